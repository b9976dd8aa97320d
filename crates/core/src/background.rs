//! Text-free page backgrounds.
//!
//! Every native word is painted over with the most common color found in
//! thin strips just outside its box, which approximates inpainting on
//! locally uniform backgrounds.

use crate::deck::{ImageData, Slide};
use crate::error::Result;
use crate::source::PageSource;
use crate::style::Rgb;
use crate::types::{BBox, Word};
use crate::units::CoordinateMapper;
use image::RgbImage;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Minimum thickness of the sampled border strips, in pixels.
pub const MIN_BORDER_PX: i64 = 2;

/// Erases native text from page rasters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundReconstructor {
    scale: f64,
    border: i64,
}

impl BackgroundReconstructor {
    /// Create a reconstructor for rasters rendered at `scale` pixels per point.
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            border: border_thickness(scale),
        }
    }

    /// Render the page, erase its words, and place the result as a
    /// full-page background picture on `slide`.
    pub fn reconstruct<P: PageSource>(
        &self,
        page: &P,
        mapper: &CoordinateMapper,
        slide: &mut Slide,
    ) -> Result<()> {
        let mut raster = page.rasterize(self.scale)?;
        let words = page.extract_words()?;

        self.erase_words(&mut raster, &words);

        let image = ImageData::from_rgb(&raster)?;
        log::debug!(
            "Background {}x{} px, {} words erased, {} bytes",
            raster.width(),
            raster.height(),
            words.len(),
            image.bytes.len()
        );
        slide.add_image(image, mapper.full_page());
        Ok(())
    }

    /// Paint over every word in place.
    pub fn erase_words(&self, raster: &mut RgbImage, words: &[Word]) {
        for word in words {
            self.erase_word(raster, &word.bbox);
        }
    }

    /// Paint over one word box, expanded by 1 pixel on every side, with the
    /// dominant color of its surroundings (white if none can be sampled).
    pub fn erase_word(&self, raster: &mut RgbImage, bbox: &BBox) {
        let w = i64::from(raster.width());
        let h = i64::from(raster.height());
        let px = PixelBox::from_points(bbox, self.scale).clamped(w, h, self.border + 1);
        let samples = sample_border(raster, &px, self.border);
        let fill = dominant_color(&samples).unwrap_or(Rgb::WHITE);

        fill_rect(
            raster,
            (px.x0 - 1).max(0),
            (px.y0 - 1).max(0),
            (px.x1 + 1).min(w - 1),
            (px.y1 + 1).min(h - 1),
            fill,
        );
    }
}

/// `max(2, round(scale))`.
pub fn border_thickness(scale: f64) -> i64 {
    (scale.round() as i64).max(MIN_BORDER_PX)
}

/// A word box in pixel space; `x1`/`y1` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelBox {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

impl PixelBox {
    fn from_points(bbox: &BBox, scale: f64) -> Self {
        Self {
            x0: (bbox.x0 * scale) as i64,
            y0: (bbox.y0 * scale) as i64,
            x1: (bbox.x1 * scale) as i64,
            y1: (bbox.y1 * scale) as i64,
        }
    }

    /// Clamp into `[-margin, w + margin] × [-margin, h + margin]`; anything
    /// past the margin samples and fills the same pixels.
    fn clamped(self, w: i64, h: i64, margin: i64) -> Self {
        Self {
            x0: self.x0.clamp(-margin, w + margin),
            y0: self.y0.clamp(-margin, h + margin),
            x1: self.x1.clamp(-margin, w + margin),
            y1: self.y1.clamp(-margin, h + margin),
        }
    }
}

/// Collect pixels from the strips above, below, left of and right of the
/// box, in that order, each row-major. A strip is skipped when it would
/// start outside the image; otherwise it is clipped to the image and to the
/// box's own horizontal (top/bottom) or vertical (left/right) extent.
fn sample_border(raster: &RgbImage, px: &PixelBox, border: i64) -> Vec<Rgb> {
    let w = i64::from(raster.width());
    let h = i64::from(raster.height());
    let mut samples = Vec::new();

    if px.y0 - border >= 0 {
        collect_region(raster, px.x0.max(0), px.y0 - border, px.x1.min(w), px.y0, &mut samples);
    }
    if px.y1 + border <= h {
        collect_region(raster, px.x0.max(0), px.y1, px.x1.min(w), (px.y1 + border).min(h), &mut samples);
    }
    if px.x0 - border >= 0 {
        collect_region(raster, px.x0 - border, px.y0.max(0), px.x0, px.y1.min(h), &mut samples);
    }
    if px.x1 + border <= w {
        collect_region(raster, px.x1, px.y0.max(0), (px.x1 + border).min(w), px.y1.min(h), &mut samples);
    }

    samples
}

/// Push pixels of the half-open region `[x0, x1) × [y0, y1)`, clipped to the image.
fn collect_region(raster: &RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, out: &mut Vec<Rgb>) {
    let w = i64::from(raster.width());
    let h = i64::from(raster.height());
    let (x0, x1) = (x0.clamp(0, w), x1.clamp(0, w));
    let (y0, y1) = (y0.clamp(0, h), y1.clamp(0, h));

    for y in y0..y1 {
        for x in x0..x1 {
            out.push(Rgb::from(*raster.get_pixel(x as u32, y as u32)));
        }
    }
}

/// Most frequent color; ties go to the color encountered first.
fn dominant_color(samples: &[Rgb]) -> Option<Rgb> {
    let mut counts: HashMap<Rgb, (usize, usize)> = HashMap::new();
    for (idx, color) in samples.iter().enumerate() {
        counts.entry(*color).or_insert((0, idx)).0 += 1;
    }

    counts
        .into_iter()
        .max_by_key(|(_, (count, first))| (*count, Reverse(*first)))
        .map(|(color, _)| color)
}

/// Fill the inclusive rectangle `[x0, x1] × [y0, y1]`. Empty if inverted.
fn fill_rect(raster: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb) {
    if x0 > x1 || y0 > y1 {
        return;
    }
    let px: image::Rgb<u8> = color.into();
    for y in y0..=y1 {
        for x in x0..=x1 {
            raster.put_pixel(x as u32, y as u32, px);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgb = Rgb::new(240, 230, 200);
    const INK: Rgb = Rgb::new(20, 20, 20);

    fn canvas(w: u32, h: u32, color: Rgb) -> RgbImage {
        RgbImage::from_pixel(w, h, color.into())
    }

    fn paint(raster: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb) {
        for y in y0..y1 {
            for x in x0..x1 {
                raster.put_pixel(x, y, color.into());
            }
        }
    }

    fn px(raster: &RgbImage, x: u32, y: u32) -> Rgb {
        Rgb::from(*raster.get_pixel(x, y))
    }

    #[test]
    fn test_border_thickness() {
        assert_eq!(border_thickness(72.0 / 72.0), 2);
        assert_eq!(border_thickness(100.0 / 72.0), 2);
        assert_eq!(border_thickness(150.0 / 72.0), 2);
        assert_eq!(border_thickness(200.0 / 72.0), 3);
        assert_eq!(border_thickness(250.0 / 72.0), 3);
        assert_eq!(border_thickness(300.0 / 72.0), 4);
    }

    #[test]
    fn test_word_on_uniform_background_is_erased() {
        let mut raster = canvas(100, 60, BG);
        // glyph strokes inside the word box (20..60, 20..35)
        paint(&mut raster, 22, 22, 30, 33, INK);
        paint(&mut raster, 35, 21, 38, 34, INK);
        paint(&mut raster, 45, 25, 58, 30, INK);

        let recon = BackgroundReconstructor::new(1.0);
        recon.erase_word(&mut raster, &BBox::new(20.0, 20.0, 60.0, 35.0));

        assert_eq!(px(&raster, 40, 27), BG);
        for y in 0..60 {
            for x in 0..100 {
                assert_eq!(px(&raster, x, y), BG, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_scaled_word_box() {
        // 2x scale: word at (10,10)-(30,20) pt covers (20,20)-(60,40) px
        let mut raster = canvas(120, 80, BG);
        paint(&mut raster, 24, 24, 56, 36, INK);

        let recon = BackgroundReconstructor::new(2.0);
        recon.erase_words(&mut raster, &[Word::new(BBox::new(10.0, 10.0, 30.0, 20.0), "ink")]);

        assert_eq!(px(&raster, 40, 30), BG);
        assert_eq!(px(&raster, 24, 24), BG);
    }

    #[test]
    fn test_expansion_absorbs_antialiased_edge() {
        let mut raster = canvas(50, 50, BG);
        let halo = Rgb::new(120, 120, 120);
        // box is [10, 20) x [10, 20); halo sits on the right/bottom edge pixels
        paint(&mut raster, 10, 10, 20, 20, INK);
        paint(&mut raster, 20, 10, 21, 20, halo);
        paint(&mut raster, 10, 20, 20, 21, halo);

        BackgroundReconstructor::new(1.0).erase_word(&mut raster, &BBox::new(10.0, 10.0, 20.0, 20.0));

        assert_eq!(px(&raster, 20, 15), BG);
        assert_eq!(px(&raster, 15, 20), BG);
        assert_eq!(px(&raster, 21, 15), BG);
        assert_eq!(px(&raster, 9, 9), BG);
    }

    #[test]
    fn test_fill_stops_one_pixel_outside_box() {
        let marker = Rgb::new(0, 0, 255);
        let mut raster = canvas(50, 50, BG);
        paint(&mut raster, 22, 10, 23, 20, marker);

        BackgroundReconstructor::new(1.0).erase_word(&mut raster, &BBox::new(10.0, 10.0, 20.0, 20.0));

        // x = 21 is inside the 1 px expansion, x = 22 is not
        assert_eq!(px(&raster, 22, 15), marker);
    }

    #[test]
    fn test_local_backgrounds_are_sampled_per_word() {
        let left_bg = Rgb::new(255, 0, 0);
        let right_bg = Rgb::new(0, 0, 255);
        let mut raster = canvas(100, 40, left_bg);
        paint(&mut raster, 50, 0, 100, 40, right_bg);
        paint(&mut raster, 12, 12, 28, 28, INK);
        paint(&mut raster, 62, 12, 88, 28, INK);

        let recon = BackgroundReconstructor::new(1.0);
        recon.erase_words(
            &mut raster,
            &[
                Word::new(BBox::new(10.0, 10.0, 30.0, 30.0), "left"),
                Word::new(BBox::new(60.0, 10.0, 90.0, 30.0), "right"),
            ],
        );

        assert_eq!(px(&raster, 20, 20), left_bg);
        assert_eq!(px(&raster, 75, 20), right_bg);
    }

    #[test]
    fn test_box_covering_image_falls_back_to_white() {
        let mut raster = canvas(20, 20, INK);
        BackgroundReconstructor::new(1.0).erase_word(&mut raster, &BBox::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(px(&raster, 10, 10), Rgb::WHITE);
        assert_eq!(px(&raster, 0, 0), Rgb::WHITE);
        assert_eq!(px(&raster, 19, 19), Rgb::WHITE);
    }

    #[test]
    fn test_box_outside_image_is_harmless() {
        let mut raster = canvas(20, 20, BG);
        let recon = BackgroundReconstructor::new(1.0);
        recon.erase_word(&mut raster, &BBox::new(-50.0, -50.0, -30.0, -30.0));
        recon.erase_word(&mut raster, &BBox::new(40.0, 40.0, 60.0, 60.0));
        recon.erase_word(&mut raster, &BBox::new(15.0, 15.0, 5.0, 5.0));
        assert!(raster.pixels().all(|p| Rgb::from(*p) == BG));
    }

    #[test]
    fn test_huge_coordinates_are_clamped() {
        let mut raster = canvas(20, 20, BG);
        paint(&mut raster, 6, 6, 19, 10, INK);

        let recon = BackgroundReconstructor::new(1.0);
        recon.erase_word(&mut raster, &BBox::new(5.0, 5.0, 1e300, 10.0));
        assert!(raster.pixels().all(|p| Rgb::from(*p) == BG));

        recon.erase_word(&mut raster, &BBox::new(-1e300, -1e300, 1e300, 1e300));
        assert!(raster.pixels().all(|p| Rgb::from(*p) == Rgb::WHITE));

        recon.erase_word(&mut raster, &BBox::new(f64::NAN, 0.0, f64::INFINITY, 4.0));
    }

    #[test]
    fn test_dominant_color_tie_prefers_first_seen() {
        let a = Rgb::new(1, 1, 1);
        let b = Rgb::new(2, 2, 2);
        assert_eq!(dominant_color(&[a, b, b, a]), Some(a));
        assert_eq!(dominant_color(&[b, a, a, b]), Some(b));
        assert_eq!(dominant_color(&[a, b, b]), Some(b));
        assert_eq!(dominant_color(&[]), None);
    }

    #[test]
    fn test_sample_order_top_bottom_left_right() {
        let top = Rgb::new(1, 0, 0);
        let bottom = Rgb::new(2, 0, 0);
        let left = Rgb::new(3, 0, 0);
        let right = Rgb::new(4, 0, 0);
        let mut raster = canvas(30, 30, BG);
        paint(&mut raster, 10, 8, 20, 10, top);
        paint(&mut raster, 10, 20, 20, 22, bottom);
        paint(&mut raster, 8, 10, 10, 20, left);
        paint(&mut raster, 20, 10, 22, 20, right);

        let px_box = PixelBox {
            x0: 10,
            y0: 10,
            x1: 20,
            y1: 20,
        };
        let samples = sample_border(&raster, &px_box, 2);

        assert_eq!(samples.len(), 4 * 20);
        assert!(samples[..20].iter().all(|c| *c == top));
        assert!(samples[20..40].iter().all(|c| *c == bottom));
        assert!(samples[40..60].iter().all(|c| *c == left));
        assert!(samples[60..].iter().all(|c| *c == right));
    }

    #[test]
    fn test_strips_skipped_at_image_edges() {
        let raster = canvas(30, 30, BG);
        // touches the top and left edges: only bottom and right strips remain
        let px_box = PixelBox {
            x0: 0,
            y0: 1,
            x1: 10,
            y1: 10,
        };
        let samples = sample_border(&raster, &px_box, 2);
        assert_eq!(samples.len(), 10 * 2 + 9 * 2);
    }
}
