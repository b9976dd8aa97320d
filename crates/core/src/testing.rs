//! In-memory document used by the unit tests.
//!
//! Pages carry spans and images like a real backend would report them, and
//! rasterize to a synthetic render where every word box is filled with ink
//! in the span's color over a flat page color.

use crate::error::{Error, Result};
use crate::source::{DocumentSource, PageSource};
use crate::style::Rgb;
use crate::types::{BBox, ContentBlock, PageSize, TextLine, TextSpan, Word};
use image::RgbImage;

#[derive(Debug, Clone)]
pub struct FakePage {
    size: PageSize,
    paper: Rgb,
    blocks: Vec<ContentBlock>,
    /// Dark region drawn for pages that only hold a scanned picture.
    scan_marks: Vec<BBox>,
    fail_raster: bool,
}

impl FakePage {
    /// A page with no text at all.
    pub fn blank(width: f64, height: f64) -> Self {
        Self {
            size: PageSize::new(width, height),
            paper: Rgb::WHITE,
            blocks: Vec::new(),
            scan_marks: Vec::new(),
            fail_raster: false,
        }
    }

    /// A page that only carries a scanned picture.
    pub fn scanned(width: f64, height: f64) -> Self {
        let mut page = Self::blank(width, height);
        page.paper = Rgb::new(235, 232, 220);
        page.scan_marks
            .push(BBox::new(width * 0.1, height * 0.1, width * 0.9, height * 0.3));
        page
    }

    pub fn with_paper(mut self, paper: Rgb) -> Self {
        self.paper = paper;
        self
    }

    /// Add a one-line text block holding a single span.
    pub fn with_text(self, text: &str, bbox: BBox, font_size: f64, color: u32) -> Self {
        self.with_span(TextSpan {
            text: text.to_string(),
            bbox,
            font_size,
            font_flags: 0,
            color,
            font_name: "ABCDEF+Helvetica".to_string(),
        })
    }

    pub fn with_span(mut self, span: TextSpan) -> Self {
        self.blocks.push(ContentBlock::Text {
            lines: vec![TextLine::new(vec![span])],
        });
        self
    }

    pub fn with_image(mut self, bytes: Vec<u8>, bbox: BBox) -> Self {
        self.blocks.push(ContentBlock::Image { bytes, bbox });
        self
    }

    /// Make `rasterize` fail.
    pub fn failing_raster(mut self) -> Self {
        self.fail_raster = true;
        self
    }

    fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.blocks.iter().flat_map(|b| match b {
            ContentBlock::Text { lines } => lines.iter().flat_map(|l| l.spans.iter()).collect(),
            ContentBlock::Image { .. } => Vec::new(),
        })
    }
}

/// Split a span into word boxes, giving every character the same advance.
fn span_words(span: &TextSpan) -> Vec<Word> {
    let chars: Vec<char> = span.text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    let advance = span.bbox.width() / chars.len() as f64;

    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    for idx in 0..=chars.len() {
        let is_space = idx == chars.len() || chars[idx].is_whitespace();
        match (start, is_space) {
            (None, false) => start = Some(idx),
            (Some(s), true) => {
                let text: String = chars[s..idx].iter().collect();
                let bbox = BBox::new(
                    span.bbox.x0 + s as f64 * advance,
                    span.bbox.y0,
                    span.bbox.x0 + idx as f64 * advance,
                    span.bbox.y1,
                );
                words.push(Word::new(bbox, text));
                start = None;
            }
            _ => {}
        }
    }
    words
}

fn fill(raster: &mut RgbImage, bbox: &BBox, scale: f64, inset: i64, color: Rgb) {
    let x0 = (bbox.x0 * scale) as i64 + inset;
    let y0 = (bbox.y0 * scale) as i64 + inset;
    let x1 = ((bbox.x1 * scale) as i64 - inset).min(i64::from(raster.width()));
    let y1 = ((bbox.y1 * scale) as i64 - inset).min(i64::from(raster.height()));
    for y in y0.max(0)..y1 {
        for x in x0.max(0)..x1 {
            raster.put_pixel(x as u32, y as u32, color.into());
        }
    }
}

impl PageSource for FakePage {
    fn size(&self) -> PageSize {
        self.size
    }

    fn rasterize(&self, scale: f64) -> Result<RgbImage> {
        if self.fail_raster {
            return Err(Error::RasterError("synthetic render failure".to_string()));
        }
        let w = (self.size.width * scale).round() as u32;
        let h = (self.size.height * scale).round() as u32;
        let mut raster = RgbImage::from_pixel(w, h, self.paper.into());

        for mark in &self.scan_marks {
            fill(&mut raster, mark, scale, 0, Rgb::new(40, 40, 40));
        }
        for span in self.spans() {
            for word in span_words(span) {
                fill(&mut raster, &word.bbox, scale, 1, Rgb::from_packed(span.color));
            }
        }
        Ok(raster)
    }

    fn extract_text(&self) -> Result<String> {
        Ok(self
            .spans()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn extract_words(&self) -> Result<Vec<Word>> {
        Ok(self.spans().flat_map(span_words).collect())
    }

    fn extract_blocks(&self) -> Result<Vec<ContentBlock>> {
        Ok(self.blocks.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeDocument {
    pages: Vec<FakePage>,
    unreadable: bool,
}

impl FakeDocument {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            pages,
            unreadable: false,
        }
    }

    /// A document whose page table cannot be read.
    pub fn unreadable() -> Self {
        Self {
            pages: Vec::new(),
            unreadable: true,
        }
    }
}

impl DocumentSource for FakeDocument {
    type Page = FakePage;

    fn page_count(&self) -> Result<usize> {
        if self.unreadable {
            return Err(Error::DocumentError("synthetic corrupt document".to_string()));
        }
        Ok(self.pages.len())
    }

    fn page(&self, index: usize) -> Result<FakePage> {
        self.pages
            .get(index)
            .cloned()
            .ok_or_else(|| Error::DocumentError(format!("page {} out of range", index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_words_split_on_whitespace() {
        let span = TextSpan {
            text: "ab  cd".to_string(),
            bbox: BBox::new(0.0, 0.0, 60.0, 10.0),
            font_size: 10.0,
            font_flags: 0,
            color: 0,
            font_name: String::new(),
        };
        let words = span_words(&span);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].bbox, BBox::new(0.0, 0.0, 20.0, 10.0));
        assert_eq!(words[1].bbox, BBox::new(40.0, 0.0, 60.0, 10.0));
        assert_eq!(words[1].text, "cd");
    }
}
