//! Flat-image fallback for pages without usable native text.

use crate::deck::{ImageData, Slide};
use crate::error::Result;
use crate::source::PageSource;
use crate::units::CoordinateMapper;

/// Render the whole page and place it as one full-bleed picture.
///
/// No text layer is produced, so the word count for such pages is always 0.
pub fn place_scanned_page<P: PageSource>(
    page: &P,
    scale: f64,
    mapper: &CoordinateMapper,
    slide: &mut Slide,
) -> Result<()> {
    let raster = page.rasterize(scale)?;
    let image = ImageData::from_rgb(&raster)?;
    log::debug!(
        "Scanned page rendered at {}x{} px",
        image.width_px,
        image.height_px
    );
    slide.add_image(image, mapper.full_page());
    Ok(())
}
