//! Collaborator interfaces the conversion pipeline consumes.
//!
//! A PDF engine backend implements these; the pipeline never touches the
//! engine directly.

use crate::error::Result;
use crate::types::{ContentBlock, PageSize, Word};
use image::RgbImage;

/// A paginated input document.
pub trait DocumentSource {
    /// Page handle produced by this document.
    type Page: PageSource;

    /// Number of pages in the document.
    fn page_count(&self) -> Result<usize>;

    /// Open the page at a 0-based index.
    fn page(&self, index: usize) -> Result<Self::Page>;
}

/// One page of an input document. Pages are immutable for the duration of
/// a conversion.
pub trait PageSource {
    /// Page extent in document points.
    fn size(&self) -> PageSize;

    /// Render the page with `scale` pixels per point.
    fn rasterize(&self, scale: f64) -> Result<RgbImage>;

    /// Plain text content of the page.
    fn extract_text(&self) -> Result<String>;

    /// Bounding boxes of every whitespace-delimited word of native text.
    fn extract_words(&self) -> Result<Vec<Word>>;

    /// Structured content (text spans and embedded images) in document order.
    fn extract_blocks(&self) -> Result<Vec<ContentBlock>>;
}
