//! Error types for PDF to slide deck conversion.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting a document into a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The input document could not be opened or is corrupted.
    #[error("Unreadable or corrupted document: {0}")]
    DocumentError(String),

    /// The input document has no pages.
    #[error("Document contains no pages")]
    EmptyDocument,

    /// A content extraction service failed for a page.
    #[error("Content extraction error: {0}")]
    ExtractionError(String),

    /// Rendering or encoding a page raster failed.
    #[error("Raster error: {0}")]
    RasterError(String),

    /// Embedded image data is corrupt or in an unsupported format.
    #[error("Image error: {0}")]
    ImageError(String),

    /// Conversion options are out of range.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML writing or parsing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),
}
