//! Domain types for representing page content and conversion results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An axis-aligned rectangle in document points, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    /// Create a new bounding box from its corner coordinates.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Size of a page in document points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Bounding box of one whitespace-delimited token of native text.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub bbox: BBox,
    pub text: String,
}

impl Word {
    pub fn new(bbox: BBox, text: impl Into<String>) -> Self {
        Self {
            bbox,
            text: text.into(),
        }
    }
}

/// Structured content of a page, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// A block of text lines.
    Text { lines: Vec<TextLine> },
    /// An embedded raster image with its encoded bytes.
    Image { bytes: Vec<u8>, bbox: BBox },
}

/// One line of a text block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
}

impl TextLine {
    pub fn new(spans: Vec<TextSpan>) -> Self {
        Self { spans }
    }
}

/// A contiguous run of text sharing one font, size, color, and style.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// The text content, whitespace preserved.
    pub text: String,

    /// Measured extent of the run.
    pub bbox: BBox,

    /// Font size in points.
    pub font_size: f64,

    /// Style bit-field (see [`crate::style::FLAG_BOLD`] and [`crate::style::FLAG_ITALIC`]).
    pub font_flags: u32,

    /// Packed 24-bit color, 0xRRGGBB.
    pub color: u32,

    /// Raw font name as recorded in the document, possibly subset-prefixed.
    pub font_name: String,
}

/// How a page was reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageMode {
    /// Text-free background plus a selectable text layer.
    Native,
    /// One flat full-page image.
    Scan,
}

impl PageMode {
    /// Label shown in reports.
    pub fn label(&self) -> &'static str {
        match self {
            PageMode::Native => "native",
            PageMode::Scan => "scan",
        }
    }
}

impl fmt::Display for PageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-page outcome of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageReport {
    /// 1-based page number.
    pub page_number: usize,

    /// Branch the page went through.
    pub mode: PageMode,

    /// Whitespace-delimited words written to the text layer.
    pub word_count: usize,
}

impl PageReport {
    pub fn new(page_number: usize, mode: PageMode, word_count: usize) -> Self {
        Self {
            page_number,
            mode,
            word_count,
        }
    }
}
