//! Core page reconstruction for PDF to slide deck conversion:
//! page classification, text-free backgrounds, and text/image layout.

pub mod background;
pub mod classify;
pub mod deck;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod scan;
pub mod source;
pub mod style;
pub mod types;
pub mod units;

#[cfg(test)]
mod testing;

pub use background::BackgroundReconstructor;
pub use classify::{classify_text, NATIVE_TEXT_THRESHOLD};
pub use deck::{Deck, ImageData, Picture, PictureFormat, Shape, Slide, TextBox, TextRun};
pub use error::{Error, Result};
pub use layout::LayoutReconstructor;
pub use pipeline::{ConvertOptions, Conversion, Converter, DEFAULT_DPI, DPI_PRESETS};
pub use source::{DocumentSource, PageSource};
pub use style::{FontStyle, Rgb, FLAG_BOLD, FLAG_ITALIC};
pub use types::{BBox, ContentBlock, PageMode, PageReport, PageSize, TextLine, TextSpan, Word};
pub use units::{pts_to_emu, CoordinateMapper, Emu, Frame, EMU_PER_POINT};
