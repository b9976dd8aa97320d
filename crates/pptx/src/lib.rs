//! PPTX (Office Open XML) backend for reconstructed slide decks.
//!
//! Writes a finished [`pdfdeck_core::Deck`] as a .pptx package and reads
//! back a shape-level summary of an existing one.

mod parts;
pub mod reader;
pub mod writer;
mod xml;

pub use reader::{DeckSummary, PptxReader, SlideSummary};
pub use writer::PptxWriter;
