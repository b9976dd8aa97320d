//! Native/scan page classification.

use crate::error::Result;
use crate::source::PageSource;
use crate::types::PageMode;

/// Minimum stripped text length, in characters, for a page to count as native.
pub const NATIVE_TEXT_THRESHOLD: usize = 10;

/// Classify a page from its plain text.
pub fn classify_text(text: &str) -> PageMode {
    if text.trim().chars().count() >= NATIVE_TEXT_THRESHOLD {
        PageMode::Native
    } else {
        PageMode::Scan
    }
}

/// Classify a page by extracting its plain text.
pub fn classify_page<P: PageSource>(page: &P) -> Result<PageMode> {
    let text = page.extract_text()?;
    Ok(classify_text(&text))
}
