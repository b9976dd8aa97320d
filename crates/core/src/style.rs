//! Text attribute decoding: style flags, packed colors, font names, and
//! run text cleanup.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Span flag bit marking italic text.
pub const FLAG_ITALIC: u32 = 1 << 1;

/// Span flag bit marking bold text.
pub const FLAG_BOLD: u32 = 1 << 4;

/// Font family used when a recorded name normalizes to nothing.
pub const FALLBACK_FONT: &str = "Calibri";

/// Characters that XML 1.0 does not allow in text content.
static XML_ILLEGAL_CHARS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x{FFFE}\x{FFFF}]").unwrap());

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Decode a packed 0xRRGGBB integer. Bits above the low 24 are ignored.
    pub fn from_packed(color: u32) -> Self {
        Self {
            r: ((color >> 16) & 0xFF) as u8,
            g: ((color >> 8) & 0xFF) as u8,
            b: (color & 0xFF) as u8,
        }
    }

    /// Re-pack into 0xRRGGBB.
    pub fn packed(&self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }

    /// Upper-case hex form, e.g. `1A2B3C`.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl From<image::Rgb<u8>> for Rgb {
    fn from(px: image::Rgb<u8>) -> Self {
        Self::new(px[0], px[1], px[2])
    }
}

impl From<Rgb> for image::Rgb<u8> {
    fn from(c: Rgb) -> Self {
        image::Rgb([c.r, c.g, c.b])
    }
}

/// Bold/italic decoded from a span's flag bit-field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
}

impl FontStyle {
    /// Decode the style bits; every bit other than bold and italic is ignored.
    pub fn from_flags(flags: u32) -> Self {
        Self {
            bold: flags & FLAG_BOLD != 0,
            italic: flags & FLAG_ITALIC != 0,
        }
    }
}

/// Normalize a font name recorded in a document to a family name.
///
/// - Drops a subset prefix (`ABCDEF+Arial` → `Arial`), keeping the text after the last `+`
/// - Turns hyphens into spaces
/// - Cuts style suffixes after the first comma
/// - Falls back to [`FALLBACK_FONT`] if nothing is left
pub fn normalize_font_name(raw: &str) -> String {
    let name = raw.rsplit('+').next().unwrap_or(raw);
    let name = name.replace('-', " ");
    let name = name.split(',').next().unwrap_or("").trim();

    if name.is_empty() {
        FALLBACK_FONT.to_string()
    } else {
        name.to_string()
    }
}

/// Prepare span text for a text run: NFC-compose and strip characters
/// that cannot be stored in the output document.
pub fn clean_run_text(text: &str) -> String {
    let composed: String = text.nfc().collect();
    XML_ILLEGAL_CHARS_REGEX.replace_all(&composed, "").into_owned()
}

/// Count whitespace-delimited words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
