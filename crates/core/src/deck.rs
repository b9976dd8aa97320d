//! In-memory slide deck built by the conversion pipeline.
//!
//! The deck is append-only: slides are added in page order and shapes in
//! z-order, so the first shape of a slide is drawn underneath the rest.

use crate::error::{Error, Result};
use crate::style::Rgb;
use crate::units::{Emu, Frame};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

/// An ordered sequence of slides sharing one page size.
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    /// Slide width in EMU.
    pub width: Emu,

    /// Slide height in EMU.
    pub height: Emu,

    slides: Vec<Slide>,
}

impl Deck {
    /// Create an empty deck with the given slide size.
    pub fn new(width: Emu, height: Emu) -> Self {
        Self {
            width,
            height,
            slides: Vec::new(),
        }
    }

    /// Append a slide.
    pub fn push_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }
}

/// One slide: shapes in back-to-front order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Slide {
    shapes: Vec<Shape>,
}

impl Slide {
    /// Create a blank slide.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place encoded image bytes in the given frame.
    ///
    /// Fails with [`Error::ImageError`] if the bytes are not a decodable
    /// image in a format the output supports; the slide is left untouched.
    pub fn add_picture(&mut self, bytes: &[u8], frame: Frame) -> Result<()> {
        let image = ImageData::from_bytes(bytes)?;
        self.shapes.push(Shape::Picture(Picture { frame, image }));
        Ok(())
    }

    /// Place an already-validated image in the given frame.
    pub fn add_image(&mut self, image: ImageData, frame: Frame) {
        self.shapes.push(Shape::Picture(Picture { frame, image }));
    }

    /// Place a text box.
    pub fn add_text_box(&mut self, text_box: TextBox) {
        self.shapes.push(Shape::TextBox(text_box));
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn pictures(&self) -> impl Iterator<Item = &Picture> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Picture(p) => Some(p),
            Shape::TextBox(_) => None,
        })
    }

    pub fn text_boxes(&self) -> impl Iterator<Item = &TextBox> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::TextBox(t) => Some(t),
            Shape::Picture(_) => None,
        })
    }
}

/// A placed shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Picture(Picture),
    TextBox(TextBox),
}

/// An image stretched over a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub frame: Frame,
    pub image: ImageData,
}

/// Image formats a picture may be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PictureFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl PictureFormat {
    fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Gif => Some(Self::Gif),
            ImageFormat::Bmp => Some(Self::Bmp),
            ImageFormat::Tiff => Some(Self::Tiff),
            _ => None,
        }
    }

    /// File extension used for the media part.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    /// MIME content type.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }
}

/// Encoded image bytes with their sniffed format and pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub format: PictureFormat,
    pub width_px: u32,
    pub height_px: u32,
    pub bytes: Vec<u8>,
}

impl ImageData {
    /// Validate encoded image bytes by sniffing and fully decoding them.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::ImageError("empty image data".to_string()));
        }

        let detected = image::guess_format(bytes)
            .map_err(|e| Error::ImageError(format!("Unrecognized image data: {}", e)))?;
        let format = PictureFormat::from_image_format(detected).ok_or_else(|| {
            Error::ImageError(format!("Unsupported image format: {:?}", detected))
        })?;

        let decoded = image::load_from_memory_with_format(bytes, detected)
            .map_err(|e| Error::ImageError(format!("Corrupt {:?} image: {}", detected, e)))?;

        Ok(Self {
            format,
            width_px: decoded.width(),
            height_px: decoded.height(),
            bytes: bytes.to_vec(),
        })
    }

    /// Encode an RGB raster as PNG.
    pub fn from_rgb(raster: &RgbImage) -> Result<Self> {
        let mut bytes = Vec::new();
        raster
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| Error::RasterError(format!("PNG encoding failed: {}", e)))?;

        Ok(Self {
            format: PictureFormat::Png,
            width_px: raster.width(),
            height_px: raster.height(),
            bytes,
        })
    }

    /// Decode back to an RGB raster.
    pub fn to_rgb(&self) -> Result<RgbImage> {
        image::load_from_memory(&self.bytes)
            .map(|img| img.to_rgb8())
            .map_err(|e| Error::ImageError(e.to_string()))
    }
}

/// A non-wrapping text box holding one styled run.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub frame: Frame,

    /// Always false for reconstructed spans: the box is sized to the measured extent.
    pub word_wrap: bool,

    pub run: TextRun,
}

/// A styled run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub size_pt: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: Rgb,
    pub font: String,
}
