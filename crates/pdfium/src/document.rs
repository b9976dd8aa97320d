//! PDFium-backed document and page sources.

use crate::extract::{
    flatten_objects, flip_rect, group_blocks, group_words, pack_color, style_flags, ObjectNode,
    PageItem,
};
use image::{ImageFormat, RgbImage, RgbaImage};
use pdfdeck_core::{
    BBox, ContentBlock, DocumentSource, Error, PageSize, PageSource, Result, TextSpan, Word,
};
use pdfium_render::prelude::*;
use std::io::Cursor;

/// A loaded PDF document.
pub struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumDocument<'a> {
    /// Load a document from its raw bytes.
    pub fn load(pdfium: &'a Pdfium, bytes: Vec<u8>) -> Result<Self> {
        let document = pdfium
            .load_pdf_from_byte_vec(bytes, None)
            .map_err(|e| Error::DocumentError(format!("Failed to open PDF: {}", e)))?;
        Ok(Self { document })
    }
}

impl<'a> DocumentSource for PdfiumDocument<'a> {
    type Page = PdfiumPage<'a>;

    fn page_count(&self) -> Result<usize> {
        Ok(self.document.pages().len() as usize)
    }

    fn page(&self, index: usize) -> Result<PdfiumPage<'a>> {
        let page_index: PdfPageIndex = index
            .try_into()
            .map_err(|_| Error::DocumentError(format!("Page index {} out of range", index)))?;
        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|e| Error::DocumentError(format!("Failed to open page {}: {}", index + 1, e)))?;
        Ok(PdfiumPage::new(page))
    }
}

/// One page of a [`PdfiumDocument`].
pub struct PdfiumPage<'a> {
    page: PdfPage<'a>,
    size: PageSize,
}

impl<'a> PdfiumPage<'a> {
    fn new(page: PdfPage<'a>) -> Self {
        let size = PageSize::new(
            f64::from(page.width().value),
            f64::from(page.height().value),
        );
        Self { page, size }
    }

    fn text_span(&self, object: &PdfPageTextObject) -> Option<TextSpan> {
        let text = object.text();
        if text.is_empty() {
            return None;
        }
        let bounds = object.bounds().ok()?;
        let bbox = flip_rect(
            f64::from(bounds.left().value),
            f64::from(bounds.bottom().value),
            f64::from(bounds.right().value),
            f64::from(bounds.top().value),
            self.size.height,
        );

        let font = object.font();
        let font_name = font.name();
        let italic = font.is_italic();
        let weight = font.weight().ok().map(weight_value);

        let color = object
            .fill_color()
            .map(|c| pack_color(c.red(), c.green(), c.blue()))
            .unwrap_or(0);

        Some(TextSpan {
            text,
            bbox,
            font_size: f64::from(object.scaled_font_size().value),
            font_flags: style_flags(&font_name, italic, weight),
            color,
            font_name,
        })
    }

    fn image_item(&self, object: &PdfPageImageObject) -> Option<PageItem> {
        let bounds = object.bounds().ok()?;
        let bbox = flip_rect(
            f64::from(bounds.left().value),
            f64::from(bounds.bottom().value),
            f64::from(bounds.right().value),
            f64::from(bounds.top().value),
            self.size.height,
        );

        // Unreadable pixels yield an empty payload; layout skips those.
        let bytes = match object.get_raw_image() {
            Ok(raw) => {
                let rgba = raw.to_rgba8();
                let (width, height) = (rgba.width(), rgba.height());
                encode_png_rgba(width, height, rgba.into_raw()).unwrap_or_else(|e| {
                    log::debug!("Dropping embedded image at {:?}: {}", bbox, e);
                    Vec::new()
                })
            }
            Err(e) => {
                log::debug!("Embedded image at {:?} has no readable pixels: {}", bbox, e);
                Vec::new()
            }
        };

        Some(PageItem::Image { bytes, bbox })
    }

    /// Text and image objects, with form XObjects expanded into their contents.
    fn object_node(&self, object: &PdfPageObject<'_>) -> Option<ObjectNode> {
        if let Some(text_object) = object.as_text_object() {
            return self
                .text_span(text_object)
                .map(|span| ObjectNode::Item(PageItem::Span(span)));
        }
        if let Some(image_object) = object.as_image_object() {
            return self.image_item(image_object).map(ObjectNode::Item);
        }
        let form = object.as_x_object_form_object()?;
        let children = form
            .iter()
            .filter_map(|child| self.object_node(&child))
            .collect();
        Some(ObjectNode::Group(children))
    }
}

fn text_err(e: PdfiumError) -> Error {
    Error::ExtractionError(format!("Failed to read page text: {}", e))
}

/// Map PDFium's font weight to its numeric CSS-style value.
fn weight_value(weight: PdfFontWeight) -> u32 {
    match weight {
        PdfFontWeight::Weight100 => 100,
        PdfFontWeight::Weight200 => 200,
        PdfFontWeight::Weight300 => 300,
        PdfFontWeight::Weight400Normal => 400,
        PdfFontWeight::Weight500 => 500,
        PdfFontWeight::Weight600 => 600,
        PdfFontWeight::Weight700Bold => 700,
        PdfFontWeight::Weight800 => 800,
        PdfFontWeight::Weight900 => 900,
        PdfFontWeight::Custom(value) => value,
    }
}

/// Re-encode RGBA pixels as PNG with this crate's `image` version.
fn encode_png_rgba(width: u32, height: u32, raw: Vec<u8>) -> Result<Vec<u8>> {
    let buffer = RgbaImage::from_raw(width, height, raw)
        .ok_or_else(|| Error::ImageError("Pixel buffer does not match its size".to_string()))?;
    let mut bytes = Vec::new();
    buffer
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| Error::ImageError(format!("PNG encoding failed: {}", e)))?;
    Ok(bytes)
}

/// Pixel size of a render at `scale` pixels per point, at least 1x1.
pub fn render_size(size: PageSize, scale: f64) -> (u32, u32) {
    let width = (size.width * scale).round().max(1.0) as u32;
    let height = (size.height * scale).round().max(1.0) as u32;
    (width, height)
}

impl<'a> PageSource for PdfiumPage<'a> {
    fn size(&self) -> PageSize {
        self.size
    }

    fn rasterize(&self, scale: f64) -> Result<RgbImage> {
        let (width, height) = render_size(self.size, scale);
        let config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32);

        let bitmap = self
            .page
            .render_with_config(&config)
            .map_err(|e| Error::RasterError(format!("Failed to render page: {}", e)))?;
        let rgb = bitmap.as_image().to_rgb8();
        let (w, h) = (rgb.width(), rgb.height());

        RgbImage::from_raw(w, h, rgb.into_raw())
            .ok_or_else(|| Error::RasterError("Rendered buffer does not match its size".to_string()))
    }

    fn extract_text(&self) -> Result<String> {
        let text = self.page.text().map_err(text_err)?;
        Ok(text.all())
    }

    fn extract_words(&self) -> Result<Vec<Word>> {
        let text = self.page.text().map_err(text_err)?;
        let height = self.size.height;

        let text_chars = text.chars();
        let chars = text_chars.iter().map(|ch| {
            let c = ch.unicode_char().unwrap_or(' ');
            let bbox: Option<BBox> = ch.loose_bounds().ok().map(|r| {
                flip_rect(
                    f64::from(r.left().value),
                    f64::from(r.bottom().value),
                    f64::from(r.right().value),
                    f64::from(r.top().value),
                    height,
                )
            });
            (c, bbox)
        });

        Ok(group_words(chars))
    }

    fn extract_blocks(&self) -> Result<Vec<ContentBlock>> {
        let nodes = self
            .page
            .objects()
            .iter()
            .filter_map(|object| self.object_node(&object));

        Ok(group_blocks(flatten_objects(nodes)))
    }
}
