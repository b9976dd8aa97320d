//! Selectable text layer and embedded images for native pages.

use crate::deck::{Slide, TextBox, TextRun};
use crate::error::Result;
use crate::source::PageSource;
use crate::style::{clean_run_text, normalize_font_name, word_count, FontStyle, Rgb};
use crate::types::{BBox, ContentBlock, TextSpan};
use crate::units::CoordinateMapper;

/// Places text spans and embedded images over a page background.
#[derive(Debug, Clone, Copy)]
pub struct LayoutReconstructor {
    mapper: CoordinateMapper,
}

impl LayoutReconstructor {
    /// Create a layout reconstructor for one output page.
    pub fn new(mapper: CoordinateMapper) -> Self {
        Self { mapper }
    }

    /// Extract the page's blocks and place them on `slide`.
    ///
    /// Returns the number of whitespace-delimited words written.
    pub fn reconstruct<P: PageSource>(&self, page: &P, slide: &mut Slide) -> Result<usize> {
        let blocks = page.extract_blocks()?;
        Ok(self.place_blocks(&blocks, slide))
    }

    /// Place blocks in document order. Returns the number of words written.
    pub fn place_blocks(&self, blocks: &[ContentBlock], slide: &mut Slide) -> usize {
        let mut words = 0;

        for block in blocks {
            match block {
                ContentBlock::Image { bytes, bbox } => self.place_image(bytes, bbox, slide),
                ContentBlock::Text { lines } => {
                    for span in lines.iter().flat_map(|l| l.spans.iter()) {
                        words += self.place_span(span, slide);
                    }
                }
            }
        }

        words
    }

    /// Place an embedded image. Unreadable image data only costs this block.
    fn place_image(&self, bytes: &[u8], bbox: &BBox, slide: &mut Slide) {
        if bytes.is_empty() {
            return;
        }

        let frame = self.mapper.project(bbox);
        if let Err(e) = slide.add_picture(bytes, frame) {
            log::warn!("Skipping embedded image at {:?}: {}", bbox, e);
        }
    }

    /// Place one span as its own non-wrapping text box. Returns its word count.
    fn place_span(&self, span: &TextSpan, slide: &mut Slide) -> usize {
        if span.text.trim().is_empty() {
            return 0;
        }

        let style = FontStyle::from_flags(span.font_flags);
        slide.add_text_box(TextBox {
            frame: self.mapper.project(&span.bbox),
            word_wrap: false,
            run: TextRun {
                text: clean_run_text(&span.text),
                size_pt: span.font_size,
                bold: style.bold,
                italic: style.italic,
                color: Rgb::from_packed(span.color),
                font: normalize_font_name(&span.font_name),
            },
        });

        word_count(&span.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{ImageData, Shape};
    use crate::style::FALLBACK_FONT;
    use crate::types::TextLine;
    use crate::units::{pts_to_emu, Frame};
    use image::RgbImage;

    fn layout() -> LayoutReconstructor {
        LayoutReconstructor::new(CoordinateMapper::for_page_points(612.0, 792.0))
    }

    fn span(text: &str, bbox: BBox) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            bbox,
            font_size: 12.0,
            font_flags: 0,
            color: 0,
            font_name: "ABCDEF+Helvetica".to_string(),
        }
    }

    fn text_block(spans: Vec<TextSpan>) -> ContentBlock {
        ContentBlock::Text {
            lines: vec![TextLine::new(spans)],
        }
    }

    fn png(w: u32, h: u32) -> Vec<u8> {
        ImageData::from_rgb(&RgbImage::new(w, h)).unwrap().bytes
    }

    #[test]
    fn test_span_becomes_styled_text_box() {
        let mut s = span("Hello World", BBox::new(72.0, 72.0, 144.0, 86.0));
        s.font_flags = 16 | 2 | 4;
        s.color = 0x336699;
        s.font_size = 14.5;
        s.font_name = "XYZABC+Arial-BoldItalic,Bold".to_string();

        let mut slide = Slide::new();
        let words = layout().place_blocks(&[text_block(vec![s])], &mut slide);

        assert_eq!(words, 2);
        let boxes: Vec<_> = slide.text_boxes().collect();
        assert_eq!(boxes.len(), 1);
        let tb = boxes[0];
        assert!(!tb.word_wrap);
        assert_eq!(tb.frame, Frame::new(914_400, 914_400, 914_400, pts_to_emu(14.0)));
        assert_eq!(tb.run.text, "Hello World");
        assert_eq!(tb.run.size_pt, 14.5);
        assert!(tb.run.bold);
        assert!(tb.run.italic);
        assert_eq!(tb.run.color, Rgb::new(0x33, 0x66, 0x99));
        assert_eq!(tb.run.font, "Arial BoldItalic");
    }

    #[test]
    fn test_whitespace_spans_skipped() {
        let mut slide = Slide::new();
        let words = layout().place_blocks(
            &[text_block(vec![
                span("   ", BBox::new(0.0, 0.0, 10.0, 10.0)),
                span("", BBox::new(0.0, 0.0, 10.0, 10.0)),
                span("\t\n", BBox::new(0.0, 0.0, 10.0, 10.0)),
            ])],
            &mut slide,
        );
        assert_eq!(words, 0);
        assert!(slide.shapes().is_empty());
    }

    #[test]
    fn test_each_span_is_independent_box() {
        let mut slide = Slide::new();
        let blocks = vec![
            text_block(vec![
                span("Title ", BBox::new(50.0, 40.0, 90.0, 55.0)),
                span("in bold", BBox::new(90.0, 40.0, 130.0, 55.0)),
            ]),
            ContentBlock::Text {
                lines: vec![
                    TextLine::new(vec![span("second block", BBox::new(50.0, 100.0, 120.0, 112.0))]),
                    TextLine::new(vec![span("three more words", BBox::new(50.0, 114.0, 150.0, 126.0))]),
                ],
            },
        ];

        let words = layout().place_blocks(&blocks, &mut slide);

        assert_eq!(words, 1 + 2 + 2 + 3);
        let texts: Vec<_> = slide.text_boxes().map(|t| t.run.text.as_str()).collect();
        assert_eq!(texts, vec!["Title ", "in bold", "second block", "three more words"]);
    }

    #[test]
    fn test_empty_font_name_uses_fallback() {
        let mut s = span("plain text", BBox::new(0.0, 0.0, 50.0, 12.0));
        s.font_name = String::new();
        let mut slide = Slide::new();
        layout().place_blocks(&[text_block(vec![s])], &mut slide);
        assert_eq!(slide.text_boxes().next().unwrap().run.font, FALLBACK_FONT);
    }

    #[test]
    fn test_image_block_placed_with_projected_frame() {
        let mut slide = Slide::new();
        let block = ContentBlock::Image {
            bytes: png(8, 8),
            bbox: BBox::new(100.0, 200.0, 300.0, 350.0),
        };

        let words = layout().place_blocks(&[block], &mut slide);

        assert_eq!(words, 0);
        let pics: Vec<_> = slide.pictures().collect();
        assert_eq!(pics.len(), 1);
        assert_eq!(
            pics[0].frame,
            Frame::new(pts_to_emu(100.0), pts_to_emu(200.0), pts_to_emu(200.0), pts_to_emu(150.0))
        );
    }

    #[test]
    fn test_bad_image_is_skipped_and_page_continues() {
        let mut slide = Slide::new();
        let blocks = vec![
            ContentBlock::Image {
                bytes: b"\x89PNG\r\n\x1a\ncorrupted".to_vec(),
                bbox: BBox::new(0.0, 0.0, 100.0, 100.0),
            },
            ContentBlock::Image {
                bytes: Vec::new(),
                bbox: BBox::new(0.0, 0.0, 100.0, 100.0),
            },
            text_block(vec![span("after the image", BBox::new(10.0, 150.0, 200.0, 162.0))]),
            ContentBlock::Image {
                bytes: png(2, 2),
                bbox: BBox::new(0.0, 300.0, 50.0, 350.0),
            },
        ];

        let words = layout().place_blocks(&blocks, &mut slide);

        assert_eq!(words, 3);
        assert!(matches!(slide.shapes()[0], Shape::TextBox(_)));
        assert!(matches!(slide.shapes()[1], Shape::Picture(_)));
        assert_eq!(slide.shapes().len(), 2);
    }

    #[test]
    fn test_off_page_span_is_clipped() {
        let mut slide = Slide::new();
        layout().place_blocks(
            &[text_block(vec![span("overflow", BBox::new(580.0, 780.0, 680.0, 800.0))])],
            &mut slide,
        );
        let frame = slide.text_boxes().next().unwrap().frame;
        assert_eq!(frame.right(), pts_to_emu(612.0));
        assert_eq!(frame.bottom(), pts_to_emu(792.0));
    }
}
