//! Engine-independent helpers that turn PDFium's page objects into the
//! core's words and content blocks.

use pdfdeck_core::{BBox, ContentBlock, TextLine, TextSpan, Word, FLAG_BOLD, FLAG_ITALIC};

/// Fraction of a span's font size two baselines may differ by and still
/// count as one line.
const LINE_TOLERANCE: f64 = 0.5;

/// Lowest numeric weight treated as bold.
const BOLD_WEIGHT: u32 = 600;

/// Convert a PDF rectangle (bottom-left origin, y up) to a top-left origin box.
pub fn flip_rect(left: f64, bottom: f64, right: f64, top: f64, page_height: f64) -> BBox {
    BBox::new(left, page_height - top, right, page_height - bottom)
}

/// Pack 8-bit channels as 0xRRGGBB.
pub fn pack_color(r: u8, g: u8, b: u8) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Style bits for a font, from its flags, weight and name.
pub fn style_flags(font_name: &str, italic: bool, weight: Option<u32>) -> u32 {
    let name = font_name.to_ascii_lowercase();
    let mut flags = 0;

    let heavy_name = ["bold", "black", "heavy"].iter().any(|w| name.contains(w));
    if heavy_name || weight.is_some_and(|w| w >= BOLD_WEIGHT) {
        flags |= FLAG_BOLD;
    }
    if italic || name.contains("italic") || name.contains("oblique") {
        flags |= FLAG_ITALIC;
    }
    flags
}

/// Group positioned characters into whitespace-delimited words.
///
/// Characters without bounds (generated by the engine for line ends) split
/// words like whitespace does. A character that does not overlap the
/// current word vertically starts a new word.
pub fn group_words<I>(chars: I) -> Vec<Word>
where
    I: IntoIterator<Item = (char, Option<BBox>)>,
{
    let mut words = Vec::new();
    let mut current: Option<(String, BBox)> = None;

    for (ch, bounds) in chars {
        let bbox = match bounds {
            Some(bbox) if !ch.is_whitespace() && !ch.is_control() => bbox,
            _ => {
                if let Some((text, bbox)) = current.take() {
                    words.push(Word::new(bbox, text));
                }
                continue;
            }
        };

        if let Some((text, word_box)) = current.as_mut() {
            if bbox.y0 < word_box.y1 && bbox.y1 > word_box.y0 {
                text.push(ch);
                *word_box = word_box.union(&bbox);
                continue;
            }
        }
        if let Some((text, word_box)) = current.take() {
            words.push(Word::new(word_box, text));
        }
        current = Some((ch.to_string(), bbox));
    }

    if let Some((text, bbox)) = current {
        words.push(Word::new(bbox, text));
    }
    words
}

/// A page object in content order.
#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    Span(TextSpan),
    Image { bytes: Vec<u8>, bbox: BBox },
}

/// A page object, or a container of them such as a form XObject.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectNode {
    Item(PageItem),
    Group(Vec<ObjectNode>),
}

/// Flatten object trees depth-first, keeping content order.
pub fn flatten_objects<I>(nodes: I) -> Vec<PageItem>
where
    I: IntoIterator<Item = ObjectNode>,
{
    let mut items = Vec::new();
    let mut stack: Vec<std::vec::IntoIter<ObjectNode>> = vec![nodes
        .into_iter()
        .collect::<Vec<_>>()
        .into_iter()];

    while let Some(level) = stack.last_mut() {
        match level.next() {
            Some(ObjectNode::Item(item)) => items.push(item),
            Some(ObjectNode::Group(children)) => stack.push(children.into_iter()),
            None => {
                stack.pop();
            }
        }
    }
    items
}

/// Fold page objects into blocks: runs of consecutive text objects form one
/// text block, split into lines by baseline; every image is its own block.
pub fn group_blocks(items: Vec<PageItem>) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut lines: Vec<TextLine> = Vec::new();

    for item in items {
        match item {
            PageItem::Span(span) => {
                let same_line = lines
                    .last()
                    .and_then(|line| line.spans.last())
                    .is_some_and(|prev| {
                        let tolerance = LINE_TOLERANCE * span.font_size.max(prev.font_size);
                        (prev.bbox.y1 - span.bbox.y1).abs() <= tolerance
                    });
                if same_line {
                    if let Some(line) = lines.last_mut() {
                        line.spans.push(span);
                        continue;
                    }
                }
                lines.push(TextLine::new(vec![span]));
            }
            PageItem::Image { bytes, bbox } => {
                if !lines.is_empty() {
                    blocks.push(ContentBlock::Text {
                        lines: std::mem::take(&mut lines),
                    });
                }
                blocks.push(ContentBlock::Image { bytes, bbox });
            }
        }
    }

    if !lines.is_empty() {
        blocks.push(ContentBlock::Text { lines });
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, y1: f64, size: f64) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            bbox: BBox::new(0.0, y1 - size, 10.0, y1),
            font_size: size,
            font_flags: 0,
            color: 0,
            font_name: "Helvetica".to_string(),
        }
    }

    fn chars(text: &str, y0: f64) -> Vec<(char, Option<BBox>)> {
        text.chars()
            .enumerate()
            .map(|(i, c)| {
                let x = i as f64 * 5.0;
                (c, Some(BBox::new(x, y0, x + 5.0, y0 + 10.0)))
            })
            .collect()
    }

    #[test]
    fn test_flip_rect() {
        let bbox = flip_rect(72.0, 700.0, 144.0, 720.0, 792.0);
        assert_eq!(bbox, BBox::new(72.0, 72.0, 144.0, 92.0));
    }

    #[test]
    fn test_pack_color() {
        assert_eq!(pack_color(0x12, 0x34, 0x56), 0x123456);
        assert_eq!(pack_color(255, 255, 255), 0xFFFFFF);
    }

    #[test]
    fn test_style_flags() {
        assert_eq!(style_flags("Helvetica", false, Some(400)), 0);
        assert_eq!(style_flags("Helvetica", false, Some(700)), FLAG_BOLD);
        assert_eq!(style_flags("ABCDEF+Arial-BoldMT", false, None), FLAG_BOLD);
        assert_eq!(style_flags("Inter-Black", false, Some(400)), FLAG_BOLD);
        assert_eq!(style_flags("Times-Italic", false, None), FLAG_ITALIC);
        assert_eq!(style_flags("Courier-Oblique", false, None), FLAG_ITALIC);
        assert_eq!(style_flags("Garamond", true, Some(600)), FLAG_BOLD | FLAG_ITALIC);
    }

    #[test]
    fn test_group_words_splits_on_whitespace() {
        let words = group_words(chars("ab cd", 0.0));
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "ab");
        assert_eq!(words[0].bbox, BBox::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(words[1].text, "cd");
        assert_eq!(words[1].bbox, BBox::new(15.0, 0.0, 25.0, 10.0));
    }

    #[test]
    fn test_group_words_unbounded_char_is_separator() {
        let mut input = chars("ab", 0.0);
        input.push(('\n', None));
        input.extend(chars("cd", 0.0).into_iter().map(|(c, b)| {
            (c, b.map(|b| BBox::new(b.x0 + 30.0, b.y0, b.x1 + 30.0, b.y1)))
        }));
        let words = group_words(input);
        let texts: Vec<_> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["ab", "cd"]);
    }

    #[test]
    fn test_group_words_line_change_splits() {
        let mut input = chars("ab", 0.0);
        input.extend(chars("cd", 20.0));
        let words = group_words(input);
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].bbox.y0, 20.0);
    }

    #[test]
    fn test_group_words_empty() {
        assert!(group_words(Vec::new()).is_empty());
        assert!(group_words(chars("   ", 0.0)).is_empty());
    }

    #[test]
    fn test_group_blocks_lines_and_images() {
        let items = vec![
            PageItem::Span(span("Title", 100.0, 12.0)),
            PageItem::Span(span("continued", 101.0, 12.0)),
            PageItem::Span(span("next line", 120.0, 12.0)),
            PageItem::Image {
                bytes: vec![1, 2, 3],
                bbox: BBox::new(0.0, 200.0, 50.0, 250.0),
            },
            PageItem::Span(span("caption", 270.0, 9.0)),
        ];

        let blocks = group_blocks(items);
        assert_eq!(blocks.len(), 3);
        match &blocks[0] {
            ContentBlock::Text { lines } => {
                assert_eq!(lines.len(), 2);
                assert_eq!(lines[0].spans.len(), 2);
                assert_eq!(lines[1].spans[0].text, "next line");
            }
            other => panic!("expected text block, got {:?}", other),
        }
        assert!(matches!(blocks[1], ContentBlock::Image { .. }));
        assert!(matches!(&blocks[2], ContentBlock::Text { lines } if lines.len() == 1));
    }

    #[test]
    fn test_form_contents_join_page_text() {
        let nodes = vec![
            ObjectNode::Group(vec![
                ObjectNode::Item(PageItem::Span(span("Hello", 100.0, 12.0))),
                ObjectNode::Group(vec![ObjectNode::Item(PageItem::Span(span(
                    "World", 100.0, 12.0,
                )))]),
            ]),
            ObjectNode::Group(Vec::new()),
            ObjectNode::Item(PageItem::Span(span("Below", 130.0, 12.0))),
        ];

        let items = flatten_objects(nodes);
        let texts: Vec<_> = items
            .iter()
            .filter_map(|item| match item {
                PageItem::Span(s) => Some(s.text.as_str()),
                PageItem::Image { .. } => None,
            })
            .collect();
        assert_eq!(texts, vec!["Hello", "World", "Below"]);

        let blocks = group_blocks(items);
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            ContentBlock::Text { lines } => {
                assert_eq!(lines.len(), 2);
                assert_eq!(lines[0].spans.len(), 2);
            }
            other => panic!("expected text block, got {:?}", other),
        }
    }

    #[test]
    fn test_flatten_objects_empty() {
        assert!(flatten_objects(Vec::new()).is_empty());
        assert!(flatten_objects(vec![ObjectNode::Group(Vec::new())]).is_empty());
    }

    #[test]
    fn test_group_blocks_empty() {
        assert!(group_blocks(Vec::new()).is_empty());
    }
}
