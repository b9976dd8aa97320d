//! PPTX package writer.

use crate::parts::{self, rel_type, NS_A, NS_CONTENT_TYPES, NS_P, NS_PKG_RELS, NS_R};
use crate::xml::XmlPart;
use pdfdeck_core::{Deck, Error, Frame, Picture, PictureFormat, Result, Shape, Slide, TextBox};
use std::io::{Cursor, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Valid range of `a:rPr/@sz`, in hundredths of a point.
const MIN_FONT_SIZE: i64 = 100;
const MAX_FONT_SIZE: i64 = 400_000;

/// Valid range of `p:sldSz` extents, in EMU.
const MIN_SLIDE_EXTENT: i64 = 914_400;
const MAX_SLIDE_EXTENT: i64 = 51_206_400;

/// Writer for PPTX (Office Open XML) presentations.
pub struct PptxWriter {
    title: Option<String>,
}

impl PptxWriter {
    /// Create a new PPTX writer.
    pub fn new() -> Self {
        Self { title: None }
    }

    /// Set the document title stored in the core properties.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Serialize a deck into an in-memory PPTX file.
    pub fn to_bytes(&self, deck: &Deck) -> Result<Vec<u8>> {
        let cursor = self.write(deck, Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Write a deck as a PPTX package and return the underlying writer.
    pub fn write<W: Write + Seek>(&self, deck: &Deck, out: W) -> Result<W> {
        if !(MIN_SLIDE_EXTENT..=MAX_SLIDE_EXTENT).contains(&deck.width)
            || !(MIN_SLIDE_EXTENT..=MAX_SLIDE_EXTENT).contains(&deck.height)
        {
            log::warn!(
                "Slide size {}x{} EMU is outside the range PowerPoint accepts",
                deck.width,
                deck.height
            );
        }

        let media = MediaPlan::new(deck);
        let mut package = Package::new(out);

        package.add("[Content_Types].xml", &content_types(deck, &media)?)?;
        package.add("_rels/.rels", parts::ROOT_RELS.as_bytes())?;
        package.add("docProps/core.xml", &core_props(self.title.as_deref())?)?;
        package.add("docProps/app.xml", &app_props(deck)?)?;

        package.add("ppt/presentation.xml", &presentation(deck)?)?;
        package.add("ppt/_rels/presentation.xml.rels", &presentation_rels(deck)?)?;
        package.add("ppt/presProps.xml", parts::PRES_PROPS.as_bytes())?;
        package.add("ppt/viewProps.xml", parts::VIEW_PROPS.as_bytes())?;
        package.add("ppt/tableStyles.xml", parts::TABLE_STYLES.as_bytes())?;
        package.add("ppt/slideMasters/slideMaster1.xml", parts::SLIDE_MASTER.as_bytes())?;
        package.add(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            parts::SLIDE_MASTER_RELS.as_bytes(),
        )?;
        package.add("ppt/slideLayouts/slideLayout1.xml", parts::SLIDE_LAYOUT.as_bytes())?;
        package.add(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            parts::SLIDE_LAYOUT_RELS.as_bytes(),
        )?;
        package.add("ppt/theme/theme1.xml", parts::THEME.as_bytes())?;

        for (idx, slide) in deck.slides().iter().enumerate() {
            let names = &media.per_slide[idx];
            let number = idx + 1;
            package.add(&format!("ppt/slides/slide{}.xml", number), &slide_xml(slide)?)?;
            package.add(
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                &slide_rels(names)?,
            )?;
            for (name, picture) in names.iter().zip(slide.pictures()) {
                package.add(&format!("ppt/media/{}", name), &picture.image.bytes)?;
            }
        }

        log::debug!(
            "Wrote {} slides with {} media parts",
            deck.slides().len(),
            media.count()
        );
        package.finish()
    }
}

impl Default for PptxWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// ZIP container for the package parts.
struct Package<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: FileOptions,
}

impl<W: Write + Seek> Package<W> {
    fn new(out: W) -> Self {
        Self {
            zip: ZipWriter::new(out),
            options: FileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    fn add(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        self.zip
            .start_file(path, self.options)
            .map_err(|e| Error::ZipError(format!("Failed to start '{}': {}", path, e)))?;
        self.zip.write_all(bytes)?;
        Ok(())
    }

    fn finish(mut self) -> Result<W> {
        self.zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finalize ZIP: {}", e)))
    }
}

/// Media file names, assigned deck-wide in picture order.
struct MediaPlan {
    per_slide: Vec<Vec<String>>,
    formats: Vec<PictureFormat>,
}

impl MediaPlan {
    fn new(deck: &Deck) -> Self {
        let mut next = 1;
        let mut formats = Vec::new();
        let per_slide = deck
            .slides()
            .iter()
            .map(|slide| {
                slide
                    .pictures()
                    .map(|picture| {
                        let format = picture.image.format;
                        if !formats.contains(&format) {
                            formats.push(format);
                        }
                        let name = format!("image{}.{}", next, format.extension());
                        next += 1;
                        name
                    })
                    .collect()
            })
            .collect();

        Self { per_slide, formats }
    }

    fn count(&self) -> usize {
        self.per_slide.iter().map(Vec::len).sum()
    }
}

fn content_types(deck: &Deck, media: &MediaPlan) -> Result<Vec<u8>> {
    let mut x = XmlPart::new()?;
    x.start("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    x.empty("Default", &[("Extension", "rels"), ("ContentType", parts::CT_RELS)])?;
    x.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    for format in &media.formats {
        x.empty(
            "Default",
            &[("Extension", format.extension()), ("ContentType", format.content_type())],
        )?;
    }

    let overrides = [
        ("/ppt/presentation.xml", parts::CT_PRESENTATION),
        ("/ppt/presProps.xml", parts::CT_PRES_PROPS),
        ("/ppt/viewProps.xml", parts::CT_VIEW_PROPS),
        ("/ppt/tableStyles.xml", parts::CT_TABLE_STYLES),
        ("/ppt/slideMasters/slideMaster1.xml", parts::CT_SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml", parts::CT_SLIDE_LAYOUT),
        ("/ppt/theme/theme1.xml", parts::CT_THEME),
        ("/docProps/core.xml", parts::CT_CORE_PROPS),
        ("/docProps/app.xml", parts::CT_APP_PROPS),
    ];
    for (part, content_type) in overrides {
        x.empty("Override", &[("PartName", part), ("ContentType", content_type)])?;
    }
    for number in 1..=deck.slides().len() {
        x.empty(
            "Override",
            &[
                ("PartName", format!("/ppt/slides/slide{}.xml", number).as_str()),
                ("ContentType", parts::CT_SLIDE),
            ],
        )?;
    }

    x.end("Types")?;
    Ok(x.finish())
}

fn core_props(title: Option<&str>) -> Result<Vec<u8>> {
    let mut x = XmlPart::new()?;
    x.start(
        "cp:coreProperties",
        &[
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    if let Some(title) = title {
        x.text_element("dc:title", title)?;
    }
    x.text_element("dc:creator", "pdf2pptx")?;
    x.end("cp:coreProperties")?;
    Ok(x.finish())
}

fn app_props(deck: &Deck) -> Result<Vec<u8>> {
    let mut x = XmlPart::new()?;
    x.start(
        "Properties",
        &[
            (
                "xmlns",
                "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
            ),
            (
                "xmlns:vt",
                "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes",
            ),
        ],
    )?;
    x.text_element("Application", "pdf2pptx")?;
    x.text_element("Slides", &deck.slides().len().to_string())?;
    x.end("Properties")?;
    Ok(x.finish())
}

fn presentation(deck: &Deck) -> Result<Vec<u8>> {
    let mut x = XmlPart::new()?;
    x.start(
        "p:presentation",
        &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P), ("saveSubsetFonts", "1")],
    )?;

    x.start("p:sldMasterIdLst", &[])?;
    x.empty(
        "p:sldMasterId",
        &[("id", parts::MASTER_ID.to_string().as_str()), ("r:id", "rId1")],
    )?;
    x.end("p:sldMasterIdLst")?;

    if !deck.slides().is_empty() {
        x.start("p:sldIdLst", &[])?;
        for idx in 0..deck.slides().len() {
            x.empty(
                "p:sldId",
                &[
                    ("id", (parts::FIRST_SLIDE_ID + idx as u32).to_string().as_str()),
                    ("r:id", format!("rId{}", idx + 2).as_str()),
                ],
            )?;
        }
        x.end("p:sldIdLst")?;
    }

    x.empty(
        "p:sldSz",
        &[("cx", deck.width.to_string().as_str()), ("cy", deck.height.to_string().as_str())],
    )?;
    x.empty(
        "p:notesSz",
        &[
            ("cx", parts::NOTES_WIDTH.to_string().as_str()),
            ("cy", parts::NOTES_HEIGHT.to_string().as_str()),
        ],
    )?;
    x.end("p:presentation")?;
    Ok(x.finish())
}

fn presentation_rels(deck: &Deck) -> Result<Vec<u8>> {
    let count = deck.slides().len();
    let mut x = XmlPart::new()?;
    x.start("Relationships", &[("xmlns", NS_PKG_RELS)])?;
    relationship(&mut x, "rId1", "slideMaster", "slideMasters/slideMaster1.xml")?;
    for idx in 0..count {
        relationship(
            &mut x,
            &format!("rId{}", idx + 2),
            "slide",
            &format!("slides/slide{}.xml", idx + 1),
        )?;
    }
    let fixed = [
        ("presProps", "presProps.xml"),
        ("viewProps", "viewProps.xml"),
        ("tableStyles", "tableStyles.xml"),
        ("theme", "theme/theme1.xml"),
    ];
    for (offset, (kind, target)) in fixed.iter().enumerate() {
        relationship(&mut x, &format!("rId{}", count + 2 + offset), kind, target)?;
    }
    x.end("Relationships")?;
    Ok(x.finish())
}

fn slide_rels(media: &[String]) -> Result<Vec<u8>> {
    let mut x = XmlPart::new()?;
    x.start("Relationships", &[("xmlns", NS_PKG_RELS)])?;
    relationship(&mut x, "rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")?;
    for (idx, name) in media.iter().enumerate() {
        relationship(
            &mut x,
            &format!("rId{}", idx + 2),
            "image",
            &format!("../media/{}", name),
        )?;
    }
    x.end("Relationships")?;
    Ok(x.finish())
}

fn relationship(x: &mut XmlPart, id: &str, kind: &str, target: &str) -> Result<()> {
    x.empty(
        "Relationship",
        &[("Id", id), ("Type", rel_type(kind).as_str()), ("Target", target)],
    )
}

fn slide_xml(slide: &Slide) -> Result<Vec<u8>> {
    let mut x = XmlPart::new()?;
    x.start("p:sld", &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)])?;
    x.start("p:cSld", &[])?;
    x.start("p:spTree", &[])?;

    x.start("p:nvGrpSpPr", &[])?;
    x.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
    x.empty("p:cNvGrpSpPr", &[])?;
    x.empty("p:nvPr", &[])?;
    x.end("p:nvGrpSpPr")?;
    x.start("p:grpSpPr", &[])?;
    x.start("a:xfrm", &[])?;
    x.empty("a:off", &[("x", "0"), ("y", "0")])?;
    x.empty("a:ext", &[("cx", "0"), ("cy", "0")])?;
    x.empty("a:chOff", &[("x", "0"), ("y", "0")])?;
    x.empty("a:chExt", &[("cx", "0"), ("cy", "0")])?;
    x.end("a:xfrm")?;
    x.end("p:grpSpPr")?;

    // Shape id 1 is the tree itself; media rels start after the layout's rId1.
    let mut next_rel = 2;
    for (idx, shape) in slide.shapes().iter().enumerate() {
        let id = idx + 2;
        match shape {
            Shape::Picture(picture) => {
                write_picture(&mut x, picture, id, &format!("rId{}", next_rel))?;
                next_rel += 1;
            }
            Shape::TextBox(text_box) => write_text_box(&mut x, text_box, id)?,
        }
    }

    x.end("p:spTree")?;
    x.end("p:cSld")?;
    x.start("p:clrMapOvr", &[])?;
    x.empty("a:masterClrMapping", &[])?;
    x.end("p:clrMapOvr")?;
    x.end("p:sld")?;
    Ok(x.finish())
}

fn write_xfrm(x: &mut XmlPart, frame: &Frame) -> Result<()> {
    x.start("a:xfrm", &[])?;
    x.empty(
        "a:off",
        &[("x", frame.left.to_string().as_str()), ("y", frame.top.to_string().as_str())],
    )?;
    x.empty(
        "a:ext",
        &[("cx", frame.width.to_string().as_str()), ("cy", frame.height.to_string().as_str())],
    )?;
    x.end("a:xfrm")?;
    x.start("a:prstGeom", &[("prst", "rect")])?;
    x.empty("a:avLst", &[])?;
    x.end("a:prstGeom")
}

fn write_picture(x: &mut XmlPart, picture: &Picture, id: usize, rel_id: &str) -> Result<()> {
    x.start("p:pic", &[])?;
    x.start("p:nvPicPr", &[])?;
    x.empty(
        "p:cNvPr",
        &[("id", id.to_string().as_str()), ("name", format!("Picture {}", id - 1).as_str())],
    )?;
    x.start("p:cNvPicPr", &[])?;
    x.empty("a:picLocks", &[("noChangeAspect", "1")])?;
    x.end("p:cNvPicPr")?;
    x.empty("p:nvPr", &[])?;
    x.end("p:nvPicPr")?;

    x.start("p:blipFill", &[])?;
    x.empty("a:blip", &[("r:embed", rel_id)])?;
    x.start("a:stretch", &[])?;
    x.empty("a:fillRect", &[])?;
    x.end("a:stretch")?;
    x.end("p:blipFill")?;

    x.start("p:spPr", &[])?;
    write_xfrm(x, &picture.frame)?;
    x.end("p:spPr")?;
    x.end("p:pic")
}

/// Run size in hundredths of a point, clamped to what the schema allows.
fn font_size_attr(size_pt: f64) -> String {
    let sz = (size_pt * 100.0).round() as i64;
    sz.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE).to_string()
}

fn flag(on: bool) -> &'static str {
    if on {
        "1"
    } else {
        "0"
    }
}

fn write_text_box(x: &mut XmlPart, text_box: &TextBox, id: usize) -> Result<()> {
    let run = &text_box.run;

    x.start("p:sp", &[])?;
    x.start("p:nvSpPr", &[])?;
    x.empty(
        "p:cNvPr",
        &[("id", id.to_string().as_str()), ("name", format!("TextBox {}", id - 1).as_str())],
    )?;
    x.empty("p:cNvSpPr", &[("txBox", "1")])?;
    x.empty("p:nvPr", &[])?;
    x.end("p:nvSpPr")?;

    x.start("p:spPr", &[])?;
    write_xfrm(x, &text_box.frame)?;
    x.empty("a:noFill", &[])?;
    x.end("p:spPr")?;

    x.start("p:txBody", &[])?;
    let wrap = if text_box.word_wrap { "square" } else { "none" };
    x.start("a:bodyPr", &[("wrap", wrap), ("rtlCol", "0")])?;
    x.empty("a:noAutofit", &[])?;
    x.end("a:bodyPr")?;
    x.empty("a:lstStyle", &[])?;
    x.start("a:p", &[])?;
    x.start("a:r", &[])?;
    x.start(
        "a:rPr",
        &[
            ("lang", "en-US"),
            ("sz", font_size_attr(run.size_pt).as_str()),
            ("b", flag(run.bold)),
            ("i", flag(run.italic)),
            ("dirty", "0"),
        ],
    )?;
    x.start("a:solidFill", &[])?;
    x.empty("a:srgbClr", &[("val", run.color.to_hex().as_str())])?;
    x.end("a:solidFill")?;
    x.empty("a:latin", &[("typeface", run.font.as_str())])?;
    x.end("a:rPr")?;
    x.text_element("a:t", &run.text)?;
    x.end("a:r")?;
    x.end("a:p")?;
    x.end("p:txBody")?;
    x.end("p:sp")
}
