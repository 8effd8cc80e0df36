//! Document model to WordprocessingML backend.
//!
//! Renders [`mdocx_ir::Document`] into `word/document.xml` (with OMML for
//! native math) and packages the parts into a `.docx` ZIP container.

mod math;
mod parts;
mod text;

use std::fmt::{self, Write as _};
use std::io::{self, Cursor, Seek, Write};

use mdocx_ir::{Document, Element, Image, Inline, Paragraph, ParagraphStyle, Table, TextRun};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::text::escape_text;

pub use math::{render_math, render_omath, render_omath_para};

/// DrawingML extents are expressed in EMU; 96 dpi pixels.
pub const EMU_PER_PX: u64 = 9525;

/// Usable text width (dxa) for Letter paper with one inch margins.
const TEXT_WIDTH_DXA: u32 = 9360;

const CODE_FONT: &str = "Consolas";
const HEADER_FILL: &str = "D9E2F3";
const CODE_FILL: &str = "F4F4F4";
const QUOTE_FILL: &str = "F2F2F2";

/// Packaging failure.
#[derive(Debug, Clone)]
pub enum PackageError {
    Io { message: String },
    Zip { message: String },
}

impl fmt::Display for PackageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageError::Io { message } => write!(f, "IO error while packaging: {}", message),
            PackageError::Zip { message } => write!(f, "ZIP error while packaging: {}", message),
        }
    }
}

impl std::error::Error for PackageError {}

impl From<io::Error> for PackageError {
    fn from(err: io::Error) -> Self {
        PackageError::Io {
            message: err.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for PackageError {
    fn from(err: zip::result::ZipError) -> Self {
        PackageError::Zip {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Deflate level (0-9).
    pub compression_level: Option<i64>,
    pub creator: Option<String>,
    /// W3CDTF timestamp for `docProps/core.xml`.
    pub created: Option<String>,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            compression_level: Some(6),
            creator: Some("mdocx".to_string()),
            created: None,
        }
    }
}

/// An image part referenced from the document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPart {
    pub rel_id: String,
    /// Target relative to `word/`, e.g. `media/image1.png`.
    pub target: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub xml: String,
    pub media: Vec<MediaPart>,
}

pub fn render_document_xml(doc: &Document) -> RenderedDocument {
    let mut writer = BodyWriter::default();
    for element in &doc.elements {
        writer.write_element(element);
    }
    let BodyWriter { out: body, media, .. } = writer;

    let mut xml = String::with_capacity(body.len() + 1024);
    xml.push_str(parts::XML_DECL);
    xml.push_str(concat!(
        "\n<w:document",
        r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
        r#" xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math""#,
        r#" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing""#,
        r#" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#,
        r#" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture""#,
        r#" xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        "<w:body>",
    ));
    xml.push_str(&body);
    xml.push_str(concat!(
        "<w:sectPr>",
        r#"<w:pgSz w:w="12240" w:h="15840"/>"#,
        r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/>"#,
        "</w:sectPr></w:body></w:document>",
    ));

    RenderedDocument { xml, media }
}

/// Write the complete `.docx` package and hand the writer back.
pub fn write_docx<W: Write + Seek>(
    doc: &Document,
    writer: W,
    options: &PackageOptions,
) -> Result<W, PackageError> {
    let rendered = render_document_xml(doc);
    let mut zip = ZipWriter::new(writer);
    let deflated = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(options.compression_level);

    zip.start_file("[Content_Types].xml", deflated)?;
    zip.write_all(parts::content_types_xml().as_bytes())?;

    zip.start_file("_rels/.rels", deflated)?;
    zip.write_all(parts::root_rels_xml().as_bytes())?;

    zip.start_file("docProps/core.xml", deflated)?;
    zip.write_all(
        parts::core_xml(
            doc.title.as_deref(),
            options.creator.as_deref(),
            options.created.as_deref(),
        )
        .as_bytes(),
    )?;

    zip.start_file("word/document.xml", deflated)?;
    zip.write_all(rendered.xml.as_bytes())?;

    zip.start_file("word/_rels/document.xml.rels", deflated)?;
    zip.write_all(parts::document_rels_xml(&rendered.media).as_bytes())?;

    zip.start_file("word/styles.xml", deflated)?;
    zip.write_all(parts::styles_xml().as_bytes())?;

    zip.start_file("word/numbering.xml", deflated)?;
    zip.write_all(parts::numbering_xml().as_bytes())?;

    // Compressed images gain nothing from deflate.
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for part in &rendered.media {
        zip.start_file(format!("word/{}", part.target), stored)?;
        zip.write_all(&part.data)?;
    }

    Ok(zip.finish()?)
}

pub fn package_docx(doc: &Document) -> Result<Vec<u8>, PackageError> {
    package_docx_with_options(doc, &PackageOptions::default())
}

pub fn package_docx_with_options(
    doc: &Document,
    options: &PackageOptions,
) -> Result<Vec<u8>, PackageError> {
    let cursor = write_docx(doc, Cursor::new(Vec::new()), options)?;
    Ok(cursor.into_inner())
}

#[derive(Default)]
struct BodyWriter {
    out: String,
    media: Vec<MediaPart>,
}

#[derive(Clone, Copy, Default)]
struct RunOverride {
    bold: bool,
    monospace: bool,
}

impl BodyWriter {
    fn write_element(&mut self, element: &Element) {
        match element {
            Element::Heading { level, text } => {
                let level = (*level).clamp(1, 6);
                let _ = write!(
                    self.out,
                    r#"<w:p><w:pPr><w:pStyle w:val="Heading{}"/></w:pPr>"#,
                    level
                );
                self.write_text_run(&TextRun::plain(text.as_str()), RunOverride::default());
                self.out.push_str("</w:p>");
            }
            Element::Paragraph(para) => self.write_paragraph(para),
            Element::Table(table) => self.write_table(table),
        }
    }

    fn write_paragraph(&mut self, para: &Paragraph) {
        self.out.push_str("<w:p>");
        write_paragraph_properties(&mut self.out, para.style);
        let overrides = RunOverride {
            bold: false,
            monospace: para.style == ParagraphStyle::Code,
        };
        for inline in &para.inlines {
            match inline {
                Inline::Math(primitives) if para.style == ParagraphStyle::DisplayMath => {
                    self.out.push_str(&render_omath_para(primitives));
                }
                _ => self.write_inline(inline, overrides),
            }
        }
        self.out.push_str("</w:p>");
    }

    fn write_inline(&mut self, inline: &Inline, overrides: RunOverride) {
        match inline {
            Inline::Text(run) => self.write_text_run(run, overrides),
            Inline::Math(primitives) => self.out.push_str(&render_omath(primitives)),
            Inline::Image(image) => self.write_image(image),
            Inline::Break => self.out.push_str("<w:r><w:br/></w:r>"),
        }
    }

    fn write_text_run(&mut self, run: &TextRun, overrides: RunOverride) {
        let bold = run.bold || overrides.bold;
        let monospace = run.monospace || overrides.monospace;
        self.out.push_str("<w:r>");
        if bold || run.italic || monospace || run.color.is_some() {
            self.out.push_str("<w:rPr>");
            if monospace {
                let _ = write!(
                    self.out,
                    r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:cs="{0}"/>"#,
                    CODE_FONT
                );
            }
            if bold {
                self.out.push_str("<w:b/><w:bCs/>");
            }
            if run.italic {
                self.out.push_str("<w:i/><w:iCs/>");
            }
            if let Some(color) = &run.color {
                let _ = write!(
                    self.out,
                    r#"<w:color w:val="{}"/>"#,
                    escape_text(color.as_str())
                );
            }
            if monospace {
                self.out.push_str(r#"<w:sz w:val="20"/><w:szCs w:val="20"/>"#);
            }
            self.out.push_str("</w:rPr>");
        }
        let _ = write!(
            self.out,
            r#"<w:t xml:space="preserve">{}</w:t></w:r>"#,
            escape_text(run.text.as_str())
        );
    }

    fn write_table(&mut self, table: &Table) {
        let columns = table.column_count();
        let col_width = TEXT_WIDTH_DXA / columns as u32;

        self.out.push_str(concat!(
            "<w:tbl><w:tblPr>",
            r#"<w:tblStyle w:val="TableGrid"/><w:tblW w:w="5000" w:type="pct"/>"#,
            "<w:tblBorders>",
            r#"<w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
            r#"<w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
            r#"<w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
            r#"<w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
            r#"<w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
            r#"<w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
            "</w:tblBorders></w:tblPr><w:tblGrid>",
        ));
        for _ in 0..columns {
            let _ = write!(self.out, r#"<w:gridCol w:w="{}"/>"#, col_width);
        }
        self.out.push_str("</w:tblGrid>");

        if !table.header.is_empty() {
            self.out.push_str("<w:tr><w:trPr><w:tblHeader/></w:trPr>");
            for idx in 0..columns {
                let content = table
                    .header
                    .get(idx)
                    .map(|cell| cell.content.as_slice())
                    .unwrap_or(&[]);
                self.write_cell(content, col_width, true);
            }
            self.out.push_str("</w:tr>");
        }

        for row in &table.rows {
            self.out.push_str("<w:tr>");
            for idx in 0..columns {
                let content = row
                    .get(idx)
                    .map(|cell| cell.content.as_slice())
                    .unwrap_or(&[]);
                self.write_cell(content, col_width, false);
            }
            self.out.push_str("</w:tr>");
        }
        self.out.push_str("</w:tbl>");
        // Word merges adjacent tables without a separating paragraph.
        self.out.push_str("<w:p/>");
    }

    fn write_cell(&mut self, content: &[Inline], width: u32, header: bool) {
        let _ = write!(
            self.out,
            r#"<w:tc><w:tcPr><w:tcW w:w="{}" w:type="dxa"/>"#,
            width
        );
        if header {
            let _ = write!(
                self.out,
                r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                HEADER_FILL
            );
        }
        self.out.push_str("</w:tcPr><w:p>");
        if header {
            self.out.push_str(r#"<w:pPr><w:jc w:val="center"/></w:pPr>"#);
        }
        let overrides = RunOverride {
            bold: header,
            monospace: false,
        };
        for inline in content {
            self.write_inline(inline, overrides);
        }
        self.out.push_str("</w:p></w:tc>");
    }

    fn write_image(&mut self, image: &Image) {
        let index = self.media.len() + 1;
        // rId1 and rId2 are taken by styles and numbering.
        let rel_id = format!("rId{}", index + 2);
        let target = format!("media/image{}.{}", index, image.format.extension());
        let cx = u64::from(image.width_px) * EMU_PER_PX;
        let cy = u64::from(image.height_px) * EMU_PER_PX;
        let name = format!("Picture {}", index);
        let descr = image.description.as_deref().unwrap_or("");

        let _ = write!(
            self.out,
            concat!(
                "<w:r><w:drawing>",
                r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#,
                r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
                r#"<wp:docPr id="{id}" name="{name}" descr="{descr}"/>"#,
                r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
                r#"<pic:pic><pic:nvPicPr><pic:cNvPr id="{id}" name="{file}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
                r#"<pic:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
                r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>"#,
                "</a:graphicData></a:graphic></wp:inline></w:drawing></w:r>",
            ),
            cx = cx,
            cy = cy,
            id = index,
            name = name,
            descr = escape_text(descr),
            file = target.trim_start_matches("media/"),
            rel = rel_id,
        );

        self.media.push(MediaPart {
            rel_id,
            target,
            data: image.data.clone(),
        });
    }
}

fn write_paragraph_properties(out: &mut String, style: ParagraphStyle) {
    match style {
        ParagraphStyle::Body => out.push_str(r#"<w:pPr><w:jc w:val="both"/></w:pPr>"#),
        ParagraphStyle::Code => {
            let _ = write!(
                out,
                concat!(
                    r#"<w:pPr><w:pStyle w:val="Code"/>"#,
                    r#"<w:pBdr><w:left w:val="single" w:sz="24" w:space="8" w:color="C8C8C8"/></w:pBdr>"#,
                    r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                    r#"<w:spacing w:before="120" w:after="120"/></w:pPr>"#,
                ),
                CODE_FILL
            );
        }
        ParagraphStyle::Bullet => {
            let _ = write!(
                out,
                concat!(
                    r#"<w:pPr><w:pStyle w:val="ListParagraph"/>"#,
                    r#"<w:numPr><w:ilvl w:val="0"/><w:numId w:val="{}"/></w:numPr></w:pPr>"#,
                ),
                parts::BULLET_NUM_ID
            );
        }
        ParagraphStyle::Quote => {
            let _ = write!(
                out,
                concat!(
                    r#"<w:pPr><w:pStyle w:val="Quote"/>"#,
                    r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                    r#"<w:ind w:left="720" w:right="720"/></w:pPr>"#,
                ),
                QUOTE_FILL
            );
        }
        ParagraphStyle::Rule => out.push_str(
            r#"<w:pPr><w:pBdr><w:bottom w:val="single" w:sz="6" w:space="1" w:color="auto"/></w:pBdr></w:pPr>"#,
        ),
        ParagraphStyle::DisplayMath | ParagraphStyle::Centered => {
            out.push_str(r#"<w:pPr><w:jc w:val="center"/></w:pPr>"#)
        }
    }
}
