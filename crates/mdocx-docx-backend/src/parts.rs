//! Fixed package parts: content types, relationships, styles, numbering.

use std::fmt::Write;

use crate::text::escape_text;
use crate::MediaPart;

pub(crate) const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub(crate) const STYLES_REL_ID: &str = "rId1";
pub(crate) const NUMBERING_REL_ID: &str = "rId2";

/// numId of the single-level bullet list.
pub(crate) const BULLET_NUM_ID: u32 = 1;

const HEADING_SIZES: [u32; 6] = [32, 28, 26, 24, 22, 22];

pub(crate) fn content_types_xml() -> String {
    format!(
        r#"{XML_DECL}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Default Extension="jpeg" ContentType="image/jpeg"/>
  <Default Extension="gif" ContentType="image/gif"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
  <Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
</Types>"#
    )
}

pub(crate) fn root_rels_xml() -> String {
    format!(
        r#"{XML_DECL}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="{REL_BASE}/officeDocument" Target="word/document.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
</Relationships>"#
    )
}

pub(crate) fn document_rels_xml(media: &[MediaPart]) -> String {
    let mut out = String::new();
    out.push_str(XML_DECL);
    out.push_str(
        "\n<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\n",
    );
    let _ = writeln!(
        out,
        r#"  <Relationship Id="{STYLES_REL_ID}" Type="{REL_BASE}/styles" Target="styles.xml"/>"#
    );
    let _ = writeln!(
        out,
        r#"  <Relationship Id="{NUMBERING_REL_ID}" Type="{REL_BASE}/numbering" Target="numbering.xml"/>"#
    );
    for part in media {
        let _ = writeln!(
            out,
            r#"  <Relationship Id="{}" Type="{REL_BASE}/image" Target="{}"/>"#,
            part.rel_id, part.target
        );
    }
    out.push_str("</Relationships>");
    out
}

pub(crate) fn styles_xml() -> String {
    let mut out = String::new();
    out.push_str(XML_DECL);
    let _ = write!(out, "\n<w:styles xmlns:w=\"{NS_W}\">");
    out.push_str(concat!(
        "<w:docDefaults><w:rPrDefault><w:rPr>",
        r#"<w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:eastAsia="Calibri" w:cs="Calibri"/>"#,
        r#"<w:sz w:val="22"/><w:szCs w:val="22"/>"#,
        "</w:rPr></w:rPrDefault><w:pPrDefault><w:pPr>",
        r#"<w:spacing w:after="160" w:line="259" w:lineRule="auto"/>"#,
        "</w:pPr></w:pPrDefault></w:docDefaults>",
    ));
    out.push_str(
        r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
    );
    for (idx, size) in HEADING_SIZES.iter().enumerate() {
        let level = idx + 1;
        let _ = write!(
            out,
            concat!(
                r#"<w:style w:type="paragraph" w:styleId="Heading{level}">"#,
                r#"<w:name w:val="heading {level}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
                r#"<w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="{outline}"/></w:pPr>"#,
                r#"<w:rPr><w:b/><w:bCs/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr></w:style>"#,
            ),
            level = level,
            outline = idx,
            size = size,
        );
    }
    out.push_str(concat!(
        r#"<w:style w:type="paragraph" w:styleId="Code"><w:name w:val="Code"/><w:basedOn w:val="Normal"/>"#,
        r#"<w:pPr><w:spacing w:after="0" w:line="240" w:lineRule="auto"/></w:pPr>"#,
        r#"<w:rPr><w:rFonts w:ascii="Consolas" w:hAnsi="Consolas" w:cs="Consolas"/><w:sz w:val="20"/><w:szCs w:val="20"/></w:rPr></w:style>"#,
        r#"<w:style w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote"/><w:basedOn w:val="Normal"/>"#,
        r#"<w:rPr><w:i/><w:color w:val="595959"/></w:rPr></w:style>"#,
        r#"<w:style w:type="paragraph" w:styleId="ListParagraph"><w:name w:val="List Paragraph"/><w:basedOn w:val="Normal"/>"#,
        r#"<w:pPr><w:ind w:left="720"/></w:pPr></w:style>"#,
        r#"<w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/>"#,
        r#"<w:tblPr><w:tblBorders>"#,
        r#"<w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        r#"<w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        r#"<w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        r#"<w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        r#"<w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        r#"<w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        r#"</w:tblBorders></w:tblPr></w:style>"#,
    ));
    out.push_str("</w:styles>");
    out
}

pub(crate) fn numbering_xml() -> String {
    format!(
        concat!(
            "{decl}\n<w:numbering xmlns:w=\"{ns}\">",
            r#"<w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/>"#,
            r#"<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="•"/><w:lvlJc w:val="left"/>"#,
            r#"<w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum>"#,
            r#"<w:num w:numId="{num}"><w:abstractNumId w:val="0"/></w:num>"#,
            "</w:numbering>",
        ),
        decl = XML_DECL,
        ns = NS_W,
        num = BULLET_NUM_ID,
    )
}

pub(crate) fn core_xml(title: Option<&str>, creator: Option<&str>, created: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(XML_DECL);
    out.push_str(concat!(
        "\n<cp:coreProperties",
        r#" xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties""#,
        r#" xmlns:dc="http://purl.org/dc/elements/1.1/""#,
        r#" xmlns:dcterms="http://purl.org/dc/terms/""#,
        r#" xmlns:dcmitype="http://purl.org/dc/dcmitype/""#,
        r#" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
    ));
    if let Some(title) = title {
        let _ = write!(out, "<dc:title>{}</dc:title>", escape_text(title));
    }
    if let Some(creator) = creator {
        let _ = write!(out, "<dc:creator>{}</dc:creator>", escape_text(creator));
    }
    if let Some(created) = created {
        let _ = write!(
            out,
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
            escape_text(created)
        );
    }
    out.push_str("</cp:coreProperties>");
    out
}
