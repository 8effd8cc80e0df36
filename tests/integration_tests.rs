//! Integration tests for mdocx full document export

use std::io::{Cursor, Read};

use mdocx::external::{DiagramRenderer, RasterImage};
use mdocx::ir::{Document, Element, Inline, MathPrimitive, ParagraphStyle};
use mdocx::{
    convert_latex_to_math, convert_latex_with_report, export_bytes, export_document,
    parse_markdown, BlockKind, ChartTheme, DegradationKind, DocumentPackager, ExportError,
    ExportOptions, ExportResult, Exporter,
};
use pretty_assertions::assert_eq;
use quick_xml::events::Event;
use quick_xml::Reader;

const SCENARIO: &str = "# Title\n\nHello **world** with $x^2$.\n\n| A | B |\n|---|---|\n| 1 | 2 |";

fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {}", path, e))
}

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("zip archive");
    let mut part = String::new();
    archive
        .by_name(name)
        .unwrap_or_else(|e| panic!("missing {}: {}", name, e))
        .read_to_string(&mut part)
        .expect("utf-8 part");
    part
}

fn assert_well_formed(xml: &str) {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => panic!("malformed XML at {}: {err}", reader.buffer_position()),
        }
    }
}

fn png_header(width: u32, height: u32) -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[8, 6, 0, 0, 0]);
    data
}

// ============================================================================
// Markdown structure
// ============================================================================

mod structure {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scenario_sections() {
        let sections = parse_markdown(SCENARIO);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Title");
        assert_eq!(sections[0].level, 1);
        let kinds: Vec<_> = sections[0].blocks.iter().map(|b| b.kind).collect();
        assert_eq!(kinds, vec![BlockKind::Paragraph, BlockKind::Table]);
        let table = sections[0].blocks[1].table.as_ref().expect("table");
        assert_eq!(table.headers, vec!["A", "B"]);
        assert_eq!(table.rows, vec![vec!["1".to_string(), "2".to_string()]]);
    }

    #[test]
    fn test_fixture_block_order() {
        let sections = parse_markdown(&fixture("report.md"));
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Quarterly Report", "Model"]);
        let kinds: Vec<_> = sections[1].blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Paragraph,
                BlockKind::CodeBlock,
                BlockKind::Table,
                BlockKind::ListItem,
                BlockKind::ListItem,
                BlockKind::Blockquote,
                BlockKind::Hr,
                BlockKind::CodeBlock,
            ]
        );
        assert!(sections[1].blocks[1].is_math_block());
        assert_eq!(sections[1].blocks[7].language.as_deref(), Some("python"));
    }

    #[test]
    fn test_sections_serialize_to_json() {
        let json = serde_json::to_value(parse_markdown(SCENARIO)).expect("json");
        assert_eq!(json[0]["title"], "Title");
        assert_eq!(json[0]["blocks"][1]["kind"], "TABLE");
    }
}

// ============================================================================
// Math conversion
// ============================================================================

mod math {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quadratic_formula_structure() {
        let prims = convert_latex_to_math(r"x = \frac{-b \pm \sqrt{b^2 - 4ac}}{2a}");
        let fraction = prims
            .iter()
            .find_map(|p| match p {
                MathPrimitive::Fraction { num, den } => Some((num, den)),
                _ => None,
            })
            .expect("fraction");
        assert!(fraction.0.iter().any(|p| matches!(p, MathPrimitive::Radical { degree: None, .. })));
        assert_eq!(mdocx::ir::math_text(fraction.1), "2a");
    }

    #[test]
    fn test_sum_limits() {
        let prims = convert_latex_to_math(r"\sum_{i=1}^{n} i");
        assert!(matches!(
            &prims[0],
            MathPrimitive::Nary { sub: Some(_), sup: Some(_), integral: false, .. }
        ));
    }

    #[test]
    fn test_unknown_command_degrades_per_node() {
        let conversion = convert_latex_with_report(r"\foo + 1");
        assert!(!conversion.fell_back);
        assert!(mdocx::ir::math_text(&conversion.primitives).contains("foo"));
    }

    #[test]
    fn test_unbalanced_source_is_kept_verbatim() {
        let conversion = convert_latex_with_report(r"\sqrt{x");
        assert!(conversion.fell_back);
        assert_eq!(conversion.primitives, vec![MathPrimitive::plain(r"\sqrt{x")]);
    }

    #[test]
    fn test_empty_source_is_blank() {
        let prims = convert_latex_to_math("   ");
        assert_eq!(prims.len(), 1);
        assert!(prims[0].is_blank());
    }
}

// ============================================================================
// Document export
// ============================================================================

mod export {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scenario_package() {
        let bytes = export_document(SCENARIO, &ExportOptions::default()).expect("export");
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "word/numbering.xml",
        ] {
            assert_well_formed(&read_part(&bytes, name));
        }

        let xml = read_part(&bytes, "word/document.xml");
        assert_well_formed(&xml);
        assert!(xml.contains(r#"<w:pStyle w:val="Heading1"/>"#));
        assert!(xml.contains(">Title</w:t>"));
        assert!(xml.contains("<w:b/>"));
        assert!(xml.contains(">world</w:t>"));
        assert!(xml.contains("<m:sSup>"));
        assert_eq!(xml.matches("<w:tbl>").count(), 1);
        assert_eq!(xml.matches("<w:gridCol ").count(), 2);

        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains("<dc:title>Title</dc:title>"));
    }

    #[test]
    fn test_output_preserves_source_order() {
        let bytes = export_document(&fixture("report.md"), &ExportOptions::default())
            .expect("export");
        let xml = read_part(&bytes, "word/document.xml");
        let positions: Vec<usize> = [
            "Quarterly Report",
            "Revenue grew by ",
            "<m:oMathPara>",
            "Metric",
            "first point",
            "Numbers are unaudited.",
            "def total(xs):",
        ]
        .iter()
        .map(|needle| xml.find(needle).unwrap_or_else(|| panic!("missing {}", needle)))
        .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_fixture_document_model() {
        let mut exporter = Exporter::new(ExportOptions::default());
        let document = exporter.build_document(&fixture("report.md"));
        assert_eq!(document.title.as_deref(), Some("Quarterly Report"));
        assert_eq!(document.elements.len(), 11);
        assert!(matches!(document.elements[2], Element::Heading { level: 2, .. }));
        let Element::Paragraph(display) = &document.elements[4] else {
            panic!("expected display math");
        };
        assert_eq!(display.style, ParagraphStyle::DisplayMath);
        let Element::Table(table) = &document.elements[5] else {
            panic!("expected table");
        };
        assert_eq!(table.header.len(), 3);
        assert_eq!(table.rows.len(), 2);
        assert!(matches!(table.rows[1][1].content[0], Inline::Math(_)));
        assert!(exporter.report().is_empty());
    }

    #[test]
    fn test_degradations_do_not_abort() {
        let mut exporter = Exporter::new(ExportOptions::default());
        let bytes = exporter.export(&fixture("degraded.md")).expect("export");
        let report = exporter.report();
        assert_eq!(report.count(DegradationKind::DiagramFailed), 1);
        assert_eq!(report.count(DegradationKind::MathFallback), 1);
        assert_eq!(report.count(DegradationKind::MalformedTable), 1);

        let xml = read_part(&bytes, "word/document.xml");
        assert_well_formed(&xml);
        assert!(xml.contains("[Diagram rendering failed]"));
        assert!(xml.contains(r"\frac{a}{b"));
        assert!(xml.contains("|---|---|"));

        let json = serde_json::to_value(report).expect("json");
        assert_eq!(json["degradations"][0]["kind"], "malformed-table");
    }

    #[test]
    fn test_diagram_image_is_packaged() {
        struct Png;
        impl DiagramRenderer for Png {
            fn render(&self, _source: &str, theme: ChartTheme) -> Option<RasterImage> {
                assert_eq!(theme, ChartTheme::Forest);
                RasterImage::from_bytes(png_header(300, 100))
            }
        }

        let options = ExportOptions {
            chart_theme: ChartTheme::Forest,
            ..ExportOptions::default()
        };
        let mut exporter = Exporter::new(options).with_diagram_renderer(Png);
        let bytes = exporter
            .export("```mermaid\ngraph TD\n```\n\n```mermaid\ngraph TD\n```")
            .expect("export");
        assert!(exporter.report().is_empty());

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.clone())).expect("zip");
        assert!(archive.by_name("word/media/image1.png").is_ok());
        let rels = read_part(&bytes, "word/_rels/document.xml.rels");
        assert!(rels.contains("media/image1.png"));
        let xml = read_part(&bytes, "word/document.xml");
        assert_well_formed(&xml);
        assert_eq!(xml.matches("<pic:pic").count(), 2);
    }

    #[test]
    fn test_custom_packager() {
        struct ElementCount;
        impl DocumentPackager for ElementCount {
            fn package(&self, document: &Document) -> ExportResult<Vec<u8>> {
                Ok(document.elements.len().to_string().into_bytes())
            }
        }

        let mut exporter = Exporter::new(ExportOptions::default()).with_packager(ElementCount);
        assert_eq!(exporter.export(SCENARIO).expect("export"), b"3");
    }

    #[test]
    fn test_non_utf8_input_is_rejected() {
        let err = export_bytes(b"# Title\n\xC3\x28", &ExportOptions::default())
            .expect_err("invalid UTF-8");
        assert!(matches!(err, ExportError::InvalidInput { .. }));
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_form_feed_yields_a_valid_package() {
        let bytes = export_document("a\u{000C}b and $x\u{0001}$", &ExportOptions::default())
            .expect("export");
        let xml = read_part(&bytes, "word/document.xml");
        assert!(!xml.contains('\u{000C}'));
        assert!(!xml.contains('\u{0001}'));
        assert_well_formed(&xml);
        assert!(xml.contains(">ab and </w:t>"));
    }

    #[test]
    fn test_empty_input_is_a_valid_package() {
        let bytes = export_document("", &ExportOptions::default()).expect("export");
        let xml = read_part(&bytes, "word/document.xml");
        assert_well_formed(&xml);
        assert!(!xml.contains("<w:p>"));
    }
}
