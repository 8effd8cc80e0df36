//! Document assembly
//!
//! Walks the parsed sections in order and lowers every block into the
//! document model, delegating diagrams and (in image mode) math to the
//! injected rasterizers. Failures of those collaborators never abort the
//! export: they are replaced by native math or a visible label and
//! recorded in the [`ExportReport`].

pub mod image;
pub mod inline;

pub use image::{embed, fit_to_width};
pub use inline::{split_inline, InlineSegment};

use chrono::Utc;
use log::{debug, warn};
use mdocx_docx_backend::{package_docx_with_options, PackageOptions};
use mdocx_ir::{Document, Element, Inline, Paragraph, ParagraphStyle, Table, TableCell, TextRun};

use crate::config::{ExportOptions, MathMode};
use crate::core::latex2omml::convert_latex_with_report;
use crate::core::markdown::{BlockKind, ContentBlock, MarkdownParser, ParsedTable, Section};
use crate::external::{
    DiagramCache, DiagramRenderer, MathRasterizer, NoDiagramRenderer, NoMathRasterizer,
};
use crate::utils::{Degradation, DegradationKind, ExportReport, ExportResult};

/// Code block language routed to the diagram renderer.
pub const DIAGRAM_LANGUAGE: &str = "mermaid";
pub const DIAGRAM_ERROR_LABEL: &str = "[Diagram rendering failed]";
pub const MATH_ERROR_LABEL: &str = "[Math rendering failed]";
const ERROR_COLOR: &str = "FF0000";
const MAX_HEADING_LEVEL: u8 = 6;

/// Turns a finished document into container bytes.
pub trait DocumentPackager {
    fn package(&self, document: &Document) -> ExportResult<Vec<u8>>;
}

/// `.docx` packager backed by `mdocx-docx-backend`.
#[derive(Debug, Clone, Default)]
pub struct DocxPackager {
    pub options: PackageOptions,
}

impl DocumentPackager for DocxPackager {
    fn package(&self, document: &Document) -> ExportResult<Vec<u8>> {
        let mut options = self.options.clone();
        if options.created.is_none() {
            options.created = Some(Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string());
        }
        Ok(package_docx_with_options(document, &options)?)
    }
}

/// Options, collaborators and the degradation report of the last run.
///
/// Each export gets its own [`DiagramCache`], so nothing carries over
/// between documents except the report of the most recent one.
pub struct Exporter {
    options: ExportOptions,
    diagrams: Box<dyn DiagramRenderer>,
    rasterizer: Box<dyn MathRasterizer>,
    packager: Box<dyn DocumentPackager>,
    report: ExportReport,
}

impl Exporter {
    /// Exporter without rasterizers: diagrams get the error label and
    /// image math mode falls back to native math.
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            diagrams: Box::new(NoDiagramRenderer),
            rasterizer: Box::new(NoMathRasterizer),
            packager: Box::new(DocxPackager::default()),
            report: ExportReport::default(),
        }
    }

    pub fn with_diagram_renderer(mut self, renderer: impl DiagramRenderer + 'static) -> Self {
        self.diagrams = Box::new(renderer);
        self
    }

    pub fn with_math_rasterizer(mut self, rasterizer: impl MathRasterizer + 'static) -> Self {
        self.rasterizer = Box::new(rasterizer);
        self
    }

    pub fn with_packager(mut self, packager: impl DocumentPackager + 'static) -> Self {
        self.packager = Box::new(packager);
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Degradations recorded by the most recent export.
    pub fn report(&self) -> &ExportReport {
        &self.report
    }

    /// Build the document model without packaging it.
    pub fn build_document(&mut self, markdown: &str) -> Document {
        self.report = ExportReport::default();
        let (sections, degraded_tables) = MarkdownParser::new().parse_with_report(markdown);
        for source in &degraded_tables {
            self.report.push(
                Degradation::new(
                    DegradationKind::MalformedTable,
                    "pipe rows without content kept as paragraphs",
                )
                .with_snippet(source),
            );
        }

        let mut assembly = Assembly {
            options: &self.options,
            diagrams: self.diagrams.as_ref(),
            rasterizer: self.rasterizer.as_ref(),
            cache: DiagramCache::new(),
            report: &mut self.report,
            elements: Vec::new(),
        };
        for section in &sections {
            assembly.section(section);
        }
        let Assembly {
            elements, cache, ..
        } = assembly;
        if cache.hits() > 0 {
            debug!("{} diagram(s) reused from cache", cache.hits());
        }

        let document = Document::new(elements);
        match sections.first() {
            Some(first) => document.with_title(first.title.as_str()),
            None => document,
        }
    }

    pub fn export(&mut self, markdown: &str) -> ExportResult<Vec<u8>> {
        let document = self.build_document(markdown);
        if !self.report.is_empty() {
            warn!(
                "export finished with {} degraded block(s)",
                self.report.degradations.len()
            );
        }
        self.packager.package(&document)
    }

    /// Export raw input bytes, rejecting anything that is not UTF-8.
    pub fn export_bytes(&mut self, input: &[u8]) -> ExportResult<Vec<u8>> {
        let markdown = std::str::from_utf8(input)?;
        self.export(markdown)
    }
}

/// Export with the default collaborators.
pub fn export_document(markdown: &str, options: &ExportOptions) -> ExportResult<Vec<u8>> {
    Exporter::new(options.clone()).export(markdown)
}

pub fn export_bytes(input: &[u8], options: &ExportOptions) -> ExportResult<Vec<u8>> {
    Exporter::new(options.clone()).export_bytes(input)
}

struct Assembly<'a> {
    options: &'a ExportOptions,
    diagrams: &'a dyn DiagramRenderer,
    rasterizer: &'a dyn MathRasterizer,
    cache: DiagramCache,
    report: &'a mut ExportReport,
    elements: Vec<Element>,
}

impl Assembly<'_> {
    fn section(&mut self, section: &Section) {
        self.elements.push(Element::Heading {
            level: heading_level(section.level),
            text: section.title.clone(),
        });
        for block in &section.blocks {
            self.block(block);
        }
    }

    fn block(&mut self, block: &ContentBlock) {
        debug!("assembling {:?} block", block.kind);
        match block.kind {
            BlockKind::CodeBlock => self.code_block(block),
            BlockKind::Table => match &block.table {
                Some(table) => self.table(table),
                None => self.paragraph(ParagraphStyle::Body, &block.content),
            },
            BlockKind::ListItem => self.paragraph(ParagraphStyle::Bullet, &block.content),
            BlockKind::Blockquote => self.quote(&block.content),
            BlockKind::Hr => self.push(Paragraph::rule()),
            BlockKind::Paragraph => self.paragraph(ParagraphStyle::Body, &block.content),
        }
    }

    fn push(&mut self, paragraph: Paragraph) {
        self.elements.push(Element::Paragraph(paragraph));
    }

    fn code_block(&mut self, block: &ContentBlock) {
        let language = block.language.as_deref().map_or("", str::trim);
        if language.eq_ignore_ascii_case(DIAGRAM_LANGUAGE) {
            self.diagram(&block.content);
        } else if let Some(latex) = display_math_source(language, &block.content) {
            self.display_math(latex);
        } else {
            self.code(&block.content);
        }
    }

    fn diagram(&mut self, source: &str) {
        let theme = self.options.chart_theme;
        match self.cache.get_or_render(self.diagrams, source, theme) {
            Some(raster) => {
                let image = embed(raster, self.options.max_image_width_px, "diagram");
                self.push(Paragraph::new(ParagraphStyle::Centered, vec![Inline::Image(image)]));
            }
            None => {
                warn!("diagram rendering failed, inserting error label");
                self.report.push(
                    Degradation::new(DegradationKind::DiagramFailed, "diagram replaced by error label")
                        .with_snippet(source),
                );
                self.push(Paragraph::new(
                    ParagraphStyle::Centered,
                    vec![error_label(DIAGRAM_ERROR_LABEL)],
                ));
            }
        }
    }

    fn display_math(&mut self, latex: &str) {
        if let Some(image) = self.rasterize_math(latex) {
            self.push(Paragraph::new(ParagraphStyle::Centered, vec![Inline::Image(image)]));
            return;
        }
        let inlines = self.native_math(latex);
        self.push(Paragraph::new(ParagraphStyle::DisplayMath, inlines));
    }

    /// Image mode only. A failed attempt is recorded and returns `None`.
    fn rasterize_math(&mut self, latex: &str) -> Option<mdocx_ir::Image> {
        if self.options.math_mode != MathMode::Image {
            return None;
        }
        match self.rasterizer.rasterize(latex) {
            Some(raster) => Some(embed(raster, self.options.max_image_width_px, latex)),
            None => {
                warn!("math rasterization failed, using native math");
                self.report.push(
                    Degradation::new(DegradationKind::MathRasterFailed, "formula kept as native math")
                        .with_snippet(latex),
                );
                None
            }
        }
    }

    fn native_math(&mut self, latex: &str) -> Vec<Inline> {
        let conversion = convert_latex_with_report(latex);
        let mut inlines = vec![Inline::Math(conversion.primitives)];
        if conversion.fell_back {
            self.report.push(
                Degradation::new(DegradationKind::MathFallback, "formula emitted as raw LaTeX")
                    .with_snippet(latex),
            );
            if self.options.math_mode == MathMode::Image {
                inlines.push(error_label(MATH_ERROR_LABEL));
            }
        }
        inlines
    }

    fn code(&mut self, content: &str) {
        let mut inlines = Vec::new();
        for (idx, line) in content.split('\n').enumerate() {
            if idx > 0 {
                inlines.push(Inline::Break);
            }
            if !line.is_empty() {
                inlines.push(Inline::Text(TextRun::plain(line).monospace()));
            }
        }
        self.push(Paragraph::new(ParagraphStyle::Code, inlines));
    }

    fn table(&mut self, table: &ParsedTable) {
        let header = table.headers.iter().map(|cell| self.cell(cell)).collect();
        let rows = table
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| self.cell(cell)).collect())
            .collect();
        self.elements.push(Element::Table(Table { header, rows }));
    }

    fn cell(&mut self, text: &str) -> TableCell {
        TableCell::new(self.inline_content(text))
    }

    fn quote(&mut self, content: &str) {
        let mut inlines = Vec::new();
        for (idx, line) in content.split('\n').enumerate() {
            if idx > 0 {
                inlines.push(Inline::Break);
            }
            inlines.extend(self.inline_content(line));
        }
        self.push(Paragraph::new(ParagraphStyle::Quote, inlines));
    }

    fn paragraph(&mut self, style: ParagraphStyle, text: &str) {
        let inlines = self.inline_content(text);
        self.push(Paragraph::new(style, inlines));
    }

    fn inline_content(&mut self, text: &str) -> Vec<Inline> {
        let mut inlines = Vec::new();
        for segment in split_inline(text) {
            match segment {
                InlineSegment::Text { text, bold, italic } => {
                    inlines.push(Inline::Text(TextRun::plain(text).bold(bold).italic(italic)));
                }
                InlineSegment::Math(latex) => match self.rasterize_math(&latex) {
                    Some(image) => inlines.push(Inline::Image(image)),
                    None => inlines.extend(self.native_math(&latex)),
                },
            }
        }
        inlines
    }
}

fn heading_level(level: u8) -> u8 {
    if (1..=MAX_HEADING_LEVEL).contains(&level) {
        level
    } else {
        1
    }
}

fn error_label(label: &str) -> Inline {
    Inline::Text(TextRun::plain(label).bold(true).color(ERROR_COLOR))
}

/// LaTeX source of a display-math code block, if it is one.
fn display_math_source<'a>(language: &str, content: &'a str) -> Option<&'a str> {
    let trimmed = content.trim();
    let unwrapped = trimmed
        .strip_prefix("$$")
        .and_then(|rest| rest.strip_suffix("$$"))
        .map(str::trim);
    if language.eq_ignore_ascii_case("math") || language.eq_ignore_ascii_case("latex") {
        return Some(unwrapped.unwrap_or(trimmed));
    }
    unwrapped
}
