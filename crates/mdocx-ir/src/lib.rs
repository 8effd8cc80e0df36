//! Target document model for Markdown to Word conversion.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub title: Option<String>,
    pub elements: Vec<Element>,
}

impl Document {
    pub fn new(elements: Vec<Element>) -> Self {
        Self {
            title: None,
            elements,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Heading { level: u8, text: String },
    Paragraph(Paragraph),
    Table(Table),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    /// Justified body text.
    Body,
    /// Monospaced, shaded, left-bordered.
    Code,
    /// Single-level bullet.
    Bullet,
    /// Indented and shaded.
    Quote,
    /// Empty paragraph carrying a bottom border.
    Rule,
    /// Centered `m:oMathPara`.
    DisplayMath,
    /// Centered, used for diagrams and rasterized display math.
    Centered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    pub inlines: Vec<Inline>,
}

impl Paragraph {
    pub fn new(style: ParagraphStyle, inlines: Vec<Inline>) -> Self {
        Self { style, inlines }
    }

    pub fn rule() -> Self {
        Self::new(ParagraphStyle::Rule, Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(TextRun),
    Math(Vec<MathPrimitive>),
    Image(Image),
    Break,
}

impl Inline {
    pub fn text(s: impl Into<String>) -> Self {
        Inline::Text(TextRun::plain(s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub monospace: bool,
    /// Hex RGB without the leading `#`.
    pub color: Option<String>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn monospace(mut self) -> Self {
        self.monospace = true;
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
        }
    }
}

/// An embedded raster image with its display size in pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub width_px: u32,
    pub height_px: u32,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<TableCell>,
    pub rows: Vec<Vec<TableCell>>,
}

impl Table {
    /// Number of grid columns, taking ragged rows into account.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
            .max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableCell {
    pub content: Vec<Inline>,
}

impl TableCell {
    pub fn new(content: Vec<Inline>) -> Self {
        Self { content }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathRunStyle {
    /// Upright (`m:sty p`): functions, digits, operators.
    Plain,
    /// Math italic, the default for variables.
    Italic,
}

/// Native math primitives, one per OMML construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathPrimitive {
    Run {
        text: String,
        style: MathRunStyle,
    },
    Fraction {
        num: Vec<MathPrimitive>,
        den: Vec<MathPrimitive>,
    },
    Radical {
        degree: Option<Vec<MathPrimitive>>,
        body: Vec<MathPrimitive>,
    },
    Sub {
        base: Vec<MathPrimitive>,
        sub: Vec<MathPrimitive>,
    },
    Sup {
        base: Vec<MathPrimitive>,
        sup: Vec<MathPrimitive>,
    },
    SubSup {
        base: Vec<MathPrimitive>,
        sub: Vec<MathPrimitive>,
        sup: Vec<MathPrimitive>,
    },
    Nary {
        op: char,
        integral: bool,
        sub: Option<Vec<MathPrimitive>>,
        sup: Option<Vec<MathPrimitive>>,
        body: Vec<MathPrimitive>,
    },
    LimitLower {
        base: Vec<MathPrimitive>,
        lim: Vec<MathPrimitive>,
    },
    Accent {
        chr: char,
        body: Vec<MathPrimitive>,
    },
}

impl MathPrimitive {
    pub fn run(text: impl Into<String>, style: MathRunStyle) -> Self {
        MathPrimitive::Run {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::run(text, MathRunStyle::Plain)
    }

    /// The placeholder run substituted for empty operand lists.
    pub fn blank() -> Self {
        Self::run("", MathRunStyle::Plain)
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, MathPrimitive::Run { text, .. } if text.is_empty())
    }

    /// Concatenated run text, for diagnostics and tests.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(std::slice::from_ref(self), &mut out);
        out
    }
}

pub fn math_text(primitives: &[MathPrimitive]) -> String {
    let mut out = String::new();
    collect_text(primitives, &mut out);
    out
}

fn collect_text(primitives: &[MathPrimitive], out: &mut String) {
    for p in primitives {
        match p {
            MathPrimitive::Run { text, .. } => out.push_str(text),
            MathPrimitive::Fraction { num, den } => {
                collect_text(num, out);
                out.push('/');
                collect_text(den, out);
            }
            MathPrimitive::Radical { degree, body } => {
                if let Some(deg) = degree {
                    collect_text(deg, out);
                }
                out.push('√');
                collect_text(body, out);
            }
            MathPrimitive::Sub { base, sub } => {
                collect_text(base, out);
                out.push('_');
                collect_text(sub, out);
            }
            MathPrimitive::Sup { base, sup } => {
                collect_text(base, out);
                out.push('^');
                collect_text(sup, out);
            }
            MathPrimitive::SubSup { base, sub, sup } => {
                collect_text(base, out);
                out.push('_');
                collect_text(sub, out);
                out.push('^');
                collect_text(sup, out);
            }
            MathPrimitive::Nary { op, sub, sup, body, .. } => {
                out.push(*op);
                if let Some(sub) = sub {
                    out.push('_');
                    collect_text(sub, out);
                }
                if let Some(sup) = sup {
                    out.push('^');
                    collect_text(sup, out);
                }
                collect_text(body, out);
            }
            MathPrimitive::LimitLower { base, lim } => {
                collect_text(base, out);
                out.push('_');
                collect_text(lim, out);
            }
            MathPrimitive::Accent { body, .. } => collect_text(body, out),
        }
    }
}
