//! mdocx CLI - Markdown to Word converter with native LaTeX math

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use std::time::Duration;

#[cfg(feature = "cli")]
use mdocx::{
    convert_latex_to_math, core::latex2omml::resolve_latex, external::CommandDiagramRenderer,
    external::CommandMathRasterizer, parse_markdown, ChartTheme, ExportError, ExportOptions,
    ExportResult, Exporter, MathMode,
};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "mdocx")]
#[command(version)]
#[command(about = "mdocx - Markdown to Word converter with native LaTeX math", long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input Markdown file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Output .docx path (defaults to <stem>_<timestamp>.docx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Diagram theme: default, neutral, forest or base
    #[arg(long)]
    theme: Option<ChartTheme>,

    /// Math rendering: native or image
    #[arg(long)]
    math_mode: Option<MathMode>,

    /// TOML file with export options; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Shell command rendering Mermaid from stdin to an image on stdout
    #[arg(long)]
    diagram_cmd: Option<String>,

    /// Shell command rasterizing LaTeX from stdin to an image on stdout
    #[arg(long)]
    math_cmd: Option<String>,

    /// Timeout for each external render, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Write the degradation report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Print the parsed sections as JSON
    Sections {
        /// Input Markdown file
        input: Option<PathBuf>,
    },

    /// Print the resolved math tree of a LaTeX expression
    Math {
        /// LaTeX source (reads from stdin if not provided)
        latex: Option<String>,

        /// Print OMML instead of the JSON tree
        #[arg(long)]
        xml: bool,
    },

    /// Show version and feature info
    Info,
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let result = match cli.command {
        Some(ref cmd) => handle_subcommand(cmd),
        None => convert(&cli),
    };

    if let Err(err) = result {
        eprintln!("✗ {}", err);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn convert(cli: &Cli) -> ExportResult<()> {
    let options = resolve_options(cli)?;
    let timeout = Duration::from_millis(options.render_timeout_ms);

    let mut exporter = Exporter::new(options);
    if let Some(cmd) = &cli.diagram_cmd {
        exporter = exporter.with_diagram_renderer(CommandDiagramRenderer::new(cmd.as_str(), timeout));
    }
    if let Some(cmd) = &cli.math_cmd {
        exporter = exporter.with_math_rasterizer(CommandMathRasterizer::new(cmd.as_str(), timeout));
    }

    let input = read_input_bytes(cli.input.as_deref())?;
    let bytes = exporter.export_bytes(&input)?;

    let path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(cli.input.as_deref()));
    fs::write(&path, bytes)?;
    eprintln!("✓ Output written to: {}", path.display());

    if let Some(report_path) = &cli.report {
        let serialized = serde_json::to_string_pretty(exporter.report())
            .map_err(|e| ExportError::Io { message: e.to_string() })?;
        fs::write(report_path, serialized)?;
    }
    let degraded = exporter.report().degradations.len();
    if degraded > 0 {
        eprintln!("! {} block(s) exported with fallbacks", degraded);
    }
    Ok(())
}

/// Config file first, then command-line overrides.
#[cfg(feature = "cli")]
fn resolve_options(cli: &Cli) -> ExportResult<ExportOptions> {
    let mut options = match &cli.config {
        Some(path) => ExportOptions::load(path)?,
        None => ExportOptions::default(),
    };
    if let Some(theme) = cli.theme {
        options.chart_theme = theme;
    }
    if let Some(mode) = cli.math_mode {
        options.math_mode = mode;
    }
    if let Some(ms) = cli.timeout_ms {
        options.render_timeout_ms = ms;
    }
    Ok(options)
}

#[cfg(feature = "cli")]
fn handle_subcommand(cmd: &Commands) -> ExportResult<()> {
    match cmd {
        Commands::Sections { input } => {
            let bytes = read_input_bytes(input.as_deref())?;
            let markdown = std::str::from_utf8(&bytes)?;
            print_json(&parse_markdown(markdown))?;
        }

        Commands::Math { latex, xml } => {
            let latex = match latex {
                Some(latex) => latex.clone(),
                None => String::from_utf8(read_input_bytes(None)?)
                    .map_err(|e| ExportError::from(e.utf8_error()))?,
            };
            if *xml {
                println!(
                    "{}",
                    mdocx_docx_backend::render_omath(&convert_latex_to_math(latex.trim()))
                );
            } else {
                print_json(&resolve_latex(latex.trim()))?;
            }
        }

        Commands::Info => {
            println!("mdocx - Markdown to Word converter with native LaTeX math");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Features:");
            println!("  ✓ Headings, paragraphs, lists, quotes, rules and pipe tables");
            println!("  ✓ Inline and display LaTeX math as native Word equations (OMML)");
            println!("  ✓ Mermaid diagrams through an external renderer (--diagram-cmd)");
            println!("  ✓ Image math mode through an external rasterizer (--math-cmd)");
            println!("  ✓ JSON degradation report (--report)");
            println!();
            println!("Diagram themes: default, neutral, forest, base");
            println!("Math modes: native, image");
            println!();
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> ExportResult<()> {
    let serialized =
        serde_json::to_string_pretty(value).map_err(|e| ExportError::Io { message: e.to_string() })?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", serialized)?;
    Ok(())
}

#[cfg(feature = "cli")]
fn read_input_bytes(path: Option<&Path>) -> ExportResult<Vec<u8>> {
    match path {
        Some(path) => Ok(fs::read(path)?),
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// `<stem>_<YYYYMMDD_HHMMSS>.docx` next to the input, or in the working
/// directory when reading stdin.
#[cfg(feature = "cli")]
fn default_output_path(input: Option<&Path>) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let stem = input
        .and_then(Path::file_stem)
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let name = format!("{}_{}.docx", stem, stamp);
    match input.and_then(Path::parent) {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install mdocx --features cli");
    eprintln!("  mdocx [OPTIONS] [INPUT]");
}
