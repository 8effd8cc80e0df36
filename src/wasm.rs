//! WASM bindings for mdocx
//!
//! Exposes Markdown export and math conversion to JavaScript. Diagrams
//! and image math have no rasterizer here, so they fall back to error
//! labels and native math respectively.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::ExportOptions;
use crate::core::latex2omml::convert_latex_to_math;
use crate::core::markdown::parse_markdown;
use crate::Exporter;

/// Export result with the degradations recorded along the way.
#[derive(Serialize)]
struct ExportSummary<'a> {
    degradations: &'a crate::ExportReport,
}

/// Serialize a value to JsValue, or `null` when that fails.
fn to_js_value<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Convert Markdown to `.docx` bytes.
///
/// # Arguments
/// * `markdown` - Markdown source
/// * `options` - `{ chart_theme, math_mode, max_image_width_px, render_timeout_ms }`,
///   any subset; `undefined` for defaults
///
/// # Returns
/// The document as a `Uint8Array`
#[wasm_bindgen(js_name = "markdownToDocx")]
pub fn markdown_to_docx(markdown: &str, options: JsValue) -> Result<Vec<u8>, JsValue> {
    let options: ExportOptions = if options.is_undefined() || options.is_null() {
        ExportOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from_str(&format!("Invalid options: {}", e)))?
    };
    let mut exporter = Exporter::new(options);
    let bytes = exporter
        .export(markdown)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    if !exporter.report().is_empty() {
        console_warn(&to_js_value(&ExportSummary {
            degradations: exporter.report(),
        }));
    }
    Ok(bytes)
}

/// Parsed sections as plain JS objects.
#[wasm_bindgen(js_name = "parseSections")]
pub fn parse_sections(markdown: &str) -> JsValue {
    to_js_value(&parse_markdown(markdown))
}

/// Convert LaTeX math to an OMML `<m:oMath>` fragment.
#[wasm_bindgen(js_name = "latexToOmml")]
pub fn latex_to_omml(latex: &str) -> String {
    mdocx_docx_backend::render_omath(&convert_latex_to_math(latex))
}

#[wasm_bindgen(js_name = "getVersion")]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = warn)]
    fn console_warn(value: &JsValue);
}
