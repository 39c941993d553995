//! Stylesheet handling: validation through lightningcss and runtime injection.
//!
//! Stylesheets never reach Rolldown as CSS. Each `.css` module is parsed,
//! printed back out, recorded for aggregation and replaced in the graph by an
//! empty module. The aggregated text is injected by a preamble prepended to
//! the final program.

use crate::diagnostics::{BundleDiagnostic, DiagnosticKind};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

/// Module body that stands in for a stylesheet in the module graph.
pub const STYLESHEET_STUB: &str = "export {};\n";

/// Parse and print a stylesheet.
pub fn process_stylesheet(path: &str, source: &str) -> Result<String, BundleDiagnostic> {
    let stylesheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: path.to_string(),
            ..Default::default()
        },
    )
    .map_err(|e| {
        let diagnostic =
            BundleDiagnostic::new(DiagnosticKind::StylesheetError, e.kind.to_string())
                .with_file(path);
        match &e.loc {
            // lightningcss lines are 0-based, columns 1-based
            Some(loc) => diagnostic.at_line_column(source, loc.line + 1, loc.column),
            None => diagnostic,
        }
    })?;

    let printed = stylesheet
        .to_css(PrinterOptions::default())
        .map_err(|e| {
            BundleDiagnostic::new(DiagnosticKind::StylesheetError, e.kind.to_string())
                .with_file(path)
        })?;

    Ok(printed.code)
}

/// Prefix `program` with a preamble that injects `css` into the document head.
///
/// Injection failures are caught so the program still runs.
pub fn inject_styles(program: &str, css: &str) -> String {
    if css.trim().is_empty() {
        return program.to_string();
    }

    let literal = serde_json::Value::String(css.to_string()).to_string();
    format!(
        "(() => {{\n  try {{\n    const style = document.createElement('style');\n    \
         style.setAttribute('data-skiff', '');\n    style.textContent = {literal};\n    \
         document.head.appendChild(style);\n  }} catch (error) {{\n    \
         console.warn('[skiff] failed to inject styles', error);\n  }}\n}})();\n{program}"
    )
}
