//! Structured bundle diagnostics.
//!
//! Diagnostics raised by our own hooks (missing virtual files, syntax errors)
//! carry exact positions and a code frame. Errors that originate inside
//! Rolldown are extracted from its formatted output as a fallback.

use serde::Serialize;
use skiff_vfs::PROBE_EXTENSIONS;
use std::fmt;

/// Diagnostic kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A virtual import edge points at no file
    MissingFile,
    ParseError,
    StylesheetError,
    MissingExport,
    UnresolvedEntry,
    Other,
}

/// One bundling problem attributed to a virtual file and position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleDiagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub file: Option<String>,
    /// 1-based
    pub line: Option<u32>,
    /// 1-based, in characters
    pub column: Option<u32>,
    /// Source line plus caret marker, when the source is known
    pub frame: Option<String>,
    pub help: Option<String>,
}

impl BundleDiagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file: None,
            line: None,
            column: None,
            frame: None,
            help: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attach line, column and code frame for a byte offset into `source`.
    pub fn at_offset(mut self, source: &str, offset: usize) -> Self {
        let location = SourceLocation::from_offset(source, offset);
        self.line = Some(location.line);
        self.column = Some(location.column);
        self.frame = Some(location.frame());
        self
    }

    /// Attach a 1-based line/column position inside `source`.
    pub fn at_line_column(mut self, source: &str, line: u32, column: u32) -> Self {
        let text = source
            .lines()
            .nth(line.saturating_sub(1) as usize)
            .unwrap_or_default();
        let location = SourceLocation {
            line,
            column,
            text: text.to_string(),
        };
        self.line = Some(line);
        self.column = Some(column);
        self.frame = Some(location.frame());
        self
    }

    fn sort_key(&self) -> (Option<&str>, u32, u32, &str) {
        (
            self.file.as_deref(),
            self.line.unwrap_or(0),
            self.column.unwrap_or(0),
            &self.message,
        )
    }
}

impl fmt::Display for BundleDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line, self.column) {
            (Some(file), Some(line), Some(column)) => write!(f, "{file}:{line}:{column}: ")?,
            (Some(file), _, _) => write!(f, "{file}: ")?,
            _ => {}
        }
        write!(f, "error: {}", self.message)?;
        if let Some(frame) = &self.frame {
            write!(f, "\n{frame}")?;
        }
        if let Some(help) = &self.help {
            write!(f, "\nhelp: {help}")?;
        }
        Ok(())
    }
}

/// Sort diagnostics by file and position and drop exact duplicates.
pub fn normalize(mut diagnostics: Vec<BundleDiagnostic>) -> Vec<BundleDiagnostic> {
    diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    diagnostics.dedup();
    diagnostics
}

/// Render a batch of diagnostics as one error message.
pub fn render(diagnostics: &[BundleDiagnostic]) -> String {
    let count = diagnostics.len();
    let mut out = format!(
        "Build failed with {count} error{}:",
        if count == 1 { "" } else { "s" }
    );
    for diagnostic in diagnostics {
        out.push('\n');
        out.push_str(&diagnostic.to_string());
    }
    out
}

/// A resolved position inside a source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
    /// The full text of the line
    pub text: String,
}

impl SourceLocation {
    /// Convert a byte offset to a 1-based line and character column.
    ///
    /// Offsets past the end clamp to the end of the source; offsets inside a
    /// multi-byte character snap back to its start.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }

        let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line_end = source[offset..]
            .find('\n')
            .map_or(source.len(), |i| offset + i);
        let line = source[..line_start].matches('\n').count() + 1;
        let column = source[line_start..offset].chars().count() + 1;

        Self {
            line: line as u32,
            column: column as u32,
            text: source[line_start..line_end].trim_end_matches('\r').to_string(),
        }
    }

    /// Two-line code frame: the source line and a caret under the column.
    pub fn frame(&self) -> String {
        let gutter = self.line.to_string();
        let pad = " ".repeat(gutter.len());
        // Tabs are mirrored so the caret lines up in the caller's terminal.
        let marker: String = self
            .text
            .chars()
            .take(self.column.saturating_sub(1) as usize)
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        format!("  {gutter} | {}\n  {pad} | {marker}^", self.text)
    }
}

/// Extract diagnostics from a Rolldown error.
///
/// Rolldown's batched error type has no stable structured accessors, so the
/// formatted output is parsed heuristically.
pub fn extract_from_rolldown_error(error: &dyn fmt::Debug) -> Vec<BundleDiagnostic> {
    let error_str = format!("{error:?}");

    let kind = if error_str.contains("MissingExport") {
        DiagnosticKind::MissingExport
    } else if error_str.contains("Parse error")
        || error_str.contains("Syntax")
        || error_str.contains("Expected")
    {
        DiagnosticKind::ParseError
    } else if error_str.contains("UnresolvedEntry") {
        DiagnosticKind::UnresolvedEntry
    } else if error_str.contains("Could not resolve") || error_str.contains("UnresolvedImport") {
        DiagnosticKind::MissingFile
    } else {
        DiagnosticKind::Other
    };

    let mut diagnostic = BundleDiagnostic::new(kind, extract_message(&error_str));
    diagnostic.file = extract_file_path(&error_str);
    vec![diagnostic]
}

fn extract_message(error_str: &str) -> String {
    // Plugin hook failures are surfaced by Rolldown with our own message inside.
    for marker in ["message: \"", "message: "] {
        if let Some(start) = error_str.find(marker) {
            let rest = &error_str[start + marker.len()..];
            let end = rest.find(['"', '\n']).unwrap_or(rest.len());
            let message = rest[..end].trim();
            if !message.is_empty() {
                return message.to_string();
            }
        }
    }
    error_str.lines().next().unwrap_or(error_str).trim().to_string()
}

fn extract_file_path(error_str: &str) -> Option<String> {
    error_str
        .split(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '(' | ')' | ','))
        .map(|token| token.trim_end_matches(':'))
        .find(|token| PROBE_EXTENSIONS.iter().any(|ext| token.ends_with(ext)) && token.contains('/'))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_offset() {
        let source = "import a from './a'\nconst x = ;\n";
        let offset = source.find(';').unwrap();
        let loc = SourceLocation::from_offset(source, offset);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 11);
        assert_eq!(loc.text, "const x = ;");
    }

    #[test]
    fn test_location_counts_characters_not_bytes() {
        let source = "const é = ;";
        let offset = source.find(';').unwrap();
        let loc = SourceLocation::from_offset(source, offset);
        assert_eq!(loc.column, 11);
    }

    #[test]
    fn test_location_clamps_offset() {
        let loc = SourceLocation::from_offset("abc", 99);
        assert_eq!((loc.line, loc.column), (1, 4));
    }

    #[test]
    fn test_frame_places_caret() {
        let loc = SourceLocation {
            line: 12,
            column: 5,
            text: "let = 1".into(),
        };
        assert_eq!(loc.frame(), "  12 | let = 1\n     |     ^");
    }

    #[test]
    fn test_display_with_location() {
        let diag = BundleDiagnostic::new(DiagnosticKind::ParseError, "Unexpected token")
            .with_file("src/App.tsx")
            .at_offset("const x = ;", 10);
        let text = diag.to_string();
        assert!(text.starts_with("src/App.tsx:1:11: error: Unexpected token"));
        assert!(text.contains("1 | const x = ;"));
        assert!(text.ends_with('^'));
    }

    #[test]
    fn test_render_header_and_order() {
        let b = BundleDiagnostic::new(DiagnosticKind::Other, "second").with_file("src/b.ts");
        let a = BundleDiagnostic::new(DiagnosticKind::Other, "first").with_file("src/a.ts");
        let diagnostics = normalize(vec![b.clone(), a, b]);
        assert_eq!(diagnostics.len(), 2);
        let text = render(&diagnostics);
        assert!(text.starts_with("Build failed with 2 errors:"));
        assert!(text.find("first").unwrap() < text.find("second").unwrap());
    }

    #[test]
    fn test_extract_file_path_uses_probe_extensions() {
        assert_eq!(
            extract_file_path("Unexpected token in (src/data/x.json): line 2").as_deref(),
            Some("src/data/x.json")
        );
        assert_eq!(extract_file_path("bad value at main.ts"), None);
        assert_eq!(extract_file_path("no path in src/README.md"), None);
    }

    #[test]
    fn test_extract_from_debug_string() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct FakeError {
            message: &'static str,
        }
        let diagnostics = extract_from_rolldown_error(&FakeError {
            message: "Parse error in src/App.tsx",
        });
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::ParseError);
        assert_eq!(diagnostics[0].message, "Parse error in src/App.tsx");
        assert_eq!(diagnostics[0].file.as_deref(), Some("src/App.tsx"));
    }
}
