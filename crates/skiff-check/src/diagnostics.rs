//! Parsing and filtering of `tsc --pretty false` output.
//!
//! Output is grouped into blocks: a `file(line,col): error TSxxxx: message`
//! header followed by its indented continuation lines. Suppression works on
//! whole blocks, keyed by the diagnostic code when the header parses and by
//! message text otherwise.

use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Diagnostic codes that only mean "this package isn't installed here".
///
/// - TS2307: Cannot find module '{0}' or its corresponding type declarations.
/// - TS2792: Cannot find module '{0}'. Did you mean to set 'moduleResolution'...
/// - TS7016: Could not find a declaration file for module '{0}'.
pub const SUPPRESSED_CODES: [u32; 3] = [2307, 2792, 7016];

const SUPPRESSED_PHRASES: [&str; 2] = [
    "Cannot find module",
    "Could not find a declaration file for module",
];

/// Replaces the scope root in reported text.
pub const VIRTUAL_ROOT: &str = "/virtual";

/// Maximum number of characters of filtered text returned to callers.
pub const MAX_REPORT_CHARS: usize = 2000;

pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<file>.+?)\((?P<line>\d+),(?P<column>\d+)\): )?(?P<severity>error|warning|message) TS(?P<code>\d+): (?P<message>.*)$",
    )
    .expect("diagnostic header pattern is valid")
});

/// One diagnostic with its continuation lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TscDiagnostic {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub code: Option<u32>,
    pub message: String,
    /// Header line followed by continuation lines, as printed
    pub lines: Vec<String>,
}

impl TscDiagnostic {
    fn parse_header(line: &str) -> Option<Self> {
        let caps = HEADER.captures(line)?;
        Some(Self {
            file: caps.name("file").map(|m| m.as_str().to_string()),
            line: caps.name("line").and_then(|m| m.as_str().parse().ok()),
            column: caps.name("column").and_then(|m| m.as_str().parse().ok()),
            code: caps.name("code").and_then(|m| m.as_str().parse().ok()),
            message: caps["message"].to_string(),
            lines: vec![line.to_string()],
        })
    }

    fn unparsed(line: &str) -> Self {
        Self {
            file: None,
            line: None,
            column: None,
            code: None,
            message: line.trim().to_string(),
            lines: vec![line.to_string()],
        }
    }

    pub fn is_suppressed(&self) -> bool {
        is_suppressed(self.code, &self.message)
    }
}

/// Whether a diagnostic is an artifact of packages not being installed.
///
/// The code decides when present; the message is only consulted for lines
/// that carry no code.
pub fn is_suppressed(code: Option<u32>, message: &str) -> bool {
    match code {
        Some(code) => SUPPRESSED_CODES.contains(&code),
        None => SUPPRESSED_PHRASES
            .iter()
            .any(|phrase| message.contains(phrase)),
    }
}

/// Group raw checker output into diagnostics. Blank lines are dropped.
pub fn parse(output: &str) -> Vec<TscDiagnostic> {
    let mut diagnostics: Vec<TscDiagnostic> = Vec::new();
    for line in output.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        if let Some(diagnostic) = TscDiagnostic::parse_header(line) {
            diagnostics.push(diagnostic);
            continue;
        }
        let continues = line.starts_with(char::is_whitespace);
        match diagnostics.last_mut() {
            Some(previous) if continues => previous.lines.push(line.to_string()),
            _ => diagnostics.push(TscDiagnostic::unparsed(line)),
        }
    }
    diagnostics
}

/// Result of filtering a failed check's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Remaining diagnostics, root-rewritten, untruncated
    pub text: String,
    pub kept: usize,
    pub suppressed: usize,
}

impl FilterOutcome {
    /// Nothing but install noise was reported.
    pub fn is_clean(&self) -> bool {
        self.kept == 0
    }

    /// `text` bounded to [`MAX_REPORT_CHARS`].
    pub fn report(&self) -> String {
        truncate(&self.text, MAX_REPORT_CHARS)
    }
}

/// Drop suppressed diagnostics and rewrite `roots` to [`VIRTUAL_ROOT`].
pub fn filter(output: &str, roots: &[PathBuf]) -> FilterOutcome {
    let (suppressed, kept): (Vec<_>, Vec<_>) =
        parse(output).into_iter().partition(TscDiagnostic::is_suppressed);

    let text = kept
        .iter()
        .flat_map(|d| d.lines.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("\n");

    FilterOutcome {
        text: rewrite_roots(&text, roots),
        kept: kept.len(),
        suppressed: suppressed.len(),
    }
}

/// Replace every spelling of the scope root with [`VIRTUAL_ROOT`].
pub fn rewrite_roots(text: &str, roots: &[PathBuf]) -> String {
    let mut spellings: Vec<String> = roots
        .iter()
        .flat_map(|root| {
            let native = root.to_string_lossy().trim_end_matches(['/', '\\']).to_string();
            let forward = native.replace('\\', "/");
            [native, forward]
        })
        .filter(|s| !s.is_empty())
        .collect();
    // Longest first, so a canonical path isn't partially rewritten through its alias.
    spellings.sort_by_key(|s| std::cmp::Reverse(s.len()));
    spellings.dedup();

    spellings
        .iter()
        .fold(text.to_string(), |acc, root| acc.replace(root.as_str(), VIRTUAL_ROOT))
}

/// First `max_chars` characters of `text`, marked when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}{TRUNCATION_MARKER}", &text[..end]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOISE: &str = "src/main.tsx(1,19): error TS2307: Cannot find module 'react' or its corresponding type declarations.";

    #[test]
    fn test_parse_header() {
        let diagnostics =
            parse("src/App.tsx(3,7): error TS2322: Type 'string' is not assignable to type 'number'.");
        assert_eq!(diagnostics.len(), 1);
        let d = &diagnostics[0];
        assert_eq!(d.file.as_deref(), Some("src/App.tsx"));
        assert_eq!((d.line, d.column, d.code), (Some(3), Some(7), Some(2322)));
        assert!(d.message.starts_with("Type 'string'"));
    }

    #[test]
    fn test_global_diagnostic_has_code() {
        let diagnostics = parse("error TS5023: Unknown compiler option 'foo'.");
        assert_eq!(diagnostics[0].code, Some(5023));
        assert_eq!(diagnostics[0].file, None);
    }

    #[test]
    fn test_continuation_lines_attach() {
        let output = "src/a.ts(1,1): error TS2322: Type '{ a: string; }' is not assignable.\n  Types of property 'a' are incompatible.\n\n    Type 'string' is not assignable to type 'number'.\n";
        let diagnostics = parse(output);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].lines.len(), 3);
    }

    #[test]
    fn test_suppression_predicate() {
        assert!(is_suppressed(Some(2307), "anything"));
        assert!(is_suppressed(Some(2792), ""));
        assert!(is_suppressed(Some(7016), ""));
        assert!(!is_suppressed(Some(2322), "Cannot find module 'x'"));
        assert!(is_suppressed(None, "Cannot find module 'x'"));
        assert!(is_suppressed(None, "Could not find a declaration file for module 'y'"));
        assert!(!is_suppressed(None, "Something else"));
    }

    #[test]
    fn test_only_noise_is_clean() {
        let output = format!(
            "{NOISE}\nsrc/b.ts(2,1): error TS7016: Could not find a declaration file for module 'lodash'.\n  Try `npm i --save-dev @types/lodash`\n\n"
        );
        let outcome = filter(&output, &[]);
        assert!(outcome.is_clean());
        assert_eq!(outcome.suppressed, 2);
        assert_eq!(outcome.text, "");
    }

    #[test]
    fn test_genuine_error_survives_with_rewritten_root() {
        let root = PathBuf::from("/tmp/skiff-check-abc123");
        let output = format!(
            "{NOISE}\n/tmp/skiff-check-abc123/src/App.tsx(4,3): error TS2322: Type 'string' is not assignable to type 'number'.\n{NOISE}\n"
        );
        let outcome = filter(&output, &[root]);
        assert_eq!(outcome.kept, 1);
        assert_eq!(outcome.suppressed, 2);
        assert_eq!(
            outcome.text,
            "/virtual/src/App.tsx(4,3): error TS2322: Type 'string' is not assignable to type 'number'."
        );
    }

    #[test]
    fn test_canonical_root_rewritten_first() {
        let roots = [
            PathBuf::from("/var/folders/x/skiff-check-1"),
            PathBuf::from("/private/var/folders/x/skiff-check-1"),
        ];
        let text = "/private/var/folders/x/skiff-check-1/src/a.ts and /var/folders/x/skiff-check-1/src/b.ts";
        assert_eq!(
            rewrite_roots(text, &roots),
            "/virtual/src/a.ts and /virtual/src/b.ts"
        );
    }

    #[test]
    fn test_truncate() {
        let long = "é".repeat(MAX_REPORT_CHARS + 10);
        let cut = truncate(&long, MAX_REPORT_CHARS);
        assert!(cut.ends_with(TRUNCATION_MARKER));
        assert_eq!(cut.chars().count(), MAX_REPORT_CHARS + TRUNCATION_MARKER.chars().count());
        assert_eq!(truncate("short", MAX_REPORT_CHARS), "short");
    }

    #[test]
    fn test_report_is_bounded() {
        let output = (0..200)
            .map(|i| format!("src/a.ts({i},1): error TS2322: Type mismatch number {i}."))
            .collect::<Vec<_>>()
            .join("\n");
        let outcome = filter(&output, &[]);
        assert_eq!(outcome.kept, 200);
        assert!(outcome.report().ends_with(TRUNCATION_MARKER));
        assert!(outcome.text.len() > MAX_REPORT_CHARS);
    }
}
