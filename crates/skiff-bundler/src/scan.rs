//! Per-module source scan with OXC.
//!
//! One parse per script module yields three things the pipeline needs before
//! Rolldown sees the code: syntax errors with exact positions, the module's
//! import specifiers in source order, and the spans of `process.env.NAME`
//! reads to substitute.

use crate::diagnostics::{BundleDiagnostic, DiagnosticKind};
use crate::env::EnvSubstitutions;
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_ast_visit::{Visit, walk};
use oxc_parser::{Parser, ParserReturn};
use oxc_span::SourceType;
use skiff_vfs::LoaderKind;

/// An import edge as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub specifier: String,
    /// Byte offset of the specifier literal
    pub offset: u32,
}

/// Result of scanning one script module.
#[derive(Debug, Clone)]
pub struct ModuleScan {
    /// Source with environment reads substituted
    pub code: String,
    /// Imports in source order
    pub imports: Vec<ImportRecord>,
    pub substitutions: usize,
}

fn source_type(loader: LoaderKind) -> SourceType {
    SourceType::mjs()
        .with_typescript(loader.is_typed())
        .with_jsx(loader.allows_markup())
}

/// Parse and scan a script module.
///
/// Syntax errors are returned as located diagnostics against `path`.
pub fn scan_module(
    path: &str,
    source: &str,
    loader: LoaderKind,
    env: &EnvSubstitutions,
) -> Result<ModuleScan, Vec<BundleDiagnostic>> {
    let allocator = Allocator::default();
    let ParserReturn {
        program, errors, ..
    } = Parser::new(&allocator, source, source_type(loader)).parse();

    if !errors.is_empty() {
        return Err(errors
            .iter()
            .map(|error| {
                let diagnostic =
                    BundleDiagnostic::new(DiagnosticKind::ParseError, error.message.to_string())
                        .with_file(path);
                match error.labels.as_ref().and_then(|labels| labels.first()) {
                    Some(label) => diagnostic.at_offset(source, label.offset()),
                    None => diagnostic,
                }
            })
            .collect());
    }

    let mut scanner = ModuleScanner {
        env,
        imports: Vec::new(),
        replacements: Vec::new(),
    };
    scanner.visit_program(&program);

    let substitutions = scanner.replacements.len();
    Ok(ModuleScan {
        code: splice(source, scanner.replacements),
        imports: scanner.imports,
        substitutions,
    })
}

struct ModuleScanner<'e> {
    env: &'e EnvSubstitutions,
    imports: Vec<ImportRecord>,
    replacements: Vec<(u32, u32, &'e str)>,
}

impl<'e> ModuleScanner<'e> {
    fn record_import(&mut self, source: &StringLiteral<'_>) {
        self.imports.push(ImportRecord {
            specifier: source.value.to_string(),
            offset: source.span.start,
        });
    }

    /// Literal for a `process.env.NAME` read, if `NAME` was supplied.
    fn env_literal(&self, member: &StaticMemberExpression<'_>) -> Option<&'e str> {
        let Expression::StaticMemberExpression(object) = &member.object else {
            return None;
        };
        let Expression::Identifier(root) = &object.object else {
            return None;
        };
        if root.name.as_str() != "process" || object.property.name.as_str() != "env" {
            return None;
        }
        self.env.literal(member.property.name.as_str())
    }
}

impl<'a> Visit<'a> for ModuleScanner<'_> {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        if !matches!(decl.import_kind, ImportOrExportKind::Type) {
            self.record_import(&decl.source);
        }
        walk::walk_import_declaration(self, decl);
    }

    fn visit_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'a>) {
        if !matches!(decl.export_kind, ImportOrExportKind::Type) {
            self.record_import(&decl.source);
        }
        walk::walk_export_all_declaration(self, decl);
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &decl.source {
            if !matches!(decl.export_kind, ImportOrExportKind::Type) {
                self.record_import(source);
            }
        }
        walk::walk_export_named_declaration(self, decl);
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        if let Expression::StringLiteral(source) = &expr.source {
            self.record_import(source);
        }
        walk::walk_import_expression(self, expr);
    }

    fn visit_static_member_expression(&mut self, member: &StaticMemberExpression<'a>) {
        if let Some(literal) = self.env_literal(member) {
            self.replacements
                .push((member.span.start, member.span.end, literal));
            return;
        }
        walk::walk_static_member_expression(self, member);
    }
}

/// Apply non-overlapping `(start, end, text)` replacements to `source`.
fn splice(source: &str, mut replacements: Vec<(u32, u32, &str)>) -> String {
    if replacements.is_empty() {
        return source.to_string();
    }
    replacements.sort_by_key(|(start, _, _)| *start);

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0usize;
    for (start, end, text) in replacements {
        let (start, end) = (start as usize, end as usize);
        if start < cursor || end > source.len() {
            continue;
        }
        out.push_str(&source[cursor..start]);
        out.push_str(text);
        cursor = end;
    }
    out.push_str(&source[cursor..]);
    out
}
