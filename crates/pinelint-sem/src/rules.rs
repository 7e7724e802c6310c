//! The rule registry: source-text rules that never touch the AST, plus the
//! rule that drives the semantic analyzer and turns its findings into
//! diagnostics. Grounded on the reference implementation's `rules.py`.

use crate::analyzer::SemanticAnalyzer;
use pinelint_par::Stmt;
use pinelint_util::{Diagnostic, DiagnosticCode, Span};
use std::panic::{self, AssertUnwindSafe};

const SUSPICIOUS_PATTERNS: &[&str] = &["import os", "import sys", "exec(", "eval(", "__import__"];
const SUPPORTED_VERSIONS: &[u32] = &[4, 5, 6];

fn at(line: u32, column: u32) -> Span {
    Span::new(0, 0, line, column)
}

fn with_file(diagnostic: Diagnostic, file: Option<&str>) -> Diagnostic {
    match file {
        Some(f) => diagnostic.with_file(f),
        None => diagnostic,
    }
}

pub trait Rule {
    fn check(&self, source: &str, statements: &[Stmt], file: Option<&str>) -> Vec<Diagnostic>;
}

/// R001: exactly one `//@version=N` directive. R003: N must be 4, 5, or 6.
/// Runs over the raw source text, not the AST — the lexer has already
/// stripped the comment by the time a tree exists.
pub struct VersionCheckRule;

impl Rule for VersionCheckRule {
    fn check(&self, source: &str, _statements: &[Stmt], file: Option<&str>) -> Vec<Diagnostic> {
        let matches: Vec<(usize, &str)> = source
            .lines()
            .enumerate()
            .filter_map(|(i, line)| line.strip_prefix("//@version=").map(|rest| (i, rest.trim_end())))
            .collect();

        let mut out = Vec::new();
        match matches.len() {
            0 => out.push(with_file(
                Diagnostic::error(DiagnosticCode::R001, "Missing //@version directive.", at(1, 1)),
                file,
            )),
            n if n > 1 => out.push(with_file(
                Diagnostic::error(DiagnosticCode::R001, "Multiple //@version directives.", at(1, 1)),
                file,
            )),
            _ => {
                let (line_idx, version_str) = matches[0];
                let unsupported = match version_str.parse::<u32>() {
                    Ok(v) if SUPPORTED_VERSIONS.contains(&v) => None,
                    Ok(v) => Some(v.to_string()),
                    Err(_) => Some(version_str.to_string()),
                };
                if let Some(v) = unsupported {
                    out.push(with_file(
                        Diagnostic::error(
                            DiagnosticCode::R003,
                            format!("Unsupported Pine Script version: {}. Expected 4, 5, or 6.", v),
                            at(line_idx as u32 + 1, 1),
                        ),
                        file,
                    ));
                }
            }
        }
        out
    }
}

/// SEC01: flag source lines that look like a host-language escape attempt
/// smuggled into a Pine Script file.
pub struct SecurityRule;

impl Rule for SecurityRule {
    fn check(&self, source: &str, _statements: &[Stmt], file: Option<&str>) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for (i, line) in source.lines().enumerate() {
            for pattern in SUSPICIOUS_PATTERNS {
                if line.contains(pattern) {
                    out.push(with_file(
                        Diagnostic::warning(
                            DiagnosticCode::Sec01,
                            format!("Suspicious pattern found: '{}'. Verify this is intended Pine Script.", pattern),
                            at(i as u32 + 1, 1),
                        ),
                        file,
                    ));
                }
            }
        }
        out
    }
}

/// Drives [`SemanticAnalyzer`] over the (possibly partial) statement list and
/// turns its findings into `R200`/`R201`/`R202`/`W001`/`W002` diagnostics. A
/// panic anywhere in the walk is caught and surfaced as a single `E999`
/// rather than aborting the remaining rules.
pub struct SemanticCheckRule;

impl Rule for SemanticCheckRule {
    fn check(&self, _source: &str, statements: &[Stmt], file: Option<&str>) -> Vec<Diagnostic> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut analyzer = SemanticAnalyzer::new();
            analyzer.analyze(statements);
            analyzer
        }));

        let analyzer = match result {
            Ok(analyzer) => analyzer,
            Err(_) => {
                return vec![with_file(
                    Diagnostic::error(DiagnosticCode::E999, "Internal analyzer error", at(1, 1)),
                    file,
                )];
            }
        };

        let mut out = Vec::new();
        for issue in &analyzer.errors {
            let code = if issue.message.contains("Undefined") {
                DiagnosticCode::R201
            } else if issue.message.contains("Type mismatch") {
                DiagnosticCode::R202
            } else {
                DiagnosticCode::R200
            };
            out.push(with_file(
                Diagnostic::error(code, issue.message.clone(), at(issue.span.line, issue.span.column)),
                file,
            ));
        }

        for issue in &analyzer.warnings {
            out.push(with_file(
                Diagnostic::warning(DiagnosticCode::W001, issue.message.clone(), at(issue.span.line, issue.span.column)),
                file,
            ));
        }

        for scope in &analyzer.all_scopes {
            for (name, sym) in &scope.borrow().symbols {
                if !sym.is_mutable || sym.usage_count != 0 || name.starts_with('_') {
                    continue;
                }
                let Some(span) = sym.declared_at else { continue };
                let diagnostic = Diagnostic::warning(
                    DiagnosticCode::W002,
                    format!("Variable '{}' is declared but never used.", name),
                    at(span.line, 1),
                )
                .with_suggestion(format!("Remove '{}' or prefix with '_'.", name));
                out.push(with_file(diagnostic, file));
            }
        }

        out
    }
}

/// Runs every registered rule in a fixed order and concatenates their
/// diagnostics. Unlike the original, this always runs the full sequence,
/// even over a statement list the parser only partially recovered.
pub struct RuleRunner {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRunner {
    pub fn new() -> Self {
        RuleRunner {
            rules: vec![
                Box::new(VersionCheckRule),
                Box::new(SecurityRule),
                Box::new(SemanticCheckRule),
            ],
        }
    }

    pub fn run(&self, source: &str, statements: &[Stmt], file: Option<&str>) -> Vec<Diagnostic> {
        self.rules
            .iter()
            .flat_map(|rule| rule.check(source, statements, file))
            .collect()
    }
}

impl Default for RuleRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinelint_lex::Lexer;
    use pinelint_par::parse;

    fn run_rules(source: &str) -> Vec<Diagnostic> {
        let tokens = Lexer::tokenize(source).unwrap();
        let (stmts, _errors) = parse(&tokens);
        RuleRunner::new().run(source, &stmts, Some("test.pine"))
    }

    #[test]
    fn missing_version_is_r001() {
        let diags = run_rules("indicator(\"T\")\n");
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::R001));
    }

    #[test]
    fn valid_version_produces_no_r001_or_r003() {
        let diags = run_rules("//@version=5\nindicator(\"T\")\n");
        assert!(!diags.iter().any(|d| matches!(d.code, DiagnosticCode::R001 | DiagnosticCode::R003)));
    }

    #[test]
    fn unsupported_version_is_r003() {
        let diags = run_rules("//@version=2\nindicator(\"T\")\n");
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::R003));
    }

    #[test]
    fn suspicious_pattern_is_sec01() {
        let diags = run_rules("//@version=5\n// eval(\"x\")\n");
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::Sec01));
    }

    #[test]
    fn unused_variable_is_w002() {
        let diags = run_rules("//@version=5\nindicator(\"T\")\nx = 1\nplot(close)\n");
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::W002));
    }

    #[test]
    fn undefined_identifier_is_r201() {
        let diags = run_rules("//@version=5\nindicator(\"T\")\nplot(totally_undefined)\n");
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::R201));
    }
}
