//! Glues the lexer, parser, analyzer, and rule engine into a single
//! per-file entry point. Owns nothing shared across files: every call to
//! [`Pipeline::run`] builds its own scope tree and diagnostic sink, so
//! concurrent callers can safely run one `Pipeline` per file.

use crate::rules::RuleRunner;
use pinelint_lex::Lexer;
use pinelint_par::parse;
use pinelint_util::{Diagnostic, DiagnosticCode, Report};
use tracing::{debug, trace};

pub struct Pipeline {
    runner: RuleRunner,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline { runner: RuleRunner::new() }
    }

    /// Runs the full lex -> parse -> analyze -> rules sequence over `source`.
    ///
    /// A lexer failure short-circuits the pipeline: the returned report
    /// contains exactly one `E001` diagnostic at the lexer's own failure
    /// position. Parser errors do not short-circuit anything — they become
    /// `E002` diagnostics and the rule engine still runs over whatever
    /// partial statement list the parser recovered.
    pub fn run(&self, source: &str, file: Option<&str>) -> Report {
        let mut report = Report::new();

        let tokens = match Lexer::tokenize(source) {
            Ok(tokens) => tokens,
            Err(err) => {
                debug!(error = %err, "lexing failed, short-circuiting pipeline");
                report.add(with_file(
                    Diagnostic::error(DiagnosticCode::E001, err.to_string(), err.span()),
                    file,
                ));
                return report;
            }
        };
        trace!(token_count = tokens.len(), "lexing complete");

        let (statements, parse_errors) = parse(&tokens);
        trace!(
            statement_count = statements.len(),
            error_count = parse_errors.len(),
            "parsing complete"
        );
        for err in &parse_errors {
            report.add(with_file(
                Diagnostic::error(DiagnosticCode::E002, err.message.clone(), err.span),
                file,
            ));
        }

        report.extend(self.runner.run(source, &statements, file));
        report
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn with_file(diagnostic: Diagnostic, file: Option<&str>) -> Diagnostic {
    match file {
        Some(f) => diagnostic.with_file(f),
        None => diagnostic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_source_produces_no_errors() {
        let report = Pipeline::new().run("//@version=5\nindicator(\"T\")\nplot(close)\n", None);
        assert!(!report.has_errors());
    }

    #[test]
    fn lexer_failure_short_circuits_with_single_e001() {
        let report = Pipeline::new().run("if true\n        x = 1\n    y = 2\n", None);
        assert_eq!(report.diagnostics().len(), 1);
        assert_eq!(report.diagnostics()[0].code, DiagnosticCode::E001);
    }

    #[test]
    fn parse_error_still_runs_rule_engine() {
        let report = Pipeline::new().run("//@version=5\nx = (1 +\n", None);
        assert!(report.diagnostics().iter().any(|d| d.code == DiagnosticCode::E002));
    }

    #[test]
    fn file_name_is_attached_to_every_diagnostic() {
        let report = Pipeline::new().run("plot(undefined_thing)\n", Some("strategy.pine"));
        assert!(report.diagnostics().iter().all(|d| d.file.as_deref() == Some("strategy.pine")));
    }
}
