use super::{Diagnostic, Severity};
use serde::Serialize;

/// Aggregates the diagnostics produced for one analyzed file, in emission
/// order, and renders them to the two supported output formats.
#[derive(Clone, Debug, Default)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn new() -> Self {
        Report::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// One line per diagnostic, followed by a blank line and the summary.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for diagnostic in &self.diagnostics {
            out.push_str(&diagnostic.to_string());
            out.push('\n');
        }
        out.push_str(&format!(
            "\nFound {} errors, {} warnings.\n",
            self.error_count(),
            self.warning_count()
        ));
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&ReportJson::from(self))
    }
}

#[derive(Serialize)]
struct ReportJson {
    valid: bool,
    error_count: usize,
    warning_count: usize,
    diagnostics: Vec<DiagnosticJson>,
}

#[derive(Serialize)]
struct DiagnosticJson {
    severity: Severity,
    code: String,
    message: String,
    location: LocationJson,
    suggestion: Option<String>,
}

#[derive(Serialize)]
struct LocationJson {
    line: u32,
    column: u32,
    file: Option<String>,
}

impl From<&Report> for ReportJson {
    fn from(report: &Report) -> Self {
        ReportJson {
            valid: !report.has_errors(),
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            diagnostics: report
                .diagnostics
                .iter()
                .map(|d| DiagnosticJson {
                    severity: d.severity,
                    code: d.code.as_str().to_string(),
                    message: d.message.clone(),
                    location: LocationJson {
                        line: d.line,
                        column: d.column,
                        file: d.file.clone(),
                    },
                    suggestion: d.suggestion.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticCode;
    use crate::span::Span;

    fn sample_report() -> Report {
        let mut report = Report::new();
        report.add(Diagnostic::error(
            DiagnosticCode::R001,
            "missing version",
            Span::new(0, 0, 1, 1),
        ));
        report.add(Diagnostic::warning(
            DiagnosticCode::W002,
            "unused variable 'x'",
            Span::new(10, 11, 3, 5),
        ));
        report
    }

    #[test]
    fn has_errors_reflects_any_error_severity() {
        let report = sample_report();
        assert!(report.has_errors());
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn empty_report_is_valid() {
        let report = Report::new();
        assert!(!report.has_errors());
        assert_eq!(report.error_count(), 0);
    }

    #[test]
    fn to_text_ends_with_summary_line() {
        let report = sample_report();
        let text = report.to_text();
        assert!(text.contains("Found 1 errors, 1 warnings."));
    }

    #[test]
    fn to_json_round_trips_counts() {
        let report = sample_report();
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(value["error_count"], 1);
        assert_eq!(value["warning_count"], 1);
        assert_eq!(value["diagnostics"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn running_twice_produces_identical_json() {
        let report = sample_report();
        assert_eq!(report.to_json().unwrap(), report.to_json().unwrap());
    }
}
