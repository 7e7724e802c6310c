use thiserror::Error;

/// Truly unrecoverable analyzer conditions. In practice the analyzer never
/// returns one of these — recoverable problems become [`crate::analyzer::SemanticIssue`]
/// values instead — but the rule runner still needs a concrete error type to
/// name what `std::panic::catch_unwind` caught.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("internal analyzer error: {0}")]
    Internal(String),
}
