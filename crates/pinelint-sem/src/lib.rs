//! Name resolution, type checking, and the rule engine: turns a parsed
//! script into the diagnostics a caller reports to the user.

pub mod analyzer;
pub mod catalog;
pub mod error;
mod pipeline;
pub mod rules;
pub mod scope;
pub mod types;

pub use analyzer::{SemanticAnalyzer, SemanticIssue};
pub use error::AnalyzeError;
pub use pipeline::Pipeline;
pub use rules::{Rule, RuleRunner, SecurityRule, SemanticCheckRule, VersionCheckRule};
