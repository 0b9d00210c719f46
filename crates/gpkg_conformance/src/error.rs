//! Error types for rule evaluation.

use crate::backend::BackendError;
use crate::rules::RuleId;
use thiserror::Error;

/// Rule evaluation result type.
pub type Result<T> = std::result::Result<T, CheckError>;

/// Fatal conditions that abort a rule before it can reach a verdict.
///
/// Non-conformance is not an error; it is reported as a failing
/// [`Verdict`](crate::Verdict).
#[derive(Error, Debug)]
pub enum CheckError {
    /// The store rejected or could not execute a required query.
    #[error("{rule}: query failed: {source}")]
    Query {
        rule: RuleId,
        #[source]
        source: BackendError,
    },
}

impl CheckError {
    /// Build a `map_err` adapter tagging backend errors with `rule`.
    pub fn query(rule: RuleId) -> impl FnOnce(BackendError) -> Self {
        move |source| Self::Query { rule, source }
    }

    pub fn rule(&self) -> RuleId {
        match self {
            Self::Query { rule, .. } => *rule,
        }
    }
}
