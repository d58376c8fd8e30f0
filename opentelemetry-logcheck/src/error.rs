use thiserror::Error;

/// Errors that prevent a matcher from deciding whether it matches.
///
/// An error is never a "no match": it means the outcome could not be
/// determined at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MatchError {
    /// A value of a kind that has no attribute value representation was
    /// encountered while normalizing.
    #[error("unsupported value kind {0}")]
    UnsupportedValueKind(String),

    /// A matcher was constructed from an expectation it cannot test.
    #[error("malformed predicate: {0}")]
    MalformedPredicate(String),

    /// The object under test has a shape the matcher does not accept.
    #[error("expected actual of {expected}, got {actual}")]
    ActualTypeMismatch {
        /// The shapes the matcher accepts.
        expected: &'static str,
        /// The shape it was given.
        actual: &'static str,
    },

    /// A caller supplied predicate failed to evaluate.
    #[error("{0}")]
    Predicate(String),
}

/// Outcome of a match: `Ok(verdict)`, or an error overriding any verdict.
pub type MatchResult = Result<bool, MatchError>;
