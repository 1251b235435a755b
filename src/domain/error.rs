use thiserror::Error;

/// Errors produced while declaring or loading an expectation suite.
#[derive(Debug, Error)]
pub enum SuiteError {
    /// Suite names key the suite store and must be non-empty.
    #[error("suite name must not be empty")]
    EmptyName,

    /// One expectation in the suite is malformed.
    #[error("expectation {index} ({kind}): {message}")]
    InvalidExpectation {
        index: usize,
        kind: &'static str,
        message: String,
    },
}
