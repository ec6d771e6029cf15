use thiserror::Error;

/// Failures the tracking engine distinguishes.
///
/// These travel inside `anyhow::Error`; use `downcast_ref::<EngineError>()`
/// to classify them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Found no valid `name=value` pair in credentials")]
    InvalidCredentials,

    /// The outcome of the submission is uncertain, it may still have been recorded.
    #[error("Could not confirm submission : {0}")]
    SubmitFailed(String),

    #[error("Could not read submission history : {0}")]
    LocatorUnavailable(String),

    #[error("Deadline elapsed before a final verdict was observed")]
    Timeout,

    #[error("Could not release browser : {0}")]
    ResourceCleanup(String),
}

impl EngineError {
    pub fn submit_failed(reason: impl Into<String>) -> Self {
        Self::SubmitFailed(reason.into())
    }

    pub fn locator_unavailable(reason: impl Into<String>) -> Self {
        Self::LocatorUnavailable(reason.into())
    }

    /// Classifies an error chain, if any layer of it is an `EngineError`.
    pub fn classify(err: &anyhow::Error) -> Option<&Self> {
        err.chain().find_map(|cause| cause.downcast_ref::<Self>())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context as _;

    use super::*;

    #[test]
    fn classify_through_context() {
        let result: anyhow::Result<()> =
            Err(EngineError::InvalidCredentials).context("Could not build session");
        let err = result.unwrap_err();
        assert_eq!(
            EngineError::classify(&err),
            Some(&EngineError::InvalidCredentials)
        );
    }

    #[test]
    fn classify_foreign_error() {
        let err = anyhow::Error::msg("unrelated");
        assert_eq!(EngineError::classify(&err), None);
    }
}
