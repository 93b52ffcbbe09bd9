//! Unified error types for the security-analysis engine.
//!
//! [`GsaError`] is the common error currency at API boundaries. The one
//! variant with control-flow meaning is [`GsaError::Singular`]: a reduced
//! susceptance matrix that cannot be inverted means the network has split
//! into electrical islands, and every caller of the solver is expected to
//! match on it and degrade gracefully (report collapse, skip screening)
//! rather than abort the analysis pass.

use thiserror::Error;

/// Unified error type for all security-analysis operations.
#[derive(Error, Debug)]
pub enum GsaError {
    /// Reduced susceptance matrix is singular (islanded or disconnected
    /// topology). Recoverable: callers report collapse for the scenario.
    #[error("singular topology: {0}")]
    Singular(String),

    /// Structural problems with the topology snapshot (too few buses, etc.)
    #[error("topology error: {0}")]
    Topology(String),

    /// State-estimation failures that cannot be handled by degraded mode
    #[error("estimation error: {0}")]
    Estimation(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using GsaError.
pub type GsaResult<T> = Result<T, GsaError>;

impl GsaError {
    /// True when the error means "this scenario is islanded", the one
    /// condition downstream components recover from.
    pub fn is_singular(&self) -> bool {
        matches!(self, GsaError::Singular(_))
    }
}

impl From<anyhow::Error> for GsaError {
    fn from(err: anyhow::Error) -> Self {
        GsaError::Other(err.to_string())
    }
}

impl From<String> for GsaError {
    fn from(s: String) -> Self {
        GsaError::Other(s)
    }
}

impl From<&str> for GsaError {
    fn from(s: &str) -> Self {
        GsaError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GsaError::Singular("network split into 2 islands".into());
        assert!(err.to_string().contains("singular topology"));
        assert!(err.to_string().contains("2 islands"));
    }

    #[test]
    fn test_is_singular() {
        assert!(GsaError::Singular("x".into()).is_singular());
        assert!(!GsaError::Topology("x".into()).is_singular());
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> GsaResult<()> {
            Err(GsaError::Topology("test".into()))
        }

        fn outer() -> GsaResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
