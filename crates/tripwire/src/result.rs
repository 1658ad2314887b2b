//! Result and error types for Tripwire.

use thiserror::Error;

/// Result type for Tripwire operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that can occur while driving a scenario
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Target unreachable or navigation timed out
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Selector resolved to zero elements
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Selector description
        selector: String,
    },

    /// Strict selector resolved to more than one element
    #[error("{selector} resolved to {count} elements, expected exactly one")]
    AmbiguousMatch {
        /// Selector description
        selector: String,
        /// Number of matches
        count: usize,
    },

    /// Element exists but cannot receive the action
    #[error("Element {selector} is not actionable: {reason}")]
    ElementNotActionable {
        /// Selector description
        selector: String,
        /// Why the element was rejected (hidden, disabled, moving)
        reason: String,
    },

    /// Bounded wait exceeded
    #[error("Timed out after {timeout_ms}ms waiting for {description} (last observed: {last_observed})")]
    Timeout {
        /// What was waited for
        description: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
        /// Last value seen before giving up
        last_observed: String,
    },

    /// A drag gesture too coarse for the application's drag sensing
    #[error("Drag gesture not recognised ({fidelity}): {message}")]
    GestureFidelity {
        /// Gesture fidelity label
        fidelity: String,
        /// Error message
        message: String,
    },

    /// Non-fatal artifact miss
    #[error("Capture '{checkpoint}' skipped: {reason}")]
    CaptureSkipped {
        /// Checkpoint name
        checkpoint: String,
        /// Why nothing was captured
        reason: String,
    },

    /// Explicit assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Script evaluation error
    #[error("Evaluation failed: {message}")]
    Evaluation {
        /// Error message
        message: String,
    },

    /// Input dispatch error
    #[error("Input simulation failed: {message}")]
    Input {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Operation called in the wrong scenario state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image decoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl HarnessError {
    /// Whether this error should abort the running scenario
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::CaptureSkipped { .. })
    }

    /// Short variant name for reports
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::BrowserLaunch { .. } => "BrowserLaunch",
            Self::Navigation { .. } => "Navigation",
            Self::ElementNotFound { .. } => "ElementNotFound",
            Self::AmbiguousMatch { .. } => "AmbiguousMatch",
            Self::ElementNotActionable { .. } => "ElementNotActionable",
            Self::Timeout { .. } => "Timeout",
            Self::GestureFidelity { .. } => "GestureFidelity",
            Self::CaptureSkipped { .. } => "CaptureSkipped",
            Self::AssertionFailed { .. } => "AssertionFailed",
            Self::Evaluation { .. } => "Evaluation",
            Self::Input { .. } => "Input",
            Self::Screenshot { .. } => "Screenshot",
            Self::InvalidState { .. } => "InvalidState",
            Self::Config { .. } => "Config",
            Self::Io(_) => "Io",
            Self::Json(_) => "Json",
            Self::Image(_) => "Image",
        }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_skipped_is_not_fatal() {
        let err = HarnessError::CaptureSkipped {
            checkpoint: "card".to_string(),
            reason: "not visible".to_string(),
        };
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("card"));
    }

    #[test]
    fn test_other_errors_are_fatal() {
        assert!(HarnessError::ElementNotFound {
            selector: "css=header".to_string()
        }
        .is_fatal());
        assert!(HarnessError::assertion("boom").is_fatal());
    }

    #[test]
    fn test_timeout_message_carries_last_observed() {
        let err = HarnessError::Timeout {
            description: "body overflow == \"\"".to_string(),
            timeout_ms: 2000,
            last_observed: "\"hidden\"".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2000ms"));
        assert!(msg.contains("hidden"));
    }

    #[test]
    fn test_ambiguous_match_message() {
        let err = HarnessError::AmbiguousMatch {
            selector: "role=button[name=\"Save\"]".to_string(),
            count: 2,
        };
        assert!(err.to_string().contains("2 elements"));
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(HarnessError::assertion("x").kind(), "AssertionFailed");
        let err = HarnessError::GestureFidelity {
            fidelity: "teleport".to_string(),
            message: "not recognised".to_string(),
        };
        assert_eq!(err.kind(), "GestureFidelity");
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: HarnessError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }
}
