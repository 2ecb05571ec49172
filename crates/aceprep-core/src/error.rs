//! Error types shared across aceprep.
//!
//! `ProviderError` lives here rather than in `aceprep-providers` so the
//! generator can classify transport failures without string matching.
//! The remaining enums mirror the three recoverable failure classes of a
//! session: a form that is not ready to submit, a generation call that did
//! not produce a usable payload, and an answer the sheet refused.

use thiserror::Error;

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` if resubmitting the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::ModelNotFound(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// A form was submitted before its required inputs were present.
///
/// Validation errors never change session state and never issue a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("select at least one subject")]
    NoSubjectSelected,

    #[error("pick at least one topic")]
    NoTopicSelected,

    #[error("select at least one focus subject")]
    NoFocusSubject,

    #[error("enter a topic to summarise")]
    EmptyTopic,

    #[error("enter the question to solve")]
    EmptyQuestion,

    #[error("choose a subject and topic to browse")]
    NoArchiveTopic,

    #[error("unknown subject: {0}")]
    UnknownSubject(String),

    #[error("a request for this tool is already in flight")]
    AlreadyLoading,

    #[error("no tool is being configured")]
    NotConfiguring,
}

/// The external generation call did not yield a conforming payload.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The provider call itself failed (network, auth, HTTP status).
    #[error("generation request failed: {0:#}")]
    Request(anyhow::Error),

    /// The provider answered with no text at all.
    #[error("the model returned an empty response")]
    EmptyResponse,

    /// The response text is not JSON of the declared shape.
    #[error("response is not valid JSON for the declared shape: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// The JSON parsed but violates a constraint of the shape.
    #[error("response does not match the expected shape: {0}")]
    ShapeMismatch(String),
}

impl GenerationError {
    /// The underlying provider error, if the failure came from transport.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            GenerationError::Request(e) => e.downcast_ref::<ProviderError>(),
            _ => None,
        }
    }
}

/// An answer could not be recorded on an answer sheet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerError {
    #[error("answers are frozen once the sheet is submitted")]
    AlreadySubmitted,

    #[error("no question with id {0} in this set")]
    UnknownQuestion(u32),

    #[error("option {token} is not offered for question {id}")]
    InvalidOption { id: u32, token: String },

    #[error("no answer sheet is open")]
    NoSheet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_provider_errors() {
        assert!(ProviderError::AuthenticationFailed("bad key".into()).is_permanent());
        assert!(ProviderError::ModelNotFound("x".into()).is_permanent());
        assert!(!ProviderError::Timeout(30).is_permanent());
        assert_eq!(
            ProviderError::RateLimited {
                retry_after_ms: 5000
            }
            .retry_after_ms(),
            Some(5000)
        );
    }

    #[test]
    fn generation_error_exposes_provider_cause() {
        let err = GenerationError::Request(ProviderError::Timeout(120).into());
        assert!(matches!(
            err.provider_error(),
            Some(ProviderError::Timeout(120))
        ));
        assert!(GenerationError::EmptyResponse.provider_error().is_none());
    }
}
