use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::{FailureKind, ScanOutcome};

const INVALID_FORMAT_MESSAGE: &str =
    "Invalid response format from the AI service, please try again.";

/// Failure taxonomy for every AI-backed request. Each variant is terminal for
/// the request that produced it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    #[error("AI service is not configured: {0}")]
    Configuration(String),
    #[error("AI service request failed: {0}")]
    Service(String),
    #[error("AI response could not be parsed: {0}")]
    Parse(String),
    #[error("AI response is missing required data: {0}")]
    Validation(String),
    #[error("Invalid input: {0}")]
    Input(String),
}

pub type ScanResult<T> = Result<T, ScanError>;

impl ScanError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ScanError::Configuration(_) => FailureKind::Configuration,
            ScanError::Service(_) => FailureKind::Service,
            ScanError::Parse(_) => FailureKind::Parse,
            ScanError::Validation(_) => FailureKind::Validation,
            ScanError::Input(_) => FailureKind::Input,
        }
    }

    /// Message shown to the user. Parse and validation failures share one
    /// generic text; the detail only goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            ScanError::Parse(_) | ScanError::Validation(_) => INVALID_FORMAT_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    pub fn into_outcome<T>(self) -> ScanOutcome<T> {
        ScanOutcome::failure(self.kind(), self.user_message())
    }
}

impl ResponseError for ScanError {
    fn status_code(&self) -> StatusCode {
        match self {
            ScanError::Input(_) => StatusCode::BAD_REQUEST,
            ScanError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            ScanError::Service(_) | ScanError::Parse(_) | ScanError::Validation(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.clone().into_outcome::<()>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_validation_share_the_user_message() {
        let parse = ScanError::Parse("expected value at line 1".into());
        let validation = ScanError::Validation("missing `name`".into());
        assert_eq!(parse.user_message(), validation.user_message());
        assert!(!parse.user_message().contains("line 1"));
    }

    #[test]
    fn configuration_errors_surface_verbatim() {
        let err = ScanError::Configuration("GEMINI_API_KEY is not set".into());
        assert!(err.user_message().contains("GEMINI_API_KEY is not set"));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn status_codes_follow_the_kind() {
        assert_eq!(
            ScanError::Input("gif".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ScanError::Service("timeout".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ScanError::Validation("name".into()).kind(),
            FailureKind::Validation
        );
    }

    #[test]
    fn outcome_keeps_the_kind() {
        let outcome: ScanOutcome<()> = ScanError::Service("quota exceeded".into()).into_outcome();
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Service));
    }
}
