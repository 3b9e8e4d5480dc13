use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use validator::ValidationErrors;

use crate::domain::decision::{CompletionError, InvalidInput};
use crate::response::ErrorResponse;

/// issue/mood 누락 시 사용자에게 보여줄 메시지
pub const MISSING_INPUT_MESSAGE: &str = "Missing issue or mood";

/// 텍스트 생성 실패 시 사용자에게 보여줄 메시지 (실패 종류와 무관하게 동일)
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate pros and cons.";

/// 애플리케이션 전역 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("잘못된 요청 형식입니다: {0}")]
    JsonParseFailed(String),

    #[error("generation failed: {0}")]
    GenerationFailed(#[from] CompletionError),
}

impl AppError {
    /// 에러 코드 반환
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) | AppError::JsonParseFailed(_) => "COMMON400",
            AppError::GenerationFailed(_) => "AI_003",
        }
    }

    /// HTTP 상태 코드 반환
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::JsonParseFailed(_) => StatusCode::BAD_REQUEST,
            AppError::GenerationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 사용자에게 노출할 메시지
    ///
    /// 상위 서비스 오류의 세부 내용은 노출하지 않습니다.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(_) => MISSING_INPUT_MESSAGE.to_string(),
            AppError::JsonParseFailed(_) => {
                format!("잘못된 요청 형식입니다. {}", MISSING_INPUT_MESSAGE)
            }
            AppError::GenerationFailed(_) => GENERATION_FAILED_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        match &self {
            AppError::GenerationFailed(e) => {
                tracing::error!(code, kind = %e.kind(), error = %e, "Upstream generation failed");
            }
            _ => {
                tracing::warn!(code, error = %self, "Client error");
            }
        }

        let body = ErrorResponse::new(code, self.public_message());
        (status, Json(body)).into_response()
    }
}

/// JsonRejection을 AppError로 변환
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::JsonParseFailed(rejection.body_text())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::InvalidInput(errors.to_string())
    }
}

impl From<InvalidInput> for AppError {
    fn from(error: InvalidInput) -> Self {
        AppError::InvalidInput(error.to_string())
    }
}
