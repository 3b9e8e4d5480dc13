use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use validator::Validate;

use crate::error::AppError;
use crate::response::{BaseResponse, ErrorResponse};
use crate::AppState;

use super::dto::{AnalysisRequest, GenerateRequest, GenerateResult, GenerateSuccessResponse, HelloResponse};

/// 찬반 분석 생성
///
/// 고민 내용과 기분을 받아 AI가 생성한 장단점 목록과 추천을 반환합니다.
/// 모델 출력에서 `Pros:` / `Cons:` 섹션을 찾지 못하면 빈 목록과 빈 추천 문구를 반환합니다.
#[utoipa::path(
    post,
    path = "/api/generate",
    tag = "Decision",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "분석 성공", body = GenerateSuccessResponse),
        (status = 400, description = "issue 또는 mood 누락", body = ErrorResponse),
        (status = 500, description = "텍스트 생성 실패", body = ErrorResponse)
    )
)]
pub async fn generate(
    State(state): State<AppState>,
    request: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<GenerateResult>>, AppError> {
    // JSON 파싱 에러 처리
    let Json(request) = request.map_err(AppError::from)?;

    // 입력 검증
    request.validate()?;
    let request = AnalysisRequest::try_from(request)?;

    tracing::info!(
        issue_length = request.issue().len(),
        mood = %request.mood(),
        "Generate request received"
    );

    let outcome = state.decision_service.analyze(&request).await?;

    Ok(Json(BaseResponse::success(GenerateResult::new(
        outcome.raw.into_inner(),
        outcome.analysis,
    ))))
}

/// 연결 확인
#[utoipa::path(
    get,
    path = "/api/hello",
    tag = "Decision",
    responses(
        (status = 200, description = "백엔드 연결 확인", body = HelloResponse)
    )
)]
pub async fn hello() -> Json<BaseResponse<HelloResponse>> {
    Json(BaseResponse::success(HelloResponse {
        message: "Hello from the backend!".to_string(),
    }))
}
