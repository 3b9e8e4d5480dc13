use axum::{extract::State, Json};

use super::dto::HealthStatus;
use crate::AppState;

/// 헬스체크 API
///
/// 프로세스 생존 여부만 확인하며, 텍스트 생성 서비스는 호출하지 않습니다.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "헬스체크 성공", body = HealthStatus)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus::ok(state.started_at.elapsed().as_secs()))
}
