pub mod config;
pub mod domain;
pub mod error;
pub mod global;
pub mod logging;
pub mod response;
pub mod shutdown;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::AppConfig;
use domain::decision::{handler as decision_handler, DecisionService, OpenAiClient, RetryPolicy};
use domain::health;

pub use domain::decision::{CompletionClient, CompletionError, FailureKind, RawCompletion};

#[derive(OpenApi)]
#[openapi(
    paths(
        decision_handler::generate,
        decision_handler::hello,
        health::handler::health_check,
    ),
    components(
        schemas(
            domain::decision::dto::GenerateRequest,
            domain::decision::dto::GenerateResult,
            domain::decision::dto::GenerateSuccessResponse,
            domain::decision::dto::HelloResponse,
            domain::decision::extractor::Verdict,
            health::dto::HealthStatus,
            response::ErrorResponse,
        )
    ),
    tags(
        (name = "Decision", description = "찬반 분석 API"),
        (name = "Health", description = "헬스체크 API")
    )
)]
pub struct ApiDoc;

/// 핸들러 공유 상태
#[derive(Clone)]
pub struct AppState {
    pub decision_service: DecisionService,
    pub started_at: Instant,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(decision_service: DecisionService, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            decision_service,
            started_at: Instant::now(),
            metrics,
        }
    }
}

/// 설정으로부터 OpenAI 클라이언트를 생성해 전체 라우터를 구성합니다.
pub fn create_app(config: &AppConfig, metrics: Option<PrometheusHandle>) -> Router {
    let client = Arc::new(OpenAiClient::new(&config.openai));
    let service = DecisionService::new(client, config.retry.clone());
    create_router(AppState::new(service, metrics))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health::health_check))
        .route("/metrics", get(render_metrics))
        .route("/api/hello", get(decision_handler::hello))
        .route("/api/generate", post(decision_handler::generate))
        .layer(middleware::from_fn(global::middleware::request_tracing))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// 테스트용 라우터 (Mock 클라이언트 주입, 재시도 없음, 메트릭 비활성)
pub fn create_test_router_with_mock<C>(client: C) -> Router
where
    C: CompletionClient + 'static,
{
    create_test_router_with_retry(client, RetryPolicy::single_attempt())
}

/// 테스트용 라우터 (Mock 클라이언트와 재시도 정책 주입)
pub fn create_test_router_with_retry<C>(client: C, retry_policy: RetryPolicy) -> Router
where
    C: CompletionClient + 'static,
{
    let service = DecisionService::new(Arc::new(client), retry_policy);
    create_router(AppState::new(service, None))
}

async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder is not installed".to_string()),
    }
}
