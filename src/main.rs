use decision_server::{config::AppConfig, create_app, logging, shutdown::shutdown_signal};
use metrics_exporter_prometheus::PrometheusBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 환경변수 로드
    dotenvy::dotenv().ok();

    // 2. 로깅 초기화
    logging::init_logging();

    // 3. 설정 및 메트릭
    let config = AppConfig::from_env()?;
    tracing::info!(
        model = %config.openai.model,
        api_base = %config.openai.api_base,
        timeout_secs = config.openai.timeout.as_secs(),
        max_attempts = config.retry.max_attempts,
        "Configuration loaded"
    );
    let metrics = PrometheusBuilder::new().install_recorder()?;

    // 4. 라우터 설정
    let app = create_app(&config, Some(metrics));

    // 5. 서버 실행
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
