use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_openai::{
    error::{ApiError, OpenAIError},
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse,
    },
};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::OpenAiSettings;

/// 오류 본문을 메시지로 옮길 때의 최대 길이
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// 모델이 생성한 원문 (파싱 전)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCompletion(String);

impl RawCompletion {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// 생성 실패 분류 (진단용)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Authentication,
    UpstreamStatus,
    MalformedResponse,
    RequestBuild,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::Authentication => "authentication",
            FailureKind::UpstreamStatus => "upstream_status",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::RequestBuild => "request_build",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 텍스트 생성 호출 실패
///
/// 사용자에게는 구분 없이 "생성 실패"로만 노출되고, 세부 내용은 로그에만 남깁니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("completion call timed out after {0:?}")]
    Timeout(Duration),

    #[error("authentication failure: {0}")]
    Authentication(String),

    #[error("upstream error status: {message}")]
    UpstreamStatus { message: String, retryable: bool },

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("failed to build completion request: {0}")]
    RequestBuild(String),
}

impl CompletionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CompletionError::Transport(_) | CompletionError::Timeout(_) => FailureKind::Transport,
            CompletionError::Authentication(_) => FailureKind::Authentication,
            CompletionError::UpstreamStatus { .. } => FailureKind::UpstreamStatus,
            CompletionError::MalformedResponse(_) => FailureKind::MalformedResponse,
            CompletionError::RequestBuild(_) => FailureKind::RequestBuild,
        }
    }

    /// 재시도로 회복될 수 있는 일시적 오류인지
    pub fn is_transient(&self) -> bool {
        match self {
            CompletionError::Transport(_) | CompletionError::Timeout(_) => true,
            CompletionError::UpstreamStatus { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

/// OpenAI 형식의 오류 본문 `{"error": {...}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

/// 2xx가 아닌 응답을 상태 코드 기준으로 분류
///
/// 본문이 OpenAI 형식이 아니어도(프록시의 HTML 502 등) 상태 코드로 판단합니다.
pub(crate) fn classify_error_status(status: StatusCode, body: &[u8]) -> CompletionError {
    let api_error = serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error);

    let err_type = api_error
        .as_ref()
        .and_then(|e| e.r#type.as_deref())
        .unwrap_or("");
    let err_code = api_error
        .as_ref()
        .and_then(|e| e.code.as_ref())
        .and_then(|v| v.as_str())
        .unwrap_or("");
    let detail = match &api_error {
        Some(e) => e.message.clone(),
        None => String::from_utf8_lossy(body)
            .chars()
            .take(ERROR_BODY_PREVIEW_CHARS)
            .collect(),
    };
    let message = format!("{}: {}", status, detail.trim());

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || err_code == "invalid_api_key"
    {
        return CompletionError::Authentication(message);
    }

    // 할당량 소진은 429여도 기다린다고 회복되지 않는다
    let retryable = match status {
        StatusCode::TOO_MANY_REQUESTS => err_type != "insufficient_quota",
        StatusCode::REQUEST_TIMEOUT => true,
        s => s.is_server_error(),
    };
    CompletionError::UpstreamStatus { message, retryable }
}

/// 요청 전송 단계의 reqwest 에러 분류
fn classify_send_error(error: reqwest::Error) -> CompletionError {
    if error.is_builder() {
        CompletionError::RequestBuild(error.to_string())
    } else {
        CompletionError::Transport(error.to_string())
    }
}

/// 요청 빌더 에러 분류
fn classify_build_error(error: OpenAIError) -> CompletionError {
    match error {
        OpenAIError::InvalidArgument(msg) => CompletionError::RequestBuild(msg),
        other => CompletionError::RequestBuild(other.to_string()),
    }
}

/// 텍스트 생성 서비스 인터페이스
///
/// 테스트에서 Mock 객체로 대체할 수 있습니다.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// 프롬프트 하나로 텍스트를 생성합니다. 한 번 호출에 한 번만 요청합니다.
    async fn complete(&self, prompt: &str) -> Result<RawCompletion, CompletionError>;
}

/// Arc로 래핑된 CompletionClient (Clone 지원)
pub type CompletionClientRef = Arc<dyn CompletionClient>;

/// OpenAI 호환 Chat Completions 클라이언트
///
/// 요청/응답 타입은 async-openai를 쓰고, 전송은 reqwest로 직접 합니다.
/// 상태 코드를 본문 해석보다 먼저 확인해야 실패 종류를 구분할 수 있습니다.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u16,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(settings: &OpenAiSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!(
                "{}/chat/completions",
                settings.api_base.trim_end_matches('/')
            ),
            api_key: settings.api_key.trim().to_string(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            timeout: settings.timeout,
        }
    }

    fn build_request(&self, prompt: &str) -> Result<CreateChatCompletionRequest, CompletionError> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(classify_build_error)?
                .into(),
        ];

        CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(messages)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(classify_build_error)
    }

    async fn send(
        &self,
        request: &CreateChatCompletionRequest,
    ) -> Result<CreateChatCompletionResponse, CompletionError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_error_status(status, &body));
        }

        serde_json::from_slice(&body).map_err(|e| CompletionError::MalformedResponse(e.to_string()))
    }

    async fn request_completion(&self, prompt: &str) -> Result<RawCompletion, CompletionError> {
        if self.api_key.is_empty() {
            return Err(CompletionError::Authentication(
                "OPENAI_API_KEY is not configured".to_string(),
            ));
        }

        let request = self.build_request(prompt)?;
        let response = tokio::time::timeout(self.timeout, self.send(&request))
            .await
            .map_err(|_| CompletionError::Timeout(self.timeout))??;

        // 빈 본문은 실패가 아니라 빈 분석으로 이어진다
        let content = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::MalformedResponse("no choices".to_string()))?
            .message
            .content
            .unwrap_or_default();

        Ok(RawCompletion::new(content))
    }
}

#[async_trait::async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<RawCompletion, CompletionError> {
        let start = Instant::now();
        let result = self.request_completion(prompt).await;
        let elapsed = start.elapsed();

        metrics::counter!("completion_requests_total").increment(1);
        metrics::histogram!("completion_duration_seconds").record(elapsed.as_secs_f64());

        match &result {
            Ok(raw) => {
                tracing::debug!(
                    model = %self.model,
                    duration_ms = elapsed.as_millis() as u64,
                    completion_length = raw.as_str().len(),
                    "Completion received"
                );
            }
            Err(e) => {
                metrics::counter!("completion_failures_total", "kind" => e.kind().as_str())
                    .increment(1);
            }
        }

        result
    }
}
