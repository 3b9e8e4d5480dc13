use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backoff::{future::retry, ExponentialBackoff};

use super::client::CompletionError;

/// 텍스트 생성 재시도 정책
///
/// 기본값은 1회 시도(재시도 없음)입니다. 일시적 오류(네트워크, 429, 5xx)만 재시도합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn single_attempt() -> Self {
        Self::default()
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            current_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: self.multiplier,
            // 종료 조건은 시도 횟수로만 판단
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// 재시도 정책을 적용한 비동기 작업 실행
///
/// 일시적 오류는 지수 백오프 후 `max_attempts`까지 재시도하고,
/// 영구적 오류는 즉시 반환합니다.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, operation: F) -> Result<T, CompletionError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, CompletionError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let attempts = AtomicU32::new(0);
    let attempts = &attempts;
    let operation = &operation;

    retry(policy.backoff(), move || async move {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
        match operation().await {
            Ok(value) => Ok(value),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                tracing::warn!(attempt, max_attempts, error = %e, "Transient completion error, retrying");
                Err(backoff::Error::transient(e))
            }
            Err(e) => Err(backoff::Error::permanent(e)),
        }
    })
    .await
}
