use super::client::{CompletionClientRef, CompletionError, RawCompletion};
use super::dto::AnalysisRequest;
use super::extractor::{extract_analysis, ParsedAnalysis};
use super::prompt::build_prompt;
use super::retry::{with_retry, RetryPolicy};

/// 분석 한 건의 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub raw: RawCompletion,
    pub analysis: ParsedAnalysis,
}

/// 찬반 분석 서비스
///
/// 프롬프트 생성 → 텍스트 생성 호출 → 찬반 추출 순으로 처리하며,
/// 요청 간에 공유하는 가변 상태가 없습니다.
#[derive(Clone)]
pub struct DecisionService {
    client: CompletionClientRef,
    retry_policy: RetryPolicy,
}

impl DecisionService {
    pub fn new(client: CompletionClientRef, retry_policy: RetryPolicy) -> Self {
        Self {
            client,
            retry_policy,
        }
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome, CompletionError> {
        let prompt = build_prompt(request);
        tracing::debug!(
            issue_length = request.issue().len(),
            mood = %request.mood(),
            prompt_length = prompt.len(),
            "Prompt built"
        );

        // 실패 로그는 응답 변환(AppError) 시점에 한 번만 남긴다
        let raw = with_retry(&self.retry_policy, || self.client.complete(&prompt)).await?;

        let analysis = extract_analysis(raw.as_str());
        if analysis.is_empty() {
            tracing::warn!(
                completion_length = raw.as_str().len(),
                "Completion contained no Pros:/Cons: sections"
            );
        } else {
            tracing::info!(
                pros = analysis.pros.len(),
                cons = analysis.cons.len(),
                verdict = ?analysis.verdict,
                "Analysis extracted"
            );
        }

        Ok(AnalysisOutcome { raw, analysis })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::decision::client::MockCompletionClient;
    use crate::domain::decision::extractor::Verdict;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn request() -> AnalysisRequest {
        AnalysisRequest::new("Take the new job offer?", "Happy").unwrap()
    }

    #[tokio::test]
    async fn should_send_built_prompt_and_extract_analysis() {
        // Arrange
        let mut mock = MockCompletionClient::new();
        mock.expect_complete()
            .withf(|prompt| prompt.contains("Take the new job offer?") && prompt.contains("happy"))
            .times(1)
            .returning(|_| Ok(RawCompletion::new("Pros:\n- Salary\n- Growth\nCons:\n- Commute")));
        let service = DecisionService::new(Arc::new(mock), RetryPolicy::default());

        // Act
        let outcome = service.analyze(&request()).await.unwrap();

        // Assert
        assert_eq!(outcome.analysis.pros, vec!["- Salary", "- Growth"]);
        assert_eq!(outcome.analysis.cons, vec!["- Commute"]);
        assert_eq!(outcome.analysis.verdict, Some(Verdict::Favor));
        assert!(outcome.raw.as_str().starts_with("Pros:"));
    }

    #[tokio::test]
    async fn should_return_empty_analysis_for_unparseable_output() {
        let mut mock = MockCompletionClient::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Ok(RawCompletion::new("Sorry, I can't decide that for you.")));
        let service = DecisionService::new(Arc::new(mock), RetryPolicy::default());

        let outcome = service.analyze(&request()).await.unwrap();

        assert_eq!(outcome.analysis, ParsedAnalysis::empty());
        assert_eq!(outcome.raw.as_str(), "Sorry, I can't decide that for you.");
    }

    #[tokio::test]
    async fn should_propagate_failure_with_single_attempt_by_default() {
        let mut mock = MockCompletionClient::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Err(CompletionError::Transport("connection refused".to_string())));
        let service = DecisionService::new(Arc::new(mock), RetryPolicy::default());

        let result = service.analyze(&request()).await;

        assert!(matches!(result, Err(CompletionError::Transport(_))));
    }

    #[tokio::test]
    async fn should_retry_when_policy_allows() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let mut mock = MockCompletionClient::new();
        mock.expect_complete().times(2).returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(CompletionError::Timeout(Duration::from_secs(25)))
            } else {
                Ok(RawCompletion::new("Cons:\n- Risky"))
            }
        });
        let policy = RetryPolicy {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
            multiplier: 2.0,
        };
        let service = DecisionService::new(Arc::new(mock), policy);

        let outcome = service.analyze(&request()).await.unwrap();

        assert_eq!(outcome.analysis.verdict, Some(Verdict::Oppose));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
