use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::extractor::{ParsedAnalysis, Verdict};

/// 찬반 분석 요청 DTO
///
/// 필드 누락을 400으로 돌려주기 위해 두 필드 모두 `Option`으로 받고
/// `validate()`에서 존재 여부와 공백 여부를 검사합니다.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateRequest {
    /// 고민 중인 결정 내용
    #[validate(
        required(message = "issue는 필수입니다"),
        custom = "validate_not_blank",
        length(max = 4000, message = "issue는 4000자 이하여야 합니다")
    )]
    #[schema(example = "Should I move to another city for a new job?")]
    pub issue: Option<String>,

    /// 현재 기분 (happy, optimistic, neutral, anxious, upset ...)
    #[validate(required(message = "mood는 필수입니다"), custom = "validate_not_blank")]
    #[schema(example = "anxious")]
    pub mood: Option<String>,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("공백만 입력할 수 없습니다".into());
        return Err(error);
    }
    Ok(())
}

/// 요청 입력 오류
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInput {
    #[error("issue is missing or blank")]
    MissingIssue,
    #[error("mood is missing or blank")]
    MissingMood,
}

/// 검증이 끝난 분석 요청
///
/// `issue`는 앞뒤 공백이 제거된 비어 있지 않은 문자열이고,
/// `mood`는 소문자로 정규화되어 있습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    issue: String,
    mood: Mood,
}

impl AnalysisRequest {
    pub fn new(issue: &str, mood: &str) -> Result<Self, InvalidInput> {
        let issue = issue.trim();
        if issue.is_empty() {
            return Err(InvalidInput::MissingIssue);
        }
        let mood = Mood::parse(mood).ok_or(InvalidInput::MissingMood)?;

        Ok(Self {
            issue: issue.to_string(),
            mood,
        })
    }

    pub fn issue(&self) -> &str {
        &self.issue
    }

    pub fn mood(&self) -> &Mood {
        &self.mood
    }
}

impl TryFrom<GenerateRequest> for AnalysisRequest {
    type Error = InvalidInput;

    fn try_from(request: GenerateRequest) -> Result<Self, Self::Error> {
        let issue = request.issue.ok_or(InvalidInput::MissingIssue)?;
        let mood = request.mood.ok_or(InvalidInput::MissingMood)?;
        Self::new(&issue, &mood)
    }
}

/// 사용자가 선택한 기분 라벨 (소문자 정규화)
///
/// 알려지지 않은 라벨도 그대로 받아들이며, 프롬프트의 어조만 중립으로 처리됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mood(String);

impl Mood {
    pub const CANONICAL: [&'static str; 5] = ["happy", "optimistic", "neutral", "anxious", "upset"];

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn tone(&self) -> Tone {
        match self.0.as_str() {
            "happy" | "optimistic" => Tone::Optimistic,
            "anxious" | "upset" => Tone::Cautious,
            _ => Tone::Neutral,
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 프롬프트 어조
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Optimistic,
    Cautious,
    Neutral,
}

/// 찬반 분석 결과 DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateResult {
    /// 모델이 생성한 원문
    #[schema(example = "Pros:\n- Higher salary\nCons:\n- Far from family")]
    pub response: String,

    /// 장점 목록 (원문 등장 순서)
    pub pros: Vec<String>,

    /// 단점 목록 (원문 등장 순서)
    pub cons: Vec<String>,

    /// 추천 문구 (섹션을 찾지 못하면 빈 문자열)
    #[schema(example = "🤔 The pros and cons are balanced. It’s a neutral decision.")]
    pub recommendation: String,

    /// 추천 판정 (섹션을 찾지 못하면 null)
    pub verdict: Option<Verdict>,
}

impl GenerateResult {
    pub fn new(response: String, analysis: ParsedAnalysis) -> Self {
        Self {
            response,
            pros: analysis.pros,
            cons: analysis.cons,
            recommendation: analysis.recommendation,
            verdict: analysis.verdict,
        }
    }
}

/// 찬반 분석 성공 응답 (OpenAPI 스키마용)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSuccessResponse {
    #[schema(example = true)]
    pub is_success: bool,
    #[schema(example = "COMMON200")]
    pub code: String,
    #[schema(example = "성공입니다.")]
    pub message: String,
    pub result: GenerateResult,
}

/// 연결 확인 응답
#[derive(Debug, Serialize, ToSchema)]
pub struct HelloResponse {
    #[schema(example = "Hello from the backend!")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_trim_issue_and_lowercase_mood() {
        // Arrange & Act
        let request = AnalysisRequest::new("  Quit my job?\n", "  Anxious ").unwrap();

        // Assert
        assert_eq!(request.issue(), "Quit my job?");
        assert_eq!(request.mood().as_str(), "anxious");
    }

    #[test]
    fn should_reject_blank_issue() {
        let result = AnalysisRequest::new("   \t", "happy");
        assert_eq!(result, Err(InvalidInput::MissingIssue));
    }

    #[test]
    fn should_reject_blank_mood() {
        let result = AnalysisRequest::new("Buy a car?", "  ");
        assert_eq!(result, Err(InvalidInput::MissingMood));
    }

    #[test]
    fn should_accept_unknown_mood_label() {
        let request = AnalysisRequest::new("Adopt a dog?", "Curious").unwrap();

        assert_eq!(request.mood().as_str(), "curious");
        assert_eq!(request.mood().tone(), Tone::Neutral);
    }

    #[test]
    fn should_classify_canonical_moods() {
        let tones: Vec<Tone> = Mood::CANONICAL
            .iter()
            .map(|label| Mood::parse(label).unwrap().tone())
            .collect();

        assert_eq!(
            tones,
            vec![
                Tone::Optimistic,
                Tone::Optimistic,
                Tone::Neutral,
                Tone::Cautious,
                Tone::Cautious,
            ]
        );
    }

    #[test]
    fn should_fail_validation_when_issue_missing() {
        // Arrange
        let request: GenerateRequest = serde_json::from_str(r#"{"mood": "happy"}"#).unwrap();

        // Act
        let result = request.validate();

        // Assert
        let errors = result.unwrap_err();
        assert!(errors.field_errors().contains_key("issue"));
    }

    #[test]
    fn should_fail_validation_when_mood_blank() {
        let request: GenerateRequest =
            serde_json::from_str(r#"{"issue": "Move abroad?", "mood": "   "}"#).unwrap();

        let errors = request.validate().unwrap_err();

        assert!(errors.field_errors().contains_key("mood"));
    }

    #[test]
    fn should_pass_validation_and_convert() {
        let request: GenerateRequest =
            serde_json::from_str(r#"{"issue": " Move abroad? ", "mood": "HAPPY"}"#).unwrap();

        assert!(request.validate().is_ok());
        let request = AnalysisRequest::try_from(request).unwrap();

        assert_eq!(request.issue(), "Move abroad?");
        assert_eq!(request.mood().tone(), Tone::Optimistic);
    }

    #[test]
    fn should_accept_issue_up_to_length_limit() {
        let at_limit = GenerateRequest {
            issue: Some("가".repeat(4000)),
            mood: Some("neutral".to_string()),
        };
        let over_limit = GenerateRequest {
            issue: Some("a".repeat(4001)),
            mood: Some("neutral".to_string()),
        };

        assert!(at_limit.validate().is_ok());
        let errors = over_limit.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("issue"));
    }

    #[test]
    fn should_serialize_empty_result_with_null_verdict() {
        let result = GenerateResult::new("no markers here".to_string(), ParsedAnalysis::empty());

        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["response"], "no markers here");
        assert_eq!(json["recommendation"], "");
        assert!(json["verdict"].is_null());
        assert_eq!(json["pros"], serde_json::json!([]));
    }
}
