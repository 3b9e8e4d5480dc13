//! 찬반 분석 도메인
//!
//! 요청 → 프롬프트 → 텍스트 생성 → 찬반 추출 → 추천 순서로 처리합니다.

pub mod client;
pub mod dto;
pub mod extractor;
pub mod handler;
pub mod prompt;
pub mod retry;
pub mod service;

pub use client::{
    CompletionClient, CompletionClientRef, CompletionError, FailureKind, OpenAiClient,
    RawCompletion,
};
pub use dto::{AnalysisRequest, GenerateRequest, GenerateResult, InvalidInput, Mood, Tone};
pub use extractor::{extract_analysis, ParsedAnalysis, Verdict};
pub use prompt::build_prompt;
pub use retry::RetryPolicy;
pub use service::{AnalysisOutcome, DecisionService};
