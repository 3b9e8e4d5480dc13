//! 모델 출력에서 찬반 목록을 추출합니다.
//!
//! 프롬프트가 요구한 `Pros:` / `Cons:` 라벨에 의존하는 휴리스틱입니다.
//! 다른 표기(대소문자, 복수형 생략 등)는 인식하지 않습니다.

use serde::Serialize;
use utoipa::ToSchema;

pub const PROS_MARKER: &str = "Pros:";
pub const CONS_MARKER: &str = "Cons:";

/// 항목 내용 없이 글머리 기호만 있는 줄로 취급할 문자
const BULLET_GLYPHS: &[char] = &['-', '*', '+', '•', '◦', '·', '‣', '–', '—'];

/// 추천 판정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Favor,
    Oppose,
    Balanced,
}

impl Verdict {
    /// 장점/단점 개수만으로 판정합니다.
    pub fn from_counts(pros: usize, cons: usize) -> Self {
        match pros.cmp(&cons) {
            std::cmp::Ordering::Greater => Verdict::Favor,
            std::cmp::Ordering::Less => Verdict::Oppose,
            std::cmp::Ordering::Equal => Verdict::Balanced,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Favor => {
                "✅ The pros outweigh the cons. It's recommended to go ahead with this decision!"
            }
            Verdict::Oppose => {
                "❌ The cons outweigh the pros. It might be better to reconsider this decision."
            }
            Verdict::Balanced => "🤔 The pros and cons are balanced. It’s a neutral decision.",
        }
    }
}

/// 추출된 찬반 분석
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedAnalysis {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub verdict: Option<Verdict>,
    /// 판정 문구. 판정이 없으면 빈 문자열
    pub recommendation: String,
}

impl ParsedAnalysis {
    /// 섹션을 찾지 못했을 때의 결과 (오류가 아님)
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_sections(pros: Vec<String>, cons: Vec<String>) -> Self {
        let verdict = Verdict::from_counts(pros.len(), cons.len());
        Self {
            pros,
            cons,
            verdict: Some(verdict),
            recommendation: verdict.message().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.verdict.is_none()
    }
}

/// 원문에서 찬반 목록과 추천을 추출합니다.
///
/// - 각 라벨은 첫 번째 등장 위치만 사용합니다.
/// - 장점 구간은 `Pros:` 직후부터 `Cons:` 직전까지이며, `Cons:`가 없거나
///   `Pros:`보다 앞에 있으면 원문 끝까지입니다.
/// - 단점 구간은 `Cons:` 직후부터 원문 끝까지입니다.
/// - 두 라벨이 모두 없으면 빈 결과를 반환합니다.
pub fn extract_analysis(raw: &str) -> ParsedAnalysis {
    let pros_at = raw.find(PROS_MARKER);
    let cons_at = raw.find(CONS_MARKER);

    if pros_at.is_none() && cons_at.is_none() {
        return ParsedAnalysis::empty();
    }

    let pros = pros_at
        .map(|start| {
            let body_start = start + PROS_MARKER.len();
            let body_end = match cons_at {
                Some(cons_start) if cons_start >= body_start => cons_start,
                _ => raw.len(),
            };
            section_entries(&raw[body_start..body_end])
        })
        .unwrap_or_default();

    let cons = cons_at
        .map(|start| section_entries(&raw[start + CONS_MARKER.len()..]))
        .unwrap_or_default();

    ParsedAnalysis::from_sections(pros, cons)
}

fn section_entries(section: &str) -> Vec<String> {
    section
        .lines()
        .map(str::trim)
        .filter(|line| !is_blank_entry(line))
        .map(str::to_string)
        .collect()
}

fn is_blank_entry(line: &str) -> bool {
    line.chars()
        .all(|c| c.is_whitespace() || BULLET_GLYPHS.contains(&c))
}
