use super::dto::{AnalysisRequest, Tone};
use super::extractor::{CONS_MARKER, PROS_MARKER};

/// 찬반 분석 프롬프트 생성
///
/// 고민 내용은 그대로 인용하고, 기분에 맞는 어조와 `Pros:` / `Cons:` 출력 형식을 지시합니다.
pub fn build_prompt(request: &AnalysisRequest) -> String {
    format!(
        r#"Generate a pros and cons list for the following issue: "{issue}".
The user is feeling {mood}. Provide a clear and concise list of pros and cons.
{tone}
Format the answer as exactly two sections labeled "{pros}" and "{cons}", in that order, with one item per line and no other headings."#,
        issue = request.issue(),
        mood = request.mood(),
        tone = tone_instruction(request.mood().tone()),
        pros = PROS_MARKER,
        cons = CONS_MARKER,
    )
}

fn tone_instruction(tone: Tone) -> &'static str {
    match tone {
        Tone::Optimistic => "Since the user is in a positive mood, provide an optimistic view.",
        Tone::Cautious => {
            "Since the user is feeling uneasy, provide a cautious and careful approach."
        }
        Tone::Neutral => "Keep the view balanced and neutral.",
    }
}
