use crate::engine::story_parser::PANEL_DELIMITER;

/// Builds the system instruction sent along with every episode.
/// It only formats text; the output contract it describes is what
/// `story_parser` reads back.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn system_prompt() -> String {
        let mut prompt = String::new();

        push_role(&mut prompt);
        push_drawing_style(&mut prompt);
        push_output_format(&mut prompt, PANEL_DELIMITER);

        prompt
    }
}

fn push_role(prompt: &mut String) {
    prompt.push_str(
        "당신은 인스타툰 전문 콘티 작가이자, 매우 단순한 그림을 그리는 코더입니다.\n\
         사용자의 입력을 바탕으로 4컷 만화의 스토리와 각 장면의 SVG 코드를 작성하세요.\n\n",
    );
}

fn push_drawing_style(prompt: &mut String) {
    prompt.push_str("[그림 스타일: '졸라맨' 초단순 약식]\n");
    for rule in [
        "복잡한 묘사 금지. 유치원생 낙서처럼 검은색 선으로만 표현.",
        "배경 없음 (투명).",
        "**남주(두더지):** 뚱뚱한 회색 덩어리(감자 모양). 가운데 큰 동그라미 코. 점 눈. 땀 흘리는 표현 자주 사용.",
        "**여주(페럿/담비):** 역삼각형 얼굴. 큰 동그라미 눈. 머리 뒤로 긴 선 몇 개(머리카락).",
    ] {
        prompt.push_str("- ");
        prompt.push_str(rule);
        prompt.push('\n');
    }
    prompt.push('\n');
}

fn push_output_format(prompt: &mut String, delimiter: &str) {
    prompt.push_str("[출력 형식 엄수]\n");
    prompt.push_str(&format!(
        "반드시 아래와 같은 구조로, 각 컷을 '{delimiter}' 구분자로 나누어 출력하세요. \
         SVG 코드 블록 외의 사족을 달지 마세요.\n\n"
    ));

    prompt.push_str("제목: [재치 있는 제목]\n");
    for cut in 1..=4 {
        prompt.push_str(delimiter);
        prompt.push('\n');
        prompt.push_str(&format!("## {cut}컷 내용\n"));

        if cut == 1 {
            prompt.push_str("**상황:** [상황 묘사]\n");
            prompt.push_str("**대사:** [캐릭터]: \"대사\"\n");
            prompt.push_str("```svg\n");
            prompt.push_str("<svg width=\"300\" height=\"300\" xmlns=\"http://www.w3.org/2000/svg\">\n");
            prompt.push_str(
                "(여기에 1컷 상황을 묘사하는 단순한 졸라맨 스타일의 SVG 코드 작성. 남주, 여주 특징 살릴 것)\n",
            );
            prompt.push_str("</svg>\n");
            prompt.push_str("```\n");
        } else if cut == 4 {
            prompt.push_str("(위와 동일한 구조, 마지막 컷 반전/유머 필수)...\n");
        } else {
            prompt.push_str("(위와 동일한 구조)...\n");
        }
    }
}
