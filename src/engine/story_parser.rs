use crate::engine::svg_matcher::find_svg;
use crate::model::story::{Panel, StoryResponse};

/// Separates the title block and every panel in the model output.
/// The prompt template is built from this same constant.
pub const PANEL_DELIMITER: &str = "|||";

pub const TITLE_PLACEHOLDER: &str = "제목 없음";

const TITLE_LABELS: [&str; 2] = ["제목:", "title:"];

/// Best-effort parse of raw model output. Never fails: missing structure
/// just yields fewer panels or panels without a graphic.
pub fn parse_story(raw: &str) -> StoryResponse {
    let mut segments = raw.split(PANEL_DELIMITER);

    let title = segments
        .next()
        .map(parse_title)
        .unwrap_or_else(|| TITLE_PLACEHOLDER.to_string());

    let panels = segments
        .enumerate()
        .map(|(i, segment)| parse_panel(i as u32 + 1, segment))
        .collect();

    StoryResponse { title, panels }
}

fn parse_title(segment: &str) -> String {
    let mut title = segment.trim();

    // "**제목:** x" and "# 제목: x" both show up in practice
    let undecorated = title.trim_start_matches(['#', '*', ' ']);
    if let Some(rest) = strip_label(undecorated) {
        title = rest.trim_matches(['*', ' ']).trim();
    }

    if title.is_empty() {
        TITLE_PLACEHOLDER.to_string()
    } else {
        title.to_string()
    }
}

fn strip_label(text: &str) -> Option<&str> {
    TITLE_LABELS.iter().find_map(|label| {
        let head = text.get(..label.len())?;
        head.eq_ignore_ascii_case(label).then(|| &text[label.len()..])
    })
}

fn parse_panel(index: u32, segment: &str) -> Panel {
    let text = segment.trim();

    match find_svg(text) {
        Some(found) => {
            tracing::debug!(panel = index, matcher = found.matcher, "svg fragment found");

            let mut narrative = String::with_capacity(text.len());
            narrative.push_str(&text[..found.span.start]);
            narrative.push_str(&text[found.span.end..]);

            Panel {
                index,
                narrative_text: narrative.trim().to_string(),
                graphic_fragment: Some(found.fragment),
            }
        }
        None => Panel {
            index,
            narrative_text: text.to_string(),
            graphic_fragment: None,
        },
    }
}
