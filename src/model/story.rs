use serde::{Deserialize, Serialize};

/// Parsed result of one generation call.
/// Built once by the parser and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryResponse {
    pub title: String,
    pub panels: Vec<Panel>,
}

/// One comic panel.
///
/// `index` is 1-based and follows delimiter order.
/// `narrative_text` is the panel text with the graphic span removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub index: u32,
    pub narrative_text: String,
    pub graphic_fragment: Option<String>,
}

impl Panel {
    pub fn is_missing_graphic(&self) -> bool {
        self.graphic_fragment.is_none()
    }
}

impl StoryResponse {
    pub fn missing_graphics(&self) -> usize {
        self.panels.iter().filter(|p| p.is_missing_graphic()).count()
    }
}
