use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::model::story::{Panel, StoryResponse};

/// On-disk form of a saved story. One file per save, never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredStory {
    pub title: String,
    pub episode_input: String,
    pub raw_response_text: String,
    pub panels: Vec<Panel>,
    pub created_at: DateTime<FixedOffset>,
    pub filename: String,
}

impl StoredStory {
    pub fn to_story(&self) -> StoryResponse {
        StoryResponse {
            title: self.title.clone(),
            panels: self.panels.clone(),
        }
    }
}
