use crate::model::story::StoryResponse;

/// The last generation held by a session, kept until it is saved or replaced.
#[derive(Debug, Clone)]
pub struct GeneratedStory {
    pub episode: String,
    pub raw_response: String,
    pub story: StoryResponse,
}

impl GeneratedStory {
    pub fn new(episode: String, raw_response: String, story: StoryResponse) -> Self {
        Self {
            episode,
            raw_response,
            story,
        }
    }
}
