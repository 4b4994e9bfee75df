use crate::model::generated_story::GeneratedStory;

/// Per-session context: what was generated last and whether it was saved.
#[derive(Debug, Default)]
pub struct Session {
    last_generated: Option<GeneratedStory>,
    saved_as: Option<String>,
}

impl Session {
    /// Replaces the previous result and clears its save state.
    pub fn set_generated(&mut self, generated: GeneratedStory) {
        self.last_generated = Some(generated);
        self.saved_as = None;
    }

    pub fn last_generated(&self) -> Option<&GeneratedStory> {
        self.last_generated.as_ref()
    }

    pub fn saved_as(&self) -> Option<&str> {
        self.saved_as.as_deref()
    }

    pub fn mark_saved(&mut self, filename: String) {
        self.saved_as = Some(filename);
    }

    /// Called when a file is deleted so the current result can be saved again.
    pub fn forget_file(&mut self, filename: &str) {
        if self.saved_as.as_deref() == Some(filename) {
            self.saved_as = None;
        }
    }
}
