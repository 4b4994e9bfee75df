use crate::model::story::StoryResponse;
use crate::model::stored_story::StoredStory;
use crate::ui::settings::AppSettings;

pub enum EngineCommand {
    Generate { episode: String },
    SaveLast,
    RefreshLibrary,
    DeleteStory { filename: String },
    ApplySettings(AppSettings),
    TestConnection,
}

#[derive(Debug)]
pub enum EngineResponse {
    Generated(StoryResponse),
    GenerationFailed(String),
    InputRejected(String),

    Saved(StoredStory),
    AlreadySaved(String),
    SaveFailed(String),

    Library(Vec<StoredStory>),
    LibraryFailed(String),
    Deleted(String),
    DeleteFailed(String),

    /// Generation backend is usable; carries its description.
    Ready(String),
    /// Generation cannot run at all until the settings are fixed.
    ConfigurationError(String),
    ConnectionStatus(Result<String, String>),
}
