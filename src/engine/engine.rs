use std::sync::mpsc::{Receiver, Sender};

use crate::engine::llm_client::{build_client, test_connection, GenerationClient};
use crate::engine::prompt_builder::PromptBuilder;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::session::Session;
use crate::engine::story_parser::parse_story;
use crate::model::generated_story::GeneratedStory;
use crate::storage::story_store::StoryStore;
use crate::ui::settings::AppSettings;

/// Runs on its own thread and serves one command at a time, so the
/// window stays responsive while a generation call blocks.
pub struct Engine {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    session: Session,
    settings: AppSettings,
    client: Result<Box<dyn GenerationClient>, String>,
    store: StoryStore,
    system_prompt: String,
}

impl Engine {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        settings: AppSettings,
    ) -> Self {
        let client = build_client(&settings).map_err(|e| e.to_string());
        let store = store_for(&settings);
        Self::with_parts(rx, tx, settings, client, store)
    }

    pub fn with_parts(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        settings: AppSettings,
        client: Result<Box<dyn GenerationClient>, String>,
        store: StoryStore,
    ) -> Self {
        Self {
            rx,
            tx,
            session: Session::default(),
            settings,
            client,
            store,
            system_prompt: PromptBuilder::system_prompt(),
        }
    }

    pub fn run(&mut self) {
        let _ = self.tx.send(self.status());

        while let Ok(cmd) = self.rx.recv() {
            for resp in self.handle(cmd) {
                if self.tx.send(resp).is_err() {
                    return;
                }
            }
        }
        tracing::debug!("engine channel closed");
    }

    pub fn handle(&mut self, cmd: EngineCommand) -> Vec<EngineResponse> {
        match cmd {
            EngineCommand::Generate { episode } => vec![self.generate(episode)],

            EngineCommand::SaveLast => {
                let saved = self.save_last();
                let saved_ok = matches!(saved, EngineResponse::Saved(_));
                let mut out = vec![saved];
                if saved_ok {
                    out.push(self.library());
                }
                out
            }

            EngineCommand::RefreshLibrary => vec![self.library()],

            EngineCommand::DeleteStory { filename } => match self.store.delete(&filename) {
                Ok(()) => {
                    self.session.forget_file(&filename);
                    vec![EngineResponse::Deleted(filename), self.library()]
                }
                Err(e) => {
                    tracing::warn!(file = %filename, "delete failed: {e}");
                    vec![EngineResponse::DeleteFailed(e.to_string())]
                }
            },

            EngineCommand::ApplySettings(settings) => {
                self.client = build_client(&settings).map_err(|e| e.to_string());
                self.store = store_for(&settings);
                self.settings = settings;
                tracing::info!(dir = %self.store.dir().display(), "settings applied");
                vec![self.status(), self.library()]
            }

            EngineCommand::TestConnection => {
                let status = test_connection(&self.settings).map_err(|e| e.to_string());
                vec![EngineResponse::ConnectionStatus(status)]
            }
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session {
        &self.session
    }

    fn status(&self) -> EngineResponse {
        match &self.client {
            Ok(client) => EngineResponse::Ready(client.describe()),
            Err(e) => EngineResponse::ConfigurationError(e.clone()),
        }
    }

    fn generate(&mut self, episode: String) -> EngineResponse {
        if episode.trim().is_empty() {
            return EngineResponse::InputRejected("내용을 입력해줘! ✍️".into());
        }

        let client = match &self.client {
            Ok(client) => client,
            Err(e) => return EngineResponse::ConfigurationError(e.clone()),
        };

        tracing::info!(backend = %client.describe(), chars = episode.chars().count(), "generating story");

        match client.generate(&self.system_prompt, &episode) {
            Ok(raw) => {
                let story = parse_story(&raw);
                tracing::info!(
                    title = %story.title,
                    panels = story.panels.len(),
                    missing_graphics = story.missing_graphics(),
                    "story parsed"
                );

                self.session
                    .set_generated(GeneratedStory::new(episode, raw, story.clone()));
                EngineResponse::Generated(story)
            }
            Err(e) => {
                tracing::warn!("generation failed: {e}");
                EngineResponse::GenerationFailed(e.to_string())
            }
        }
    }

    fn save_last(&mut self) -> EngineResponse {
        let Some(generated) = self.session.last_generated() else {
            return EngineResponse::SaveFailed("저장할 결과가 없어요.".into());
        };

        if let Some(filename) = self.session.saved_as() {
            return EngineResponse::AlreadySaved(filename.to_string());
        }

        match self.store.save(generated) {
            Ok(stored) => {
                self.session.mark_saved(stored.filename.clone());
                EngineResponse::Saved(stored)
            }
            Err(e) => {
                tracing::warn!("save failed: {e}");
                EngineResponse::SaveFailed(e.to_string())
            }
        }
    }

    fn library(&self) -> EngineResponse {
        match self.store.list() {
            Ok(stories) => EngineResponse::Library(stories),
            Err(e) => {
                tracing::warn!("listing failed: {e}");
                EngineResponse::LibraryFailed(e.to_string())
            }
        }
    }
}

fn store_for(settings: &AppSettings) -> StoryStore {
    let dir = settings
        .storage_dir
        .clone()
        .unwrap_or_else(StoryStore::default_dir);
    StoryStore::new(dir)
}
