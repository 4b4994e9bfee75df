use eframe::egui;
use std::sync::mpsc;
use std::time::Duration;

use crate::engine::engine::Engine;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::model::story::StoryResponse;
use crate::model::stored_story::StoredStory;
use crate::ui::settings::AppSettings;
use crate::ui::story_view::panel_image_uri;

/* =========================
   Screens
   ========================= */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Create,
    Library,
    Settings,
}

/* =========================
   Notices
   ========================= */

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn show(&self, ui: &mut egui::Ui) {
        let (color, text) = match self {
            Notice::Success(t) => (egui::Color32::from_rgb(60, 150, 80), t),
            Notice::Warning(t) => (egui::Color32::from_rgb(200, 150, 40), t),
            Notice::Error(t) => (egui::Color32::from_rgb(200, 60, 60), t),
        };
        ui.colored_label(color, text);
    }
}

/* =========================
   UI State
   ========================= */

/// The story on the create screen plus a key that keeps its image URIs unique.
pub struct CurrentStory {
    pub story: StoryResponse,
    pub key: String,
}

#[derive(Default)]
pub struct UiState {
    pub screen: Screen,

    pub episode_input: String,
    pub generating: bool,
    pub saving: bool,
    pub generation_count: u64,
    pub current: Option<CurrentStory>,
    /// Image URIs of replaced stories, released from egui's caches next frame.
    pub stale_images: Vec<String>,
    pub create_notice: Option<Notice>,
    pub save_notice: Option<Notice>,

    pub backend: Option<String>,
    pub config_error: Option<String>,

    pub library: Vec<StoredStory>,
    pub library_notice: Option<Notice>,
    pub selected: Option<String>,
    pub confirm_delete: Option<String>,

    pub settings: AppSettings,
    pub settings_notice: Option<Notice>,
    pub testing_connection: bool,
}

impl UiState {
    pub fn selected_story(&self) -> Option<&StoredStory> {
        let filename = self.selected.as_deref()?;
        self.library.iter().find(|s| s.filename == filename)
    }

    fn busy(&self) -> bool {
        self.generating || self.saving || self.testing_connection
    }

    /// Folds one engine response into the state.
    pub fn apply(&mut self, resp: EngineResponse) {
        match resp {
            EngineResponse::Generated(story) => {
                self.generating = false;
                self.generation_count += 1;

                let missing = story.missing_graphics();
                self.create_notice = Some(if missing == 0 {
                    Notice::Success("생성 완료! 🎉".into())
                } else {
                    Notice::Warning(format!("생성 완료! 다만 {missing}개 컷에 그림이 없어요."))
                });
                self.save_notice = None;

                let replaced = self.current.replace(CurrentStory {
                    story,
                    key: format!("generated/{}", self.generation_count),
                });
                if let Some(old) = replaced {
                    self.stale_images.extend(
                        old.story
                            .panels
                            .iter()
                            .filter(|p| !p.is_missing_graphic())
                            .map(|p| panel_image_uri(&old.key, p.index)),
                    );
                }
            }
            EngineResponse::GenerationFailed(e) => {
                self.generating = false;
                self.create_notice = Some(Notice::Error(format!("에러가 났어 ㅠㅠ: {e}")));
            }
            EngineResponse::InputRejected(msg) => {
                self.generating = false;
                self.create_notice = Some(Notice::Warning(msg));
            }

            EngineResponse::Saved(stored) => {
                self.saving = false;
                self.save_notice = Some(Notice::Success(format!("저장했어요: {}", stored.filename)));
            }
            EngineResponse::AlreadySaved(filename) => {
                self.saving = false;
                self.save_notice = Some(Notice::Warning(format!("이미 저장된 결과예요: {filename}")));
            }
            EngineResponse::SaveFailed(e) => {
                self.saving = false;
                self.save_notice = Some(Notice::Error(format!("저장 실패: {e}")));
            }

            EngineResponse::Library(stories) => {
                self.library = stories;
                self.library_notice = None;
                if self.selected_story().is_none() {
                    self.selected = None;
                }
            }
            EngineResponse::LibraryFailed(e) => {
                self.library_notice = Some(Notice::Error(format!("목록을 불러오지 못했어요: {e}")));
            }
            EngineResponse::Deleted(filename) => {
                if self.selected.as_deref() == Some(filename.as_str()) {
                    self.selected = None;
                }
                self.confirm_delete = None;
                self.library_notice = Some(Notice::Success(format!("삭제했어요: {filename}")));
            }
            EngineResponse::DeleteFailed(e) => {
                self.confirm_delete = None;
                self.library_notice = Some(Notice::Error(format!("삭제 실패: {e}")));
            }

            EngineResponse::Ready(backend) => {
                self.backend = Some(backend);
                self.config_error = None;
            }
            EngineResponse::ConfigurationError(e) => {
                self.generating = false;
                self.backend = None;
                self.config_error = Some(e);
            }
            EngineResponse::ConnectionStatus(status) => {
                self.testing_connection = false;
                self.settings_notice = Some(match status {
                    Ok(msg) => Notice::Success(msg),
                    Err(e) => Notice::Error(e),
                });
            }
        }
    }
}

/* =========================
   App
   ========================= */

pub struct ToonApp {
    pub ui: UiState,

    cmd_tx: mpsc::Sender<EngineCommand>,
    resp_rx: mpsc::Receiver<EngineResponse>,
}

impl ToonApp {
    pub fn new(settings: AppSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();

        let engine_settings = settings.clone();
        std::thread::spawn(move || {
            let mut engine = Engine::new(cmd_rx, resp_tx, engine_settings);
            engine.run();
        });

        let app = Self {
            ui: UiState {
                settings,
                ..Default::default()
            },
            cmd_tx,
            resp_rx,
        };
        app.send_command(EngineCommand::RefreshLibrary);
        app
    }

    pub fn send_command(&self, cmd: EngineCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::error!("engine thread is gone");
        }
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for ToonApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.ui.settings.ui_scale);

        while let Ok(resp) = self.resp_rx.try_recv() {
            self.ui.apply(resp);
        }
        for uri in self.ui.stale_images.drain(..) {
            ctx.forget_image(&uri);
        }

        egui::TopBottomPanel::top("screens").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("🐭 두더지와 페럿의 툰 공장");
                ui.separator();
                ui.selectable_value(&mut self.ui.screen, Screen::Create, "만들기");
                ui.selectable_value(&mut self.ui.screen, Screen::Library, "보관함");
                ui.selectable_value(&mut self.ui.screen, Screen::Settings, "설정");
            });
        });

        let screen = self.ui.screen;
        egui::CentralPanel::default().show(ctx, |ui| match screen {
            Screen::Create => super::create_panel::draw_create_panel(ui, self),
            Screen::Library => super::library_panel::draw_library_panel(ui, self),
            Screen::Settings => super::settings_panel::draw_settings_panel(ui, self),
        });

        if self.ui.busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::story::Panel;
    use chrono::Local;

    fn story(missing: bool) -> StoryResponse {
        StoryResponse {
            title: "t".into(),
            panels: vec![Panel {
                index: 1,
                narrative_text: "n".into(),
                graphic_fragment: (!missing).then(|| "<svg></svg>".to_string()),
            }],
        }
    }

    fn stored(filename: &str) -> StoredStory {
        StoredStory {
            title: "t".into(),
            episode_input: "e".into(),
            raw_response_text: "r".into(),
            panels: vec![],
            created_at: Local::now().fixed_offset(),
            filename: filename.into(),
        }
    }

    #[test]
    fn each_generation_gets_a_fresh_image_key() {
        let mut state = UiState { generating: true, ..Default::default() };

        state.apply(EngineResponse::Generated(story(false)));
        let first = state.current.as_ref().unwrap().key.clone();
        state.apply(EngineResponse::Generated(story(false)));

        assert!(!state.generating);
        assert_ne!(state.current.as_ref().unwrap().key, first);
        assert!(matches!(state.create_notice, Some(Notice::Success(_))));
    }

    #[test]
    fn replaced_story_images_are_queued_for_release() {
        let mut state = UiState::default();

        state.apply(EngineResponse::Generated(story(false)));
        assert!(state.stale_images.is_empty());
        let first = state.current.as_ref().unwrap().key.clone();

        state.apply(EngineResponse::Generated(story(true)));
        assert_eq!(state.stale_images, vec![panel_image_uri(&first, 1)]);

        state.stale_images.clear();
        state.apply(EngineResponse::Generated(story(false)));
        assert!(state.stale_images.is_empty());
    }

    #[test]
    fn missing_graphics_produce_a_warning() {
        let mut state = UiState::default();
        state.apply(EngineResponse::Generated(story(true)));
        assert!(matches!(state.create_notice, Some(Notice::Warning(_))));
    }

    #[test]
    fn refreshed_library_drops_a_vanished_selection() {
        let mut state = UiState {
            selected: Some("gone.json".into()),
            ..Default::default()
        };
        state.apply(EngineResponse::Library(vec![stored("kept.json")]));
        assert!(state.selected.is_none());

        state.selected = Some("kept.json".into());
        state.apply(EngineResponse::Library(vec![stored("kept.json")]));
        assert_eq!(state.selected_story().unwrap().filename, "kept.json");
    }

    #[test]
    fn configuration_error_is_kept_until_ready() {
        let mut state = UiState::default();
        state.apply(EngineResponse::ConfigurationError("no key".into()));
        assert_eq!(state.config_error.as_deref(), Some("no key"));

        state.apply(EngineResponse::Ready("Gemini".into()));
        assert!(state.config_error.is_none());
        assert_eq!(state.backend.as_deref(), Some("Gemini"));
    }
}
