use eframe::egui;

use super::app::{Notice, ToonApp};
use super::settings::{AppSettings, Provider};
use super::settings_io::save_settings;
use crate::engine::protocol::EngineCommand;
use crate::storage::story_store::StoryStore;

pub fn draw_settings_panel(ui: &mut egui::Ui, app: &mut ToonApp) {
    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.heading("설정");
        ui.separator();

        let s = &mut app.ui.settings;

        ui.label("UI 크기");
        ui.add(egui::Slider::new(&mut s.ui_scale, 0.75..=2.0));

        ui.separator();
        ui.label("생성 모델");
        egui::ComboBox::from_id_salt("provider")
            .selected_text(s.provider.label())
            .show_ui(ui, |ui| {
                for provider in [Provider::Gemini, Provider::LmStudio] {
                    ui.selectable_value(&mut s.provider, provider, provider.label());
                }
            });

        ui.label("모델 이름");
        ui.add(egui::TextEdit::singleline(&mut s.model).hint_text(s.provider.default_model()));

        ui.label("엔드포인트");
        ui.add(egui::TextEdit::singleline(&mut s.endpoint).hint_text(s.provider.default_endpoint()));

        if s.provider == Provider::Gemini {
            draw_api_key(ui, s);
        }

        ui.separator();
        ui.label("저장 폴더");
        ui.horizontal(|ui| {
            let shown = s
                .storage_dir
                .clone()
                .unwrap_or_else(StoryStore::default_dir);
            ui.monospace(shown.display().to_string());

            if ui.button("📁 변경").clicked() {
                if let Some(dir) = rfd::FileDialog::new().set_directory(&shown).pick_folder() {
                    s.storage_dir = Some(dir);
                }
            }
            if s.storage_dir.is_some() && ui.button("기본값").clicked() {
                s.storage_dir = None;
            }
        });

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("✔ 적용").clicked() {
                apply_settings(app);
            }

            let test = ui.add_enabled(!app.ui.testing_connection, egui::Button::new("연결 테스트"));
            if test.clicked() {
                app.ui.testing_connection = true;
                app.ui.settings_notice = None;
                app.send_command(EngineCommand::TestConnection);
            }
            if app.ui.testing_connection {
                ui.spinner();
            }
        });

        if let Some(notice) = &app.ui.settings_notice {
            notice.show(ui);
        }
    });
}

fn draw_api_key(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.label("API 키 (GEMINI_API_KEY 환경 변수가 없을 때만 사용)");

    // edited through a copy so that merely showing the field leaves `None` alone
    let mut key = settings.api_key.clone().unwrap_or_default();
    if ui.add(egui::TextEdit::singleline(&mut key).password(true)).changed() {
        settings.api_key = Some(key);
    }
}

fn apply_settings(app: &mut ToonApp) {
    let settings = &mut app.ui.settings;
    if settings.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
        settings.api_key = None;
    }

    app.ui.settings_notice = Some(match save_settings(settings) {
        Ok(()) => Notice::Success("설정을 저장했어요.".into()),
        Err(e) => {
            tracing::warn!("settings not saved: {e:#}");
            Notice::Error(format!("설정 저장 실패: {e:#}"))
        }
    });

    app.send_command(EngineCommand::ApplySettings(app.ui.settings.clone()));
}
