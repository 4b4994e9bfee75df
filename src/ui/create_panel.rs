use eframe::egui;

use super::app::{Notice, ToonApp};
use super::story_view::draw_story;
use crate::engine::protocol::EngineCommand;

pub fn draw_create_panel(ui: &mut egui::Ui, app: &mut ToonApp) {
    // without a usable backend the whole generate flow stops here
    if let Some(err) = &app.ui.config_error {
        ui.add_space(12.0);
        ui.colored_label(egui::Color32::from_rgb(200, 60, 60), format!("🚨 {err}"));
        ui.label("설정 화면에서 제공자를 바꾸거나 API 키를 넣은 뒤 다시 적용해주세요.");
        return;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.label(egui::RichText::new("오늘의 에피소드는?").strong().size(18.0));
        if let Some(backend) = &app.ui.backend {
            ui.small(format!("with {backend}"));
        }

        ui.add(
            egui::TextEdit::multiline(&mut app.ui.episode_input)
                .hint_text("예: 여자친구랑 카페 갔는데 내가 커피 쏟아서 혼난 이야기...")
                .desired_rows(8)
                .desired_width(f32::INFINITY),
        );

        let can_generate = !app.ui.generating && !app.ui.saving;
        let clicked = ui
            .add_enabled(
                can_generate,
                egui::Button::new("콘티 & 그림 뽑기 🎨").min_size(egui::vec2(ui.available_width(), 32.0)),
            )
            .clicked();

        if clicked {
            let episode = app.ui.episode_input.trim().to_string();
            if episode.is_empty() {
                app.ui.create_notice = Some(Notice::Warning("내용을 입력해줘! ✍️".into()));
            } else {
                app.ui.generating = true;
                app.ui.create_notice = None;
                app.send_command(EngineCommand::Generate { episode });
            }
        }

        if app.ui.generating {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("🐭 두더지가 열심히 그림을 그리고 있어요... (약 10초)");
            });
        }

        if let Some(notice) = &app.ui.create_notice {
            notice.show(ui);
        }

        let Some(current) = &app.ui.current else {
            return;
        };

        ui.separator();
        draw_story(ui, &current.story, &current.key);

        ui.horizontal(|ui| {
            let save = ui.add_enabled(!app.ui.saving && !app.ui.generating, egui::Button::new("💾 저장하기"));
            if save.clicked() {
                app.ui.saving = true;
                app.send_command(EngineCommand::SaveLast);
            }
            if let Some(notice) = &app.ui.save_notice {
                notice.show(ui);
            }
        });
    });
}
