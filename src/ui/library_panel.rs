use eframe::egui;

use super::app::{ToonApp, UiState};
use super::story_view::draw_story;
use crate::engine::protocol::EngineCommand;
use crate::model::stored_story::StoredStory;

pub fn draw_library_panel(ui: &mut egui::Ui, app: &mut ToonApp) {
    egui::SidePanel::left("library_list")
        .resizable(true)
        .default_width(240.0)
        .min_width(180.0)
        .show_inside(ui, |ui| {
            ui.horizontal(|ui| {
                ui.heading("보관함");
                if ui.small_button("🔄 새로고침").clicked() {
                    app.send_command(EngineCommand::RefreshLibrary);
                }
            });
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| draw_story_list(ui, &mut app.ui));
        });

    let mut delete_now: Option<String> = None;

    egui::CentralPanel::default().show_inside(ui, |ui| {
        if let Some(notice) = &app.ui.library_notice {
            notice.show(ui);
            ui.separator();
        }

        let Some(story) = app.ui.selected_story() else {
            ui.label("왼쪽 목록에서 저장된 툰을 골라주세요.");
            return;
        };

        let filename = story.filename.clone();
        egui::ScrollArea::vertical().show(ui, |ui| {
            draw_stored_header(ui, story);
            draw_story(ui, &story.to_story(), &format!("stored/{}", story.filename));

            ui.collapsing("원본 응답", |ui| {
                let mut raw = story.raw_response_text.as_str();
                ui.add(egui::TextEdit::multiline(&mut raw).code_editor().desired_width(f32::INFINITY));
            });
        });

        ui.separator();
        delete_now = draw_delete_controls(ui, &mut app.ui.confirm_delete, filename);
    });

    if let Some(filename) = delete_now {
        app.send_command(EngineCommand::DeleteStory { filename });
    }
}

fn draw_story_list(ui: &mut egui::Ui, state: &mut UiState) {
    if state.library.is_empty() {
        ui.label("아직 저장된 툰이 없어요.");
        return;
    }

    for story in &state.library {
        let selected = state.selected.as_deref() == Some(story.filename.as_str());
        let label = format!(
            "{}\n{}",
            story.title,
            story.created_at.format("%Y-%m-%d %H:%M")
        );

        if ui.selectable_label(selected, label).clicked() {
            state.selected = Some(story.filename.clone());
            state.confirm_delete = None;
        }
        ui.add_space(2.0);
    }
}

fn draw_stored_header(ui: &mut egui::Ui, story: &StoredStory) {
    ui.small(format!(
        "{} · {}",
        story.created_at.format("%Y-%m-%d %H:%M:%S"),
        story.filename
    ));
    ui.collapsing("에피소드", |ui| {
        ui.label(&story.episode_input);
    });
    ui.add_space(6.0);
}

/// Two-step delete. Returns the filename once the user confirmed.
fn draw_delete_controls(
    ui: &mut egui::Ui,
    confirm_delete: &mut Option<String>,
    filename: String,
) -> Option<String> {
    let mut confirmed = None;

    ui.horizontal(|ui| {
        if confirm_delete.as_deref() == Some(filename.as_str()) {
            ui.label("정말 삭제할까요?");
            if ui.button("🗑 삭제").clicked() {
                confirmed = Some(filename.clone());
            }
            if ui.button("취소").clicked() {
                *confirm_delete = None;
            }
        } else if ui.button("🗑 삭제하기").clicked() {
            *confirm_delete = Some(filename.clone());
        }
    });

    confirmed
}
