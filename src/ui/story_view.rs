use eframe::egui;

use crate::model::story::{Panel, StoryResponse};

const PANEL_IMAGE_WIDTH: f32 = 300.0;

/// Draws a story: title, then each panel's text and picture.
///
/// `key` must be unique per story; it namespaces the `bytes://` image URIs
/// egui caches decoded SVGs under.
pub fn draw_story(ui: &mut egui::Ui, story: &StoryResponse, key: &str) {
    ui.heading(&story.title);
    ui.separator();

    if story.panels.is_empty() {
        panel_warning(ui, "컷 구분을 찾지 못했어요. 받은 내용을 그대로 보여드려요.");
        return;
    }

    for panel in &story.panels {
        draw_panel(ui, panel, key);
        ui.separator();
    }
}

fn draw_panel(ui: &mut egui::Ui, panel: &Panel, key: &str) {
    ui.group(|ui| {
        ui.set_width(ui.available_width());
        draw_narrative(ui, &panel.narrative_text);

        match &panel.graphic_fragment {
            Some(svg) => {
                let uri = panel_image_uri(key, panel.index);
                ui.vertical_centered(|ui| {
                    ui.add(
                        egui::Image::from_bytes(uri, svg.as_bytes().to_vec())
                            .max_width(PANEL_IMAGE_WIDTH)
                            .fit_to_original_size(1.0),
                    );
                });

                ui.horizontal(|ui| {
                    if ui.small_button("SVG 내보내기").clicked() {
                        export_svg(svg, panel.index);
                    }
                    ui.collapsing(format!("SVG 코드 ({}컷)", panel.index), |ui| {
                        let mut code = svg.as_str();
                        ui.add(egui::TextEdit::multiline(&mut code).code_editor());
                    });
                });
            }
            None => panel_warning(ui, "⚠ 이 컷은 그림이 없어요. 텍스트만 보여드려요."),
        }
    });
}

/// Markdown-lite: `#` lines become headings, `**x**` spans become strong.
fn draw_narrative(ui: &mut egui::Ui, text: &str) {
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            ui.add_space(4.0);
            continue;
        }

        if line.starts_with('#') {
            let heading = line.trim_start_matches('#').trim();
            ui.label(egui::RichText::new(heading).strong().size(18.0));
            continue;
        }

        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            for (i, part) in line.split("**").enumerate() {
                if part.is_empty() {
                    continue;
                }
                if i % 2 == 1 {
                    ui.label(egui::RichText::new(part).strong());
                } else {
                    ui.label(part);
                }
            }
        });
    }
}

pub fn panel_image_uri(key: &str, index: u32) -> String {
    format!("bytes://{key}/panel_{index}.svg")
}

fn export_svg(svg: &str, index: u32) {
    let Some(path) = rfd::FileDialog::new()
        .add_filter("SVG", &["svg"])
        .set_file_name(format!("panel_{index}.svg"))
        .save_file()
    else {
        return;
    };

    match std::fs::write(&path, svg) {
        Ok(()) => tracing::info!(path = %path.display(), "panel svg exported"),
        Err(e) => tracing::warn!(path = %path.display(), "svg export failed: {e}"),
    }
}

fn panel_warning(ui: &mut egui::Ui, text: &str) {
    ui.colored_label(egui::Color32::from_rgb(200, 150, 40), text);
}
