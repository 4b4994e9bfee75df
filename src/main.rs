mod engine;
mod model;
mod storage;
mod ui;

use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Directory name under the platform config and data dirs.
pub const APP_DIR_NAME: &str = "toon_factory";

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("toon_factory=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = ui::settings_io::load_settings();
    tracing::info!(provider = settings.provider.label(), "starting toon factory");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("두더지와 페럿의 툰 공장")
            .with_inner_size([720.0, 900.0]),
        ..Default::default()
    };

    eframe::run_native(
        "toon_factory",
        options,
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            ui::fonts::install_hangul_font(&cc.egui_ctx);
            Ok(Box::new(ui::app::ToonApp::new(settings)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("window failed: {e}"))
}
