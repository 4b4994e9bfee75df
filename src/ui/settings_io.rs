use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ui::settings::AppSettings;
use crate::APP_DIR_NAME;

fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR_NAME);
    path.push("settings.json");
    path
}

pub fn load_settings() -> AppSettings {
    load_settings_from(&settings_path())
}

pub fn save_settings(settings: &AppSettings) -> anyhow::Result<()> {
    save_settings_to(&settings_path(), settings)
}

/// A missing or unreadable file gives the defaults.
pub fn load_settings_from(path: &Path) -> AppSettings {
    match fs::read_to_string(path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), "ignoring unreadable settings: {e}");
            AppSettings::default()
        }),
        Err(_) => AppSettings::default(),
    }
}

pub fn save_settings_to(path: &Path, settings: &AppSettings) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
