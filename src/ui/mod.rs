pub mod app;
pub mod create_panel;
pub mod fonts;
pub mod library_panel;
pub mod settings;
pub mod settings_io;
pub mod settings_panel;
pub mod story_view;
