pub mod error;
pub mod story_store;
