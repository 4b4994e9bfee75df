pub mod story;
pub mod stored_story;
pub mod generated_story;
