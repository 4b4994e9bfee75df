pub mod engine;
pub mod protocol;
pub mod session;

pub mod prompt_builder;
pub mod llm_client;
pub mod story_parser;
pub mod svg_matcher;
