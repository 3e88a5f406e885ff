pub mod content_generator;
pub mod recording_bot;
