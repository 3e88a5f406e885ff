pub mod content;
pub mod recording;
