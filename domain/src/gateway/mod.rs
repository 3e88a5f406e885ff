pub mod content_service;
pub mod oauth;
pub mod recall_ai;
