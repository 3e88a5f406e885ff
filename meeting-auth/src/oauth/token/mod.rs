//! Normalized refresh results and at-rest token encryption.

mod encryption;
mod tokens;

pub use encryption::TokenCipher;
pub use tokens::{RefreshResult, DEFAULT_EXPIRES_IN_SECS};
