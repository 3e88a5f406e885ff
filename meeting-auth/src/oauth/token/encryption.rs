//! AES-256-GCM encryption for OAuth tokens stored at rest.
//!
//! The key is a 32-byte value given as a 64-character hex string. Each sealed
//! value is `base64(nonce || ciphertext)` so it fits a text column.

use std::fmt;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::Rng;

use crate::error::{storage_error, Error, ErrorKind, StorageErrorKind};

/// 12-byte nonce size for AES-GCM
const NONCE_SIZE: usize = 12;

/// Seals and opens token strings with a key parsed once at startup.
#[derive(Clone)]
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenCipher(..)")
    }
}

impl TokenCipher {
    /// Parse a hex-encoded 32-byte key.
    pub fn from_hex_key(key_hex: &str) -> Result<Self, Error> {
        let bytes = hex::decode(key_hex.trim()).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Storage(StorageErrorKind::InvalidKey),
        })?;
        let cipher = Aes256Gcm::new_from_slice(&bytes)
            .map_err(|_| storage_error(StorageErrorKind::InvalidKey))?;
        Ok(Self { cipher })
    }

    /// Encrypt with a fresh random nonce.
    pub fn seal(&self, plaintext: &str) -> Result<String, Error> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| storage_error(StorageErrorKind::EncryptionFailed))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend(ciphertext);

        Ok(BASE64.encode(combined))
    }

    /// Decrypt a value produced by [`TokenCipher::seal`].
    pub fn open(&self, sealed: &str) -> Result<String, Error> {
        let combined = BASE64.decode(sealed).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Storage(StorageErrorKind::DecryptionFailed),
        })?;

        if combined.len() < NONCE_SIZE {
            return Err(storage_error(StorageErrorKind::DecryptionFailed));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext_bytes = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| storage_error(StorageErrorKind::DecryptionFailed))?;

        String::from_utf8(plaintext_bytes).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Storage(StorageErrorKind::DecryptionFailed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn cipher() -> TokenCipher {
        TokenCipher::from_hex_key(TEST_KEY).unwrap()
    }

    #[test]
    fn sealed_token_opens_to_original() {
        let sealed = cipher().seal("ya29.refresh-me").unwrap();
        assert_ne!(sealed, "ya29.refresh-me");
        assert_eq!(cipher().open(&sealed).unwrap(), "ya29.refresh-me");
    }

    #[test]
    fn each_seal_uses_a_fresh_nonce() {
        let c = cipher();
        let first = c.seal("same").unwrap();
        let second = c.seal("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn short_key_is_rejected() {
        let result = TokenCipher::from_hex_key("abcd");
        assert!(matches!(
            result,
            Err(Error {
                error_kind: ErrorKind::Storage(StorageErrorKind::InvalidKey),
                ..
            })
        ));
    }

    #[test]
    fn non_hex_key_is_rejected() {
        let result = TokenCipher::from_hex_key("not-valid-hex!");
        assert!(matches!(
            result,
            Err(Error {
                error_kind: ErrorKind::Storage(StorageErrorKind::InvalidKey),
                ..
            })
        ));
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let sealed = cipher().seal("secret").unwrap();
        let other = TokenCipher::from_hex_key(
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
        )
        .unwrap();
        assert!(matches!(
            other.open(&sealed),
            Err(Error {
                error_kind: ErrorKind::Storage(StorageErrorKind::DecryptionFailed),
                ..
            })
        ));
    }

    #[test]
    fn garbage_fails_to_open() {
        assert!(cipher().open("not_valid_base64!!!").is_err());
        // "abc" is shorter than a nonce
        assert!(cipher().open("YWJj").is_err());
    }
}
