// src/auth/token.rs
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

const TOKEN_BYTES: usize = 32;

/// A bearer secret handed to the browser (magic link or session cookie).
/// Only its SHA-256 digest is ever stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn generate() -> Self {
        Self::generate_with(&mut OsRng)
    }

    /// URL-safe base64 without padding, so it can sit in a query string or
    /// cookie as is.
    pub fn generate_with<R: RngCore>(rng: &mut R) -> Self {
        let mut buf = [0u8; TOKEN_BYTES];
        rng.fill_bytes(&mut buf);
        Token(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn digest(&self) -> [u8; 32] {
        digest(&self.0)
    }
}

/// Digest of a raw token string as received from a client.
pub fn digest(raw: &str) -> [u8; 32] {
    Sha256::digest(raw.as_bytes()).into()
}
