//! Digest helpers
//!
//! One-time secrets (password reset tokens) are never stored as issued; only
//! their SHA-256 digest is persisted and compared.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of `input`
pub fn sha256_hex(input: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(input.as_ref()))
}
