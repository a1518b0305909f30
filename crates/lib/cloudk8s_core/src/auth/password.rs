//! Login password hashing and secret comparison.
//!
//! Clients never send plaintext: the login form carries the lowercase
//! SHA-256 hex digest of the password, and the server compares it with the
//! digest of the configured password.

use std::sync::OnceLock;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Lowercase SHA-256 hex digest of `plain`.
pub fn hash_password(plain: &str) -> String {
    format!("{:x}", Sha256::digest(plain.as_bytes()))
}

/// Constant-time equality for secret-bearing strings.
///
/// Both inputs are MACed under a per-process random key and the tags are
/// compared with `verify_slice`.
pub fn secure_compare(a: &str, b: &str) -> bool {
    let key = compare_key();
    let (Ok(mut mac_a), Ok(mut mac_b)) = (
        HmacSha256::new_from_slice(key),
        HmacSha256::new_from_slice(key),
    ) else {
        return false;
    };
    mac_a.update(a.as_bytes());
    mac_b.update(b.as_bytes());
    let tag_a = mac_a.finalize().into_bytes();
    mac_b.verify_slice(&tag_a).is_ok()
}

fn compare_key() -> &'static [u8; 32] {
    static KEY: OnceLock<[u8; 32]> = OnceLock::new();
    KEY.get_or_init(rand::random)
}
