//! Helpers de hash.

use blake3::Hasher;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::to_canonical_json;

/// Hashea un string con BLAKE3 y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Hash BLAKE3 de la forma canónica de un `Value`.
pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}

/// SHA-256 hex de un string.
pub fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
