//! Hashing y canonicalización JSON.
//!
//! Dos algoritmos conviven: BLAKE3 para artifacts y fingerprints del motor,
//! SHA-256 para el fingerprint de contenido de los `FeedItem` (formato
//! persistido en el dedup store).

pub mod canonical_json;
pub mod hash;

pub use canonical_json::to_canonical_json;
pub use hash::{hash_str, hash_value, sha256_hex};
