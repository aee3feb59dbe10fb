//! Cryptographic primitives for minikey
//!
//! This module provides:
//! - scrypt for passphrase-based key derivation, with libsodium cost limits
//! - Ed25519 key generation and the BLAKE2b-256 key checksum
//! - Secure memory handling with automatic zeroing

pub mod kdf;
mod keys;
mod passphrase;
mod secure_bytes;

pub use kdf::{derive, DerivedKey, KdfParams, ScryptCost, DERIVED_KEY_LEN, SALT_LEN};
pub use keys::{SigningKeyPair, CHECKSUM_LEN, KEY_ID_LEN, PUBLIC_KEY_LEN, SECRET_KEY_LEN};
pub(crate) use keys::{compute_checksum, ct_equal};
pub use passphrase::Passphrase;
pub use secure_bytes::SecureBytes;

/// Cheap cost used by unit tests (N = 2^10, r = 8, p = 1)
#[cfg(test)]
pub(crate) const TEST_KDF_PARAMS: KdfParams = KdfParams {
    ops_limit: 32_768,
    mem_limit: 1_048_576,
};
