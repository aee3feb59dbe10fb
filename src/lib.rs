//! minikey - passphrase-protected Ed25519 signing keys
//!
//! This crate provides:
//! - Ed25519 key generation with an 8-byte key id
//! - scrypt-derived masking of the secret key, with the cost stored in the key
//! - A minisign-compatible two-line text encoding, verified by a BLAKE2b checksum
//! - Zeroing of passphrases and intermediate secrets on every path

pub mod cli;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod signature;

pub use codec::{deserialize, serialize, serialize_with, Layout};
pub use crypto::{KdfParams, Passphrase, SigningKeyPair};
pub use error::{MinikeyError, Result};
