//! Configuration and key files for minikey
//!
//! Handles:
//! - JSON settings (KDF cost profile, default comment)
//! - Reading and writing secret/public key files for the CLI

mod settings;
mod storage;

pub use settings::{default_path, CostProfile, Settings, DEFAULT_MIN_PASSPHRASE_LEN};
pub use storage::{public_key_path, read_secret_key, write_public_key, write_secret_key};
