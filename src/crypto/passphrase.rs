//! Owned passphrase with a single use
//!
//! A `Passphrase` is handed by value to the key derivation step, which drops
//! it as soon as the derived key exists. Dropping wipes the storage, so after
//! `derive` (or any codec call that reaches it) the caller holds nothing.

use secrecy::{ExposeSecret, Secret, SecretVec};
use zeroize::Zeroize;

pub struct Passphrase(SecretVec<u8>);

impl Passphrase {
    /// Copy the passphrase out of a caller buffer and wipe that buffer
    pub fn from_buffer(buf: &mut [u8]) -> Self {
        let owned = buf.to_vec();
        buf.zeroize();
        Self(Secret::new(owned))
    }

    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.0.expose_secret()
    }
}

impl From<String> for Passphrase {
    fn from(s: String) -> Self {
        Self(Secret::new(s.into_bytes()))
    }
}

impl From<Vec<u8>> for Passphrase {
    fn from(v: Vec<u8>) -> Self {
        Self(Secret::new(v))
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Passphrase([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_buffer_wipes_source() {
        let mut buf = *b"correct horse battery staple";
        let passphrase = Passphrase::from_buffer(&mut buf);

        assert!(buf.iter().all(|&b| b == 0));
        assert_eq!(passphrase.expose(), b"correct horse battery staple");
    }

    #[test]
    fn test_from_string_moves_bytes() {
        let passphrase = Passphrase::from("hunter2hunter2".to_string());
        assert_eq!(passphrase.len(), 14);
        assert!(!passphrase.is_empty());
    }

    #[test]
    fn test_debug_is_redacted() {
        let passphrase = Passphrase::from(b"top secret".to_vec());
        assert_eq!(format!("{:?}", passphrase), "Passphrase([REDACTED])");
    }
}
