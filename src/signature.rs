//! Signature-side helpers
//!
//! Holds the algorithm tags and the comment marker shared by every minisign
//! text file, and the Ed25519 operations that consume a validated key.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

use crate::crypto::{SigningKeyPair, KEY_ID_LEN, PUBLIC_KEY_LEN, SECRET_KEY_LEN};
use crate::error::{MinikeyError, Result};

/// Ed25519 over the raw message
pub const SIGNATURE_ALGORITHM: [u8; 2] = *b"Ed";

/// scrypt (salsa20/8, SHA-256)
pub const KDF_ALGORITHM: [u8; 2] = *b"Sc";

/// BLAKE2b-256
pub const CHECKSUM_ALGORITHM: [u8; 2] = *b"B2";

/// First line marker of every key and signature file
pub const UNTRUSTED_COMMENT_PREFIX: &str = "untrusted comment: ";

pub const SIGNATURE_LEN: usize = 64;

/// Sign `message` with a 64-byte secret key (seed followed by public key).
///
/// Fails with `Crypto` when the public half does not belong to the seed.
pub fn sign(secret_key: &[u8; SECRET_KEY_LEN], message: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
    let signing_key = SigningKey::from_keypair_bytes(secret_key).map_err(|_| MinikeyError::Crypto)?;
    Ok(signing_key.sign(message).to_bytes())
}

/// Verify an Ed25519 signature, rejecting small-order and non-canonical inputs
pub fn verify(
    public_key: &[u8; PUBLIC_KEY_LEN],
    message: &[u8],
    signature: &[u8; SIGNATURE_LEN],
) -> Result<()> {
    let verifying_key = VerifyingKey::from_bytes(public_key).map_err(|_| MinikeyError::Signature)?;
    let signature = Signature::from_bytes(signature);
    verifying_key
        .verify_strict(message, &signature)
        .map_err(|_| MinikeyError::Signature)
}

/// Public key in minisign's text format:
///
/// ```text
/// untrusted comment: minisign public key <KEY ID>
/// base64(<signature_algorithm> || <key_id> || <public_key>)
/// ```
///
/// minisign prints the key id as a little-endian u64, so the hex in the
/// comment runs in reverse byte order.
pub fn public_key_text(keypair: &SigningKeyPair) -> String {
    let mut blob = Vec::with_capacity(2 + keypair.key_id().len() + PUBLIC_KEY_LEN);
    blob.extend_from_slice(keypair.algorithm_tag());
    blob.extend_from_slice(keypair.key_id());
    blob.extend_from_slice(keypair.public_key());

    format!(
        "{}minisign public key {}\n{}\n",
        UNTRUSTED_COMMENT_PREFIX,
        key_id_number(keypair.key_id()),
        STANDARD.encode(&blob)
    )
}

fn key_id_number(key_id: &[u8; KEY_ID_LEN]) -> String {
    format!("{:016X}", u64::from_le_bytes(*key_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Passphrase, TEST_KDF_PARAMS};

    fn keypair() -> SigningKeyPair {
        SigningKeyPair::generate_with(Passphrase::from("signing".to_string()), TEST_KDF_PARAMS).unwrap()
    }

    #[test]
    fn test_sign_verify() {
        let keypair = keypair();
        let signature = sign(keypair.secret_key(), b"experiment 42").unwrap();

        assert!(verify(keypair.public_key(), b"experiment 42", &signature).is_ok());
    }

    #[test]
    fn test_verify_rejects_other_message() {
        let keypair = keypair();
        let signature = sign(keypair.secret_key(), b"experiment 42").unwrap();

        let result = verify(keypair.public_key(), b"experiment 43", &signature);
        assert!(matches!(result, Err(MinikeyError::Signature)));
    }

    #[test]
    fn test_verify_rejects_other_key() {
        let signer = keypair();
        let other = keypair();
        let signature = sign(signer.secret_key(), b"payload").unwrap();

        assert!(verify(other.public_key(), b"payload", &signature).is_err());
    }

    #[test]
    fn test_sign_rejects_mismatched_public_half() {
        let keypair = keypair();
        let mut secret = *keypair.secret_key();
        secret[63] ^= 0x01;

        assert!(matches!(sign(&secret, b"payload"), Err(MinikeyError::Crypto)));
    }

    #[test]
    fn test_public_key_text_format() {
        let keypair = keypair();
        let text = public_key_text(&keypair);
        let mut lines = text.lines();

        let comment = lines.next().unwrap();
        assert!(comment.starts_with(UNTRUSTED_COMMENT_PREFIX));
        let mut reversed = *keypair.key_id();
        reversed.reverse();
        assert!(comment.ends_with(&hex::encode_upper(reversed)));

        let blob = STANDARD.decode(lines.next().unwrap()).unwrap();
        assert_eq!(blob.len(), 42);
        assert_eq!(&blob[..2], b"Ed");
        assert_eq!(&blob[2..10], keypair.key_id());
        assert_eq!(&blob[10..], keypair.public_key());
    }

    #[test]
    fn test_key_id_number_is_little_endian() {
        let key_id = [0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef];
        assert_eq!(key_id_number(&key_id), "EFCDAB8967452301");
    }
}
