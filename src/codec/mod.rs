//! Secret key encoding
//!
//! `serialize` masks the key material with the passphrase-derived key and
//! writes the armored payload; `deserialize` parses it, re-derives the mask
//! from the stored salt and cost, unmasks and checks the BLAKE2b checksum.
//!
//! Format errors are reported before any key derivation takes place. A
//! checksum mismatch is always reported as [`MinikeyError::Crypto`], whether
//! the passphrase was wrong or the data was modified.

mod armor;
mod layout;

pub use armor::DEFAULT_COMMENT;
pub use layout::Layout;

use tracing::{debug, warn};

use crate::crypto::{self, compute_checksum, ct_equal, KdfParams, Passphrase, SigningKeyPair, PUBLIC_KEY_LEN, SECRET_KEY_LEN};
use crate::error::{MinikeyError, Result};
use crate::signature::{CHECKSUM_ALGORITHM, KDF_ALGORITHM};
use layout::EncodedSecretKey;

/// Encode `keypair` in the extended layout with the default comment
pub fn serialize(keypair: &SigningKeyPair) -> String {
    serialize_with(keypair, Layout::Extended, DEFAULT_COMMENT)
}

pub fn serialize_with(keypair: &SigningKeyPair, layout: Layout, comment: &str) -> String {
    let mut remainder = layout::join_remainder(
        layout,
        keypair.key_id(),
        keypair.secret_key(),
        keypair.public_key(),
        &keypair.checksum(),
    );
    layout::apply_mask(&mut remainder, keypair.derived_key().as_bytes());

    let kdf = keypair.kdf_params();
    let encoded = EncodedSecretKey {
        layout,
        signature_algorithm: *keypair.algorithm_tag(),
        kdf_algorithm: KDF_ALGORITHM,
        checksum_algorithm: CHECKSUM_ALGORITHM,
        salt: *keypair.salt(),
        ops_limit: kdf.ops_limit,
        mem_limit: kdf.mem_limit,
        remainder,
    };
    debug!(key_id = %keypair.key_id_hex(), ?layout, "encoding secret key");

    armor::encode(comment, &encoded.to_bytes())
}

/// The untrusted comment of an armored key, without decoding the payload
pub fn comment(blob: &str) -> Result<String> {
    Ok(armor::decode(blob)?.comment)
}

/// The layout of an armored key, judged by its payload length
pub fn layout(blob: &str) -> Result<Layout> {
    let armored = armor::decode(blob)?;
    Layout::from_payload_len(armored.payload.len()).ok_or_else(|| {
        MinikeyError::Format(format!("unexpected payload length {}", armored.payload.len()))
    })
}

/// Decode, unmask and verify a secret key.
///
/// The passphrase is consumed and wiped whatever the outcome.
pub fn deserialize(blob: &str, passphrase: Passphrase) -> Result<SigningKeyPair> {
    let armored = armor::decode(blob)?;
    let encoded = EncodedSecretKey::parse(&armored.payload)?;
    drop(armored);

    // kdf and checksum algorithm tags are not checked
    let params = KdfParams::new(encoded.ops_limit, encoded.mem_limit)?;
    let derived_key = crypto::derive(passphrase, &encoded.salt, params)?;

    let mut remainder = encoded.remainder;
    layout::apply_mask(&mut remainder, derived_key.as_bytes());
    let material = layout::split_remainder(encoded.layout, &remainder)?;
    drop(remainder);

    let expected = compute_checksum(
        &encoded.signature_algorithm,
        &material.key_id,
        &material.secret_key,
    );
    let checksum_ok = ct_equal(&expected, &material.checksum);
    let public_key_ok = ct_equal(
        &material.secret_key[SECRET_KEY_LEN - PUBLIC_KEY_LEN..],
        &material.public_key,
    );
    if !(checksum_ok & public_key_ok) {
        warn!("secret key checksum mismatch");
        return Err(MinikeyError::Crypto);
    }

    let keypair = SigningKeyPair::from_parts(
        encoded.signature_algorithm,
        material.key_id,
        material.secret_key,
        material.public_key,
        encoded.salt,
        derived_key,
        params,
    );
    debug!(key_id = %keypair.key_id_hex(), layout = ?encoded.layout, "decoded secret key");
    Ok(keypair)
}
