//! Ed25519 signing key material
//!
//! A [`SigningKeyPair`] bundles everything needed to re-encode a secret key:
//! - the Ed25519 secret key (seed followed by public key, 64 bytes)
//! - the public key (32 bytes)
//! - an 8-byte random key id, a hint for which key produced a signature
//! - the KDF salt, cost and derived mask key that protect it at rest

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::Zeroizing;

use super::kdf::{self, DerivedKey, KdfParams, SALT_LEN};
use super::Passphrase;
use crate::error::{MinikeyError, Result};
use crate::signature::SIGNATURE_ALGORITHM;

pub const KEY_ID_LEN: usize = 8;
pub const SECRET_KEY_LEN: usize = 64;
pub const PUBLIC_KEY_LEN: usize = 32;
pub const CHECKSUM_LEN: usize = 32;

const SEED_LEN: usize = 32;

type Blake2b256 = Blake2b<U32>;

pub struct SigningKeyPair {
    algorithm_tag: [u8; 2],
    key_id: [u8; KEY_ID_LEN],
    secret_key: Zeroizing<[u8; SECRET_KEY_LEN]>,
    public_key: [u8; PUBLIC_KEY_LEN],
    salt: [u8; SALT_LEN],
    derived_key: DerivedKey,
    kdf: KdfParams,
}

impl SigningKeyPair {
    /// Generate a new keypair protected by `passphrase` at interactive cost
    pub fn generate(passphrase: Passphrase) -> Result<Self> {
        Self::generate_with(passphrase, KdfParams::INTERACTIVE)
    }

    /// Generate a new keypair protected by `passphrase` at the given cost
    pub fn generate_with(passphrase: Passphrase, params: KdfParams) -> Result<Self> {
        let mut salt = [0u8; SALT_LEN];
        fill_random(&mut salt)?;

        let derived_key = kdf::derive(passphrase, &salt, params)?;

        let mut key_id = [0u8; KEY_ID_LEN];
        fill_random(&mut key_id)?;

        let mut seed = Zeroizing::new([0u8; SEED_LEN]);
        fill_random(seed.as_mut_slice())?;
        let signing_key = SigningKey::from_bytes(&seed);

        let keypair = Self {
            algorithm_tag: SIGNATURE_ALGORITHM,
            key_id,
            secret_key: Zeroizing::new(signing_key.to_keypair_bytes()),
            public_key: signing_key.verifying_key().to_bytes(),
            salt,
            derived_key,
            kdf: params,
        };
        debug!(key_id = %keypair.key_id_hex(), "generated signing key");
        Ok(keypair)
    }

    pub(crate) fn from_parts(
        algorithm_tag: [u8; 2],
        key_id: [u8; KEY_ID_LEN],
        secret_key: Zeroizing<[u8; SECRET_KEY_LEN]>,
        public_key: [u8; PUBLIC_KEY_LEN],
        salt: [u8; SALT_LEN],
        derived_key: DerivedKey,
        kdf: KdfParams,
    ) -> Self {
        Self {
            algorithm_tag,
            key_id,
            secret_key,
            public_key,
            salt,
            derived_key,
            kdf,
        }
    }

    /// The same key material protected by a new passphrase, fresh salt and `params`
    pub fn rekey(&self, passphrase: Passphrase, params: KdfParams) -> Result<Self> {
        let mut salt = [0u8; SALT_LEN];
        fill_random(&mut salt)?;

        let derived_key = kdf::derive(passphrase, &salt, params)?;
        debug!(key_id = %self.key_id_hex(), "re-encrypting signing key");

        Ok(Self {
            algorithm_tag: self.algorithm_tag,
            key_id: self.key_id,
            secret_key: self.secret_key.clone(),
            public_key: self.public_key,
            salt,
            derived_key,
            kdf: params,
        })
    }

    pub fn algorithm_tag(&self) -> &[u8; 2] {
        &self.algorithm_tag
    }

    pub fn key_id(&self) -> &[u8; KEY_ID_LEN] {
        &self.key_id
    }

    /// Key id as lowercase hex, safe to display or log
    pub fn key_id_hex(&self) -> String {
        hex::encode(self.key_id)
    }

    pub fn secret_key(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.secret_key
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn kdf_params(&self) -> KdfParams {
        self.kdf
    }

    pub(crate) fn derived_key(&self) -> &DerivedKey {
        &self.derived_key
    }

    /// BLAKE2b-256 over algorithm tag, key id and secret key
    pub fn checksum(&self) -> [u8; CHECKSUM_LEN] {
        compute_checksum(&self.algorithm_tag, &self.key_id, &self.secret_key)
    }
}

impl std::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("algorithm_tag", &String::from_utf8_lossy(&self.algorithm_tag))
            .field("key_id", &self.key_id_hex())
            .field("public_key", &hex::encode(self.public_key))
            .field("kdf", &self.kdf)
            .field("secret_key", &"[REDACTED]")
            .field("derived_key", &"[REDACTED]")
            .finish()
    }
}

pub(crate) fn compute_checksum(
    algorithm_tag: &[u8; 2],
    key_id: &[u8; KEY_ID_LEN],
    secret_key: &[u8; SECRET_KEY_LEN],
) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Blake2b256::new();
    hasher.update(algorithm_tag);
    hasher.update(key_id);
    hasher.update(secret_key);
    let digest = hasher.finalize();

    let mut checksum = [0u8; CHECKSUM_LEN];
    checksum.copy_from_slice(&digest);
    checksum
}

/// Constant-time equality for secret-dependent byte strings
pub(crate) fn ct_equal(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| MinikeyError::KeyGenerationFailed(e.to_string()))
}
