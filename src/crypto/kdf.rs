//! scrypt Key Derivation Function
//!
//! Derives the 104-byte mask that protects a secret key from the user's
//! passphrase. The cost is expressed the way libsodium's
//! `crypto_pwhash_scryptsalsa208sha256` expresses it (an operations limit
//! and a memory limit) and is stored next to the key, so a key is always
//! unlocked with the cost it was created with.

use scrypt::{scrypt, Params};
use tracing::debug;
use zeroize::Zeroizing;

use super::Passphrase;
use crate::error::{MinikeyError, Result};

/// Salt length in bytes
pub const SALT_LEN: usize = 32;

/// Derived key length in bytes (covers key id, secret key and checksum)
pub const DERIVED_KEY_LEN: usize = 104;

/// libsodium raises smaller operation limits to this value
const MIN_OPS_LIMIT: u64 = 32_768;

/// scrypt block size, fixed by libsodium
const BLOCK_SIZE: u64 = 8;

const MAX_RP: u64 = 0x3fff_ffff;

/// Largest scrypt working set a stored cost may ask for
pub const MAX_SCRYPT_MEMORY: u64 = 4 << 30;

/// Cost parameters persisted with every secret key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub ops_limit: u32,
    pub mem_limit: u32,
}

/// scrypt parameters resolved from a [`KdfParams`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptCost {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

impl KdfParams {
    /// Cost suited to an interactive login (N = 2^14, 16 MiB)
    pub const INTERACTIVE: Self = Self {
        ops_limit: 524_288,
        mem_limit: 16_777_216,
    };

    /// The minisign default (N = 2^20, 1 GiB)
    pub const SENSITIVE: Self = Self {
        ops_limit: 33_554_432,
        mem_limit: 1_073_741_824,
    };

    pub fn new(ops_limit: u32, mem_limit: u32) -> Result<Self> {
        if ops_limit == 0 || mem_limit == 0 {
            return Err(MinikeyError::Format(format!(
                "kdf limits must be positive (opslimit={}, memlimit={})",
                ops_limit, mem_limit
            )));
        }
        Ok(Self {
            ops_limit,
            mem_limit,
        })
    }

    /// Map the limits to scrypt's N, r and p exactly as libsodium picks them
    pub fn scrypt_cost(&self) -> ScryptCost {
        let ops = u64::from(self.ops_limit).max(MIN_OPS_LIMIT);
        let mem = u64::from(self.mem_limit);

        if ops < mem / 32 {
            let log_n = log_n_below(ops / (BLOCK_SIZE * 4));
            return ScryptCost {
                log_n,
                r: BLOCK_SIZE as u32,
                p: 1,
            };
        }

        let log_n = log_n_below(mem / (BLOCK_SIZE * 128));
        let max_rp = ((ops / 4) / (1u64 << log_n)).min(MAX_RP);
        ScryptCost {
            log_n,
            r: BLOCK_SIZE as u32,
            p: (max_rp / BLOCK_SIZE) as u32,
        }
    }
}

impl ScryptCost {
    /// Bytes scrypt allocates for this cost (`128·r·N` plus `128·r·p`),
    /// `None` if that does not fit in a u64
    pub fn memory_bytes(&self) -> Option<u64> {
        let block = 128u64.checked_mul(u64::from(self.r))?;
        let table = block.checked_mul(1u64.checked_shl(u32::from(self.log_n))?)?;
        let lanes = block.checked_mul(u64::from(self.p))?;
        table.checked_add(lanes)
    }
}

/// Smallest `n` in `1..63` with `2^n > max_n / 2`
fn log_n_below(max_n: u64) -> u8 {
    let mut log_n = 1u8;
    while log_n < 63 && (1u64 << log_n) <= max_n / 2 {
        log_n += 1;
    }
    log_n
}

/// The passphrase-derived mask, wiped on drop
pub struct DerivedKey(Zeroizing<[u8; DERIVED_KEY_LEN]>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; DERIVED_KEY_LEN] {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn from_bytes(bytes: [u8; DERIVED_KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive the mask key for `salt` at the given cost.
///
/// The passphrase is consumed; its storage is wiped before this returns,
/// whether or not derivation succeeded.
pub fn derive(passphrase: Passphrase, salt: &[u8; SALT_LEN], params: KdfParams) -> Result<DerivedKey> {
    let mut key = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    let outcome = derive_into(passphrase.expose(), salt, params, key.as_mut_slice());
    drop(passphrase);
    outcome?;
    Ok(DerivedKey(key))
}

fn derive_into(password: &[u8], salt: &[u8], params: KdfParams, out: &mut [u8]) -> Result<()> {
    let cost = params.scrypt_cost();
    debug!(
        ops_limit = params.ops_limit,
        mem_limit = params.mem_limit,
        log_n = cost.log_n,
        r = cost.r,
        p = cost.p,
        "deriving key with scrypt"
    );

    // The limits come from the key file; scrypt aborts instead of failing
    // when an allocation is refused.
    let affordable = cost
        .memory_bytes()
        .filter(|&bytes| bytes <= MAX_SCRYPT_MEMORY)
        .and_then(|bytes| usize::try_from(bytes).ok())
        .is_some();
    if !affordable {
        return Err(MinikeyError::Format(format!(
            "unusable kdf cost parameters (N=2^{}, r={}, p={})",
            cost.log_n, cost.r, cost.p
        )));
    }

    let scrypt_params = Params::new(cost.log_n, cost.r, cost.p, Params::RECOMMENDED_LEN)
        .map_err(|e| MinikeyError::Format(format!("unusable kdf cost parameters: {}", e)))?;

    scrypt(password, salt, &scrypt_params, out)
        .map_err(|e| MinikeyError::Format(format!("key derivation failed: {}", e)))
}
