//! Secure byte container for intermediate secrets
//!
//! Used for the decoded key payload and the unmasked remainder while they
//! are being taken apart. The buffer is:
//! 1. Zeroed when dropped, on success and error paths alike
//! 2. Never printed by `Debug`
//! 3. Locked in memory where possible (prevents swapping)

use std::ops::{Deref, DerefMut};
use zeroize::Zeroize;

/// A fixed-size secret buffer that zeroes itself on drop
pub struct SecureBytes(Vec<u8>);

impl SecureBytes {
    /// Take ownership of `data`; from here on its memory is wiped on drop
    pub fn new(data: Vec<u8>) -> Self {
        let secure = Self(data);
        secure.lock_memory();
        secure
    }

    /// A zero-filled buffer of `len` bytes
    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0u8; len])
    }

    /// Lock memory to prevent swapping (best effort, may fail without privileges)
    #[cfg(unix)]
    fn lock_memory(&self) {
        if self.0.is_empty() {
            return;
        }
        unsafe {
            libc::mlock(self.0.as_ptr() as *const libc::c_void, self.0.len());
        }
    }

    #[cfg(not(unix))]
    fn lock_memory(&self) {}

    #[cfg(unix)]
    fn unlock_memory(&self) {
        if self.0.is_empty() {
            return;
        }
        unsafe {
            libc::munlock(self.0.as_ptr() as *const libc::c_void, self.0.len());
        }
    }

    #[cfg(not(unix))]
    fn unlock_memory(&self) {}

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Wipes the contents in place. The length is kept so that `Drop` still
/// unlocks the pages that were locked.
impl Zeroize for SecureBytes {
    fn zeroize(&mut self) {
        self.0.as_mut_slice().zeroize();
    }
}

impl Drop for SecureBytes {
    fn drop(&mut self) {
        // Wipe before unlocking so the plaintext never becomes swappable.
        self.0.as_mut_slice().zeroize();
        self.unlock_memory();
        self.0.zeroize();
    }
}

impl Deref for SecureBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SecureBytes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<u8>> for SecureBytes {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl std::fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureBytes")
            .field("len", &self.0.len())
            .field("data", &"[REDACTED]")
            .finish()
    }
}
