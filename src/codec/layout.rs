//! Binary layout of an encoded secret key
//!
//! ```text
//! offset  len  field
//!      0    2  signature algorithm ("Ed")
//!      2    2  kdf algorithm ("Sc")
//!      4    2  checksum algorithm ("B2")
//!      6   32  kdf salt
//!     38    4  kdf opslimit (u32 LE)
//!     42    4  reserved
//!     46    4  kdf memlimit (u32 LE)
//!     50    4  reserved
//!     54    *  masked remainder
//! ```
//!
//! The remainder is 136 bytes in the extended layout
//! (`key_id || secret_key || public_key || checksum`) and 104 bytes in the
//! minisign layout (`key_id || secret_key || checksum`, public key taken from
//! the second half of the secret key).

use zeroize::Zeroizing;

use crate::crypto::{
    SecureBytes, CHECKSUM_LEN, KEY_ID_LEN, PUBLIC_KEY_LEN, SALT_LEN, SECRET_KEY_LEN,
};
use crate::error::{MinikeyError, Result};

pub const HEADER_LEN: usize = 54;
const RESERVED_LEN: usize = 4;

const KEY_ID_OFFSET: usize = 0;
const SECRET_KEY_OFFSET: usize = KEY_ID_OFFSET + KEY_ID_LEN;
const EXTENDED_PUBLIC_KEY_OFFSET: usize = SECRET_KEY_OFFSET + SECRET_KEY_LEN;
const EXTENDED_CHECKSUM_OFFSET: usize = EXTENDED_PUBLIC_KEY_OFFSET + PUBLIC_KEY_LEN;
const MINISIGN_CHECKSUM_OFFSET: usize = SECRET_KEY_OFFSET + SECRET_KEY_LEN;

/// Which remainder layout a payload uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// 190-byte payload carrying the public key in its own field
    Extended,
    /// 158-byte payload as written by minisign
    Minisign,
}

impl Layout {
    pub const fn remainder_len(self) -> usize {
        match self {
            Layout::Extended => EXTENDED_CHECKSUM_OFFSET + CHECKSUM_LEN,
            Layout::Minisign => MINISIGN_CHECKSUM_OFFSET + CHECKSUM_LEN,
        }
    }

    pub const fn payload_len(self) -> usize {
        HEADER_LEN + self.remainder_len()
    }

    pub fn from_payload_len(len: usize) -> Option<Self> {
        [Layout::Extended, Layout::Minisign]
            .into_iter()
            .find(|layout| layout.payload_len() == len)
    }

    const fn checksum_offset(self) -> usize {
        match self {
            Layout::Extended => EXTENDED_CHECKSUM_OFFSET,
            Layout::Minisign => MINISIGN_CHECKSUM_OFFSET,
        }
    }
}

/// A parsed payload; the remainder is still masked
#[derive(Debug)]
pub struct EncodedSecretKey {
    pub layout: Layout,
    pub signature_algorithm: [u8; 2],
    pub kdf_algorithm: [u8; 2],
    pub checksum_algorithm: [u8; 2],
    pub salt: [u8; SALT_LEN],
    pub ops_limit: u32,
    pub mem_limit: u32,
    pub remainder: SecureBytes,
}

impl EncodedSecretKey {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let layout = Layout::from_payload_len(payload.len()).ok_or_else(|| {
            MinikeyError::Format(format!("unexpected payload length {}", payload.len()))
        })?;

        let mut reader = Reader::new(payload);
        let signature_algorithm: [u8; 2] = reader.array()?;
        let kdf_algorithm: [u8; 2] = reader.array()?;
        let checksum_algorithm: [u8; 2] = reader.array()?;
        let salt: [u8; SALT_LEN] = reader.array()?;
        let ops_limit = reader.u32_le()?;
        reader.skip(RESERVED_LEN)?;
        let mem_limit = reader.u32_le()?;
        reader.skip(RESERVED_LEN)?;
        let remainder = SecureBytes::new(reader.take(layout.remainder_len())?.to_vec());
        reader.finish()?;

        Ok(Self {
            layout,
            signature_algorithm,
            kdf_algorithm,
            checksum_algorithm,
            salt,
            ops_limit,
            mem_limit,
            remainder,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.layout.payload_len());
        out.extend_from_slice(&self.signature_algorithm);
        out.extend_from_slice(&self.kdf_algorithm);
        out.extend_from_slice(&self.checksum_algorithm);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.ops_limit.to_le_bytes());
        out.extend_from_slice(&[0u8; RESERVED_LEN]);
        out.extend_from_slice(&self.mem_limit.to_le_bytes());
        out.extend_from_slice(&[0u8; RESERVED_LEN]);
        out.extend_from_slice(&self.remainder);
        out
    }
}

/// Unmasked contents of the remainder
pub struct KeyMaterial {
    pub key_id: [u8; KEY_ID_LEN],
    pub secret_key: Zeroizing<[u8; SECRET_KEY_LEN]>,
    pub public_key: [u8; PUBLIC_KEY_LEN],
    pub checksum: [u8; CHECKSUM_LEN],
}

/// Split an unmasked remainder into its fields
pub fn split_remainder(layout: Layout, plain: &[u8]) -> Result<KeyMaterial> {
    if plain.len() != layout.remainder_len() {
        return Err(MinikeyError::Format(format!(
            "remainder is {} bytes, expected {}",
            plain.len(),
            layout.remainder_len()
        )));
    }

    let mut reader = Reader::new(plain);
    let key_id: [u8; KEY_ID_LEN] = reader.array()?;
    let secret_key: Zeroizing<[u8; SECRET_KEY_LEN]> = Zeroizing::new(reader.array()?);
    let public_key: [u8; PUBLIC_KEY_LEN] = match layout {
        Layout::Extended => reader.array()?,
        Layout::Minisign => {
            let mut public_key = [0u8; PUBLIC_KEY_LEN];
            public_key.copy_from_slice(&secret_key[SECRET_KEY_LEN - PUBLIC_KEY_LEN..]);
            public_key
        }
    };
    debug_assert_eq!(reader.pos, layout.checksum_offset());
    let checksum: [u8; CHECKSUM_LEN] = reader.array()?;
    reader.finish()?;

    Ok(KeyMaterial {
        key_id,
        secret_key,
        public_key,
        checksum,
    })
}

/// Lay out an unmasked remainder
pub fn join_remainder(
    layout: Layout,
    key_id: &[u8; KEY_ID_LEN],
    secret_key: &[u8; SECRET_KEY_LEN],
    public_key: &[u8; PUBLIC_KEY_LEN],
    checksum: &[u8; CHECKSUM_LEN],
) -> SecureBytes {
    let mut plain = SecureBytes::zeroed(layout.remainder_len());
    plain[KEY_ID_OFFSET..SECRET_KEY_OFFSET].copy_from_slice(key_id);
    plain[SECRET_KEY_OFFSET..SECRET_KEY_OFFSET + SECRET_KEY_LEN].copy_from_slice(secret_key);
    if layout == Layout::Extended {
        plain[EXTENDED_PUBLIC_KEY_OFFSET..EXTENDED_CHECKSUM_OFFSET].copy_from_slice(public_key);
    }
    let checksum_offset = layout.checksum_offset();
    plain[checksum_offset..checksum_offset + CHECKSUM_LEN].copy_from_slice(checksum);
    plain
}

/// XOR `mask` into `buf` position by position.
///
/// Only `min(buf.len(), mask.len())` bytes change; bytes past the end of
/// the mask are left as they are.
pub fn apply_mask(buf: &mut [u8], mask: &[u8]) {
    for (byte, m) in buf.iter_mut().zip(mask) {
        *byte ^= m;
    }
}

/// Bounds-checked cursor over a payload
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| {
                MinikeyError::Format(format!("truncated field at offset {} ({} bytes)", self.pos, len))
            })?;
        let field = &self.buf[self.pos..end];
        self.pos = end;
        Ok(field)
    }

    fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let offset = self.pos;
        <[u8; N]>::try_from(self.take(N)?).map_err(|_| {
            MinikeyError::Format(format!("cannot unpack {}-byte field at offset {}", N, offset))
        })
    }

    fn u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn finish(&self) -> Result<()> {
        if self.pos != self.buf.len() {
            return Err(MinikeyError::Format(format!(
                "{} trailing bytes",
                self.buf.len() - self.pos
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload(layout: Layout) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(b"EdScB2");
        payload.extend_from_slice(&[0x5a; SALT_LEN]);
        payload.extend_from_slice(&0x0008_0000u32.to_le_bytes());
        payload.extend_from_slice(&[0xff; 4]);
        payload.extend_from_slice(&0x0100_0000u32.to_le_bytes());
        payload.extend_from_slice(&[0xee; 4]);
        payload.extend((0..layout.remainder_len()).map(|i| i as u8));
        payload
    }

    #[test]
    fn test_payload_lengths() {
        assert_eq!(Layout::Extended.payload_len(), 190);
        assert_eq!(Layout::Extended.remainder_len(), 136);
        assert_eq!(Layout::Minisign.payload_len(), 158);
        assert_eq!(Layout::Minisign.remainder_len(), 104);
        assert_eq!(Layout::from_payload_len(190), Some(Layout::Extended));
        assert_eq!(Layout::from_payload_len(158), Some(Layout::Minisign));
        assert_eq!(Layout::from_payload_len(189), None);
    }

    #[test]
    fn test_parse_fixed_offsets() {
        let payload = sample_payload(Layout::Extended);
        let encoded = EncodedSecretKey::parse(&payload).unwrap();

        assert_eq!(encoded.layout, Layout::Extended);
        assert_eq!(&encoded.signature_algorithm, b"Ed");
        assert_eq!(&encoded.kdf_algorithm, b"Sc");
        assert_eq!(&encoded.checksum_algorithm, b"B2");
        assert_eq!(encoded.salt, [0x5a; SALT_LEN]);
        assert_eq!(encoded.ops_limit, 524_288);
        assert_eq!(encoded.mem_limit, 16_777_216);
        assert_eq!(&*encoded.remainder, &payload[HEADER_LEN..]);
    }

    #[test]
    fn test_reserved_bytes_ignored_and_written_as_zero() {
        let payload = sample_payload(Layout::Minisign);
        let encoded = EncodedSecretKey::parse(&payload).unwrap();
        let bytes = encoded.to_bytes();

        assert_eq!(bytes.len(), Layout::Minisign.payload_len());
        assert_eq!(&bytes[42..46], &[0u8; 4]);
        assert_eq!(&bytes[50..54], &[0u8; 4]);
        assert_eq!(&bytes[..42], &payload[..42]);
        assert_eq!(&bytes[46..50], &payload[46..50]);
        assert_eq!(&bytes[HEADER_LEN..], &payload[HEADER_LEN..]);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let mut payload = sample_payload(Layout::Extended);
        payload.pop();
        assert!(matches!(EncodedSecretKey::parse(&payload), Err(MinikeyError::Format(_))));
        assert!(matches!(EncodedSecretKey::parse(&[]), Err(MinikeyError::Format(_))));
    }

    #[test]
    fn test_remainder_extended_offsets() {
        let key_id = [1u8; KEY_ID_LEN];
        let secret_key = [2u8; SECRET_KEY_LEN];
        let public_key = [3u8; PUBLIC_KEY_LEN];
        let checksum = [4u8; CHECKSUM_LEN];

        let plain = join_remainder(Layout::Extended, &key_id, &secret_key, &public_key, &checksum);
        assert_eq!(&plain[0..8], &key_id);
        assert_eq!(&plain[8..72], &secret_key);
        assert_eq!(&plain[72..104], &public_key);
        assert_eq!(&plain[104..136], &checksum);

        let material = split_remainder(Layout::Extended, &plain).unwrap();
        assert_eq!(material.key_id, key_id);
        assert_eq!(*material.secret_key, secret_key);
        assert_eq!(material.public_key, public_key);
        assert_eq!(material.checksum, checksum);
    }

    #[test]
    fn test_remainder_minisign_offsets() {
        let key_id = [1u8; KEY_ID_LEN];
        let mut secret_key = [2u8; SECRET_KEY_LEN];
        secret_key[32..].copy_from_slice(&[3u8; PUBLIC_KEY_LEN]);
        let checksum = [4u8; CHECKSUM_LEN];

        let plain = join_remainder(Layout::Minisign, &key_id, &secret_key, &[3u8; PUBLIC_KEY_LEN], &checksum);
        assert_eq!(plain.len(), 104);
        assert_eq!(&plain[72..104], &checksum);

        let material = split_remainder(Layout::Minisign, &plain).unwrap();
        assert_eq!(material.public_key, [3u8; PUBLIC_KEY_LEN]);
        assert_eq!(material.checksum, checksum);
    }

    #[test]
    fn test_split_rejects_short_remainder() {
        let plain = [0u8; 100];
        assert!(matches!(split_remainder(Layout::Minisign, &plain), Err(MinikeyError::Format(_))));
    }

    #[test]
    fn test_mask_leaves_tail_untouched() {
        let mut buf = [0x0fu8; 6];
        apply_mask(&mut buf, &[0xf0, 0xf0, 0xf0, 0xf0]);
        assert_eq!(buf, [0xff, 0xff, 0xff, 0xff, 0x0f, 0x0f]);

        apply_mask(&mut buf, &[0xf0, 0xf0, 0xf0, 0xf0]);
        assert_eq!(buf, [0x0f; 6]);
    }
}
