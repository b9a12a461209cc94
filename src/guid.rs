//! Storage identifiers: the 16-byte GUID that names each save content file.
//!
//! # Byte order
//! A record stores its identifier in mixed-endian field order: the first
//! three fields (4, 2 and 2 bytes) are little-endian, the trailing 8 bytes
//! are stored as-is. The canonical order used for on-disk file names is the
//! big-endian (RFC 4122 display) order. [`transcode`] converts encoded to
//! canonical, [`encode`] goes back.
//!
//! This is the same reordering `uuid::Uuid::from_bytes_le` performs.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

/// Length of an encoded or canonical identifier.
pub const GUID_LEN: usize = 16;

/// Source position of each canonical output byte.
const PERMUTATION: [usize; GUID_LEN] = [3, 2, 1, 0, 5, 4, 7, 6, 8, 9, 10, 11, 12, 13, 14, 15];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuidError {
    #[error("Invalid identifier length: need {GUID_LEN} bytes, got {len}")]
    InvalidLength { len: usize },
}

// ── StorageId ────────────────────────────────────────────────────────────────

/// A storage identifier in canonical byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageId(pub [u8; GUID_LEN]);

impl StorageId {
    pub fn as_bytes(&self) -> &[u8; GUID_LEN] {
        &self.0
    }

    /// Uppercase hex with no separators. This is the content file's name.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    pub fn to_uuid(&self) -> Uuid {
        Uuid::from_bytes(self.0)
    }

    /// The identifier as it is laid out inside a record.
    pub fn to_encoded(&self) -> [u8; GUID_LEN] {
        encode(&self.0)
    }
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for StorageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl From<Uuid> for StorageId {
    fn from(uuid: Uuid) -> Self {
        StorageId(uuid.into_bytes())
    }
}

// ── Transcoding ──────────────────────────────────────────────────────────────

/// Reorder an encoded identifier into canonical order.
///
/// Only the first 16 bytes are used; fewer is an error.
pub fn transcode(encoded: &[u8]) -> Result<StorageId, GuidError> {
    if encoded.len() < GUID_LEN {
        return Err(GuidError::InvalidLength { len: encoded.len() });
    }
    let mut out = [0u8; GUID_LEN];
    for (dst, &src) in out.iter_mut().zip(PERMUTATION.iter()) {
        *dst = encoded[src];
    }
    Ok(StorageId(out))
}

/// Inverse of [`transcode`]: canonical order back to record order.
pub fn encode(canonical: &[u8; GUID_LEN]) -> [u8; GUID_LEN] {
    let mut out = [0u8; GUID_LEN];
    for (&dst, &byte) in PERMUTATION.iter().zip(canonical.iter()) {
        out[dst] = byte;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
        0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F,
    ];

    #[test]
    fn transcode_swaps_leading_fields() {
        let id = transcode(&SAMPLE).unwrap();
        assert_eq!(
            id.0,
            [
                0x03, 0x02, 0x01, 0x00, 0x05, 0x04, 0x07, 0x06,
                0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F,
            ]
        );
        assert_eq!(id.to_hex(), "030201000504070608090A0B0C0D0E0F");
    }

    #[test]
    fn short_input_is_rejected() {
        assert_eq!(
            transcode(&SAMPLE[..15]),
            Err(GuidError::InvalidLength { len: 15 })
        );
        assert_eq!(transcode(&[]), Err(GuidError::InvalidLength { len: 0 }));
    }

    #[test]
    fn hyphenated_form_matches_uuid_crate() {
        let id = transcode(&SAMPLE).unwrap();
        assert_eq!(
            id.to_uuid().hyphenated().to_string(),
            "03020100-0504-0706-0809-0a0b0c0d0e0f"
        );
    }

    #[test]
    fn display_is_uppercase_hex() {
        let id = StorageId([0xab; 16]);
        assert_eq!(id.to_string(), "AB".repeat(16));
    }

    proptest! {
        #[test]
        fn transcode_is_a_permutation(bytes in proptest::array::uniform16(any::<u8>())) {
            let id = transcode(&bytes).unwrap();
            let mut a = bytes.to_vec();
            let mut b = id.0.to_vec();
            a.sort_unstable();
            b.sort_unstable();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn encode_inverts_transcode(bytes in proptest::array::uniform16(any::<u8>())) {
            let id = transcode(&bytes).unwrap();
            prop_assert_eq!(id.to_encoded(), bytes);
        }

        #[test]
        fn agrees_with_uuid_from_bytes_le(bytes in proptest::array::uniform16(any::<u8>())) {
            let id = transcode(&bytes).unwrap();
            prop_assert_eq!(id, StorageId::from(Uuid::from_bytes_le(bytes)));
        }
    }
}
