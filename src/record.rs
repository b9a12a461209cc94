//! Fixed-size record table that follows the container header.
//!
//! Each record is 160 bytes. The name field starts at byte 0 and the
//! encoded identifier occupies the last 16 bytes. The table has no
//! sentinel; the header's count is the only bound, and it is trusted only
//! as far as the buffer reaches.

use crate::guid::{self, GuidError, StorageId, GUID_LEN};
use crate::header::HEADER_SIZE;

/// Size of one record slot.
pub const RECORD_LEN: usize = 160;

/// Longest name [`encode_record`] can store and still have the scan stop
/// on the double-zero terminator before the identifier field.
pub const MAX_NAME_LEN: usize = RECORD_LEN - GUID_LEN - 2;

/// Borrowed view of one record inside the container buffer.
///
/// Usually [`RECORD_LEN`] bytes; the last record of a short file may be
/// shorter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub index: usize,
    pub offset: usize,
    pub bytes: &'a [u8],
}

impl<'a> RawRecord<'a> {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_short(&self) -> bool {
        self.bytes.len() < RECORD_LEN
    }

    pub fn display_name(&self) -> Vec<u8> {
        extract_display_name(self.bytes)
    }

    pub fn encoded_id(&self) -> Result<&'a [u8], GuidError> {
        extract_encoded_id(self.bytes)
    }

    pub fn storage_id(&self) -> Result<StorageId, GuidError> {
        guid::transcode(self.encoded_id()?)
    }
}

/// Recover the display name from the front of a record.
///
/// Single zero bytes between characters are skipped. Two zeros without a
/// non-zero byte in between end the name. The last byte of the record is
/// never scanned.
pub fn extract_display_name(record: &[u8]) -> Vec<u8> {
    let mut name = Vec::new();
    let mut zero_run = 0usize;

    let end = record.len().saturating_sub(1);
    for &byte in &record[..end] {
        if zero_run >= 2 {
            break;
        }
        if byte == 0 {
            zero_run += 1;
        } else {
            // a lone zero is a separator, not a terminator
            if zero_run > 0 {
                zero_run -= 1;
            }
            name.push(byte);
        }
    }

    name
}

/// The last 16 bytes of a record, untouched.
pub fn extract_encoded_id(record: &[u8]) -> Result<&[u8], GuidError> {
    if record.len() < GUID_LEN {
        return Err(GuidError::InvalidLength { len: record.len() });
    }
    Ok(&record[record.len() - GUID_LEN..])
}

/// Build a full record slot holding `name` and `id`.
///
/// Returns `None` if the name is too long or contains a zero byte, since the
/// name scan could not recover it.
pub fn encode_record(name: &[u8], id: &StorageId) -> Option<[u8; RECORD_LEN]> {
    if name.len() > MAX_NAME_LEN || name.contains(&0) {
        return None;
    }
    let mut slot = [0u8; RECORD_LEN];
    slot[..name.len()].copy_from_slice(name);
    slot[RECORD_LEN - GUID_LEN..].copy_from_slice(&id.to_encoded());
    Some(slot)
}

// ── Iterator ─────────────────────────────────────────────────────────────────

/// Lazy walk over the record table.
///
/// Yields at most `declared` records and stops early, without error, once a
/// record would start at or past the end of the buffer.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    data: &'a [u8],
    declared: usize,
    index: usize,
}

impl<'a> Records<'a> {
    pub fn new(data: &'a [u8], declared: u16) -> Self {
        Self {
            data,
            declared: declared as usize,
            index: 0,
        }
    }

    /// Records the buffer can actually supply, counting a shortened last one.
    pub fn available(data: &[u8], declared: u16) -> usize {
        fit_in(data.len()).min(declared as usize)
    }
}

fn fit_in(len: usize) -> usize {
    len.saturating_sub(HEADER_SIZE).div_ceil(RECORD_LEN)
}

impl<'a> Iterator for Records<'a> {
    type Item = RawRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.declared {
            return None;
        }
        let start = HEADER_SIZE + self.index * RECORD_LEN;
        if start >= self.data.len() {
            self.index = self.declared;
            return None;
        }
        let end = (start + RECORD_LEN).min(self.data.len());
        let record = RawRecord {
            index: self.index,
            offset: start,
            bytes: &self.data[start..end],
        };
        self.index += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = fit_in(self.data.len())
            .min(self.declared)
            .saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Records<'_> {}

impl std::iter::FusedIterator for Records<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::ContainerHeader;

    fn table(declared: u16, records: usize, tail: usize) -> Vec<u8> {
        let mut data = ContainerHeader::new(declared).to_bytes().to_vec();
        data.resize(HEADER_SIZE + records * RECORD_LEN + tail, 0x41);
        data
    }

    #[test]
    fn single_zero_is_absorbed() {
        let mut record = b"AB\0CD\0\0EF".to_vec();
        record.resize(RECORD_LEN, 0x7A);
        assert_eq!(extract_display_name(&record), b"ABCD");
    }

    #[test]
    fn alternating_zeros_keep_going() {
        let mut record = b"S\0A\0V\0E\0\0\0X".to_vec();
        record.resize(RECORD_LEN, 0);
        assert_eq!(extract_display_name(&record), b"SAVE");
    }

    #[test]
    fn no_zero_takes_all_but_last_byte() {
        let record: Vec<u8> = (1..=RECORD_LEN as u8).collect();
        let name = extract_display_name(&record);
        assert_eq!(name.len(), RECORD_LEN - 1);
        assert_eq!(name, &record[..RECORD_LEN - 1]);
    }

    #[test]
    fn last_byte_never_scanned() {
        assert_eq!(extract_display_name(b"Q"), b"");
        assert_eq!(extract_display_name(b""), b"");
        assert_eq!(extract_display_name(b"AB"), b"A");
    }

    #[test]
    fn leading_double_zero_is_empty_name() {
        let mut record = vec![0u8, 0, b'A', b'B'];
        record.resize(RECORD_LEN, 1);
        assert!(extract_display_name(&record).is_empty());
    }

    #[test]
    fn identifier_is_last_sixteen_bytes() {
        let mut record = b"NAME\0\0".to_vec();
        record.resize(RECORD_LEN - GUID_LEN, 0);
        let tail: Vec<u8> = (100..116).collect();
        record.extend_from_slice(&tail);
        assert_eq!(extract_encoded_id(&record).unwrap(), &tail[..]);

        // unaffected by where the name scan stops
        let no_zero = vec![0x55u8; RECORD_LEN];
        assert_eq!(extract_encoded_id(&no_zero).unwrap(), &no_zero[RECORD_LEN - 16..]);
    }

    #[test]
    fn short_record_identifier_fails() {
        assert_eq!(
            extract_encoded_id(&[1u8; 10]),
            Err(GuidError::InvalidLength { len: 10 })
        );
    }

    #[test]
    fn iterator_offsets() {
        let data = table(3, 3, 0);
        let offsets: Vec<usize> = Records::new(&data, 3).map(|r| r.offset).collect();
        assert_eq!(offsets, vec![8, 168, 328]);
        assert!(Records::new(&data, 3).all(|r| r.len() == RECORD_LEN));
    }

    #[test]
    fn overstated_count_stops_at_buffer_end() {
        let data = table(10, 7, 0);
        let records: Vec<_> = Records::new(&data, 10).collect();
        assert_eq!(records.len(), 7);
        assert_eq!(Records::new(&data, 10).len(), 7);
    }

    #[test]
    fn overstated_count_with_partial_tail() {
        let data = table(10, 7, 40);
        let records: Vec<_> = Records::new(&data, 10).collect();
        assert_eq!(records.len(), 8);
        let last = records.last().unwrap();
        assert!(last.is_short());
        assert_eq!(last.len(), 40);
    }

    #[test]
    fn understated_count_ignores_trailing_records() {
        let data = table(2, 5, 0);
        assert_eq!(Records::new(&data, 2).count(), 2);
    }

    #[test]
    fn header_only_buffer_yields_nothing() {
        let data = table(4, 0, 0);
        assert_eq!(Records::new(&data, 4).next(), None);
    }

    #[test]
    fn encode_record_round_trips_through_scan() {
        let id = StorageId([7u8; 16]);
        let slot = encode_record(b"SAVE1", &id).unwrap();
        assert_eq!(extract_display_name(&slot), b"SAVE1");
        let record = RawRecord { index: 0, offset: 8, bytes: &slot };
        assert_eq!(record.storage_id().unwrap(), id);
    }

    #[test]
    fn encode_record_rejects_unrecoverable_names() {
        let id = StorageId([0u8; 16]);
        assert!(encode_record(b"A\0B", &id).is_none());
        assert!(encode_record(&[b'x'; MAX_NAME_LEN + 1], &id).is_none());
        let slot = encode_record(&[b'x'; MAX_NAME_LEN], &id).unwrap();
        assert_eq!(extract_display_name(&slot).len(), MAX_NAME_LEN);
    }
}
