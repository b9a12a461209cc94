use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

use crate::guid::{GuidError, StorageId};
use crate::record::{RawRecord, Records};

/// A decoded record: the save's display name and the id of its content file.
///
/// Owns its bytes so it can outlive the container buffer and move to a
/// worker thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMapping {
    #[serde(rename = "name", serialize_with = "lossy_str")]
    pub display_name: Vec<u8>,
    #[serde(rename = "id")]
    pub storage_id: StorageId,
}

fn lossy_str<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

impl FileMapping {
    pub fn new(display_name: impl Into<Vec<u8>>, storage_id: StorageId) -> Self {
        Self {
            display_name: display_name.into(),
            storage_id,
        }
    }

    pub fn decode(record: &RawRecord<'_>) -> Result<Self, GuidError> {
        Ok(Self {
            display_name: record.display_name(),
            storage_id: record.storage_id()?,
        })
    }

    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.display_name)
    }

    /// File name of the content file in the save directory.
    pub fn source_file_name(&self) -> String {
        self.storage_id.to_hex()
    }

    /// File name of the renamed copy. An empty extension adds nothing.
    pub fn dest_file_name(&self, extension: Option<&str>) -> String {
        match extension {
            Some(ext) if !ext.is_empty() => format!("{}.{}", self.name_lossy(), ext),
            _ => self.name_lossy().into_owned(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// List-mode line: `NAME -> HEX`.
impl fmt::Display for FileMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.name_lossy(), self.storage_id)
    }
}

// ── Mappings ─────────────────────────────────────────────────────────────────

/// Decodes each record of a [`Records`] walk into a [`FileMapping`].
///
/// A record too short to hold an identifier yields `Err` for that record
/// only; iteration continues.
#[derive(Debug, Clone)]
pub struct Mappings<'a> {
    records: Records<'a>,
}

impl<'a> Mappings<'a> {
    pub fn new(records: Records<'a>) -> Self {
        Self { records }
    }
}

impl Iterator for Mappings<'_> {
    type Item = Result<FileMapping, GuidError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        let mapping = FileMapping::decode(&record);
        match &mapping {
            Ok(m) => tracing::debug!(index = record.index, offset = record.offset, "decoded {}", m),
            Err(e) => tracing::debug!(index = record.index, offset = record.offset, "undecodable record: {}", e),
        }
        Some(mapping)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl ExactSizeIterator for Mappings<'_> {}
