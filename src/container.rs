//! High-level [`Container`] API: load a container file and walk its mappings.
//!
//! ```no_run
//! use wsgconv::container::Container;
//!
//! let container = Container::discover("saves/")?;
//! for mapping in container.mappings() {
//!     println!("{}", mapping?);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::header::{ContainerHeader, HeaderError, HEADER_SIZE};
use crate::mapping::{FileMapping, Mappings};
use crate::record::{encode_record, Records, RECORD_LEN};

/// Substring that marks the index file among the save files.
pub const CONTAINER_MARKER: &str = "container.";

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("Cannot find container file in `{}`", .dir.display())]
    NotFound { dir: PathBuf },
    #[error("Cannot read container `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error("Record name cannot be stored: {name:?}")]
    UnencodableName { name: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Locate the container file inside a save directory.
///
/// Entries are checked in file-name order and the first one whose name
/// contains [`CONTAINER_MARKER`] wins.
pub fn find_container_file<P: AsRef<Path>>(dir: P) -> Result<PathBuf, ContainerError> {
    let dir = dir.as_ref();
    let mut names: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name())
        .collect();
    names.sort();

    names
        .into_iter()
        .find(|name| name.to_string_lossy().contains(CONTAINER_MARKER))
        .map(|name| dir.join(name))
        .ok_or_else(|| ContainerError::NotFound { dir: dir.to_owned() })
}

// ── Container ─────────────────────────────────────────────────────────────────

/// A container file held in memory.
///
/// The buffer is never mutated after load, so views into it can be handed
/// to any number of readers.
#[derive(Debug, Clone)]
pub struct Container {
    path: Option<PathBuf>,
    header: ContainerHeader,
    data: Vec<u8>,
}

impl Container {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ContainerError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| ContainerError::Read {
            path: path.to_owned(),
            source,
        })?;
        let mut container = Self::from_bytes(data)?;
        container.path = Some(path.to_owned());
        Ok(container)
    }

    /// Find the container file in `dir` and load it.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Self, ContainerError> {
        let path = find_container_file(dir)?;
        tracing::debug!("found container file: {}", path.display());
        Self::open(path)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ContainerError> {
        let header = ContainerHeader::from_bytes(&data)?;
        let container = Self { path: None, header, data };
        if container.is_truncated() {
            tracing::warn!(
                declared = container.declared_count(),
                available = container.available_count(),
                "record table is shorter than the header declares; decoding what is present"
            );
        }
        Ok(container)
    }

    /// Serialize a container holding `mappings` in order.
    pub fn build(mappings: &[FileMapping]) -> Result<Vec<u8>, ContainerError> {
        let count = u16::try_from(mappings.len()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "too many records for a u16 count")
        })?;
        let mut out = Vec::with_capacity(HEADER_SIZE + mappings.len() * RECORD_LEN);
        ContainerHeader::new(count).write(&mut out)?;
        for m in mappings {
            let slot = encode_record(&m.display_name, &m.storage_id).ok_or_else(|| {
                ContainerError::UnencodableName { name: m.name_lossy().into_owned() }
            })?;
            out.extend_from_slice(&slot);
        }
        Ok(out)
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn declared_count(&self) -> u16 {
        self.header.record_count
    }

    /// Records the buffer really holds, a shortened last one included.
    pub fn available_count(&self) -> usize {
        Records::available(&self.data, self.header.record_count)
    }

    /// The header promises more full records than the buffer holds.
    pub fn is_truncated(&self) -> bool {
        self.data.len() < HEADER_SIZE + self.declared_count() as usize * RECORD_LEN
    }

    // ── Decoding ─────────────────────────────────────────────────────────────

    pub fn records(&self) -> Records<'_> {
        Records::new(&self.data, self.header.record_count)
    }

    pub fn mappings(&self) -> Mappings<'_> {
        Mappings::new(self.records())
    }
}
