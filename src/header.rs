use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use thiserror::Error;

/// Size of the metadata block in front of the record table.
pub const HEADER_SIZE: usize = 8;

#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("Malformed header: need {HEADER_SIZE} bytes, got {len}")]
    Malformed { len: usize },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// The fixed 8-byte prefix of a container file.
///
/// Only `record_count` carries meaning. `prefix` and `reserved` are kept
/// verbatim so a header can be written back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerHeader {
    pub prefix: [u8; 4],
    pub record_count: u16,
    pub reserved: [u8; 2],
}

impl ContainerHeader {
    pub fn new(record_count: u16) -> Self {
        Self {
            record_count,
            ..Self::default()
        }
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.prefix)?;
        writer.write_u16::<LittleEndian>(self.record_count)?;
        writer.write_all(&self.reserved)?;
        Ok(())
    }

    pub fn read<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut prefix = [0u8; 4];
        reader.read_exact(&mut prefix)?;
        let record_count = reader.read_u16::<LittleEndian>()?;
        let mut reserved = [0u8; 2];
        reader.read_exact(&mut reserved)?;
        Ok(Self {
            prefix,
            record_count,
            reserved,
        })
    }

    /// Parse the header from the start of a container buffer.
    pub fn from_bytes(data: &[u8]) -> Result<Self, HeaderError> {
        if data.len() < HEADER_SIZE {
            return Err(HeaderError::Malformed { len: data.len() });
        }
        Ok(Self::read(&data[..HEADER_SIZE])?)
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..4].copy_from_slice(&self.prefix);
        out[4..6].copy_from_slice(&self.record_count.to_le_bytes());
        out[6..].copy_from_slice(&self.reserved);
        out
    }
}
