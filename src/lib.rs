pub mod header;
pub mod guid;
pub mod record;
pub mod mapping;
pub mod container;
pub mod convert;

pub use header::{ContainerHeader, HeaderError, HEADER_SIZE};
pub use guid::{StorageId, GuidError, transcode};
pub use record::{RawRecord, Records, RECORD_LEN};
pub use mapping::{FileMapping, Mappings};
pub use container::{Container, ContainerError, find_container_file};
pub use convert::{ConvertOptions, ConvertReport, ConvertError, convert_all, copy_mapping};
