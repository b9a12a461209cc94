//! Convert mode: copy each content file to a copy named after its save.
//!
//! # Worker pool
//!
//! [`convert_all`] drains a mapping iterator on a fixed-size Rayon pool
//! (`jobs` threads, 0 = one per CPU) and returns once every mapping has
//! been attempted. Copies finish in no particular order. A failed copy is
//! logged and recorded in the [`ConvertReport`]; it never stops the others.
//!
//! Without the `parallel` feature the same work runs on the calling thread.
//!
//! # Naming
//!
//! | Side | Path |
//! |------|------|
//! | source | `source_dir / <32 uppercase hex digits of the storage id>` |
//! | destination | `dest_dir / <display name>[.<extension>]` |

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::guid::GuidError;
use crate::mapping::FileMapping;

/// Extension the original saves use.
pub const DEFAULT_EXTENSION: &str = "cfg";

// ── Options ──────────────────────────────────────────────────────────────────

/// Configuration for [`convert_all`].
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub source_dir: PathBuf,
    pub dest_dir:   PathBuf,
    /// Appended as `.ext`. `None` or empty keeps the bare display name.
    pub extension:  Option<String>,
    /// Worker threads; 0 lets the pool pick one per CPU.
    pub jobs:       usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            dest_dir:   PathBuf::from("."),
            extension:  Some(DEFAULT_EXTENSION.to_owned()),
            jobs:       0,
        }
    }
}

impl ConvertOptions {
    pub fn source_path(&self, mapping: &FileMapping) -> PathBuf {
        self.source_dir.join(mapping.source_file_name())
    }

    pub fn dest_path(&self, mapping: &FileMapping) -> PathBuf {
        self.dest_dir.join(mapping.dest_file_name(self.extension.as_deref()))
    }
}

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Record cannot be decoded: {0}")]
    Decode(#[from] GuidError),
    #[error("Display name {name:?} is not a usable file name")]
    InvalidDisplayName { name: String },
    #[error("Cannot open source `{}`: {source}", .path.display())]
    OpenSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot create destination `{}`: {source}", .path.display())]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot copy `{}` -> `{}`: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot start worker pool: {0}")]
    Pool(String),
}

// ── Report ───────────────────────────────────────────────────────────────────

/// One successful copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedFile {
    pub from:  PathBuf,
    pub to:    PathBuf,
    pub bytes: u64,
}

/// Outcome of a whole convert run.
#[derive(Debug, Default)]
pub struct ConvertReport {
    pub copied: Vec<CopiedFile>,
    pub failed: Vec<ConvertError>,
}

impl ConvertReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.copied.iter().map(|c| c.bytes).sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} file(s) copied ({} bytes), {} failed",
            self.copied.len(),
            self.total_bytes(),
            self.failed.len(),
        )
    }

    fn push(&mut self, result: Result<CopiedFile, ConvertError>) {
        match result {
            Ok(copied) => self.copied.push(copied),
            Err(e) => self.failed.push(e),
        }
    }
}

// ── Copy ─────────────────────────────────────────────────────────────────────

fn check_display_name(mapping: &FileMapping) -> Result<(), ConvertError> {
    let name = mapping.name_lossy();
    let unusable = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\']);
    if unusable {
        return Err(ConvertError::InvalidDisplayName { name: name.into_owned() });
    }
    Ok(())
}

/// Copy the content file of one mapping to its renamed destination.
///
/// An existing destination file is overwritten.
pub fn copy_mapping(mapping: &FileMapping, opts: &ConvertOptions) -> Result<CopiedFile, ConvertError> {
    check_display_name(mapping)?;

    let from = opts.source_path(mapping);
    let to   = opts.dest_path(mapping);

    let mut src = File::open(&from).map_err(|source| ConvertError::OpenSource {
        path: from.clone(),
        source,
    })?;
    let mut dst = File::create(&to).map_err(|source| ConvertError::CreateDestination {
        path: to.clone(),
        source,
    })?;
    let bytes = io::copy(&mut src, &mut dst).map_err(|source| ConvertError::Copy {
        from: from.clone(),
        to: to.clone(),
        source,
    })?;

    Ok(CopiedFile { from, to, bytes })
}

fn run_one(
    mapping: Result<FileMapping, GuidError>,
    opts: &ConvertOptions,
) -> Result<CopiedFile, ConvertError> {
    let result = mapping
        .map_err(ConvertError::from)
        .and_then(|m| copy_mapping(&m, opts));
    match &result {
        Ok(c)  => tracing::info!("copied: {} -> {}", c.from.display(), c.to.display()),
        Err(e) => tracing::warn!("{}", e),
    }
    result
}

/// Copy every mapping, in parallel when the `parallel` feature is on.
///
/// Only a pool start-up failure is returned as `Err`; per-mapping failures
/// land in [`ConvertReport::failed`].
pub fn convert_all<I>(mappings: I, opts: &ConvertOptions) -> Result<ConvertReport, ConvertError>
where
    I: Iterator<Item = Result<FileMapping, GuidError>> + Send,
{
    let mut report = ConvertReport::default();

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opts.jobs)
            .thread_name(|i| format!("wsgconv-copy-{i}"))
            .build()
            .map_err(|e| ConvertError::Pool(e.to_string()))?;
        tracing::debug!(threads = pool.current_num_threads(), "copy pool started");

        let results: Vec<Result<CopiedFile, ConvertError>> = pool.install(|| {
            mappings
                .par_bridge()
                .map(|m| run_one(m, opts))
                .collect()
        });
        for r in results {
            report.push(r);
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        for m in mappings {
            report.push(run_one(m, opts));
        }
    }

    Ok(report)
}

/// Destination directory check used before a run.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    let meta = std::fs::metadata(path)?;
    if !meta.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("`{}` is not a directory", path.display()),
        ));
    }
    Ok(())
}
