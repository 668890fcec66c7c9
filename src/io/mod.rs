//! Flat-file adapters: RVR topology files and `id,value` CSV files.
//!
//! All readers take a `BufRead` plus the path used in messages, with thin
//! path-based wrappers on top. Writers go through a temporary sibling file
//! that is renamed into place, so a failed run never leaves a partial output.

pub mod csv;
pub mod rvr;

pub use self::csv::{read_attributes, read_downstream_pairs, write_cumulative};
pub use self::rvr::{read_topology, write_topology, RvrContents};

use crate::graph::TopologyError;
use crate::validation::ValidationReport;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("'{path}': missing node-count header")]
    MissingHeader { path: PathBuf },
    #[error("'{path}' line {line}: {reason}")]
    InvalidRecord { path: PathBuf, line: usize, reason: String },
    #[error("'{path}': {source}")]
    Topology {
        path: PathBuf,
        #[source]
        source: TopologyError,
    },
}

impl FileError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        FileError::Io { path: path.to_path_buf(), source }
    }

    pub(crate) fn invalid(path: &Path, line: usize, reason: impl Into<String>) -> Self {
        FileError::InvalidRecord { path: path.to_path_buf(), line, reason: reason.into() }
    }
}

pub(crate) fn open(path: &Path) -> Result<BufReader<File>, FileError> {
    File::open(path).map(BufReader::new).map_err(|e| FileError::io(path, e))
}

/// Writes `path` atomically: `body` fills a temporary file in the same
/// directory, which replaces `path` only once everything succeeded.
pub(crate) fn write_atomically<F>(path: &Path, body: F) -> Result<(), FileError>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| FileError::io(path, e))?;
    {
        let mut writer = BufWriter::new(&mut tmp);
        body(&mut writer).map_err(|e| FileError::io(path, e))?;
        writer.flush().map_err(|e| FileError::io(path, e))?;
    }
    tmp.persist(path).map_err(|e| FileError::io(path, e.error))?;
    Ok(())
}

/// Writes the validation report as pretty-printed JSON.
pub fn write_report(path: &Path, report: &ValidationReport) -> Result<(), FileError> {
    write_atomically(path, |w| {
        serde_json::to_writer_pretty(&mut *w, report).map_err(io::Error::from)?;
        writeln!(w)
    })?;
    info!(path = %path.display(), errors = report.errors.len(), "Wrote report");
    Ok(())
}
