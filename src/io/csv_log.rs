//! Shared CSV reading for device and interaction logs

use csv::StringRecord;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure while reading an on-disk log
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{path} has none of the columns {expected:?}")]
    MissingColumn { path: PathBuf, expected: Vec<&'static str> },
}

/// Open a headed CSV log and return its reader and header row
pub fn open_log(path: &Path) -> Result<(csv::Reader<File>, StringRecord), LoadError> {
    let file =
        File::open(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv { path: path.to_path_buf(), source })?
        .clone();

    Ok((reader, headers))
}

/// Index of the first header matching one of `candidates`, case-insensitive
pub fn find_column(headers: &StringRecord, candidates: &[&'static str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|c| headers.iter().position(|h| h.eq_ignore_ascii_case(c)))
}

/// Like [`find_column`] but a miss is a [`LoadError::MissingColumn`]
pub fn require_column(
    path: &Path,
    headers: &StringRecord,
    candidates: &[&'static str],
) -> Result<usize, LoadError> {
    find_column(headers, candidates).ok_or_else(|| LoadError::MissingColumn {
        path: path.to_path_buf(),
        expected: candidates.to_vec(),
    })
}

/// Iterate data rows, turning CSV errors into [`LoadError::Csv`]
pub fn rows<'a>(
    path: &'a Path,
    reader: &'a mut csv::Reader<File>,
) -> impl Iterator<Item = Result<StringRecord, LoadError>> + 'a {
    reader
        .records()
        .map(move |r| r.map_err(|source| LoadError::Csv { path: path.to_path_buf(), source }))
}
