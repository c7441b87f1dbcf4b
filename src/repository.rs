use crate::puzzle::PuzzleRecord;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("failed to read puzzle store '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("puzzle store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("puzzle store must be a JSON object keyed by puzzle id")]
    NotKeyedById,
    #[error("puzzle '{0}' must be a JSON object")]
    RecordNotObject(String),
}

/// Read-only access to stored puzzle records.
pub trait PuzzleRepository {
    fn fetch_all_puzzles(&self) -> Result<Vec<PuzzleRecord>, RepositoryError>;

    /// `Ok(None)` when no puzzle is stored under `id`.
    fn fetch_puzzle(&self, id: &str) -> Result<Option<PuzzleRecord>, RepositoryError> {
        Ok(self
            .fetch_all_puzzles()?
            .into_iter()
            .find(|record| record.id == id))
    }
}

/// Parses a store export: `{ "<id>": { <fields> }, ... }`.
pub fn load_records_from_str(data: &str) -> Result<Vec<PuzzleRecord>, RepositoryError> {
    let Value::Object(documents) = serde_json::from_str::<Value>(data)? else {
        return Err(RepositoryError::NotKeyedById);
    };
    documents
        .into_iter()
        .map(|(id, fields)| match fields {
            Value::Object(fields) => Ok(PuzzleRecord::new(id, fields)),
            _ => Err(RepositoryError::RecordNotObject(id)),
        })
        .collect()
}

pub fn load_records_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<PuzzleRecord>, RepositoryError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|source| RepositoryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_records_from_str(&data)
}

/// A JSON export of the puzzle collection on disk.
#[derive(Clone, Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PuzzleRepository for JsonFileRepository {
    fn fetch_all_puzzles(&self) -> Result<Vec<PuzzleRecord>, RepositoryError> {
        load_records_from_file(&self.path)
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryRepository {
    records: Vec<PuzzleRecord>,
}

impl InMemoryRepository {
    pub fn new(records: Vec<PuzzleRecord>) -> Self {
        Self { records }
    }
}

impl PuzzleRepository for InMemoryRepository {
    fn fetch_all_puzzles(&self) -> Result<Vec<PuzzleRecord>, RepositoryError> {
        Ok(self.records.clone())
    }
}

/// Default store location: `<data dir>/ranklr/puzzles.json`.
pub fn default_store_path() -> Option<PathBuf> {
    dirs::data_dir().map(|mut path| {
        path.push("ranklr");
        path.push("puzzles.json");
        path
    })
}
