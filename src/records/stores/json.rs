//! JSON file record store.
//!
//! File shape: `{ "estudiantes": [ <StudentRecord>, … ] }`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::AppError;
use crate::records::StudentRecord;

#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    path: PathBuf,
}

#[derive(Deserialize)]
struct RawFile {
    #[serde(rename = "estudiantes", default)]
    students: Vec<StudentRecord>,
}

impl JsonRecordStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn load(&self) -> Result<Vec<StudentRecord>, AppError> {
        info!(path = %self.path.display(), "loading student records");
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "record file not found, starting with no records");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        parse(&raw).map_err(|e| {
            AppError::DataIntegrity(format!("{}: {e}", self.path.display()))
        })
    }
}

/// Parse the contents of a record file.
pub fn parse(raw: &str) -> Result<Vec<StudentRecord>, serde_json::Error> {
    serde_json::from_str::<RawFile>(raw).map(|f| f.students)
}
