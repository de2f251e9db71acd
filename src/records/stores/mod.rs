//! Record store backends.
//!
//! `RecordStore` is an enum over concrete backends, the same way the
//! embedding providers are dispatched. Adding a backend = new module + new
//! variant + new `load` arm.
//!
//! All backends share one contract: an unreachable source yields an empty
//! record set (logged), malformed data is a `DataIntegrity` error.

pub mod json;
#[cfg(feature = "isqlite")]
pub mod sqlite;

use crate::config::{RecordSourceKind, RecordsConfig};
use crate::error::AppError;
use crate::records::StudentRecord;

#[derive(Debug, Clone)]
pub enum RecordStore {
    Json(json::JsonRecordStore),
    #[cfg(feature = "isqlite")]
    Sqlite(sqlite::SqliteRecordStore),
}

impl RecordStore {
    /// Read every student record, in source order.
    pub fn load(&self) -> Result<Vec<StudentRecord>, AppError> {
        match self {
            RecordStore::Json(s) => s.load(),
            #[cfg(feature = "isqlite")]
            RecordStore::Sqlite(s) => s.load(),
        }
    }
}

/// Construct the configured record store.
pub fn build(config: &RecordsConfig) -> Result<RecordStore, AppError> {
    match config.source {
        RecordSourceKind::Json => Ok(RecordStore::Json(json::JsonRecordStore::new(&config.path))),
        #[cfg(feature = "isqlite")]
        RecordSourceKind::Sqlite => Ok(RecordStore::Sqlite(sqlite::SqliteRecordStore::new(
            &config.path,
        ))),
        #[cfg(not(feature = "isqlite"))]
        RecordSourceKind::Sqlite => Err(AppError::Config(
            "record source \"sqlite\" requires the `isqlite` feature".into(),
        )),
    }
}
