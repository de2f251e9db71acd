// Library root. Exposes the engine for integration tests and other front ends.
// The binary entry point is src/main.rs.

pub mod answer;
pub mod config;
pub mod console;
pub mod embeddings;
pub mod error;
pub mod knowledge;
pub mod logger;
pub mod records;
pub mod report;
pub mod retrieval;
pub mod router;
