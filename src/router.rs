//! Query entry point.
//!
//! `Assistant` owns the current [`KnowledgeBase`] snapshot and the embedding
//! provider. `answer` first looks for an enrollment identifier in the query
//! and, when it names an existing student, answers from that record
//! directly; everything else goes through retrieval.
//!
//! Snapshots are published behind `RwLock<Arc<_>>`: a query clones the `Arc`
//! and then runs without holding the lock, `reload` builds the replacement
//! outside the lock and swaps it in.

use std::sync::{Arc, RwLock};

use tracing::{debug, error, info};

use crate::answer;
use crate::config::RetrievalMode;
use crate::embeddings::EmbeddingProvider;
use crate::error::AppError;
use crate::knowledge::{Fragment, KnowledgeBase, StudentFragment};
use crate::records::StudentRecord;
use crate::retrieval::RetrievalEngine;

/// Accepted identifier lengths, in digits.
const ID_MIN_LEN: usize = 7;
const ID_MAX_LEN: usize = 8;

pub struct Assistant {
    kb: RwLock<Arc<KnowledgeBase>>,
    provider: Option<EmbeddingProvider>,
    mode: RetrievalMode,
}

impl Assistant {
    /// Build the knowledge base for `records`. Malformed records are fatal.
    pub fn new(
        records: Vec<StudentRecord>,
        provider: Option<EmbeddingProvider>,
        mode: RetrievalMode,
    ) -> Result<Self, AppError> {
        let kb = KnowledgeBase::build(records, provider.as_ref())?;
        Ok(Self { kb: RwLock::new(Arc::new(kb)), provider, mode })
    }

    /// Answer a free-text question. Never fails: per-query errors become a
    /// user-facing message.
    pub fn answer(&self, query: &str) -> String {
        let kb = self.knowledge();

        if let Some(id) = extract_identifier(query) {
            if let Some(record) = kb.student_by_id(id) {
                debug!(%id, "identifier lookup");
                let view = Fragment::Student(StudentFragment::view_of(record));
                return answer::compose(&[&view]);
            }
            debug!(%id, "identifier not on file, falling back to retrieval");
        }

        let engine = RetrievalEngine::new(&kb, self.provider.as_ref());
        let context = match self.mode {
            RetrievalMode::Semantic => match engine.search_semantic(query) {
                Ok(context) => context,
                Err(e) => {
                    error!(error = %e, "semantic search failed");
                    return format!("Sorry, the search could not be completed: {e}");
                }
            },
            RetrievalMode::Keyword => engine.search_keyword(query),
        };

        answer::compose(&context)
    }

    /// Rebuild the knowledge base from `records` and publish it. Queries
    /// already running keep the snapshot they started with. On error the
    /// current snapshot stays in place.
    pub fn reload(&self, records: Vec<StudentRecord>) -> Result<(), AppError> {
        let kb = Arc::new(KnowledgeBase::build(records, self.provider.as_ref())?);
        let mut guard = self.kb.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = kb;
        info!("knowledge base reloaded");
        Ok(())
    }

    /// Current knowledge base snapshot.
    pub fn knowledge(&self) -> Arc<KnowledgeBase> {
        self.kb
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn provider(&self) -> Option<&EmbeddingProvider> {
        self.provider.as_ref()
    }

    pub fn mode(&self) -> RetrievalMode {
        self.mode
    }
}

/// First comma/whitespace-delimited token made of 7–8 ASCII digits.
///
/// Only the first candidate is considered, and only by length; there is no
/// format or checksum validation.
pub fn extract_identifier(query: &str) -> Option<&str> {
    query
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .find(|t| {
            (ID_MIN_LEN..=ID_MAX_LEN).contains(&t.len()) && t.bytes().all(|b| b.is_ascii_digit())
        })
}
