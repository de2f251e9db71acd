//! Retrieval over a [`KnowledgeBase`].
//!
//! Two strategies, both capped at [`TOP_K`] fragments and deterministic for
//! a given query and knowledge base:
//!
//! - **keyword**: substring matching on identifiers, names, course names
//!   and the grade/attendance intent words.
//! - **semantic**: cosine similarity between the query embedding and every
//!   fragment embedding. Falls back to keyword when there is no provider or
//!   no embedding matrix.

use tracing::debug;

use crate::embeddings::{cosine_similarity, EmbeddingProvider};
use crate::error::AppError;
use crate::knowledge::{Fragment, KnowledgeBase};

/// Maximum number of fragments either strategy returns.
pub const TOP_K: usize = 3;

/// Words that mark a question about grades or attendance. Matched as
/// substrings, so `"asistencias"` matches `"asistencia"`.
const INTENT_WORDS: [&str; 2] = ["calificacion", "asistencia"];

/// Borrowing view pairing a knowledge base with an optional provider.
pub struct RetrievalEngine<'a> {
    kb: &'a KnowledgeBase,
    provider: Option<&'a EmbeddingProvider>,
}

impl<'a> RetrievalEngine<'a> {
    pub fn new(kb: &'a KnowledgeBase, provider: Option<&'a EmbeddingProvider>) -> Self {
        Self { kb, provider }
    }

    /// Keyword strategy.
    ///
    /// Student fragments match on identifier or full name. Course fragments
    /// match on course name or an intent word, and are then kept only when
    /// the query names their owner or names no student at all. Results
    /// follow fragment order; the cap is applied after collection.
    pub fn search_keyword(&self, query: &str) -> Vec<&'a Fragment> {
        let query = query.to_lowercase();
        let kb = self.kb;
        let mentions_any_student = kb.records().iter().any(|r| {
            query.contains(&r.name.to_lowercase()) || query.contains(&r.id.to_lowercase())
        });

        let mut results: Vec<&'a Fragment> = Vec::new();
        for fragment in kb.fragments() {
            let include = match fragment {
                Fragment::Student(s) => {
                    query.contains(&s.id.to_lowercase()) || query.contains(&s.name.to_lowercase())
                }
                Fragment::Course(c) => {
                    let topical = query.contains(&c.course_name.to_lowercase())
                        || INTENT_WORDS.iter().any(|w| query.contains(w));
                    topical && (owner_mentioned(kb, &c.student_id, &query) || !mentions_any_student)
                }
            };
            if include && !results.iter().any(|r| std::ptr::eq(*r, fragment)) {
                results.push(fragment);
            }
        }

        debug!(matched = results.len(), "keyword search");
        results.truncate(TOP_K);
        results
    }

    /// Semantic strategy. A provider failure is returned to the caller; there
    /// is no fallback once a query has started encoding.
    pub fn search_semantic(&self, query: &str) -> Result<Vec<&'a Fragment>, AppError> {
        let (provider, matrix) = match (self.provider, self.kb.embeddings()) {
            (Some(p), Some(m)) if !m.is_empty() => (p, m),
            _ => {
                debug!("no embeddings available, keyword search");
                return Ok(self.search_keyword(query));
            }
        };

        let query_vec = provider.encode(query)?;
        let mut scored: Vec<(usize, f32)> = matrix
            .iter()
            .enumerate()
            .map(|(i, row)| (i, cosine_similarity(&query_vec, row)))
            .collect();
        // Stable: equal scores keep fragment order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let fragments = self.kb.fragments();
        let top: Vec<&'a Fragment> = scored
            .into_iter()
            .take(TOP_K)
            .map(|(i, _)| &fragments[i])
            .collect();
        debug!(returned = top.len(), "semantic search");
        Ok(top)
    }
}

/// Does the (lower-cased) query mention the student who owns `student_id`?
fn owner_mentioned(kb: &KnowledgeBase, student_id: &str, query: &str) -> bool {
    kb.fragments()
        .iter()
        .find_map(|f| match f {
            Fragment::Student(s) if s.id == student_id => Some(s),
            _ => None,
        })
        .is_some_and(|s| {
            query.contains(&s.name.to_lowercase()) || query.contains(&s.id.to_lowercase())
        })
}
