//! Knowledge base: fragments of student records plus their embeddings.
//!
//! A `KnowledgeBase` is built once from a record set and never mutated;
//! reloads build a new one and publish it (see [`crate::router::Assistant`]).

pub mod fragmenter;

use tracing::{info, warn};

use crate::embeddings::EmbeddingProvider;
use crate::error::AppError;
use crate::records::{CourseEntry, StudentRecord};

// ── Fragments ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Student,
    Course,
}

/// Identity summary of one student, with the full grade sheet attached.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentFragment {
    pub id: String,
    pub name: String,
    pub program: String,
    pub average: f64,
    pub content: String,
    pub courses: Vec<CourseEntry>,
}

/// One course line, tied to its owning student.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseFragment {
    pub student_id: String,
    pub course_name: String,
    pub content: String,
    pub course: CourseEntry,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Student(StudentFragment),
    Course(CourseFragment),
}

impl Fragment {
    pub fn kind(&self) -> FragmentKind {
        match self {
            Fragment::Student(_) => FragmentKind::Student,
            Fragment::Course(_) => FragmentKind::Course,
        }
    }

    /// Text used for keyword matching and as embedding input.
    pub fn content(&self) -> &str {
        match self {
            Fragment::Student(s) => &s.content,
            Fragment::Course(c) => &c.content,
        }
    }

    /// Identifier of the student this fragment belongs to.
    pub fn student_id(&self) -> &str {
        match self {
            Fragment::Student(s) => &s.id,
            Fragment::Course(c) => &c.student_id,
        }
    }
}

impl StudentFragment {
    /// Direct-lookup view of a record. `content` is left empty: the view is
    /// composed, never matched or embedded.
    pub fn view_of(record: &StudentRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            program: record.program.clone(),
            average: record.average.unwrap_or(0.0),
            content: String::new(),
            courses: record.courses.clone(),
        }
    }
}

// ── Knowledge base ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct KnowledgeBase {
    records: Vec<StudentRecord>,
    fragments: Vec<Fragment>,
    /// Row `i` is the embedding of `fragments[i]`. `None` in keyword-only mode.
    embeddings: Option<Vec<Vec<f32>>>,
}

impl KnowledgeBase {
    /// Fragment `records` and, when a provider is given, embed every fragment.
    ///
    /// Malformed records are fatal. A failing batch encode is not: the base
    /// is built without embeddings and retrieval runs keyword-only.
    pub fn build(
        records: Vec<StudentRecord>,
        provider: Option<&EmbeddingProvider>,
    ) -> Result<Self, AppError> {
        let (fragments, texts) = fragmenter::fragment(&records)?;

        let embeddings = match provider {
            Some(p) => match p.encode_batch(&texts) {
                Ok(rows) if rows.len() == fragments.len() => Some(rows),
                Ok(rows) => {
                    warn!(
                        provider = p.name(),
                        expected = fragments.len(),
                        got = rows.len(),
                        "embedding count mismatch, keyword-only retrieval"
                    );
                    None
                }
                Err(e) => {
                    warn!(provider = p.name(), error = %e, "corpus embedding failed, keyword-only retrieval");
                    None
                }
            },
            None => None,
        };

        info!(
            students = records.len(),
            fragments = fragments.len(),
            embedded = embeddings.is_some(),
            "knowledge base built"
        );

        Ok(Self { records, fragments, embeddings })
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn embeddings(&self) -> Option<&[Vec<f32>]> {
        self.embeddings.as_deref()
    }

    /// Exact identifier lookup; first match in record order.
    pub fn student_by_id(&self, id: &str) -> Option<&StudentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Case-insensitive substring match on the full name; first match wins.
    pub fn student_by_name(&self, name: &str) -> Option<&StudentRecord> {
        let needle = name.to_lowercase();
        self.records
            .iter()
            .find(|r| r.name.to_lowercase().contains(&needle))
    }
}
