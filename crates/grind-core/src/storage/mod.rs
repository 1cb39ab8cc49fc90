//! Storage Module
//!
//! SQLite-backed persistence for questions and daily assignments, behind the
//! [`QuestionStore`] trait so the scheduling engine never touches a concrete
//! database handle. Tests substitute the in-memory fake.

mod migrations;
mod sqlite;

#[cfg(test)]
pub(crate) mod memory;

use chrono::NaiveDate;

use crate::question::{Difficulty, Question, SeedQuestion, TodayEntry};

pub use migrations::MIGRATIONS;
pub use sqlite::SqliteStore;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Question not found
    #[error("Question not found: {0}")]
    NotFound(i64),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid timestamp stored in the database
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// Invalid difficulty tier stored in the database
    #[error("Invalid difficulty: {0}")]
    InvalidDifficulty(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StoreError>;

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Abstract persistence operations consumed by the scheduling engine
///
/// Every write is a whole-record operation: a review update either lands
/// completely or not at all, so no partially applied state is ever visible.
pub trait QuestionStore {
    /// All questions in one difficulty tier, in id order
    fn questions_by_tier(&self, tier: Difficulty) -> Result<Vec<Question>>;

    /// Every question, in id order
    fn all_questions(&self) -> Result<Vec<Question>>;

    /// Point lookup by id; `Ok(None)` for an unknown id, distinct from failure
    fn question(&self, id: i64) -> Result<Option<Question>>;

    /// Every question that has been attempted at least once, in id order
    fn attempted_questions(&self) -> Result<Vec<Question>>;

    /// Persist a question's full record after a review
    fn save_question(&self, question: &Question) -> Result<()>;

    /// Bulk-insert new questions, assigning fresh ids; returns how many landed
    fn insert_questions(&self, seeds: &[SeedQuestion]) -> Result<usize>;

    /// The given day's assignments with completion flags, in assignment order
    fn today_assignments(&self, date: NaiveDate) -> Result<Vec<TodayEntry>>;

    /// Record a freshly generated question set for the given day
    fn save_today_assignments(&self, questions: &[Question], date: NaiveDate) -> Result<()>;

    /// Flip one of the day's entries to completed; false if none matched
    fn mark_assignment_completed(&self, question_id: i64, date: NaiveDate) -> Result<bool>;
}
