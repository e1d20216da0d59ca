//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Uses JOINs for list operations (no N+1)
//! - Existence checks and mutations share one transaction
//! - Dropping a transaction on error rolls it back

pub mod categories;
pub mod questions;
pub mod responses;

pub use categories::{Category, CategoryRepo};
pub use questions::{Question, QuestionRepo};
pub use responses::{ResponseRepo, Statistic, SurveyResponse};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// A counter would drop below zero: the statistic drifted from the
    /// responses it summarizes.
    #[error("statistic for question {question_id} is inconsistent: {counter} is already zero")]
    CounterUnderflow {
        question_id: i64,
        counter: &'static str,
    },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: i64) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}
