//! Pipeline state, one type per stage.
//!
//! Only the stage functions in [`crate::stages`] construct the intermediate
//! types, which keeps every field's producer unique.

use docqa_vector_store::Document;
use serde::{Deserialize, Serialize};

/// The finished record of one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagState {
    /// The question as asked.
    pub question: String,

    /// Retrieved chunks, most similar first. May be empty.
    pub docs: Vec<Document>,

    /// The model's answer, or the fallback message when nothing was retrieved.
    pub answer: String,

    /// Heuristic confidence in [0, 1], derived from the number of chunks.
    pub confidence: f64,
}

/// State after retrieval.
#[derive(Debug, Clone)]
pub struct Retrieved {
    pub(crate) question: String,
    pub(crate) docs: Vec<Document>,
}

/// State after the empty-result check.
///
/// `answer` is set only when the check short-circuited with the fallback.
#[derive(Debug, Clone)]
pub struct Checked {
    pub(crate) question: String,
    pub(crate) docs: Vec<Document>,
    pub(crate) answer: Option<String>,
}

/// State after answering.
#[derive(Debug, Clone)]
pub struct Answered {
    pub(crate) question: String,
    pub(crate) docs: Vec<Document>,
    pub(crate) answer: String,
}
