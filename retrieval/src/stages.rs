//! The four pipeline stages.
//!
//! Each stage takes the previous state by value and returns the next one.

use docqa_llm::LanguageModel;
use docqa_vector_store::VectorStore;
use tracing::debug;

use crate::error::Result;
use crate::prompt::{FALLBACK_ANSWER, build_prompt};
use crate::state::{Answered, Checked, RagState, Retrieved};

/// Base confidence before any evidence.
const BASE_CONFIDENCE: f64 = 0.6;

/// Confidence gained per retrieved chunk.
const CONFIDENCE_PER_DOC: f64 = 0.1;

/// Upper bound on confidence.
const MAX_CONFIDENCE: f64 = 0.95;

/// Fetch the `k` chunks most similar to `question`, keeping the store's order.
pub async fn retrieve(store: &dyn VectorStore, question: String, k: usize) -> Result<Retrieved> {
    let docs = store.query(&question, k).await?;
    debug!("Retrieved {} documents", docs.len());
    Ok(Retrieved { question, docs })
}

/// Short-circuit with the fallback answer when nothing was retrieved.
pub fn check(state: Retrieved) -> Checked {
    let answer = if state.docs.is_empty() {
        debug!("No documents retrieved, using fallback answer");
        Some(FALLBACK_ANSWER.to_string())
    } else {
        None
    };

    Checked {
        question: state.question,
        docs: state.docs,
        answer,
    }
}

/// Ask the model, unless the check already produced an answer.
pub async fn answer(model: &dyn LanguageModel, model_id: &str, state: Checked) -> Result<Answered> {
    let answer = match state.answer {
        Some(answer) => answer,
        None => {
            let prompt = build_prompt(&state.question, &state.docs);
            debug!("Asking {} with {} context documents", model.name(), state.docs.len());
            model.complete(model_id, &prompt).await?
        }
    };

    Ok(Answered {
        question: state.question,
        docs: state.docs,
        answer,
    })
}

/// Attach the confidence score and finish the state.
pub fn score(state: Answered) -> RagState {
    let confidence = confidence_for(state.docs.len());
    debug!("Confidence {confidence} from {} documents", state.docs.len());

    RagState {
        question: state.question,
        docs: state.docs,
        answer: state.answer,
        confidence,
    }
}

/// `round(min(0.6 + 0.1 * n, 0.95), 2)`.
pub fn confidence_for(doc_count: usize) -> f64 {
    let raw = (BASE_CONFIDENCE + CONFIDENCE_PER_DOC * doc_count as f64).min(MAX_CONFIDENCE);
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_vector_store::Document;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_confidence_table() {
        let scores: Vec<f64> = (0..7).map(confidence_for).collect();
        assert_eq!(scores, vec![0.6, 0.7, 0.8, 0.9, 0.95, 0.95, 0.95]);
    }

    #[test]
    fn test_confidence_is_bounded() {
        assert_eq!(confidence_for(usize::MAX), 0.95);
    }

    #[test]
    fn test_check_sets_fallback_on_empty() {
        let checked = check(Retrieved {
            question: "q".to_string(),
            docs: Vec::new(),
        });

        assert_eq!(checked.answer.as_deref(), Some(FALLBACK_ANSWER));
    }

    #[test]
    fn test_check_passes_docs_through() {
        let docs = vec![Document::new("b"), Document::new("a")];
        let checked = check(Retrieved {
            question: "q".to_string(),
            docs: docs.clone(),
        });

        assert_eq!(checked.answer, None);
        assert_eq!(checked.docs, docs);
    }

    #[test]
    fn test_score_keeps_fields() {
        let state = score(Answered {
            question: "q".to_string(),
            docs: vec![Document::new("a")],
            answer: "yes".to_string(),
        });

        assert_eq!(state.question, "q");
        assert_eq!(state.answer, "yes");
        assert_eq!(state.confidence, 0.7);
    }
}
