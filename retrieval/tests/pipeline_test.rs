//! Behavioural tests for the query pipeline with stub collaborators.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use docqa_llm::LlmError;
use docqa_retrieval::{
    Document, FALLBACK_ANSWER, LanguageModel, RagConfig, RagError, RagPipeline, VectorStore,
    confidence_for,
};
use docqa_vector_store::VectorStoreError;
use pretty_assertions::assert_eq;

/// Store that returns the first `k` of a fixed list and records queries.
struct StubStore {
    docs: Vec<Document>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl StubStore {
    fn new(contents: &[&str]) -> Self {
        Self {
            docs: contents.iter().map(|c| Document::new(*c)).collect(),
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorStore for StubStore {
    async fn query(&self, text: &str, k: usize) -> docqa_vector_store::Result<Vec<Document>> {
        self.queries.lock().unwrap().push((text.to_string(), k));
        Ok(self.docs.iter().take(k).cloned().collect())
    }
}

struct FailingStore;

#[async_trait]
impl VectorStore for FailingStore {
    async fn query(&self, _text: &str, _k: usize) -> docqa_vector_store::Result<Vec<Document>> {
        Err(VectorStoreError::Storage("disk unavailable".to_string()))
    }
}

/// Model that returns a fixed answer and records every call.
struct StubModel {
    answer: String,
    calls: Mutex<Vec<(String, String)>>,
}

impl StubModel {
    fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, model_id: &str, prompt: &str) -> docqa_llm::Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((model_id.to_string(), prompt.to_string()));
        Ok(self.answer.clone())
    }
}

struct FailingModel;

#[async_trait]
impl LanguageModel for FailingModel {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _model_id: &str, _prompt: &str) -> docqa_llm::Result<String> {
        Err(LlmError::ApiRequest {
            status: 401,
            body: "invalid api key".to_string(),
        })
    }
}

const AGENTIC_CHUNKS: [&str; 3] = [
    "Agentic AI systems pursue goals with limited supervision.",
    "They plan, call tools, and observe the results.",
    "Examples include coding agents and research assistants.",
];

fn pipeline(store: Arc<StubStore>, model: Arc<StubModel>) -> RagPipeline {
    RagPipeline::builder()
        .with_store(store)
        .with_model(model)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_answers_from_retrieved_chunks() {
    let store = Arc::new(StubStore::new(&AGENTIC_CHUNKS));
    let model = Arc::new(StubModel::new(
        "Agentic AI refers to autonomous goal-directed systems.",
    ));

    let state = pipeline(store.clone(), model.clone())
        .invoke("What is agentic AI?")
        .await
        .unwrap();

    let contents: Vec<&str> = state.docs.iter().map(|d| d.content.as_str()).collect();
    assert_eq!(contents, AGENTIC_CHUNKS.to_vec());
    assert_eq!(
        state.answer,
        "Agentic AI refers to autonomous goal-directed systems."
    );
    assert_eq!(state.confidence, 0.9);
    assert_eq!(state.question, "What is agentic AI?");
    assert_eq!(
        store.queries.lock().unwrap().clone(),
        vec![("What is agentic AI?".to_string(), 4)]
    );
}

#[tokio::test]
async fn test_empty_store_uses_fallback_without_model_call() {
    let store = Arc::new(StubStore::new(&[]));
    let model = Arc::new(StubModel::new("should not be used"));

    let state = pipeline(store, model.clone())
        .invoke("What is the capital of Mars?")
        .await
        .unwrap();

    assert!(state.docs.is_empty());
    assert_eq!(state.answer, FALLBACK_ANSWER);
    assert_eq!(
        state.answer,
        "I could not find this information in the provided document."
    );
    assert_eq!(state.confidence, 0.6);
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_model_called_once_with_every_chunk_in_order() {
    let store = Arc::new(StubStore::new(&AGENTIC_CHUNKS));
    let model = Arc::new(StubModel::new("answer"));

    pipeline(store, model.clone())
        .invoke("What is agentic AI?")
        .await
        .unwrap();

    let calls = model.calls();
    assert_eq!(calls.len(), 1);

    let (model_id, prompt) = &calls[0];
    assert_eq!(model_id, "llama-3.1-8b-instant");
    assert!(prompt.contains("What is agentic AI?"));

    let positions: Vec<usize> = AGENTIC_CHUNKS
        .iter()
        .map(|chunk| prompt.find(chunk).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(prompt.contains(&AGENTIC_CHUNKS.join("\n\n")));
}

#[tokio::test]
async fn test_confidence_tracks_number_of_chunks() {
    let many = ["a", "b", "c", "d", "e", "f"];
    for k in 0..=6 {
        let store = Arc::new(StubStore::new(&many));
        let model = Arc::new(StubModel::new("answer"));
        let pipeline = RagPipeline::builder()
            .with_store(store)
            .with_model(model)
            .with_retrieval_k(k)
            .build()
            .unwrap();

        let state = pipeline.invoke("question").await.unwrap();
        assert_eq!(state.docs.len(), k);
        assert_eq!(state.confidence, confidence_for(k));
    }
}

#[tokio::test]
async fn test_store_order_is_kept_without_filtering() {
    let store = Arc::new(StubStore::new(&["same", "z first", "same"]));
    let model = Arc::new(StubModel::new("answer"));

    let state = pipeline(store, model).invoke("q").await.unwrap();

    let contents: Vec<&str> = state.docs.iter().map(|d| d.content.as_str()).collect();
    assert_eq!(contents, vec!["same", "z first", "same"]);
}

#[tokio::test]
async fn test_repeated_invocations_are_identical() {
    let store = Arc::new(StubStore::new(&AGENTIC_CHUNKS));
    let model = Arc::new(StubModel::new("answer"));
    let pipeline = pipeline(store, model);

    let first = pipeline.invoke("What is agentic AI?").await.unwrap();
    let second = pipeline.invoke("What is agentic AI?").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_configured_model_id_is_used() {
    let store = Arc::new(StubStore::new(&AGENTIC_CHUNKS));
    let model = Arc::new(StubModel::new("answer"));
    let pipeline = RagPipeline::builder()
        .with_store(store)
        .with_model(model.clone())
        .with_config(RagConfig::new().with_model_id("mixtral-8x7b"))
        .build()
        .unwrap();

    pipeline.invoke("q").await.unwrap();
    assert_eq!(model.calls()[0].0, "mixtral-8x7b");
}

#[tokio::test]
async fn test_model_failure_aborts_invocation() {
    let store = Arc::new(StubStore::new(&AGENTIC_CHUNKS));
    let pipeline = RagPipeline::builder()
        .with_store(store)
        .with_model(Arc::new(FailingModel))
        .build()
        .unwrap();

    let err = pipeline.invoke("q").await.unwrap_err();
    assert!(matches!(
        err,
        RagError::Generation(LlmError::ApiRequest { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_model_failure_is_irrelevant_when_nothing_is_retrieved() {
    let pipeline = RagPipeline::builder()
        .with_store(Arc::new(StubStore::new(&[])))
        .with_model(Arc::new(FailingModel))
        .build()
        .unwrap();

    let state = pipeline.invoke("q").await.unwrap();
    assert_eq!(state.answer, FALLBACK_ANSWER);
}

#[tokio::test]
async fn test_store_failure_aborts_invocation() {
    let model = Arc::new(StubModel::new("answer"));
    let pipeline = RagPipeline::builder()
        .with_store(Arc::new(FailingStore))
        .with_model(model.clone())
        .build()
        .unwrap();

    let err = pipeline.invoke("q").await.unwrap_err();
    assert!(matches!(
        err,
        RagError::Retrieval(VectorStoreError::Storage(_))
    ));
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_whitespace_question_is_passed_through() {
    let store = Arc::new(StubStore::new(&["chunk"]));
    let model = Arc::new(StubModel::new("answer"));

    let state = pipeline(store.clone(), model).invoke("   ").await.unwrap();

    assert_eq!(state.question, "   ");
    assert_eq!(store.queries.lock().unwrap()[0].0, "   ");
}

#[test]
fn test_builder_requires_collaborators() {
    let err = RagPipeline::builder()
        .with_model(Arc::new(StubModel::new("a")))
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, RagError::Config(_)));
}

#[test]
fn test_state_serializes_with_four_fields() {
    let state = docqa_retrieval::RagState {
        question: "q".to_string(),
        docs: vec![Document::new("c")],
        answer: "a".to_string(),
        confidence: 0.7,
    };

    assert_eq!(
        serde_json::to_value(&state).unwrap(),
        serde_json::json!({
            "question": "q",
            "docs": [{"content": "c", "metadata": {}}],
            "answer": "a",
            "confidence": 0.7
        })
    );
}
