//! End-to-end tests for the ingestion job.

use std::path::PathBuf;
use std::sync::Arc;

use docqa_embeddings::HashingProvider;
use docqa_ingest::{
    DocumentLoader, IngestError, IngestionConfig, IngestionPipeline,
};
use docqa_vector_store::{PersistentVectorStore, VectorStore};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

async fn open_store(dir: &TempDir) -> PersistentVectorStore {
    PersistentVectorStore::open(dir.path().join("vector_store"), Arc::new(HashingProvider::new()))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_loads_text_with_source_metadata() {
    let path = fixtures_dir().join("agentic_ai.txt");
    let documents = DocumentLoader::new().load(&path).await.unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].source(), Some(path.display().to_string().as_str()));
    assert_eq!(
        documents[0].metadata.get("format"),
        Some(&serde_json::json!("text"))
    );
    assert!(documents[0].content.starts_with("Agentic AI refers to"));
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let err = DocumentLoader::new()
        .load(&fixtures_dir().join("does_not_exist.txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Io { .. }));
}

#[tokio::test]
async fn test_loads_pdf_one_document_per_page() {
    let path = fixtures_dir().join("two_pages.pdf");
    let documents = DocumentLoader::new().load(&path).await.unwrap();

    assert_eq!(documents.len(), 2);
    for (page, document) in documents.iter().enumerate() {
        assert_eq!(document.source(), Some(path.display().to_string().as_str()));
        assert_eq!(document.metadata.get("format"), Some(&serde_json::json!("pdf")));
        assert_eq!(document.metadata.get("page"), Some(&serde_json::json!(page)));
    }

    assert!(documents[0].content.contains("Agentic"));
    assert!(!documents[0].content.contains("Retrieval"));
    assert!(documents[1].content.contains("Retrieval"));
    assert!(!documents[1].content.contains("Agentic"));
}

#[tokio::test]
async fn test_pdf_chunks_keep_their_page() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;

    let report =
        IngestionPipeline::new(IngestionConfig::new(fixtures_dir().join("two_pages.pdf")))
            .unwrap()
            .run(&store)
            .await
            .unwrap();
    assert_eq!(report.documents_loaded, 2);
    assert_eq!(report.chunks_created, 2);

    let docs = store.query("retrieval grounds every answer", 1).await.unwrap();
    assert!(docs[0].content.contains("Retrieval"));
    assert_eq!(docs[0].metadata.get("page"), Some(&serde_json::json!(1)));
    assert_eq!(docs[0].metadata.get("chunk"), Some(&serde_json::json!(0)));
}

#[tokio::test]
async fn test_broken_pdf_is_pdf_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.pdf");
    std::fs::write(&path, b"not a pdf").unwrap();

    let err = DocumentLoader::new().load(&path).await.unwrap_err();
    assert!(matches!(err, IngestError::Pdf(_)));
}

#[tokio::test]
async fn test_ingests_paragraphs_as_chunks() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;

    let pipeline =
        IngestionPipeline::new(IngestionConfig::new(fixtures_dir().join("agentic_ai.txt")))
            .unwrap();
    let report = pipeline.run(&store).await.unwrap();

    assert_eq!(report.documents_loaded, 1);
    assert_eq!(report.chunks_created, 3);
    assert_eq!(report.chunks_stored, 3);
    assert!(temp_dir.path().join("vector_store/manifest.json").exists());

    let docs = store.query("What do agents combine with tools?", 1).await.unwrap();
    assert!(docs[0].content.starts_with("Most agents combine a language model"));
    assert_eq!(docs[0].metadata.get("chunk"), Some(&serde_json::json!(1)));
}

#[tokio::test]
async fn test_ingestion_appends_unless_reset() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;
    let source = fixtures_dir().join("agentic_ai.txt");

    IngestionPipeline::new(IngestionConfig::new(&source))
        .unwrap()
        .run(&store)
        .await
        .unwrap();
    let appended = IngestionPipeline::new(IngestionConfig::new(&source))
        .unwrap()
        .run(&store)
        .await
        .unwrap();
    assert_eq!(appended.chunks_stored, 6);

    let reset = IngestionPipeline::new(IngestionConfig::new(&source).with_reset(true))
        .unwrap()
        .run(&store)
        .await
        .unwrap();
    assert_eq!(reset.chunks_stored, 3);

    let reopened = open_store(&temp_dir).await;
    assert_eq!(reopened.len().await, 3);
}

#[tokio::test]
async fn test_smaller_chunks_overlap() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;

    let report = IngestionPipeline::new(
        IngestionConfig::new(fixtures_dir().join("agentic_ai.txt")).with_chunking(120, 40),
    )
    .unwrap()
    .run(&store)
    .await
    .unwrap();

    assert!(report.chunks_created > 3);
}

#[test]
fn test_overlap_larger_than_size_is_rejected() {
    let result = IngestionPipeline::new(IngestionConfig::new("doc.txt").with_chunking(100, 150));
    assert!(matches!(result, Err(IngestError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_unsupported_format_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir).await;

    let err = IngestionPipeline::new(IngestionConfig::new(fixtures_dir().join("data.csv")))
        .unwrap()
        .run(&store)
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::UnsupportedFormat(_)));
}
