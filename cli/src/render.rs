//! Terminal rendering of answers and reports.

use docqa_ingest::IngestReport;
use docqa_retrieval::RagState;
use docqa_vector_store::StoreStats;
use owo_colors::OwoColorize;

fn heading(text: &str, color: bool) -> String {
    if color {
        text.bold().underline().to_string()
    } else {
        text.to_string()
    }
}

/// Answer, retrieved chunks and confidence, in that order.
pub fn render_state(state: &RagState, color: bool) -> String {
    let mut out = String::new();

    out.push_str(&heading("Answer", color));
    out.push('\n');
    out.push_str(&state.answer);
    out.push_str("\n\n");

    out.push_str(&heading("Retrieved Context", color));
    out.push('\n');
    for (i, doc) in state.docs.iter().enumerate() {
        let label = format!("Chunk {}", i + 1);
        if color {
            out.push_str(&label.cyan().to_string());
        } else {
            out.push_str(&label);
        }
        out.push('\n');
        out.push_str(&doc.content);
        out.push_str("\n\n");
    }

    let confidence = format!("Confidence: {}", state.confidence);
    if color {
        out.push_str(&confidence.green().to_string());
    } else {
        out.push_str(&confidence);
    }
    out.push('\n');
    out
}

pub fn render_ingest_report(report: &IngestReport, source: &str, location: &str) -> String {
    format!(
        "Ingestion complete: {} chunks from {} document(s) in {source}\n\
         Vector store {location} now holds {} chunks ({} ms)\n",
        report.chunks_created, report.documents_loaded, report.chunks_stored, report.elapsed_ms
    )
}

pub fn render_stats(stats: &StoreStats) -> String {
    let mut out = format!(
        "Location: {}\nDocuments: {}\nEmbedding model: {}\nDimension: {}\n",
        stats.location.display(),
        stats.document_count,
        stats.embedding_model,
        stats.dimension
    );
    if stats.persisted {
        out.push_str(&format!(
            "Created: {}\nUpdated: {}\n",
            stats.created_at.to_rfc3339(),
            stats.updated_at.to_rfc3339()
        ));
    } else {
        out.push_str("Not ingested yet; run `docqa ingest` first\n");
    }
    out
}
