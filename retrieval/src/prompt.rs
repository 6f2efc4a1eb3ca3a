//! Prompt construction.

use docqa_vector_store::Document;

/// Answer given when retrieval finds nothing.
pub const FALLBACK_ANSWER: &str = "I could not find this information in the provided document.";

/// Build the grounded prompt for `question` from the retrieved chunks.
///
/// Chunk contents are joined with blank lines, in retrieval order.
pub fn build_prompt(question: &str, docs: &[Document]) -> String {
    let context = docs
        .iter()
        .map(|doc| doc.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "\nYou are a helpful AI assistant.\n\
         Answer ONLY using the context below.\n\
         If the answer is not in the context, say you don't know.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question:\n\
         {question}\n"
    )
}
