//! Prompt template shared by every backend.

/// Renders the question-answering prompt.
///
/// The template is fixed; only `context` and `question` vary.
///
/// ```
/// let p = ai_llm_service::prompt::build_rag_prompt("a\nb", "why?");
/// assert!(p.starts_with("Use the following context"));
/// assert!(p.ends_with("Question: why?\nAnswer:"));
/// ```
pub fn build_rag_prompt(context: &str, question: &str) -> String {
    format!(
        "Use the following context to answer the question clearly.\n\n\
         Context:\n{context}\n\n\
         Question: {question}\n\
         Answer:"
    )
}
