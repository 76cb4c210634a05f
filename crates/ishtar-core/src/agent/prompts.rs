//! Prompt templates for the answer pipeline

use crate::search::SearchHit;

/// Context rendered for prompts: pretty JSON of the hits, `[]` when empty
pub fn context_json(context: &[SearchHit]) -> String {
    if context.is_empty() {
        return "[]".to_string();
    }
    serde_json::to_string_pretty(context).unwrap_or_else(|_| "[]".to_string())
}

pub fn summarize_prompt(query: &str, context: &str) -> String {
    format!(
        r#"You are Ishtar AI. Read the context and answer the user question.
Be concise and cite source titles in brackets where relevant.

Question:
{}

Context (JSON-like lines of doc snippets & metadata):
{}
"#,
        query, context
    )
}

pub fn verify_prompt(draft: &str, context: &str) -> String {
    format!(
        r#"You are a fact checker. Compare the draft with the context.
Return a short verdict: 'OK' if supported by the context, otherwise list specific issues.

Draft:
{}

Context:
{}
"#,
        draft, context
    )
}

pub fn refine_prompt(draft: &str, verdict: &str) -> String {
    format!(
        r#"Refine the draft based on the verifier's verdict.
If 'OK', polish wording. If there are issues, correct them using only the context.

Draft:
{}

Verdict:
{}
"#,
        draft, verdict
    )
}
