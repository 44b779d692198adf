//! Prompt templates

/// Instructions for the grounded answer chain
pub const SYSTEM_PROMPT: &str = "You are Pagewise, a document assistant.

Rules you MUST follow:
- Answer ONLY using the provided context.
- If the answer is not in the context, say: \"I don't know based on the document.\"
- Do NOT use external knowledge.
- Be clear, concise, and factual.
- Cite page numbers when relevant.";

const INTENT_PROMPT: &str = "You are an intent classifier for a document-based assistant.

Classify the user's question into EXACTLY ONE of the following intents:

- DOC_STRICT: The user wants information strictly from the document.
- DOC_ASSISTIVE: The user wants an explanation of concepts mentioned in the document.
- GENERAL_KNOWLEDGE: The user wants a general explanation and explicitly does NOT want to rely on the document.
- CHAT: Casual conversation or greetings.

Return ONLY the intent name.
Do NOT explain your choice.

User question:
";

pub fn intent_prompt(question: &str) -> String {
    format!("{}\"{}\"\n", INTENT_PROMPT, question)
}

pub fn grounded_prompt(context: &str, question: &str) -> String {
    format!(
        "{}\n\nContext:\n{}\n\nQuestion:\n{}\n\nAnswer:\n",
        SYSTEM_PROMPT, context, question
    )
}

pub fn assistive_prompt(question: &str) -> String {
    format!(
        "Provide a clear general explanation.\n\
         Explicitly state this is based on general knowledge.\n\n\
         Question: {}",
        question
    )
}

pub fn summary_prompt(content: &str) -> String {
    format!(
        "Summarize the following document content. \
         Do NOT describe OCR, metadata, or data structures. \
         Only summarize the document itself.\n\n{}",
        content
    )
}
