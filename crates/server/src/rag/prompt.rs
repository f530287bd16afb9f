//! The fixed grounding prompt.
//!
//! The wording is a behavioral contract: it forbids the model from
//! answering outside the retrieved context and mandates the literal reply
//! "I don't know." when the context is insufficient. Do not edit it without
//! re-validating the grounding behavior.

/// System instruction with a `{context}` placeholder for retrieved passages.
pub const SYSTEM_PROMPT: &str = "You are a strict and concise AI assistant for medical question-answering.\n\
ONLY use the provided context below to answer the user's question.\n\
If the context does not contain enough information to answer the question,\n\
you MUST reply with exactly: \"I don't know.\"\n\
Do NOT try to guess, infer, or use outside knowledge.\n\
Do not reply with a blank response or say 'Kindly Visit nearest Healthcare for professional advice.\n\
Do NOT rephrase irrelevant content. Say: \"I don't know.\"\n\
NEVER assume. NEVER fabricate.\n\n\
{context}";

/// Separator between retrieved passages when stuffed into the prompt.
const PASSAGE_SEPARATOR: &str = "\n\n";

/// Render the system instruction with the retrieved passages substituted in.
#[must_use]
pub fn render_system_prompt(passages: &[String]) -> String {
    SYSTEM_PROMPT.replace("{context}", &join_passages(passages))
}

/// Join retrieved passages into a single context block.
#[must_use]
pub fn join_passages(passages: &[String]) -> String {
    passages.join(PASSAGE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_exact_text() {
        // The grounding contract, character for character.
        let expected = concat!(
            "You are a strict and concise AI assistant for medical question-answering.\n",
            "ONLY use the provided context below to answer the user's question.\n",
            "If the context does not contain enough information to answer the question,\n",
            "you MUST reply with exactly: \"I don't know.\"\n",
            "Do NOT try to guess, infer, or use outside knowledge.\n",
            "Do not reply with a blank response or say 'Kindly Visit nearest Healthcare for professional advice.\n",
            "Do NOT rephrase irrelevant content. Say: \"I don't know.\"\n",
            "NEVER assume. NEVER fabricate.\n",
            "\n",
            "{context}",
        );
        assert_eq!(SYSTEM_PROMPT, expected);
    }

    #[test]
    fn test_render_substitutes_context() {
        let passages = vec![
            "Fever is a rise in body temperature.".to_string(),
            "Normal body temperature is around 37C.".to_string(),
        ];
        let rendered = render_system_prompt(&passages);

        assert!(!rendered.contains("{context}"));
        assert!(rendered.ends_with(
            "Fever is a rise in body temperature.\n\nNormal body temperature is around 37C."
        ));
    }

    #[test]
    fn test_render_with_no_passages() {
        let rendered = render_system_prompt(&[]);
        assert!(!rendered.contains("{context}"));
        assert!(rendered.ends_with("NEVER assume. NEVER fabricate.\n\n"));
    }

    #[test]
    fn test_join_passages() {
        let passages = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(join_passages(&passages), "a\n\nb\n\nc");
    }
}
