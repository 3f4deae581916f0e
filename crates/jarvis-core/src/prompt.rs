use crate::types::RetrievalMatch;

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful enterprise AI assistant.";

/// Joins match texts in rank order with a single space, skipping empty texts.
pub fn join_context(matches: &[RetrievalMatch]) -> String {
    matches
        .iter()
        .map(|m| m.metadata.text.as_str())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "{SYSTEM_INSTRUCTION}\n\nUse ONLY the following context to answer.\n\nContext:\n{context}\n\nQuestion:\n{query}\n\nAnswer clearly and concisely."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkMetadata;

    fn hit(id: &str, text: &str) -> RetrievalMatch {
        RetrievalMatch { id: id.into(), score: 1.0, metadata: ChunkMetadata::new(text) }
    }

    #[test]
    fn context_keeps_rank_order_and_skips_empty() {
        let matches = vec![hit("chunk_2", "second"), hit("chunk_9", ""), hit("chunk_0", "first")];
        assert_eq!(join_context(&matches), "second first");
        assert_eq!(join_context(&[]), "");
    }

    #[test]
    fn prompt_has_fixed_layout() {
        let prompt = build_prompt("Jarvis runs locally.", "Where does Jarvis run?");
        assert_eq!(
            prompt,
            "You are a helpful enterprise AI assistant.\n\n\
             Use ONLY the following context to answer.\n\n\
             Context:\nJarvis runs locally.\n\n\
             Question:\nWhere does Jarvis run?\n\n\
             Answer clearly and concisely."
        );
    }
}
