//! Fallback escalation: the last-resort path when no intent matched.
//!
//! A fixed three-tier cascade, each tier attempted at most once per turn:
//! (a) the external knowledge collaborator; (b) question-shaped or multi-word
//! text goes to web search with a "searching" message; (c) a lone
//! unrecognized word gets the same search with the degraded message.

use std::sync::Arc;

use tracing::debug;

use crate::bridge::{ActionBus, KnowledgeSource};

pub struct FallbackEscalator {
    knowledge: Arc<dyn KnowledgeSource>,
    bus: Arc<dyn ActionBus>,
}

impl FallbackEscalator {
    pub fn new(knowledge: Arc<dyn KnowledgeSource>, bus: Arc<dyn ActionBus>) -> Self {
        Self { knowledge, bus }
    }

    fn search_url(query: &str) -> String {
        format!("https://www.bing.com/search?q={}", urlencoding::encode(query))
    }

    /// Always produces a response string; a failed or absent knowledge
    /// collaborator is indistinguishable from "cannot answer".
    pub async fn escalate(&self, text: &str) -> String {
        debug!(text, "local intent match failed, escalating");

        if let Some(answer) = self.knowledge.ask(text).await {
            return answer;
        }

        let lower = text.to_lowercase();
        self.bus.open_url(&Self::search_url(text));

        if lower.starts_with("what is") || lower.starts_with("who is") {
            format!("Searching the internet for {text}.")
        } else if text.split_whitespace().count() > 1 {
            format!("Searching Bing for {text}.")
        } else {
            "Neural link disconnected. Launching standard data search.".to_string()
        }
    }
}
