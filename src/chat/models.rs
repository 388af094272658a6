//! Transcript entries for a conversation with the RAG assistant.
use serde::{Deserialize, Serialize};

use crate::api::{HistoryTurn, QueryResponse, SourceDocument};

/// Excerpt length for citations, in characters.
pub const SNIPPET_LEN: usize = 100;
pub const SOURCE_PLACEHOLDER: &str = "Source";

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "error")]
    Error,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Error => "error",
        }
    }
}

/// A retrieval hit shown as evidence for an answer.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct SourceCitation {
    pub source_label: String,
    pub snippet: String,
    pub score: f64,
}

impl SourceCitation {
    pub fn from_document(doc: &SourceDocument) -> Self {
        Self {
            source_label: doc.source().unwrap_or(SOURCE_PLACEHOLDER).to_string(),
            snippet: snippet(&doc.text),
            score: doc.score,
        }
    }

    pub fn score_label(&self) -> String {
        format!("{:.2}", self.score)
    }
}

fn snippet(text: &str) -> String {
    let mut out: String = text.chars().take(SNIPPET_LEN).collect();
    out.push_str("...");
    out
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceCitation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
}

impl Message {
    fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
            sources: Vec::new(),
            model: None,
            latency_ms: None,
        }
    }

    pub fn user(content: &str) -> Self {
        Self::new(Role::User, content)
    }

    pub fn error(content: &str) -> Self {
        Self::new(Role::Error, content)
    }

    pub fn assistant(resp: &QueryResponse) -> Self {
        Self {
            role: Role::Assistant,
            content: resp.answer.clone(),
            sources: resp.sources.iter().map(SourceCitation::from_document).collect(),
            model: Some(resp.model_used.clone()),
            latency_ms: Some(resp.latency_ms),
        }
    }
}

/// Append-only record of a conversation. Entries are never edited or
/// reordered once pushed.
#[derive(Default, Clone, Debug)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn messages(&self) -> Vec<Message> {
        self.0.clone()
    }

    pub fn push(&mut self, msg: Message) {
        self.0.push(msg)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Prior user and assistant turns in the shape the backend accepts.
    /// Error entries never leave the client.
    pub fn history(&self) -> Vec<HistoryTurn> {
        self.0
            .iter()
            .filter(|msg| msg.role != Role::Error)
            .map(|msg| HistoryTurn {
                role: msg.role.as_str().to_string(),
                content: msg.content.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> SourceDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn it_labels_citations_with_fallback() {
        let cite = SourceCitation::from_document(&doc(json!({
            "text": "short",
            "metadata": {},
            "score": 0.5
        })));
        assert_eq!(cite.source_label, "Source");
        assert_eq!(cite.snippet, "short...");
        assert_eq!(cite.score_label(), "0.50");
    }

    #[test]
    fn it_truncates_snippets_on_char_boundaries() {
        let text = "é".repeat(150);
        let cite = SourceCitation::from_document(&doc(json!({
            "text": text,
            "metadata": {"source": "accents.txt"},
            "score": 0.123
        })));
        assert_eq!(cite.snippet.chars().count(), SNIPPET_LEN + 3);
        assert!(cite.snippet.ends_with("..."));
        assert_eq!(cite.score_label(), "0.12");
    }

    #[test]
    fn it_builds_assistant_messages() {
        let resp: QueryResponse = serde_json::from_value(json!({
            "answer": "30 days",
            "sources": [{
                "metadata": {"source": "policy.pdf"},
                "text": "Refunds within 30 days...",
                "score": 0.92
            }],
            "model_used": "gpt-x",
            "latency_ms": 420
        }))
        .unwrap();

        let msg = Message::assistant(&resp);
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "30 days");
        assert_eq!(msg.model.as_deref(), Some("gpt-x"));
        assert_eq!(msg.latency_ms, Some(420.0));
        assert_eq!(msg.sources.len(), 1);
        assert_eq!(msg.sources[0].source_label, "policy.pdf");
    }

    #[test]
    fn it_excludes_errors_from_history() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("first"));
        transcript.push(Message::error("Error fetching response."));
        transcript.push(Message::user("second"));

        let history = transcript.history();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|turn| turn.role == "user"));
    }
}
