use std::sync::{Arc, Mutex, MutexGuard};

use super::models::{Message, Transcript};
use crate::api::{QueryRequest, SharedBackend};

pub const QUERY_FAILED: &str = "Error fetching response.";

/// What happened to a call to `ChatSession::submit`.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Blank input, nothing was sent
    Rejected,
    /// Another query is still in flight
    Busy,
    /// The request settled and this entry was appended
    Settled(Message),
}

#[derive(Default)]
struct SessionState {
    transcript: Transcript,
    loading: bool,
    draft: String,
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Held across the backend call. If the submit future is dropped before
/// the reply lands (a caller's timeout or `select!`), the question still
/// gets a terminal error entry and the session stops being busy.
struct InFlight<'a> {
    state: &'a Mutex<SessionState>,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, reply: Message) {
        let mut state = lock(self.state);
        state.transcript.push(reply);
        state.loading = false;
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        tracing::warn!("Query abandoned before the backend answered");
        let mut state = lock(self.state);
        state.transcript.push(Message::error(QUERY_FAILED));
        state.loading = false;
    }
}

/// Owns the transcript for one conversation with the assistant.
///
/// Only one query may be in flight at a time so the reply to a question
/// always lands directly after it. Clones share the same session which
/// lets a UI watch `transcript()` and `is_loading()` while `submit` is
/// awaiting the backend.
#[derive(Clone)]
pub struct ChatSession {
    backend: SharedBackend,
    state: Arc<Mutex<SessionState>>,
}

impl ChatSession {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        lock(&self.state)
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.state().transcript.messages()
    }

    pub fn len(&self) -> usize {
        self.state().transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().transcript.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn draft(&self) -> String {
        self.state().draft.clone()
    }

    pub fn set_draft(&self, text: &str) {
        self.state().draft = text.to_string();
    }

    /// Submit whatever is in the input buffer.
    pub async fn submit_draft(&self) -> Submission {
        let text = self.draft();
        self.submit(&text).await
    }

    /// Start a new conversation. Ignored while a query is in flight so
    /// the pending reply can't land in an unrelated transcript.
    pub fn clear(&self) -> bool {
        let mut state = self.state();
        if state.loading {
            return false;
        }
        state.transcript = Transcript::new();
        true
    }

    pub async fn submit(&self, query: &str) -> Submission {
        if query.trim().is_empty() {
            return Submission::Rejected;
        }

        let request = {
            let mut state = self.state();
            if state.loading {
                tracing::debug!("Ignoring submission while a query is in flight");
                return Submission::Busy;
            }
            let mut request = QueryRequest::new(query);
            request.chat_history = state.transcript.history();

            state.transcript.push(Message::user(query));
            state.loading = true;
            state.draft.clear();
            request
        };
        let in_flight = InFlight {
            state: &*self.state,
            settled: false,
        };

        tracing::debug!("Submitting query: {}", query);
        let reply = match self.backend.query(&request).await {
            Ok(resp) => {
                tracing::debug!(
                    "Answered by {} in {:.0}ms with {} sources",
                    resp.model_used,
                    resp.latency_ms,
                    resp.sources.len()
                );
                Message::assistant(&resp)
            }
            Err(err) => {
                tracing::error!("Query failed: {}", err);
                Message::error(&err.user_message(QUERY_FAILED))
            }
        };

        in_flight.settle(reply.clone());
        Submission::Settled(reply)
    }
}
