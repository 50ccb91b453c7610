use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RelayError;

/// Visible text used when a completed job carries no readable reply.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't generate a response.";

/// A remote agent listed in the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    pub description: String,
    pub agent_id: String,
    pub api_key: String,
    pub owner: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

/// Append-only turn log for one hired agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(ConversationTurn {
            role,
            content: content.into(),
        });
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

/// Handle for an asynchronous job created by a trigger call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub studio_id: String,
    pub job_id: String,
}

impl Job {
    /// Reads `job_info.studio_id` / `job_info.job_id` out of a trigger response.
    pub fn from_trigger_response(body: &Value) -> Result<Self, RelayError> {
        let info = body.get("job_info");
        let field = |name: &str| {
            info.and_then(|i| i.get(name))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let job = Job {
            studio_id: field("studio_id"),
            job_id: field("job_id"),
        };
        if !job.is_valid() {
            return Err(RelayError::InvalidJob(body.to_string()));
        }
        Ok(job)
    }

    pub fn is_valid(&self) -> bool {
        !self.studio_id.is_empty() && !self.job_id.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusKind {
    Pending,
    Complete,
    Other(String),
}

impl From<&str> for StatusKind {
    fn from(value: &str) -> Self {
        match value {
            "pending" => StatusKind::Pending,
            "complete" => StatusKind::Complete,
            other => StatusKind::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub kind: String,
    pub output: Value,
}

impl StatusUpdate {
    pub fn is_chain_success(&self) -> bool {
        self.kind == "chain-success"
    }
}

/// Parsed body of an `async_poll` response.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatus {
    pub kind: StatusKind,
    pub updates: Vec<StatusUpdate>,
}

impl JobStatus {
    /// Lenient parse: missing `type` counts as an unknown kind, missing or
    /// malformed `updates` as an empty list.
    pub fn from_value(body: &Value) -> Self {
        let kind = body
            .get("type")
            .and_then(Value::as_str)
            .map(StatusKind::from)
            .unwrap_or_else(|| StatusKind::Other(String::new()));
        let updates = body
            .get("updates")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|u| StatusUpdate {
                        kind: u
                            .get("type")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        output: u.get("output").cloned().unwrap_or(Value::Null),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { kind, updates }
    }

    /// A job is finished only once it says so and has results attached.
    pub fn is_finished(&self) -> bool {
        self.kind == StatusKind::Complete && !self.updates.is_empty()
    }
}

/// Extractor result. `Fallback` renders the same way a short real reply would,
/// but stays distinguishable for callers and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Message(String),
    Fallback,
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Message(text) => text,
            Reply::Fallback => FALLBACK_REPLY,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Reply::Fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn job_is_read_from_trigger_response() {
        let body = json!({"job_info": {"studio_id": "s1", "job_id": "j1"}, "extra": 1});
        let job = Job::from_trigger_response(&body).unwrap();
        assert_eq!(job.studio_id, "s1");
        assert_eq!(job.job_id, "j1");
    }

    #[test]
    fn job_with_missing_or_empty_ids_is_invalid() {
        for body in [
            json!({}),
            json!({"job_info": {"studio_id": "s1"}}),
            json!({"job_info": {"studio_id": "", "job_id": "j1"}}),
            json!({"job_info": {"studio_id": 7, "job_id": "j1"}}),
        ] {
            let err = Job::from_trigger_response(&body).unwrap_err();
            assert!(matches!(err, RelayError::InvalidJob(_)), "{body}");
        }
    }

    #[test]
    fn status_requires_updates_to_be_finished() {
        let bare = JobStatus::from_value(&json!({"type": "complete"}));
        assert_eq!(bare.kind, StatusKind::Complete);
        assert!(!bare.is_finished());

        let empty = JobStatus::from_value(&json!({"type": "complete", "updates": []}));
        assert!(!empty.is_finished());

        let done = JobStatus::from_value(&json!({
            "type": "complete",
            "updates": [{"type": "chain-success", "output": {}}]
        }));
        assert!(done.is_finished());
        assert!(done.updates[0].is_chain_success());
    }

    #[test]
    fn unknown_status_kinds_are_kept() {
        let status = JobStatus::from_value(&json!({"type": "failed", "updates": "nope"}));
        assert_eq!(status.kind, StatusKind::Other("failed".to_string()));
        assert!(status.updates.is_empty());
    }

    #[test]
    fn fallback_reply_renders_fixed_text() {
        assert_eq!(Reply::Fallback.text(), FALLBACK_REPLY);
        assert!(Reply::Fallback.is_fallback());
        assert!(!Reply::Message("ok".into()).is_fallback());
    }

    #[test]
    fn conversation_appends_in_order() {
        let mut convo = Conversation::new();
        convo.push(Role::User, "Hi");
        convo.push(Role::Assistant, "Hello!");
        assert_eq!(convo.len(), 2);
        assert_eq!(convo.turns()[0].role, Role::User);
        assert_eq!(convo.turns()[1].content, "Hello!");
        convo.clear();
        assert!(convo.is_empty());
    }
}
