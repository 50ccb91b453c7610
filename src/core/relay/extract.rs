use serde_json::Value;
use tracing::debug;

use super::{JobStatus, Reply};

/// Pulls the reply text out of a finished job. Never fails: anything
/// unreadable becomes `Reply::Fallback`.
pub fn extract(status: &JobStatus) -> Reply {
    // Later chain-success updates override earlier ones.
    let winner = status.updates.iter().fold(None, |found, update| {
        if update.is_chain_success() {
            Some(update)
        } else {
            found
        }
    });

    let Some(update) = winner else {
        debug!("No chain-success update among {}", status.updates.len());
        return Reply::Fallback;
    };

    match last_history_message(&update.output) {
        Some(message) => Reply::Message(message.to_string()),
        None => {
            debug!("chain-success update has no readable history_items");
            Reply::Fallback
        }
    }
}

fn last_history_message(output: &Value) -> Option<&str> {
    output
        .get("output")?
        .get("history_items")?
        .as_array()?
        .last()?
        .get("message")?
        .as_str()
}
