use tracing::{error, info};

use super::{Job, JobTransport, RelayError, TriggerRequest};

/// Sends one user message to an agent and returns the job handle. Never retries.
pub async fn submit(
    transport: &dyn JobTransport,
    agent_id: &str,
    credential: &str,
    content: &str,
    conversation_id: Option<&str>,
) -> Result<Job, RelayError> {
    let request = TriggerRequest::user_message(agent_id, content, conversation_id);
    let body = transport.trigger(credential, &request).await.map_err(|e| {
        error!("Trigger for agent [{}] failed: {}", agent_id, e);
        e
    })?;
    let job = Job::from_trigger_response(&body)?;
    info!(
        "Triggered agent [{}]: studio={} job={}",
        agent_id, job.studio_id, job.job_id
    );
    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::relay::testing::{ScriptedTransport, job_info};
    use serde_json::json;

    #[tokio::test]
    async fn submit_builds_request_and_returns_job() {
        let transport = ScriptedTransport::new().with_trigger(Ok(job_info("s1", "j1")));
        let job = submit(&transport, "agent-1", "key-1", "Hi", None).await.unwrap();
        assert_eq!(
            job,
            Job {
                studio_id: "s1".into(),
                job_id: "j1".into()
            }
        );

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "key-1");
        assert_eq!(sent[0].1.agent_id, "agent-1");
        assert_eq!(sent[0].1.message.role, "user");
        assert_eq!(sent[0].1.message.content, "Hi");
        assert_eq!(sent[0].1.conversation_id, None);
    }

    #[tokio::test]
    async fn submit_passes_conversation_id_through() {
        let transport = ScriptedTransport::new().with_trigger(Ok(job_info("s1", "j1")));
        submit(&transport, "agent-1", "key-1", "Hi", Some("conv-7"))
            .await
            .unwrap();
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[0].1.conversation_id.as_deref(), Some("conv-7"));
    }

    #[tokio::test]
    async fn submit_failure_is_not_retried() {
        let transport = ScriptedTransport::new()
            .with_trigger(Err(RelayError::Submit("500: boom".into())))
            .with_trigger(Ok(job_info("s1", "j1")));
        let err = submit(&transport, "agent-1", "key-1", "Hi", None)
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Submit(ref text) if text.contains("boom")));
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_trigger_response_is_invalid_job() {
        let transport = ScriptedTransport::new().with_trigger(Ok(json!({"job_info": {}})));
        let err = submit(&transport, "agent-1", "key-1", "Hi", None)
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::InvalidJob(_)));
    }
}
