use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::{Job, JobStatus, RelayError};

// ── Wire request ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerRequest {
    pub message: TriggerMessage,
    pub agent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl TriggerRequest {
    pub fn user_message(agent_id: &str, content: &str, conversation_id: Option<&str>) -> Self {
        Self {
            message: TriggerMessage {
                role: "user".to_string(),
                content: content.to_string(),
            },
            agent_id: agent_id.to_string(),
            conversation_id: conversation_id
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        }
    }
}

/// The two calls the upstream agent service exposes.
#[async_trait]
pub trait JobTransport: Send + Sync {
    /// POST the trigger request, returning the raw response body.
    async fn trigger(&self, credential: &str, request: &TriggerRequest)
    -> Result<Value, RelayError>;

    async fn fetch_status(&self, credential: &str, job: &Job) -> Result<JobStatus, RelayError>;
}

// ── HTTP transport ──

pub struct HttpTransport {
    base_url: Url,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, request_timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| anyhow::anyhow!("Invalid base URL '{}': {}", base_url, e))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Base URL '{}' cannot carry a path", base_url);
        }
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { base_url, client })
    }

    /// Appends segments to the base path; each one is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn trigger_url(&self) -> Url {
        self.endpoint(&["agents", "trigger"])
    }

    pub fn status_url(&self, job: &Job) -> Url {
        self.endpoint(&["studios", &job.studio_id, "async_poll", &job.job_id])
    }
}

#[async_trait]
impl JobTransport for HttpTransport {
    async fn trigger(
        &self,
        credential: &str,
        request: &TriggerRequest,
    ) -> Result<Value, RelayError> {
        // The credential is sent verbatim, without a "Bearer " prefix.
        let res = self
            .client
            .post(self.trigger_url())
            .header("Authorization", credential)
            .json(request)
            .send()
            .await
            .map_err(|e| RelayError::Submit(e.to_string()))?;
        let status = res.status();
        if !status.is_success() {
            return Err(RelayError::Submit(format!(
                "{}: {}",
                status,
                res.text().await.unwrap_or_default()
            )));
        }
        res.json::<Value>()
            .await
            .map_err(|e| RelayError::InvalidJob(e.to_string()))
    }

    async fn fetch_status(&self, credential: &str, job: &Job) -> Result<JobStatus, RelayError> {
        let res = self
            .client
            .get(self.status_url(job))
            .header("Authorization", credential)
            .send()
            .await
            .map_err(|e| RelayError::Poll(e.to_string()))?;
        let status = res.status();
        if !status.is_success() {
            return Err(RelayError::Poll(format!(
                "{}: {}",
                status,
                res.text().await.unwrap_or_default()
            )));
        }
        let body: Value = res
            .json()
            .await
            .map_err(|e| RelayError::Poll(e.to_string()))?;
        Ok(JobStatus::from_value(&body))
    }
}
