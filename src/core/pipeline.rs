use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::relay::{
    self, Agent, Conversation, JobTransport, PollSettings, RelayError, Reply, Role, Sleeper,
};

/// How a single user turn ended.
#[derive(Debug)]
pub enum TurnOutcome {
    Replied(Reply),
    Failed(RelayError),
    /// The poll budget ran out; the agent may still finish upstream.
    StillProcessing,
}

/// Drives submit -> poll -> extract for one turn at a time.
pub struct ConversationPipeline {
    transport: Arc<dyn JobTransport>,
    sleeper: Arc<dyn Sleeper>,
    settings: PollSettings,
}

impl ConversationPipeline {
    pub fn new(
        transport: Arc<dyn JobTransport>,
        sleeper: Arc<dyn Sleeper>,
        settings: PollSettings,
    ) -> Self {
        Self {
            transport,
            sleeper,
            settings,
        }
    }

    /// Appends the user turn, then the assistant turn if a reply arrives.
    /// Failures leave the user turn in place and never touch earlier turns.
    pub async fn send_turn(
        &self,
        agent: &Agent,
        conversation: &mut Conversation,
        user_text: &str,
    ) -> TurnOutcome {
        conversation.push(Role::User, user_text);

        let job = match relay::submit(
            self.transport.as_ref(),
            &agent.agent_id,
            &agent.api_key,
            user_text,
            None,
        )
        .await
        {
            Ok(job) => job,
            Err(e) => return TurnOutcome::Failed(e),
        };

        let status = match relay::poll(
            self.transport.as_ref(),
            self.sleeper.as_ref(),
            self.settings,
            &job,
            &agent.api_key,
        )
        .await
        {
            Ok(status) => status,
            Err(e) if e.is_soft() => {
                warn!("Agent [{}] did not finish in time", agent.name);
                return TurnOutcome::StillProcessing;
            }
            Err(e) => return TurnOutcome::Failed(e),
        };

        let reply = relay::extract(&status);
        if reply.is_fallback() {
            warn!("Agent [{}] finished without a readable reply", agent.name);
        } else {
            info!("Agent [{}] replied", agent.name);
        }
        conversation.push(Role::Assistant, reply.text());
        debug!("Conversation with [{}] now has {} turns", agent.name, conversation.len());
        TurnOutcome::Replied(reply)
    }
}
