//! In-memory marketplace session: users, the agent catalog and per-agent
//! conversations. Nothing here outlives the process.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::relay::{Agent, Conversation};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarketError {
    #[error("username '{0}' already exists, please choose a different username")]
    UsernameTaken(String),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("unknown user '{0}'")]
    UnknownUser(String),
    #[error("please fill in all fields ({0} is empty)")]
    MissingField(&'static str),
    #[error("no agent with id '{0}' in the marketplace")]
    UnknownAgent(String),
    #[error("not logged in")]
    NotLoggedIn,
    #[error("an agent with id '{0}' is already listed")]
    DuplicateAgent(String),
}

/// Seed entry for a user, as written in the config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserSeed {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
struct UserRecord {
    // Compared in plaintext.
    password: String,
    agents: Vec<String>,
}

/// Input for listing a new agent.
#[derive(Debug, Clone, Default)]
pub struct NewAgent {
    pub name: String,
    pub description: String,
    pub agent_id: String,
    pub api_key: String,
}

#[derive(Debug, Default)]
pub struct MarketSession {
    users: HashMap<String, UserRecord>,
    catalog: Vec<Agent>,
    current_user: Option<String>,
    chat_agent: Option<String>,
    conversations: HashMap<String, Conversation>,
}

impl MarketSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a session from config seeds. Agents whose owner is a seeded
    /// user are also listed under that user.
    pub fn seeded(users: &[UserSeed], agents: &[Agent]) -> Self {
        let mut session = Self::new();
        for user in users {
            session.users.insert(
                user.username.clone(),
                UserRecord {
                    password: user.password.clone(),
                    agents: Vec::new(),
                },
            );
        }
        for agent in agents {
            if session.find_agent(&agent.agent_id).is_some() {
                warn!("Skipping seed agent [{}]: duplicate id", agent.name);
                continue;
            }
            if let Some(owner) = session.users.get_mut(&agent.owner) {
                owner.agents.push(agent.agent_id.clone());
            }
            session.catalog.push(agent.clone());
        }
        info!(
            "Marketplace seeded with {} user(s) and {} agent(s)",
            session.users.len(),
            session.catalog.len()
        );
        session
    }

    pub fn register(&mut self, username: &str, password: &str) -> Result<(), MarketError> {
        if username.is_empty() {
            return Err(MarketError::MissingField("username"));
        }
        if self.users.contains_key(username) {
            return Err(MarketError::UsernameTaken(username.to_string()));
        }
        self.users.insert(
            username.to_string(),
            UserRecord {
                password: password.to_string(),
                agents: Vec::new(),
            },
        );
        info!("Registered user [{}]", username);
        Ok(())
    }

    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|u| u.password == password)
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<(), MarketError> {
        if !self.authenticate(username, password) {
            return Err(MarketError::InvalidCredentials);
        }
        self.current_user = Some(username.to_string());
        info!("User [{}] logged in", username);
        Ok(())
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.current_user.take() {
            info!("User [{}] logged out", user);
        }
        self.chat_agent = None;
    }

    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }

    /// Lists a new agent under `owner` and in the public catalog.
    pub fn add_agent(&mut self, owner: &str, new_agent: NewAgent) -> Result<&Agent, MarketError> {
        let fields = [
            ("agent name", &new_agent.name),
            ("description", &new_agent.description),
            ("agent id", &new_agent.agent_id),
            ("api key", &new_agent.api_key),
        ];
        if let Some((label, _)) = fields.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(MarketError::MissingField(*label));
        }
        // Hiring and conversations are keyed by agent id.
        if self.find_agent(&new_agent.agent_id).is_some() {
            return Err(MarketError::DuplicateAgent(new_agent.agent_id));
        }
        let record = self
            .users
            .get_mut(owner)
            .ok_or_else(|| MarketError::UnknownUser(owner.to_string()))?;
        record.agents.push(new_agent.agent_id.clone());

        info!("User [{}] listed agent [{}]", owner, new_agent.name);
        self.catalog.push(Agent {
            name: new_agent.name,
            description: new_agent.description,
            agent_id: new_agent.agent_id,
            api_key: new_agent.api_key,
            owner: owner.to_string(),
        });
        let idx = self.catalog.len() - 1;
        Ok(&self.catalog[idx])
    }

    pub fn available_agents(&self) -> &[Agent] {
        &self.catalog
    }

    pub fn agents_of(&self, username: &str) -> Vec<&Agent> {
        let Some(record) = self.users.get(username) else {
            return Vec::new();
        };
        record
            .agents
            .iter()
            .filter_map(|id| self.find_agent(id))
            .collect()
    }

    pub fn find_agent(&self, agent_id: &str) -> Option<&Agent> {
        self.catalog.iter().find(|a| a.agent_id == agent_id)
    }

    /// Selects an agent for chat and starts its conversation afresh.
    pub fn hire(&mut self, agent_id: &str) -> Result<Agent, MarketError> {
        if self.current_user.is_none() {
            return Err(MarketError::NotLoggedIn);
        }
        let agent = self
            .find_agent(agent_id)
            .cloned()
            .ok_or_else(|| MarketError::UnknownAgent(agent_id.to_string()))?;
        self.conversation_mut(&agent.agent_id).clear();
        self.chat_agent = Some(agent.agent_id.clone());
        info!("Hired agent [{}]", agent.name);
        Ok(agent)
    }

    pub fn chat_agent(&self) -> Option<&Agent> {
        self.chat_agent.as_deref().and_then(|id| self.find_agent(id))
    }

    pub fn conversation_mut(&mut self, agent_id: &str) -> &mut Conversation {
        self.conversations.entry(agent_id.to_string()).or_default()
    }
}
