mod chat;

use anyhow::Result;
use console::style;
use inquire::{Password, PasswordDisplayMode, Select, Text};

use crate::core::market::{MarketSession, NewAgent};
use crate::core::pipeline::ConversationPipeline;
use crate::core::terminal::{self, print_agent_card, print_error, print_info, print_success};

pub(crate) use chat::report_outcome;

const LOGIN: &str = "Login";
const REGISTER: &str = "Register";
const QUIT: &str = "Quit";

const AVAILABLE: &str = "Available Agents";
const ADD_AGENT: &str = "Add New Agent";
const MY_AGENTS: &str = "My Agents";
const RESUME_CHAT: &str = "Resume Chat";
const LOGOUT: &str = "Logout";

/// Interactive marketplace front-end on top of a `MarketSession`.
pub struct MarketInterface {
    session: MarketSession,
    pipeline: ConversationPipeline,
}

impl MarketInterface {
    pub fn new(session: MarketSession, pipeline: ConversationPipeline) -> Self {
        Self { session, pipeline }
    }

    pub async fn run(&mut self) -> Result<()> {
        terminal::print_banner();
        loop {
            if self.session.current_user().is_none() {
                if !self.account_menu()? {
                    return Ok(());
                }
                continue;
            }
            self.main_menu().await?;
        }
    }

    /// Returns false when the user chose to quit.
    fn account_menu(&mut self) -> Result<bool> {
        let choice = Select::new("Welcome", vec![LOGIN, REGISTER, QUIT]).prompt()?;
        if choice == QUIT {
            return Ok(false);
        }

        let username = Text::new("Username:").prompt()?;
        let password = Password::new("Password:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()?;

        if choice == LOGIN {
            match self.session.login(&username, &password) {
                Ok(()) => print_success(&format!("Welcome, {}", username)),
                Err(e) => print_error(&capitalize(&e.to_string())),
            }
        } else {
            match self.session.register(&username, &password) {
                Ok(()) => print_success("Registration successful! You can now log in."),
                Err(e) => print_error(&capitalize(&e.to_string())),
            }
        }
        Ok(true)
    }

    async fn main_menu(&mut self) -> Result<()> {
        let Some(username) = self.session.current_user().map(str::to_string) else {
            return Ok(());
        };
        let mut options = vec![AVAILABLE, ADD_AGENT, MY_AGENTS];
        if self.session.chat_agent().is_some() {
            options.push(RESUME_CHAT);
        }
        options.push(LOGOUT);
        let choice = Select::new(&format!("Menu ({})", username), options).prompt()?;

        match choice {
            AVAILABLE => self.browse_and_hire().await?,
            RESUME_CHAT => self.resume_chat().await?,
            ADD_AGENT => self.add_agent(&username)?,
            MY_AGENTS => self.show_my_agents(&username),
            _ => self.session.logout(),
        }
        Ok(())
    }

    async fn browse_and_hire(&mut self) -> Result<()> {
        let agents = self.session.available_agents();
        if agents.is_empty() {
            print_info("No agents are listed yet.");
            return Ok(());
        }
        println!("\n{}\n", style("Available Agents").bold().underlined());
        for agent in agents {
            print_agent_card(&agent.name, &agent.owner, &agent.description);
        }

        let options: Vec<String> = agents
            .iter()
            .map(|a| format!("Hire {} ({})", a.name, a.agent_id))
            .collect();
        let mut choices = options.clone();
        choices.push("Back".to_string());
        let picked = Select::new("Pick an agent:", choices).prompt()?;
        let Some(idx) = options.iter().position(|o| *o == picked) else {
            return Ok(());
        };
        let agent_id = agents[idx].agent_id.clone();

        let agent = match self.session.hire(&agent_id) {
            Ok(agent) => agent,
            Err(e) => {
                print_error(&capitalize(&e.to_string()));
                return Ok(());
            }
        };
        chat::chat_loop(&self.pipeline, &agent, self.session.conversation_mut(&agent_id)).await
    }

    /// Returns to the hired agent without clearing its conversation.
    async fn resume_chat(&mut self) -> Result<()> {
        let Some(agent) = self.session.chat_agent().cloned() else {
            return Ok(());
        };
        let conversation = self.session.conversation_mut(&agent.agent_id);
        chat::chat_loop(&self.pipeline, &agent, conversation).await
    }

    fn add_agent(&mut self, username: &str) -> Result<()> {
        let new_agent = NewAgent {
            name: Text::new("Agent Name:").prompt()?,
            description: Text::new("Description:").prompt()?,
            agent_id: Text::new("Agent ID:").prompt()?,
            api_key: Password::new("API Key:")
                .with_display_mode(PasswordDisplayMode::Masked)
                .without_confirmation()
                .prompt()?,
        };
        match self.session.add_agent(username, new_agent) {
            Ok(_) => print_success("Agent added successfully!"),
            Err(e) => print_error(&capitalize(&e.to_string())),
        }
        Ok(())
    }

    fn show_my_agents(&self, username: &str) {
        let mine = self.session.agents_of(username);
        if mine.is_empty() {
            print_info("You have not listed any agents.");
            return;
        }
        println!("\n{}\n", style("My Agents").bold().underlined());
        for agent in mine {
            println!("  {}", style(&agent.name).bold());
            println!("  {}\n", agent.description);
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
