use anyhow::Result;
use console::style;
use inquire::Text;

use crate::core::pipeline::{ConversationPipeline, TurnOutcome};
use crate::core::relay::{Agent, Conversation};
use crate::core::terminal::{print_error, print_info, print_turn, print_warn};

const BACK_COMMAND: &str = "/back";

/// Reads one message at a time; the next prompt only appears once the
/// previous turn has finished.
pub(super) async fn chat_loop(
    pipeline: &ConversationPipeline,
    agent: &Agent,
    conversation: &mut Conversation,
) -> Result<()> {
    println!(
        "\n{} {}",
        style("Chat with").bold(),
        style(&agent.name).bold().cyan()
    );
    println!(
        "{}\n",
        style(format!("Type {} to return to the main menu.", BACK_COMMAND)).dim()
    );
    if conversation.is_empty() {
        print_info("New conversation.");
    }
    for turn in conversation.turns() {
        print_turn(turn.role, &turn.content);
    }

    loop {
        let input = Text::new("Your message:").prompt()?;
        // Commands are matched trimmed; the message itself is sent as typed.
        let command = input.trim();
        if command.is_empty() {
            continue;
        }
        if command == BACK_COMMAND {
            return Ok(());
        }

        print_info("Agent is thinking...");
        let outcome = pipeline.send_turn(agent, conversation, &input).await;
        report_outcome(&outcome);
    }
}

/// Prints a finished turn.
pub(crate) fn report_outcome(outcome: &TurnOutcome) {
    match outcome {
        TurnOutcome::Replied(reply) => {
            print_turn(crate::core::relay::Role::Assistant, reply.text());
        }
        TurnOutcome::StillProcessing => {
            print_warn("Max retries reached. The agent may still be processing.");
        }
        TurnOutcome::Failed(e) => {
            print_error(&format!("Failed to get a response from the agent: {}", e));
        }
    }
}
