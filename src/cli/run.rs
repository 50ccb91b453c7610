use anyhow::Result;

use crate::core::config::AppConfig;
use crate::core::pipeline::TurnOutcome;
use crate::core::relay::{Agent, Conversation};
use crate::core::terminal::print_error;
use crate::interfaces::cli::report_outcome;

use super::{RunCommandArgs, build_pipeline};

/// Resolves the target agent from `--agent` (catalog lookup by name or id)
/// or from an explicit `--agent-id` / `--api-key` pair.
pub(crate) fn resolve_agent(config: &AppConfig, args: &RunCommandArgs) -> Option<Agent> {
    if let Some(wanted) = &args.agent {
        return config
            .agents
            .iter()
            .find(|a| a.agent_id == *wanted || a.name.eq_ignore_ascii_case(wanted))
            .cloned();
    }
    match (&args.agent_id, &args.api_key) {
        (Some(agent_id), Some(api_key)) if !agent_id.is_empty() && !api_key.is_empty() => {
            Some(Agent {
                name: agent_id.clone(),
                description: String::new(),
                agent_id: agent_id.clone(),
                api_key: api_key.clone(),
                owner: String::new(),
            })
        }
        _ => None,
    }
}

pub(crate) fn exit_code(outcome: &TurnOutcome) -> i32 {
    match outcome {
        TurnOutcome::Replied(_) => 0,
        TurnOutcome::Failed(_) => 1,
        TurnOutcome::StillProcessing => 2,
    }
}

pub(crate) async fn run_once(config: &AppConfig, args: RunCommandArgs) -> Result<i32> {
    if args.prompt.trim().is_empty() {
        print_error("Error: --prompt is required for run mode.");
        return Ok(1);
    }
    let Some(agent) = resolve_agent(config, &args) else {
        print_error("Error: pass --agent <name|id>, or both --agent-id and --api-key.");
        return Ok(1);
    };

    let pipeline = build_pipeline(config)?;
    let mut conversation = Conversation::new();
    let outcome = pipeline
        .send_turn(&agent, &mut conversation, &args.prompt)
        .await;
    report_outcome(&outcome);
    Ok(exit_code(&outcome))
}
