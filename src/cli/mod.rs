mod run;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use console::style;
use tracing::info;

use crate::core::config::AppConfig;
use crate::core::market::MarketSession;
use crate::core::pipeline::ConversationPipeline;
use crate::core::relay::{HttpTransport, TokioSleeper};
use crate::core::terminal::{self, print_error};
use crate::interfaces::cli::MarketInterface;

fn print_help() {
    terminal::print_banner();
    println!("{}", style("Commands").bold().underlined());
    println!("  {:<10} Browse, list and hire agents interactively", style("market").green());
    println!("  {:<10} Send a single message to an agent", style("run").green());
    println!("  {:<10} Show this help", style("help").green());
    println!();
    println!("{}", style("run options").bold().underlined());
    println!("  --agent <name|id>     Agent from the config catalog");
    println!("  --agent-id <id>       Agent id (with --api-key)");
    println!("  --api-key <key>       Credential sent as the Authorization header");
    println!("  --prompt <text>       Message to send");
    println!();
    println!("  --config <path>       Config file (default ~/.agentmart/config.toml)");
    println!(
        "\n {} {} <command> [options]\n",
        style("Usage:").bold(),
        style("agentmart").green()
    );
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RunCommandArgs {
    pub agent: Option<String>,
    pub agent_id: Option<String>,
    pub api_key: Option<String>,
    pub prompt: String,
}

pub(crate) fn parse_run_command_args(args: &[String], start: usize) -> RunCommandArgs {
    let mut parsed = RunCommandArgs::default();
    let mut i = start;
    while i < args.len() {
        let value = args.get(i + 1).cloned();
        match (args[i].as_str(), value) {
            ("--agent" | "-a", Some(v)) => {
                parsed.agent = Some(v);
                i += 2;
            }
            ("--agent-id", Some(v)) => {
                parsed.agent_id = Some(v);
                i += 2;
            }
            ("--api-key", Some(v)) => {
                parsed.api_key = Some(v);
                i += 2;
            }
            ("--prompt" | "-p", Some(v)) => {
                parsed.prompt = v;
                i += 2;
            }
            _ => i += 1,
        }
    }
    parsed
}

pub(crate) fn parse_config_flag(args: &[String]) -> Option<PathBuf> {
    args.windows(2)
        .find(|pair| pair[0] == "--config")
        .map(|pair| PathBuf::from(&pair[1]))
}

pub(crate) fn build_pipeline(config: &AppConfig) -> Result<ConversationPipeline> {
    let transport = HttpTransport::new(&config.relay.base_url, config.relay.request_timeout())?;
    info!(
        "Agent service at {} (max_attempts={}, interval={}s)",
        config.relay.base_url, config.relay.max_attempts, config.relay.poll_interval_secs
    );
    Ok(ConversationPipeline::new(
        Arc::new(transport),
        Arc::new(TokioSleeper),
        config.relay.poll_settings(),
    ))
}

/// Returns the process exit code.
pub async fn run_main() -> Result<i32> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(String::as_str).unwrap_or("market");

    if matches!(cmd, "help" | "--help" | "-h") {
        print_help();
        return Ok(0);
    }

    let config = AppConfig::load(parse_config_flag(&args).as_deref()).await?;
    crate::logging::init(&config.logging, cmd == "market")?;
    config.log_source();

    match cmd {
        "market" => {
            let session = MarketSession::seeded(&config.users, &config.agents);
            let pipeline = build_pipeline(&config)?;
            MarketInterface::new(session, pipeline).run().await?;
            Ok(0)
        }
        "run" => {
            let parsed = parse_run_command_args(&args, 2);
            run::run_once(&config, parsed).await
        }
        other => {
            print_error(&format!("Unknown command '{}'", other));
            print_help();
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_config_flag, parse_run_command_args};
    use std::path::PathBuf;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_run_command_args_reads_all_flags() {
        let parsed = parse_run_command_args(
            &args(&[
                "agentmart", "run", "--agent-id", "a1", "--api-key", "proj:sk", "--prompt", "Hi",
            ]),
            2,
        );
        assert_eq!(parsed.agent, None);
        assert_eq!(parsed.agent_id.as_deref(), Some("a1"));
        assert_eq!(parsed.api_key.as_deref(), Some("proj:sk"));
        assert_eq!(parsed.prompt, "Hi");
    }

    #[test]
    fn parse_run_command_args_ignores_dangling_flag() {
        let parsed = parse_run_command_args(&args(&["agentmart", "run", "-a", "Video", "-p"]), 2);
        assert_eq!(parsed.agent.as_deref(), Some("Video"));
        assert!(parsed.prompt.is_empty());
    }

    #[test]
    fn parse_config_flag_finds_path() {
        assert_eq!(
            parse_config_flag(&args(&["agentmart", "run", "--config", "/tmp/c.toml"])),
            Some(PathBuf::from("/tmp/c.toml"))
        );
        assert_eq!(parse_config_flag(&args(&["agentmart", "--config"])), None);
    }
}
