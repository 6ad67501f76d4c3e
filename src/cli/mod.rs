//! CLI commands for the Hermes orchestrator.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hermes_core::{
    AgentTransport, Dispatcher, HttpTransport, HttpTransportConfig, Orchestrator,
    OrchestratorReply, Registry, RegistryConfig, Router, RouterConfig,
};
use hermes_llm::{GeminiProvider, LlmProvider, OpenAiProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// Default model-call timeout in seconds (override with
/// `HERMES_MODEL_TIMEOUT_SECS`).
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 5;

/// Command-line interface
#[derive(Parser)]
#[command(
    name = "hermes",
    version,
    about = "Capability-based query router for A2A agents"
)]
pub struct Cli {
    /// Path to the agent registry document
    #[arg(long, global = true, default_value = "config/agents.json")]
    pub registry: String,

    /// Disable model-based routing (keyword fallback only)
    #[arg(long, global = true)]
    pub no_model: bool,

    /// Subcommand to run (defaults to `chat`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Interactive chat session routed across discovered agents
    Chat,
    /// Route and dispatch a single query, then exit
    Route {
        /// The query text
        query: Vec<String>,
    },
    /// Discover agents and print the capability catalog
    Agents,
}

/// Run the selected command.
pub async fn run(cli: Cli) -> Result<()> {
    let orchestrator = build_orchestrator(&cli).await?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => chat(&orchestrator).await,
        Commands::Route { query } => route_once(&orchestrator, &query.join(" ")).await,
        Commands::Agents => list_agents(&orchestrator).await,
    }
}

/// Load configuration, discover agents, and assemble the orchestrator.
async fn build_orchestrator(cli: &Cli) -> Result<Orchestrator> {
    let config = RegistryConfig::from_path(&cli.registry)
        .with_context(|| format!("failed to load agent registry from {}", cli.registry))?;
    info!(registry = %cli.registry, agents = config.len(), "Registry loaded");

    let transport: Arc<dyn AgentTransport> =
        Arc::new(HttpTransport::new(HttpTransportConfig::default())?);

    let registry = Arc::new(Registry::new(config, Arc::clone(&transport)));
    let report = registry.discover().await;
    if report.discovered == 0 {
        warn!("No agents answered discovery; routing will fail until a refresh succeeds");
    } else {
        info!(
            discovered = report.discovered,
            failed = report.failed.len(),
            "Discovery complete"
        );
    }

    let provider = if cli.no_model {
        debug!("Model routing disabled by --no-model");
        None
    } else {
        resolve_provider()
    };

    let router_config = RouterConfig {
        model_enabled: provider.is_some(),
        model_timeout: model_timeout_from_env(),
        ..RouterConfig::default()
    };
    let mut router = Router::new(router_config);
    if let Some(provider) = provider {
        router = router.with_provider(provider);
    }

    Ok(Orchestrator::new(
        registry,
        router,
        Dispatcher::new(transport),
    ))
}

/// Pick an LLM provider from the environment: Gemini first (matching the
/// reference deployment), then OpenAI. No credentials means fallback-only
/// routing, not a startup failure.
fn resolve_provider() -> Option<Arc<dyn LlmProvider>> {
    match GeminiProvider::from_env() {
        Ok(provider) => {
            info!(provider = "gemini", "Model routing enabled");
            return Some(Arc::new(provider));
        }
        Err(e) => debug!(error = %e, "Gemini provider unavailable"),
    }

    match OpenAiProvider::from_env() {
        Ok(provider) => {
            info!(provider = "openai", "Model routing enabled");
            return Some(Arc::new(provider));
        }
        Err(e) => debug!(error = %e, "OpenAI provider unavailable"),
    }

    warn!("No LLM credentials found; using keyword fallback routing only");
    None
}

fn model_timeout_from_env() -> Duration {
    std::env::var("HERMES_MODEL_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS))
}

fn print_prompt() {
    use std::io::Write;
    print!("You: ");
    let _ = std::io::stdout().flush();
}

/// Interactive chat loop over stdin.
async fn chat(orchestrator: &Orchestrator) -> Result<()> {
    println!("Hermes ready. Type 'list' to see agents, '/refresh' to re-discover, 'exit' to quit.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "exit" | "quit") {
            break;
        }
        if input == "/refresh" {
            let report = orchestrator.refresh().await;
            println!(
                "Discovered {} agents ({} failed)\n",
                report.discovered,
                report.failed.len()
            );
            continue;
        }

        match orchestrator.handle(input).await {
            Ok(OrchestratorReply::Listing(catalog)) => println!("\n{catalog}"),
            Ok(OrchestratorReply::Answer(answer)) => {
                println!(
                    "\nAssistant ({} via {}): {}\n",
                    answer.agent,
                    answer.method.as_str(),
                    answer.text
                );
            }
            Err(e) => eprintln!("error: {e}\n"),
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Route and dispatch a single query.
async fn route_once(orchestrator: &Orchestrator, query: &str) -> Result<()> {
    if query.trim().is_empty() {
        anyhow::bail!("query must not be empty");
    }

    match orchestrator.handle(query).await? {
        OrchestratorReply::Listing(catalog) => println!("{catalog}"),
        OrchestratorReply::Answer(answer) => {
            let default_marker = if answer.confident { "" } else { ", default" };
            println!(
                "[{} via {}{}]",
                answer.agent,
                answer.method.as_str(),
                default_marker
            );
            println!("{}", answer.text);
        }
    }
    Ok(())
}

/// Print the discovered capability catalog.
async fn list_agents(orchestrator: &Orchestrator) -> Result<()> {
    let directory = orchestrator.registry().snapshot().await;
    println!("{}", directory.catalog());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["hermes"]);
        assert_eq!(cli.registry, "config/agents.json");
        assert!(!cli.no_model);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_route_collects_query_words() {
        let cli = Cli::parse_from(["hermes", "route", "what", "time", "is", "it"]);
        match cli.command {
            Some(Commands::Route { query }) => assert_eq!(query.join(" "), "what time is it"),
            _ => panic!("expected route subcommand"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["hermes", "agents", "--registry", "other.json", "--no-model"]);
        assert_eq!(cli.registry, "other.json");
        assert!(cli.no_model);
    }

    #[test]
    fn test_model_timeout_default() {
        assert_eq!(
            model_timeout_from_env(),
            Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS)
        );
    }
}
