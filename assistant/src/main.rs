//! Ticket assistant command-line session.
//!
//! Configuration comes from the environment (a `.env` file is honoured) and
//! the service-account keyfile. There are no flags.

use std::sync::Arc;
use ticket_assist::bootstrap::{build_registry, sheets_store};
use ticket_assist::session::run_session;
use ticket_assist::{Agent, AgentConfig, Config, LlmCategorizer};
use ticket_assist_anthropic::AnthropicClient;
use ticket_assist_core::environment::SystemClock;
use ticket_assist_core::TicketRepository;
use tokio::io::BufReader;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ticket_assist=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    info!(config = ?config, "Configuration loaded");

    ticket_assist::metrics::register_metrics();

    let client = AnthropicClient::new(config.anthropic.api_key.clone());
    let store = sheets_store(&config.sheets)?;
    let categorizer = LlmCategorizer::new(client.clone(), config.anthropic.categorizer_model.clone());
    let repository = Arc::new(TicketRepository::new(store, categorizer, Arc::new(SystemClock)));
    let registry = build_registry(&repository, &config.tools);

    let mut agent = Agent::new(
        client,
        registry,
        AgentConfig::new(
            config.anthropic.model.clone(),
            config.anthropic.max_tokens,
            config.agent,
        ),
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    tokio::select! {
        result = run_session(&mut agent, stdin, &mut stdout) => result?,
        _ = signal::ctrl_c() => {
            println!("\nSession interrupted. Exiting...");
        }
    }

    info!("Session ended");
    Ok(())
}
