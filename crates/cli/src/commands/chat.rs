//! `reagent chat` — run a single message through the agent.

use std::sync::Arc;

use reagent_agent::{AgentExecutor, StreamFragment};
use reagent_config::AppConfig;

pub async fn run(message: &str, stream: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early — give a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    REAGENT_API_KEY = 'sk-...'");
        eprintln!("    OPENAI_API_KEY  = 'sk-...'");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let state = reagent_gateway::build_state(&config)?;
    let agent =
        Arc::new(AgentExecutor::new("cli", state.step.clone()).with_max_steps(state.max_steps));

    if stream {
        let mut rx = agent.run_stream(message);

        loop {
            tokio::select! {
                fragment = rx.recv() => {
                    match fragment {
                        Some(StreamFragment::Thinking { tools }) => {
                            eprintln!("  [thinking] proposing: {}", tools.join(", "));
                        }
                        Some(StreamFragment::Content { content }) => {
                            println!("{content}");
                        }
                        Some(StreamFragment::Interrupted { message }) => {
                            eprintln!("  [interrupted] {message}");
                        }
                        Some(StreamFragment::Error { message }) => {
                            eprintln!("  [error] {message}");
                        }
                        Some(StreamFragment::Done { steps }) => {
                            eprintln!("  [done] {steps} steps");
                            break;
                        }
                        None => break,
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    eprintln!("  Interrupting at the next step boundary...");
                    agent.interrupt();
                }
            }
        }
    } else {
        eprint!("  Thinking...");
        let response = agent.run(message).await?;
        eprint!("\r              \r");
        println!("{response}");
    }

    Ok(())
}
