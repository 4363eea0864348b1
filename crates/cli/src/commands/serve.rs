//! `reagent serve` — start the HTTP API server.

use reagent_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("ReAgent Gateway");
    println!("   Listening:  {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:      {}", config.backend.model);
    println!("   Max steps:  {}", config.agent.max_steps);

    reagent_gateway::start(config).await?;

    Ok(())
}
