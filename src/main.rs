use std::sync::Arc;
use std::time::Duration;

use eve::agent::Assistant;
use eve::config::{AssistantConfig, ToolKeys};
use eve::llm::create_provider;
use eve::session::Session;
use eve::tools::ToolRegistry;
use eve::tools::builtin::register_builtin;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading any configuration
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AssistantConfig::from_env()?;
    let keys = ToolKeys::from_env();

    eprintln!("🤖 Eve v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {} ({})", config.model, config.ollama_url);

    // HTTP client for the tool providers, with a hard request timeout
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent(concat!("eve/", env!("CARGO_PKG_VERSION")))
        .build()?;

    // The LLM client gets a connect timeout only; a whole-request timeout
    // would cut off long streamed generations.
    let llm_http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .user_agent(concat!("eve/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let llm = create_provider(llm_http, &config);

    let mut registry = ToolRegistry::new();
    register_builtin(&mut registry, &http, keys)?;
    eprintln!("   Tools: {} registered", registry.count());
    eprintln!("   Type a message and press Enter. \"break\" to exit.\n");

    let assistant = Assistant::new(llm, Arc::new(registry), &config);
    let mut session = Session::new(assistant);
    session.run().await?;

    Ok(())
}
