use std::sync::Arc;

use anyhow::Context;

use auto_finance_advisor::config::ServerConfig;
use auto_finance_advisor::llm::create_provider;
use auto_finance_advisor::orchestrator::Orchestrator;
use auto_finance_advisor::routes::{ApiState, api_routes};
use auto_finance_advisor::session::{InMemorySessionStore, SessionStore, spawn_expiry_task};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env().context("Invalid configuration")?;

    eprintln!("🚗 Auto Finance Advisor v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api/interview/start", config.port);
    match &config.llm {
        Some(llm) => eprintln!("   Model: {} ({:?})", llm.model, llm.backend),
        None => eprintln!("   Model: none (rule-based advisor)"),
    }

    let llm = config.llm.as_ref().map(create_provider);

    // ── Sessions ──────────────────────────────────────────────────────────
    let store: Arc<dyn SessionStore> = InMemorySessionStore::new();
    let _expiry_handle = spawn_expiry_task(Arc::clone(&store), config.session_idle_timeout);

    let orchestrator = Arc::new(Orchestrator::new(config.interview.clone(), llm, store));

    // ── HTTP ──────────────────────────────────────────────────────────────
    let app = api_routes(ApiState { orchestrator });
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Interview server started");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
