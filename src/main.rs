use std::sync::Arc;

use profile_bot::activity::ChannelAccount;
use profile_bot::adapter::BotAdapter;
use profile_bot::bot::ProfileBot;
use profile_bot::channels::{ChannelManager, CliChannel, http_routes};
use profile_bot::config::{BotConfig, StorageConfig};
use profile_bot::runner::{self, StopReason};
use profile_bot::store::{LibSqlBackend, MemoryStore, StateStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env()?;

    eprintln!("🤖 Profile Bot v{}", env!("CARGO_PKG_VERSION"));

    // ── State store ──────────────────────────────────────────────────────
    let store: Arc<dyn StateStore> = match &config.storage {
        StorageConfig::Memory => {
            eprintln!("   State: in-memory (lost on exit)");
            Arc::new(MemoryStore::new())
        }
        StorageConfig::LibSql(path) => {
            eprintln!("   State: {}", path.display());
            Arc::new(LibSqlBackend::new_local(path).await?)
        }
    };

    let bot_account = ChannelAccount::new(&config.name, &config.name);
    let adapter = Arc::new(BotAdapter::new(
        ProfileBot::new(),
        store,
        bot_account.clone(),
    ));

    // ── HTTP endpoint ────────────────────────────────────────────────────
    if config.http_enabled {
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port)).await?;
        eprintln!(
            "   HTTP: http://0.0.0.0:{}/api/messages",
            config.http_port
        );
        let app = http_routes(Arc::clone(&adapter));
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("HTTP server stopped: {}", e);
            }
        });
    }

    // ── Channels ─────────────────────────────────────────────────────────
    let mut channels = ChannelManager::new();
    if config.cli_enabled {
        channels.add(Box::new(CliChannel::new(bot_account)));
        eprintln!("   Type a message and press Enter. Say cancel to stop a conversation.\n");
    }

    if channels.is_empty() {
        tokio::signal::ctrl_c().await?;
        tracing::info!("Ctrl+C received, shutting down...");
        return Ok(());
    }

    let reason = runner::run(adapter, channels).await?;
    if reason == StopReason::StreamsEnded && config.http_enabled {
        eprintln!("   stdin closed; HTTP endpoint still serving (Ctrl+C to stop)");
        tokio::signal::ctrl_c().await?;
    }
    Ok(())
}
