//! lendfront server entry point.
//!
//! Opens the storage profile, hydrates the settings store and the admin
//! gate, then serves the Axum router until SIGINT or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use lendfront_core::admin::{AdminGate, AdminLogin};
use lendfront_core::lead::LeadNotifier;
use lendfront_core::store::SettingsStore;
use lendfront_core::upload::UploadPolicy;
use lendfront_storage::{MemoryBackend, ProfileBackend, StorageBackend};

use lendfront_server::app::build_router;
use lendfront_server::config::{ServerConfig, StorageBackendType};
use lendfront_server::notify::{LogNotifier, TelegramNotifier};
use lendfront_server::resize::DiskResizer;
use lendfront_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(storage = ?config.storage_backend, "lendfront starting");

    let state = build_app_state(&config).await?;
    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "lendfront server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("lendfront server stopped");
    Ok(())
}

/// Open storage and build every shared component.
async fn build_app_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let storage: Arc<dyn StorageBackend> = match &config.storage_backend {
        StorageBackendType::Memory => {
            info!("using in-memory storage (settings will not persist)");
            Arc::new(MemoryBackend::new())
        }
        StorageBackendType::Profile { path } => {
            info!(path = %path.display(), "using profile file storage");
            Arc::new(
                ProfileBackend::open(path)
                    .await
                    .context("failed to open profile storage")?,
            )
        }
    };

    let store = Arc::new(SettingsStore::new(Arc::clone(&storage)));
    let report = store.hydrate().await;
    for (key, origin) in &report.entries {
        tracing::debug!(key, %origin, "hydrated settings group");
    }
    if report.recovered() > 0 {
        warn!(
            recovered = report.recovered(),
            "some stored settings were unreadable and fell back to defaults"
        );
    }

    let admin_gate = Arc::new(AdminGate::load(Arc::clone(&storage)).await);
    let admin_login = Arc::new(AdminLogin::new(
        Arc::clone(&storage),
        config.admin_passwords.clone(),
    ));

    let notifier: Arc<dyn LeadNotifier> = match &config.telegram {
        Some(telegram) => {
            info!(chat_id = %telegram.chat_id, "Telegram lead notifications enabled");
            Arc::new(TelegramNotifier::new(telegram).context("failed to set up Telegram notifier")?)
        }
        None => {
            warn!("no Telegram bot configured, leads will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let resizer = Arc::new(DiskResizer::new(config.public_dir.clone()));

    Ok(Arc::new(AppState {
        store,
        admin_gate,
        admin_login,
        notifier,
        resizer,
        upload_policy: UploadPolicy {
            max_bytes: config.upload_max_bytes,
        },
        public_dir: config.public_dir.clone(),
    }))
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
