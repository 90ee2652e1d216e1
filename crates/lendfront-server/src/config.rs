//! Server configuration for lendfront.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `LENDFRONT_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use lendfront_core::admin::DEFAULT_ADMIN_PASSWORDS;
use lendfront_core::upload::DEFAULT_MAX_BYTES;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Storage backend type.
    pub storage_backend: StorageBackendType,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Directory uploaded images are written under (as `images/{category}/`).
    pub public_dir: PathBuf,
    /// Upload size ceiling in bytes.
    pub upload_max_bytes: usize,
    /// Passwords accepted by the admin login.
    pub admin_passwords: Vec<String>,
    /// Telegram lead notifications (None logs leads instead).
    pub telegram: Option<TelegramConfig>,
}

/// Telegram bot used for lead notifications.
#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"[redacted]")
            .field("chat_id", &self.chat_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Supported storage backend types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// In-memory (development only, settings lost on restart).
    Memory,
    /// A JSON profile file on disk.
    Profile { path: PathBuf },
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT`: port to bind on, binds to `0.0.0.0`
    /// - `LENDFRONT_BIND_ADDR`: full bind address (overrides `PORT`, default: `127.0.0.1:8300`)
    /// - `LENDFRONT_STORAGE`: `memory` or `profile` (default: `memory`)
    /// - `LENDFRONT_PROFILE_PATH`: profile file for `profile` storage (default: `./data/profile.json`)
    /// - `LENDFRONT_LOG_LEVEL`: log filter (default: `info`)
    /// - `LENDFRONT_PUBLIC_DIR`: upload root (default: `./public`)
    /// - `LENDFRONT_UPLOAD_MAX_BYTES`: upload ceiling (default: 10 MiB)
    /// - `LENDFRONT_ADMIN_PASSWORDS`: comma-separated admin passwords
    /// - `LENDFRONT_TELEGRAM_BOT_TOKEN` / `LENDFRONT_TELEGRAM_CHAT_ID`: enable Telegram lead notifications
    /// - `LENDFRONT_NOTIFY_TIMEOUT_SECS`: webhook timeout (default: `30`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_addr = SocketAddr::from(([127, 0, 0, 1], 8300));
        // Priority: LENDFRONT_BIND_ADDR > PORT > default 127.0.0.1:8300
        let bind_addr = if let Some(addr) = var("LENDFRONT_BIND_ADDR") {
            addr.parse().unwrap_or(default_addr)
        } else if let Some(port) = var("PORT") {
            SocketAddr::from(([0, 0, 0, 0], port.parse().unwrap_or(8300)))
        } else {
            default_addr
        };

        let storage_backend = match var("LENDFRONT_STORAGE")
            .unwrap_or_else(|| "memory".to_owned())
            .to_lowercase()
            .as_str()
        {
            "profile" | "file" => StorageBackendType::Profile {
                path: var("LENDFRONT_PROFILE_PATH")
                    .map_or_else(|| PathBuf::from("./data/profile.json"), PathBuf::from),
            },
            _ => StorageBackendType::Memory,
        };

        let log_level = var("LENDFRONT_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        let public_dir = var("LENDFRONT_PUBLIC_DIR").map_or_else(|| PathBuf::from("./public"), PathBuf::from);

        let upload_max_bytes = var("LENDFRONT_UPLOAD_MAX_BYTES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_BYTES);

        let admin_passwords = var("LENDFRONT_ADMIN_PASSWORDS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_owned)
                    .collect::<Vec<_>>()
            })
            .filter(|passwords| !passwords.is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORDS.iter().map(|p| (*p).to_owned()).collect());

        let timeout = Duration::from_secs(
            var("LENDFRONT_NOTIFY_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        );

        // Telegram is enabled only when both the token and the chat id are set.
        let telegram = match (var("LENDFRONT_TELEGRAM_BOT_TOKEN"), var("LENDFRONT_TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) if !bot_token.is_empty() && !chat_id.is_empty() => {
                Some(TelegramConfig {
                    bot_token,
                    chat_id,
                    timeout,
                })
            }
            _ => None,
        };

        Self {
            bind_addr,
            storage_backend,
            log_level,
            public_dir,
            upload_max_bytes,
            admin_passwords,
            telegram,
        }
    }
}
