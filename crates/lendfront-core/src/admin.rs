//! Admin mode.
//!
//! Admin mode is a persisted flag that shows or hides the manager dialogs'
//! entry points. It is flipped either by clicking the footer control five
//! times within five seconds ([`AdminGate::register_click`]) or by the admin
//! password login ([`AdminLogin`]). Both live entirely on the client side of
//! the site. They hide controls, they do not protect anything.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lendfront_storage::StorageBackend;
use subtle::{Choice, ConstantTimeEq};
use tokio::sync::{Mutex, watch};
use tracing::{info, warn};

use crate::error::AdminError;

/// Storage key of the admin-mode flag (`"true"` / `"false"`).
pub const ADMIN_MODE_KEY: &str = "admin-mode";

/// Storage key of the login marker.
pub const ADMIN_AUTH_KEY: &str = "admin-auth";

const AUTHENTICATED: &str = "authenticated";

/// Passwords accepted when none are configured.
pub const DEFAULT_ADMIN_PASSWORDS: [&str; 2] = ["admin123", "sh2024"];

/// Counts clicks within a rolling time window.
#[derive(Debug, Clone)]
pub struct ClickWindow {
    required: usize,
    window: Duration,
    clicks: VecDeque<Instant>,
}

impl Default for ClickWindow {
    fn default() -> Self {
        Self::new(Self::REQUIRED_CLICKS, Self::WINDOW)
    }
}

impl ClickWindow {
    pub const REQUIRED_CLICKS: usize = 5;
    pub const WINDOW: Duration = Duration::from_secs(5);

    #[must_use]
    pub fn new(required: usize, window: Duration) -> Self {
        Self {
            required: required.max(1),
            window,
            clicks: VecDeque::with_capacity(required),
        }
    }

    /// Record a click at `now`. Returns `true` on the click that completes
    /// the sequence, which also clears the counter.
    pub fn register(&mut self, now: Instant) -> bool {
        self.expire(now);
        self.clicks.push_back(now);
        if self.clicks.len() >= self.required {
            self.clicks.clear();
            true
        } else {
            false
        }
    }

    /// Clicks still inside the window at `now`.
    pub fn pending(&mut self, now: Instant) -> usize {
        self.expire(now);
        self.clicks.len()
    }

    fn expire(&mut self, now: Instant) {
        while let Some(first) = self.clicks.front() {
            if now.saturating_duration_since(*first) >= self.window {
                self.clicks.pop_front();
            } else {
                break;
            }
        }
    }
}

fn flag_value(enabled: bool) -> &'static str {
    if enabled { "true" } else { "false" }
}

/// The persisted admin-mode flag and its click gate.
pub struct AdminGate {
    storage: Arc<dyn StorageBackend>,
    enabled: watch::Sender<bool>,
    clicks: Mutex<ClickWindow>,
}

impl fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminGate")
            .field("enabled", &*self.enabled.borrow())
            .finish_non_exhaustive()
    }
}

impl AdminGate {
    /// Read the flag from `storage`. Anything but `"true"`, including a read
    /// failure, means disabled.
    pub async fn load(storage: Arc<dyn StorageBackend>) -> Self {
        let enabled = match storage.get(ADMIN_MODE_KEY).await {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                warn!(key = ADMIN_MODE_KEY, error = %e, "failed to read admin mode, assuming off");
                false
            }
        };
        let (enabled, _) = watch::channel(enabled);
        Self {
            storage,
            enabled,
            clicks: Mutex::new(ClickWindow::default()),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        *self.enabled.borrow()
    }

    /// Receive every change of the flag.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.enabled.subscribe()
    }

    /// Persist and broadcast the flag. The in-memory flag only changes once
    /// the write succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Storage`] if the flag cannot be written.
    pub async fn set(&self, enabled: bool) -> Result<(), AdminError> {
        self.storage.put(ADMIN_MODE_KEY, flag_value(enabled)).await?;
        let previous = self.enabled.send_replace(enabled);
        if previous != enabled {
            info!(enabled, "admin mode changed");
        }
        Ok(())
    }

    /// Flip the flag. Returns the new value.
    ///
    /// # Errors
    ///
    /// As [`set`](Self::set).
    pub async fn toggle(&self) -> Result<bool, AdminError> {
        let next = !self.is_enabled();
        self.set(next).await?;
        Ok(next)
    }

    /// Register a footer click. Returns the new flag when this click
    /// completed the sequence, `None` otherwise.
    ///
    /// # Errors
    ///
    /// As [`set`](Self::set).
    pub async fn register_click(&self, now: Instant) -> Result<Option<bool>, AdminError> {
        let completed = self.clicks.lock().await.register(now);
        if completed {
            self.toggle().await.map(Some)
        } else {
            Ok(None)
        }
    }

    /// Clicks counted toward the next flip.
    pub async fn pending_clicks(&self, now: Instant) -> usize {
        self.clicks.lock().await.pending(now)
    }
}

/// Password login for the admin page.
pub struct AdminLogin {
    storage: Arc<dyn StorageBackend>,
    passwords: Vec<String>,
}

impl fmt::Debug for AdminLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminLogin")
            .field("passwords", &self.passwords.len())
            .finish_non_exhaustive()
    }
}

impl AdminLogin {
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>, passwords: Vec<String>) -> Self {
        Self { storage, passwords }
    }

    /// Compare `candidate` against every configured password.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        let mut matched = Choice::from(0);
        for password in &self.passwords {
            matched |= candidate.as_bytes().ct_eq(password.as_bytes());
        }
        matched.into()
    }

    /// Log in: on a correct password, store the login marker and enable
    /// admin mode. Returns whether the password was accepted.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Storage`] if the marker or flag cannot be written.
    pub async fn login(&self, candidate: &str, gate: &AdminGate) -> Result<bool, AdminError> {
        if !self.verify(candidate) {
            warn!("admin login rejected");
            return Ok(false);
        }
        self.storage.put(ADMIN_AUTH_KEY, AUTHENTICATED).await?;
        gate.set(true).await?;
        info!("admin logged in");
        Ok(true)
    }

    /// Remove the login marker and disable admin mode.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Storage`] if storage rejects either write.
    pub async fn logout(&self, gate: &AdminGate) -> Result<(), AdminError> {
        self.storage.delete(ADMIN_AUTH_KEY).await?;
        gate.set(false).await?;
        info!("admin logged out");
        Ok(())
    }

    /// Whether the login marker is present.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Storage`] if the marker cannot be read.
    pub async fn is_authenticated(&self) -> Result<bool, AdminError> {
        Ok(self.storage.get(ADMIN_AUTH_KEY).await?.as_deref() == Some(AUTHENTICATED))
    }
}
