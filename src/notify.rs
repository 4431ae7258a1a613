use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{error, info};

pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: u64,
    pub text: String,
    pub severity: Severity,
    pub created_at: DateTime<Local>,
    #[serde(skip)]
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct Tray {
    next_id: u64,
    entries: Vec<Notification>,
}

/// Shared tray of transient user messages. Entries vanish once their TTL has
/// elapsed or when dismissed.
#[derive(Debug, Clone)]
pub struct Notifications {
    ttl: Duration,
    tray: Arc<Mutex<Tray>>,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            tray: Arc::new(Mutex::new(Tray::default())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn push(&self, text: impl Into<String>, severity: Severity) -> u64 {
        let text = text.into();
        match severity {
            Severity::Error => error!(%text, "notification"),
            _ => info!(%text, severity = severity.as_str(), "notification"),
        }

        let mut tray = self.tray.lock().await;
        tray.next_id += 1;
        let id = tray.next_id;
        tray.entries.push(Notification {
            id,
            text,
            severity,
            created_at: Local::now(),
            expires_at: Instant::now() + self.ttl,
        });
        id
    }

    pub async fn info(&self, text: impl Into<String>) -> u64 {
        self.push(text, Severity::Info).await
    }

    pub async fn success(&self, text: impl Into<String>) -> u64 {
        self.push(text, Severity::Success).await
    }

    pub async fn error(&self, text: impl Into<String>) -> u64 {
        self.push(text, Severity::Error).await
    }

    /// Returns whether the notification was still displayed.
    pub async fn dismiss(&self, id: u64) -> bool {
        let mut tray = self.tray.lock().await;
        let before = tray.entries.len();
        tray.entries.retain(|entry| entry.id != id);
        tray.entries.len() != before
    }

    /// Live notifications, oldest first. Expired ones are dropped here.
    pub async fn active(&self) -> Vec<Notification> {
        let now = Instant::now();
        let mut tray = self.tray.lock().await;
        tray.entries.retain(|entry| entry.expires_at > now);
        tray.entries.clone()
    }
}
