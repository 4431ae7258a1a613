use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::info;

pub const LOGIN_PAGE: &str = "/login";
pub const DASHBOARD_PAGE: &str = "/";
pub const MANAGE_PAGE: &str = "/manage";

/// Page navigations requested by the gateway or a coordinator. The page
/// layer takes the pending location and answers with a redirect.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    pending: Arc<Mutex<Option<String>>>,
    redirects: Arc<AtomicU64>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn redirect(&self, location: impl Into<String>) {
        let location = location.into();
        info!(%location, "navigation requested");
        self.redirects.fetch_add(1, Ordering::SeqCst);
        *self.pending.lock().await = Some(location);
    }

    pub async fn redirect_to_login(&self) {
        self.redirect(LOGIN_PAGE).await;
    }

    pub async fn take_pending(&self) -> Option<String> {
        self.pending.lock().await.take()
    }

    /// Total navigations requested since creation.
    pub fn redirect_count(&self) -> u64 {
        self.redirects.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn latest_location_wins_and_is_taken_once() {
        let navigator = Navigator::new();
        navigator.redirect(MANAGE_PAGE).await;
        navigator.redirect_to_login().await;

        assert_eq!(navigator.redirect_count(), 2);
        assert_eq!(navigator.take_pending().await.as_deref(), Some(LOGIN_PAGE));
        assert_eq!(navigator.take_pending().await, None);
    }
}
