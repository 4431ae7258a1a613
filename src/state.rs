use crate::api::TaskApi;
use crate::dashboard::Dashboard;
use crate::gateway::Gateway;
use crate::manage::Manage;
use crate::navigation::Navigator;
use crate::notify::Notifications;
use crate::storage::{KeyValueStore, Session};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
    pub api: TaskApi,
    pub dashboard: Dashboard,
    pub manage: Manage,
}

impl AppState {
    pub fn new(api_url: &str, store: Arc<dyn KeyValueStore>, notification_ttl: Duration) -> Self {
        let gateway = Gateway::new(
            api_url,
            Session::new(store),
            Notifications::new(notification_ttl),
            Navigator::new(),
        );
        let api = TaskApi::new(gateway.clone());

        Self {
            dashboard: Dashboard::new(api.clone()),
            manage: Manage::new(api.clone()),
            api,
            gateway,
        }
    }
}
