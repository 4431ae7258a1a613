use crate::api::TaskApi;
use crate::models::Task;
use crate::navigation::MANAGE_PAGE;
use crate::view::{StatsView, sort_by_priority};
use tracing::{error, info};

/// What the dashboard shows. A part that failed to load stays `None`; the
/// user has already been told why.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub tasks: Option<Vec<Task>>,
    pub stats: Option<StatsView>,
}

/// Today's task list with completion toggles, drag reordering and the
/// productivity heatmap.
#[derive(Clone)]
pub struct Dashboard {
    api: TaskApi,
}

impl Dashboard {
    pub fn new(api: TaskApi) -> Self {
        Self { api }
    }

    pub async fn load(&self) -> DashboardView {
        let tasks = self.api.active_tasks().await.map(|mut tasks| {
            sort_by_priority(&mut tasks);
            tasks
        });
        let stats = self.api.stats().await.map(|stats| StatsView::from(&stats));
        DashboardView { tasks, stats }
    }

    pub async fn toggle(&self, id: i64) -> DashboardView {
        self.api.toggle_task(id).await;
        self.load().await
    }

    /// Sends the on-screen order as the new priority order.
    pub async fn reorder(&self, ordered_ids: &[i64]) -> DashboardView {
        if self.api.reorder(ordered_ids).await {
            info!(count = ordered_ids.len(), "priorities updated");
        }
        self.load().await
    }

    pub async fn add_subtask(&self, task_id: i64, title: &str) -> DashboardView {
        let title = title.trim();
        if title.is_empty() {
            self.api
                .gateway()
                .notifications()
                .error("Subtask title required")
                .await;
        } else {
            self.api.add_subtask(task_id, title).await;
        }
        self.load().await
    }

    pub async fn toggle_subtask(&self, subtask_id: i64) -> DashboardView {
        self.api.toggle_subtask(subtask_id).await;
        self.load().await
    }

    /// Hands the task over to the management page for editing.
    pub async fn edit(&self, id: i64) {
        let gateway = self.api.gateway();
        match gateway.session().set_edit_task(id).await {
            Ok(()) => gateway.navigator().redirect(MANAGE_PAGE).await,
            Err(err) => {
                error!("could not store edit handoff: {err}");
                gateway.report_error(err).await;
            }
        }
    }

    pub async fn logout(&self) {
        self.api.logout().await;
    }
}
