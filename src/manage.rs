use crate::api::TaskApi;
use crate::models::{Task, TaskDraft};
use crate::view::{TaskFilter, parse_import};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Task management page: creation, editing, archiving, deletion, bulk import
/// and client-side filtering of the full task list.
///
/// The cache only ever holds what `/tasks/all` last returned; every mutation
/// is followed by a refresh.
#[derive(Clone)]
pub struct Manage {
    api: TaskApi,
    cache: Arc<Mutex<Vec<Task>>>,
}

impl Manage {
    pub fn new(api: TaskApi) -> Self {
        Self {
            api,
            cache: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replaces the cache with a fresh fetch. On failure the previous list is
    /// kept while a credential is still stored, and dropped otherwise.
    pub async fn refresh(&self) -> bool {
        let Some(tasks) = self.api.all_tasks().await else {
            if !self.signed_in().await {
                self.clear().await;
            }
            return false;
        };
        *self.cache.lock().await = tasks;
        true
    }

    /// Cached tasks matching the filter. Nothing is shown without a stored
    /// credential, even on paths that never reach the API.
    pub async fn filtered(&self, filter: &TaskFilter) -> Vec<Task> {
        if !self.signed_in().await {
            self.clear().await;
            return Vec::new();
        }
        let cache = self.cache.lock().await;
        filter.apply(&cache).into_iter().cloned().collect()
    }

    pub async fn clear(&self) {
        self.cache.lock().await.clear();
    }

    pub async fn create(&self, draft: Option<TaskDraft>) -> bool {
        let Some(draft) = draft else {
            self.notify_error("Title and days required").await;
            return false;
        };
        let created = self.api.create_task(&draft).await;
        self.refresh().await;
        created
    }

    pub async fn update(&self, id: i64, draft: &TaskDraft) -> bool {
        let updated = self.api.update_task(id, draft).await;
        self.refresh().await;
        updated
    }

    pub async fn toggle_archive(&self, id: i64) -> bool {
        let toggled = self.api.toggle_archive(id).await;
        self.refresh().await;
        toggled
    }

    pub async fn delete(&self, id: i64) -> bool {
        let deleted = self.api.delete_task(id).await;
        self.refresh().await;
        deleted
    }

    /// Creates one task per valid entry, one call after another. A malformed
    /// file is reported and nothing is sent. Returns how many were created.
    pub async fn import(&self, text: &str) -> usize {
        let drafts = match parse_import(text) {
            Ok(drafts) => drafts,
            Err(err) => {
                warn!("import rejected: {err}");
                self.api.gateway().report_error(err).await;
                return 0;
            }
        };

        let mut created = 0;
        for draft in &drafts {
            if self.api.create_task(draft).await {
                created += 1;
            }
        }
        info!(created, total = drafts.len(), "import finished");

        self.api
            .gateway()
            .notifications()
            .success("Import finished")
            .await;
        self.refresh().await;
        created
    }

    /// The task the dashboard asked to edit, if any. Consumed on read.
    pub async fn take_edit_focus(&self) -> Option<i64> {
        let gateway = self.api.gateway();
        match gateway.session().take_edit_task().await {
            Ok(id) => id,
            Err(err) => {
                gateway.report_error(err).await;
                None
            }
        }
    }

    async fn signed_in(&self) -> bool {
        matches!(self.api.gateway().session().token().await, Ok(Some(_)))
    }

    async fn notify_error(&self, text: &str) {
        self.api.gateway().notifications().error(text).await;
    }
}
