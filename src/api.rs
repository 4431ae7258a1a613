use crate::gateway::{ApiRequest, Gateway};
use crate::models::{
    AuthResponse, Credentials, NewSubtask, PriorityOrder, Stats, SubtaskToggle, Task, TaskDraft,
    UserProfile,
};
use tracing::{error, info};

/// Typed calls against the remote task API. Fetchers give `None` and
/// mutators `false` when the call failed; the gateway has already told the
/// user why.
#[derive(Clone)]
pub struct TaskApi {
    gateway: Gateway,
}

impl TaskApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub async fn active_tasks(&self) -> Option<Vec<Task>> {
        self.gateway.call(ApiRequest::get("/tasks")).await.decode()
    }

    pub async fn all_tasks(&self) -> Option<Vec<Task>> {
        self.gateway.call(ApiRequest::get("/tasks/all")).await.decode()
    }

    pub async fn stats(&self) -> Option<Stats> {
        self.gateway.call(ApiRequest::get("/stats")).await.decode()
    }

    pub async fn create_task(&self, draft: &TaskDraft) -> bool {
        self.send(ApiRequest::post("/tasks").json(draft)).await
    }

    pub async fn update_task(&self, id: i64, draft: &TaskDraft) -> bool {
        self.send(ApiRequest::post(format!("/tasks/{id}")).json(draft))
            .await
    }

    pub async fn toggle_archive(&self, id: i64) -> bool {
        self.send(ApiRequest::patch(format!("/tasks/{id}"))).await
    }

    pub async fn delete_task(&self, id: i64) -> bool {
        self.send(ApiRequest::delete(format!("/tasks/{id}"))).await
    }

    pub async fn toggle_task(&self, id: i64) -> bool {
        self.send(ApiRequest::post(format!("/tasks/{id}/toggle")))
            .await
    }

    pub async fn reorder(&self, ordered_task_ids: &[i64]) -> bool {
        self.send(ApiRequest::post("/tasks/priorities").json(&PriorityOrder { ordered_task_ids }))
            .await
    }

    pub async fn add_subtask(&self, task_id: i64, title: &str) -> bool {
        self.send(
            ApiRequest::post(format!("/tasks/{task_id}/subtasks")).json(&NewSubtask { title }),
        )
        .await
    }

    pub async fn toggle_subtask(&self, subtask_id: i64) -> bool {
        self.send(ApiRequest::post("/subtasks/toggle").json(&SubtaskToggle { subtask_id }))
            .await
    }

    pub async fn register(&self, credentials: &Credentials) -> bool {
        self.send(ApiRequest::post("/auth/register").json(credentials))
            .await
    }

    /// Exchanges credentials for a token and stores it with the profile.
    pub async fn login(&self, credentials: &Credentials) -> bool {
        let Some(auth) = self
            .gateway
            .call(ApiRequest::post("/auth/login").json(credentials))
            .await
            .decode::<AuthResponse>()
        else {
            return false;
        };

        let session = self.gateway.session();
        let profile = UserProfile {
            username: credentials.username.clone(),
        };
        let stored = match session.set_token(&auth.token).await {
            Ok(()) => session.set_profile(&profile).await,
            Err(err) => Err(err),
        };
        if let Err(err) = stored {
            error!("could not store session: {err}");
            self.gateway.report_error(err).await;
            return false;
        }

        info!(username = %profile.username, "logged in");
        true
    }

    /// Local only: forgets the session and goes to the login page.
    pub async fn logout(&self) {
        if let Err(err) = self.gateway.session().logout().await {
            error!("could not clear session: {err}");
        }
        self.gateway.navigator().redirect_to_login().await;
    }

    async fn send(&self, request: ApiRequest) -> bool {
        self.gateway.call(request).await.is_success()
    }
}
