use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/tasks/reorder", post(handlers::reorder))
        .route("/tasks/:id/toggle", post(handlers::toggle_task))
        .route("/tasks/:id/edit", post(handlers::edit_task))
        .route("/tasks/:id/subtasks", post(handlers::add_subtask))
        .route("/subtasks/:id/toggle", post(handlers::toggle_subtask))
        .route("/manage", get(handlers::manage))
        .route("/manage/tasks", post(handlers::create_task))
        .route("/manage/tasks/:id", post(handlers::update_task))
        .route("/manage/tasks/:id/archive", post(handlers::toggle_archive))
        .route("/manage/tasks/:id/delete", post(handlers::delete_task))
        .route("/manage/import", post(handlers::import_tasks))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/register", post(handlers::register))
        .route("/logout", post(handlers::logout))
        .route("/api/notifications", get(handlers::notifications))
        .route("/notifications/:id/dismiss", post(handlers::dismiss_notification))
        .with_state(state)
}
