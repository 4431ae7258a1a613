use crate::dashboard::DashboardView;
use crate::errors::AppError;
use crate::models::{Credentials, TaskDraft};
use crate::navigation::{DASHBOARD_PAGE, LOGIN_PAGE};
use crate::notify::Notification;
use crate::state::AppState;
use crate::ui::{ManagePage, render_dashboard, render_login, render_manage};
use crate::view::{TaskFilter, parse_days, parse_order, validate_draft};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

type Pairs = Vec<(String, String)>;

#[derive(Debug, Deserialize)]
pub struct ReorderForm {
    pub order: String,
}

#[derive(Debug, Deserialize)]
pub struct SubtaskForm {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportForm {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct DismissForm {
    pub back: Option<String>,
}

pub async fn dashboard(State(state): State<AppState>) -> Response {
    let view = state.dashboard.load().await;
    dashboard_page(&state, view).await
}

pub async fn toggle_task(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let view = state.dashboard.toggle(id).await;
    dashboard_page(&state, view).await
}

pub async fn reorder(
    State(state): State<AppState>,
    Form(form): Form<ReorderForm>,
) -> Result<Response, AppError> {
    let ids = parse_order(&form.order)
        .ok_or_else(|| AppError::bad_request("order must be a comma separated list of ids"))?;
    let view = state.dashboard.reorder(&ids).await;
    Ok(dashboard_page(&state, view).await)
}

pub async fn add_subtask(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<SubtaskForm>,
) -> Response {
    let view = state.dashboard.add_subtask(id, &form.title).await;
    dashboard_page(&state, view).await
}

pub async fn toggle_subtask(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let view = state.dashboard.toggle_subtask(id).await;
    dashboard_page(&state, view).await
}

pub async fn edit_task(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    state.dashboard.edit(id).await;
    let view = match pending_redirect(&state).await {
        Some(redirect) => return redirect,
        None => state.dashboard.load().await,
    };
    dashboard_page(&state, view).await
}

pub async fn manage(State(state): State<AppState>, Query(query): Query<Pairs>) -> Response {
    state.manage.refresh().await;
    if let Some(redirect) = pending_redirect(&state).await {
        return redirect;
    }
    let focus = state.manage.take_edit_focus().await;
    manage_page(&state, &query, focus).await
}

pub async fn create_task(
    State(state): State<AppState>,
    Query(query): Query<Pairs>,
    Form(form): Form<Pairs>,
) -> Response {
    let (title, days) = draft_fields(&form);
    state.manage.create(validate_draft(&title, days)).await;
    manage_page(&state, &query, None).await
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<Pairs>,
    Form(form): Form<Pairs>,
) -> Response {
    let (title, days) = draft_fields(&form);
    let draft = TaskDraft {
        title: title.trim().to_string(),
        days,
    };
    state.manage.update(id, &draft).await;
    manage_page(&state, &query, Some(id)).await
}

pub async fn toggle_archive(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<Pairs>,
) -> Response {
    state.manage.toggle_archive(id).await;
    manage_page(&state, &query, None).await
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<Pairs>,
) -> Response {
    state.manage.delete(id).await;
    manage_page(&state, &query, None).await
}

pub async fn import_tasks(
    State(state): State<AppState>,
    Query(query): Query<Pairs>,
    Form(form): Form<ImportForm>,
) -> Response {
    state.manage.import(&form.content).await;
    manage_page(&state, &query, None).await
}

pub async fn login_page(State(state): State<AppState>) -> Response {
    let notifications = state.gateway.notifications().active().await;
    Html(render_login(&notifications, state.gateway.notifications().ttl())).into_response()
}

pub async fn login(State(state): State<AppState>, Form(form): Form<CredentialsForm>) -> Response {
    let credentials = Credentials {
        username: form.username.trim().to_string(),
        password: form.password,
    };
    if state.api.login(&credentials).await {
        return Redirect::to(DASHBOARD_PAGE).into_response();
    }
    if let Some(redirect) = pending_redirect(&state).await {
        return redirect;
    }
    login_page(State(state)).await
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let credentials = Credentials {
        username: form.username.trim().to_string(),
        password: form.password,
    };
    if state.api.register(&credentials).await {
        state
            .gateway
            .notifications()
            .success("Account created, you can now log in")
            .await;
    }
    if let Some(redirect) = pending_redirect(&state).await {
        return redirect;
    }
    login_page(State(state)).await
}

pub async fn logout(State(state): State<AppState>) -> Response {
    state.dashboard.logout().await;
    state.manage.clear().await;
    match pending_redirect(&state).await {
        Some(redirect) => redirect,
        None => Redirect::to(LOGIN_PAGE).into_response(),
    }
}

pub async fn notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.gateway.notifications().active().await)
}

pub async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Form(form): Form<DismissForm>,
) -> Redirect {
    state.gateway.notifications().dismiss(id).await;
    let back = form
        .back
        .filter(|back| back.starts_with('/') && !back.starts_with("//"))
        .unwrap_or_else(|| DASHBOARD_PAGE.to_string());
    Redirect::to(&back)
}

async fn pending_redirect(state: &AppState) -> Option<Response> {
    let location = state.gateway.navigator().take_pending().await?;
    Some(Redirect::to(&location).into_response())
}

async fn dashboard_page(state: &AppState, view: DashboardView) -> Response {
    if let Some(redirect) = pending_redirect(state).await {
        return redirect;
    }
    let notifications = state.gateway.notifications();
    let profile = state.gateway.session().profile().await.ok().flatten();
    Html(render_dashboard(
        &view,
        profile.as_ref(),
        &notifications.active().await,
        notifications.ttl(),
    ))
    .into_response()
}

async fn manage_page(state: &AppState, query: &Pairs, focus: Option<i64>) -> Response {
    if let Some(redirect) = pending_redirect(state).await {
        return redirect;
    }
    if matches!(state.gateway.session().token().await, Ok(None)) {
        return Redirect::to(LOGIN_PAGE).into_response();
    }
    let filter = filter_from_query(query);
    let tasks = state.manage.filtered(&filter).await;
    let notifications = state.gateway.notifications();
    Html(render_manage(&ManagePage {
        tasks: &tasks,
        filter: &filter,
        focus,
        notifications: &notifications.active().await,
        ttl: notifications.ttl(),
    }))
    .into_response()
}

fn filter_from_query(query: &Pairs) -> TaskFilter {
    let (search, days) = draft_fields_named(query, "search");
    TaskFilter::new(search, days)
}

fn draft_fields(form: &Pairs) -> (String, Vec<u8>) {
    draft_fields_named(form, "title")
}

/// Text field plus every repeated `days` value (checkbox groups post one pair
/// per checked box).
fn draft_fields_named(pairs: &Pairs, text_key: &str) -> (String, Vec<u8>) {
    let text = pairs
        .iter()
        .find(|(key, _)| key == text_key)
        .map(|(_, value)| value.clone())
        .unwrap_or_default();
    let joined = pairs
        .iter()
        .filter(|(key, _)| key == "days")
        .map(|(_, value)| value.as_str())
        .collect::<Vec<_>>()
        .join(",");
    (text, parse_days(&joined))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Pairs {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn repeated_day_fields_are_collected() {
        let form = pairs(&[("title", "Run"), ("days", "3"), ("days", "1")]);
        assert_eq!(draft_fields(&form), ("Run".to_string(), vec![1, 3]));
    }

    #[test]
    fn filter_reads_search_and_days() {
        let query = pairs(&[("search", "mil"), ("days", "2")]);
        assert_eq!(filter_from_query(&query), TaskFilter::new("mil", vec![2]));
        assert_eq!(filter_from_query(&Pairs::new()), TaskFilter::default());
    }
}
