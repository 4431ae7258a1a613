use crate::dashboard::DashboardView;
use crate::models::{Task, UserProfile};
use crate::notify::Notification;
use crate::view::{StatsView, TaskFilter, WEEKDAYS};
use std::fmt::Write;
use std::time::Duration;

pub struct ManagePage<'a> {
    pub tasks: &'a [Task],
    pub filter: &'a TaskFilter,
    pub focus: Option<i64>,
    pub notifications: &'a [Notification],
    pub ttl: Duration,
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_dashboard(
    view: &DashboardView,
    profile: Option<&UserProfile>,
    notifications: &[Notification],
    ttl: Duration,
) -> String {
    let mut content = String::new();

    let greeting = match profile {
        Some(profile) => format!("Hello, {}", escape(&profile.username)),
        None => "Today".to_string(),
    };
    let _ = write!(
        content,
        r#"<header><h1>{greeting}</h1><p class="subtitle">Tick off today's tasks, drag to reprioritise.</p></header>"#
    );

    content.push_str(r#"<section class="card"><ul id="tasks" class="task-list">"#);
    match &view.tasks {
        Some(tasks) if tasks.is_empty() => {
            content.push_str(r#"<li class="empty">Nothing scheduled today.</li>"#)
        }
        Some(tasks) => {
            for task in tasks {
                content.push_str(&render_task_item(task));
            }
        }
        None => content.push_str(r#"<li class="empty">Tasks could not be loaded.</li>"#),
    }
    content.push_str(
        r#"</ul><form id="reorder-form" method="post" action="/tasks/reorder"><input type="hidden" name="order" id="reorder-order"></form></section>"#,
    );

    if let Some(stats) = &view.stats {
        content.push_str(&render_stats(stats));
    }

    render_layout("Dashboard", &content, notifications, ttl, "/", DASHBOARD_SCRIPT)
}

fn render_task_item(task: &Task) -> String {
    let id = task.id;
    let completed = if task.completed { " completed" } else { "" };
    let checked = if task.completed { " checked" } else { "" };

    let mut subtasks = String::new();
    if !task.subtasks.is_empty() {
        subtasks.push_str(r#"<ul class="subtasks">"#);
        for subtask in &task.subtasks {
            let checked = if subtask.completed { " checked" } else { "" };
            let _ = write!(
                subtasks,
                r#"<li><form method="post" action="/subtasks/{sid}/toggle"><label><input type="checkbox" data-autosubmit{checked}> {title}</label></form></li>"#,
                sid = subtask.id,
                title = escape(&subtask.title),
            );
        }
        subtasks.push_str("</ul>");
    }

    format!(
        r#"<li class="task-item{completed}" data-id="{id}">
  <form method="post" action="/tasks/{id}/toggle" class="task-toggle">
    <label><input type="checkbox" data-autosubmit{checked}> <span>{title}</span></label>
  </form>
  <form method="post" action="/tasks/{id}/edit"><button class="btn-link" type="submit">Edit</button></form>
  {subtasks}
  <form method="post" action="/tasks/{id}/subtasks" class="subtask-form">
    <input name="title" placeholder="Add a subtask" maxlength="200">
  </form>
</li>"#,
        title = escape(&task.title),
    )
}

fn render_stats(stats: &StatsView) -> String {
    let mut heatmap = String::new();
    for cell in &stats.heatmap {
        let _ = write!(
            heatmap,
            r#"<div class="heatmap-square" style="background-color: {color}" title="{label}"></div>"#,
            color = cell.level.color(),
            label = escape(&cell.label),
        );
    }

    format!(
        r#"<section class="panel">
  <div class="stat"><span class="label">Created</span><span class="value" id="stat-total-created">{created}</span></div>
  <div class="stat"><span class="label">Completed</span><span class="value" id="stat-total-done">{done}</span></div>
  <div class="stat"><span class="label">Success rate</span><span class="value" id="stat-success-rate">{success}%</span></div>
  <div class="stat"><span class="label">Today</span><span class="value" id="stat-today-rate">{today}%</span></div>
</section>
<section class="card"><h2>Last days</h2><div id="heatmap-container" class="heatmap">{heatmap}</div></section>"#,
        created = stats.total_created,
        done = stats.total_completed,
        success = stats.success_rate,
        today = stats.today_rate,
    )
}

pub fn render_manage(page: &ManagePage<'_>) -> String {
    let raw_query = filter_query(page.filter);
    let query = escape(&raw_query);
    let mut content = String::new();

    let _ = write!(
        content,
        r#"<header><h1>Manage tasks</h1></header>
<section class="card">
  <h2>New task</h2>
  <form id="task-form" method="post" action="/manage/tasks{query}">
    <input id="task-title" name="title" placeholder="Title" required maxlength="200">
    <div class="days">{days}</div>
    <button class="btn-primary" type="submit">Create</button>
  </form>
</section>
<section class="card">
  <h2>Import</h2>
  <form method="post" action="/manage/import{query}" id="import-form">
    <input type="file" id="importFile" accept="application/json,.json">
    <textarea name="content" id="import-content" rows="4" placeholder='[{{"title": "Run", "days": [1, 3]}}]'></textarea>
    <button class="btn-secondary" type="submit">Import</button>
  </form>
</section>
<section class="card">
  <form method="get" action="/manage" class="filters">
    <input id="searchInput" name="search" value="{search}" placeholder="Search">
    <div class="days-filter">{filter_days}</div>
    <button class="btn-secondary" type="submit">Filter</button>
  </form>
  <div id="all-tasks">"#,
        days = day_checkboxes("days", &[], None),
        search = escape(&page.filter.search),
        filter_days = day_checkboxes("days", &page.filter.days, Some("data-autosubmit")),
    );

    if page.tasks.is_empty() {
        content.push_str(r#"<p class="empty">No matching tasks.</p>"#);
    }
    for task in page.tasks {
        content.push_str(&render_task_card(task, page.focus == Some(task.id), &query));
    }
    content.push_str("</div></section>");

    render_layout(
        "Manage",
        &content,
        page.notifications,
        page.ttl,
        &format!("/manage{raw_query}"),
        MANAGE_SCRIPT,
    )
}

fn render_task_card(task: &Task, focused: bool, query: &str) -> String {
    let id = task.id;
    let archived = if task.active { "" } else { " archived" };
    let focus_class = if focused { " focused" } else { "" };
    let autofocus = if focused { " autofocus" } else { "" };
    let archive_label = if task.active { "Archive" } else { "Activate" };

    format!(
        r#"<div class="manage-task-card{archived}{focus_class}" id="task-{id}">
  <form method="post" action="/manage/tasks/{id}{query}" class="edit-form">
    <input class="edit-title" name="title" value="{title}" data-autosubmit{autofocus}>
    <div class="edit-days">{days}</div>
  </form>
  <div class="manage-actions">
    <form method="post" action="/manage/tasks/{id}/archive{query}"><button class="btn-secondary" type="submit">{archive_label}</button></form>
    <form method="post" action="/manage/tasks/{id}/delete{query}" data-confirm="Delete this task?"><button class="btn-danger" type="submit">Delete</button></form>
  </div>
</div>"#,
        title = escape(&task.title),
        days = day_checkboxes("days", &task.days, Some("data-autosubmit")),
    )
}

fn day_checkboxes(name: &str, selected: &[u8], extra: Option<&str>) -> String {
    let extra = extra.map(|attr| format!(" {attr}")).unwrap_or_default();
    WEEKDAYS
        .iter()
        .map(|(day, label)| {
            let checked = if selected.contains(day) { " checked" } else { "" };
            format!(
                r#"<label><input type="checkbox" name="{name}" value="{day}"{checked}{extra}> {label}</label>"#
            )
        })
        .collect()
}

/// Current filter as a query string, carried by every form on the page so the
/// re-rendered list keeps it.
fn filter_query(filter: &TaskFilter) -> String {
    let mut parts = Vec::new();
    if !filter.search.is_empty() {
        parts.push(format!("search={}", encode_component(&filter.search)));
    }
    for day in &filter.days {
        parts.push(format!("days={day}"));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("?{}", parts.join("&"))
    }
}

fn encode_component(text: &str) -> String {
    let mut out = String::new();
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

pub fn render_login(notifications: &[Notification], ttl: Duration) -> String {
    let content = r#"<header><h1>Sign in</h1></header>
<section class="card">
  <form method="post" action="/login" class="auth-form">
    <input name="username" placeholder="Username" required autocomplete="username">
    <input name="password" type="password" placeholder="Password" required autocomplete="current-password">
    <button class="btn-primary" type="submit">Log in</button>
  </form>
</section>
<section class="card">
  <h2>New here?</h2>
  <form method="post" action="/register" class="auth-form">
    <input name="username" placeholder="Username" required>
    <input name="password" type="password" placeholder="Password (8+ characters)" required minlength="8">
    <button class="btn-secondary" type="submit">Create account</button>
  </form>
</section>"#;
    render_layout("Sign in", content, notifications, ttl, "/login", "")
}

fn render_notifications(notifications: &[Notification], back: &str) -> String {
    let mut out = String::new();
    for notification in notifications {
        let _ = write!(
            out,
            r#"<div class="notification {severity}" data-notification>
  <span>{text}</span>
  <form method="post" action="/notifications/{id}/dismiss"><input type="hidden" name="back" value="{back}"><button type="submit" aria-label="Dismiss">&times;</button></form>
</div>"#,
            severity = notification.severity.as_str(),
            text = escape(&notification.text),
            id = notification.id,
            back = escape(back),
        );
    }
    out
}

fn render_layout(
    title: &str,
    content: &str,
    notifications: &[Notification],
    ttl: Duration,
    back: &str,
    page_script: &str,
) -> String {
    fill_template(
        LAYOUT_HTML,
        &[
            ("TITLE", &escape(title)),
            ("TTL_MS", &ttl.as_millis().to_string()),
            ("NOTIFICATIONS", &render_notifications(notifications, back)),
            ("PAGE_SCRIPT", page_script),
            ("CONTENT", content),
        ],
    )
}

/// Replaces each `{{NAME}}` in the template in a single pass. Substituted
/// values are never scanned again; unknown names are kept as written.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let value = after.find("}}").and_then(|end| {
            let name = &after[..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });
        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

const DASHBOARD_SCRIPT: &str = r#"<script src="https://cdn.jsdelivr.net/npm/sortablejs@1.15.2/Sortable.min.js"></script>
  <script>
    const list = document.getElementById('tasks');
    if (list && window.Sortable && window.innerWidth > 400) {
      Sortable.create(list, {
        animation: 150,
        fallbackOnBody: true,
        swapThreshold: 0.65,
        onEnd: () => {
          const ids = Array.from(list.querySelectorAll(':scope > li[data-id]')).map((li) => li.dataset.id);
          document.getElementById('reorder-order').value = ids.join(',');
          document.getElementById('reorder-form').submit();
        },
      });
    }
  </script>"#;

const MANAGE_SCRIPT: &str = r#"<script>
    const fileInput = document.getElementById('importFile');
    if (fileInput) {
      fileInput.addEventListener('change', async (event) => {
        const file = event.target.files[0];
        if (!file) return;
        document.getElementById('import-content').value = await file.text();
      });
    }
    document.querySelectorAll('form[data-confirm]').forEach((form) => {
      form.addEventListener('submit', (event) => {
        if (!window.confirm(form.dataset.confirm)) event.preventDefault();
      });
    });
  </script>"#;

const LAYOUT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}} · Tasks</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 24px 18px 48px;
    }

    nav {
      display: flex;
      gap: 16px;
      align-items: center;
      max-width: 860px;
      margin: 0 auto 16px;
    }

    nav a {
      color: var(--accent-2);
      font-weight: 600;
      text-decoration: none;
    }

    nav form {
      margin-left: auto;
    }

    .app {
      max-width: 860px;
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    .card,
    .stat {
      background: var(--card);
      border-radius: 20px;
      padding: 18px;
      box-shadow: var(--shadow);
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .stat .label {
      display: block;
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .task-list {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 10px;
    }

    .task-item {
      display: grid;
      grid-template-columns: 1fr auto;
      gap: 6px;
      padding: 12px;
      border-radius: 14px;
      background: white;
      cursor: grab;
    }

    .task-item.completed span {
      text-decoration: line-through;
      color: #8b857d;
    }

    .subtasks,
    .subtask-form {
      grid-column: 1 / -1;
    }

    .heatmap {
      display: grid;
      grid-template-columns: repeat(auto-fill, 18px);
      gap: 4px;
    }

    .heatmap-square {
      width: 18px;
      height: 18px;
      border-radius: 4px;
    }

    .manage-task-card {
      background: white;
      border-radius: 14px;
      padding: 12px;
      margin-top: 10px;
      display: grid;
      gap: 8px;
    }

    .manage-task-card.archived {
      opacity: 0.55;
    }

    .manage-task-card.focused {
      outline: 2px solid var(--accent);
    }

    .manage-actions {
      display: flex;
      gap: 8px;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 8px 16px;
      font-weight: 600;
      cursor: pointer;
    }

    .btn-primary {
      background: var(--accent);
      color: white;
    }

    .btn-secondary {
      background: var(--accent-2);
      color: white;
    }

    .btn-danger {
      background: #c63b2b;
      color: white;
    }

    .btn-link {
      background: none;
      color: var(--accent-2);
      padding: 0;
    }

    #notifications {
      position: fixed;
      top: 16px;
      right: 16px;
      display: grid;
      gap: 8px;
      z-index: 10;
    }

    .notification {
      display: flex;
      align-items: center;
      gap: 12px;
      padding: 12px 16px;
      border-radius: 12px;
      color: white;
      background: var(--accent-2);
      box-shadow: var(--shadow);
    }

    .notification.success {
      background: #2d7a4b;
    }

    .notification.error {
      background: #c63b2b;
    }

    .notification button {
      background: transparent;
      color: inherit;
      padding: 0 4px;
    }
  </style>
</head>
<body>
  <nav>
    <a href="/">Dashboard</a>
    <a href="/manage">Manage</a>
    <form method="post" action="/logout"><button class="btn-link" type="submit">Log out</button></form>
  </nav>
  <div id="notifications">{{NOTIFICATIONS}}</div>
  <main class="app">
{{CONTENT}}
  </main>
  <script>
    document.querySelectorAll('[data-notification]').forEach((el) => {
      setTimeout(() => el.remove(), {{TTL_MS}});
    });
    document.querySelectorAll('[data-autosubmit]').forEach((el) => {
      el.addEventListener('change', () => el.form.submit());
    });
  </script>
  {{PAGE_SCRIPT}}
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: i64, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            active: true,
            days: vec![1],
            completed: false,
            priority: 0,
            has_subtasks: false,
            subtasks: Vec::new(),
        }
    }

    #[test]
    fn escape_handles_markup() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn dashboard_lists_tasks_in_given_order() {
        let view = DashboardView {
            tasks: Some(vec![task(5, "First"), task(2, "<Second>")]),
            stats: None,
        };
        let html = render_dashboard(&view, None, &[], Duration::from_secs(5));
        let first = html.find(r#"data-id="5""#).unwrap();
        let second = html.find(r#"data-id="2""#).unwrap();
        assert!(first < second);
        assert!(html.contains("&lt;Second&gt;"));
        assert!(!html.contains("<Second>"));
        assert!(html.contains("setTimeout(() => el.remove(), 5000)"));
    }

    #[test]
    fn manage_forms_keep_filter() {
        let filter = TaskFilter::new("buy milk", vec![2]);
        let tasks = vec![task(3, "Buy milk")];
        let html = render_manage(&ManagePage {
            tasks: &tasks,
            filter: &filter,
            focus: Some(3),
            notifications: &[],
            ttl: Duration::from_secs(5),
        });
        assert!(html.contains("/manage/tasks/3/archive?search=buy%20milk&amp;days=2"));
        assert!(html.contains("manage-task-card focused"));
    }

    #[test]
    fn template_fill_is_single_pass() {
        let filled = fill_template(
            "<a>{{A}}</a><b>{{B}}</b>{{C}}",
            &[("A", "{{B}}"), ("B", "bee")],
        );
        assert_eq!(filled, "<a>{{B}}</a><b>bee</b>{{C}}");
    }

    #[tokio::test]
    async fn placeholder_text_in_notifications_renders_literally() {
        let tray = crate::notify::Notifications::default();
        tray.error("{{CONTENT}} {{PAGE_SCRIPT}}").await;
        let html = render_login(&tray.active().await, tray.ttl());

        assert!(html.contains("{{CONTENT}} {{PAGE_SCRIPT}}"));
        assert_eq!(html.matches(r#"action="/login""#).count(), 1);
    }

    #[test]
    fn placeholder_text_in_task_titles_renders_literally() {
        let view = DashboardView {
            tasks: Some(vec![task(1, "{{NOTIFICATIONS}}")]),
            stats: None,
        };
        let html = render_dashboard(&view, None, &[], Duration::from_secs(5));
        assert!(html.contains("{{NOTIFICATIONS}}"));
    }
}
