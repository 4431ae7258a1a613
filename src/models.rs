use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub days: Vec<u8>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub has_subtasks: bool,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: i64,
    pub task_id: i64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: i64,
}

/// Payload for creating or editing a task; also one entry of an import file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub days: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct PriorityOrder<'a> {
    pub ordered_task_ids: &'a [i64],
}

#[derive(Debug, Serialize)]
pub struct NewSubtask<'a> {
    pub title: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SubtaskToggle {
    pub subtask_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub summary: StatsSummary,
    #[serde(default)]
    pub history: Vec<DayHistory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    #[serde(default)]
    pub total_created: u64,
    #[serde(default)]
    pub total_completed_ever: u64,
    #[serde(default)]
    pub today_percent: Option<f64>,
    #[serde(default)]
    pub success_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayHistory {
    pub date: String,
    #[serde(default)]
    pub percent: f64,
    #[serde(default)]
    pub completed: Option<u64>,
    #[serde(default)]
    pub scheduled: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_defaults_missing_fields() {
        let task: Task = serde_json::from_str(r#"{"id": 7, "title": "Read"}"#).unwrap();
        assert!(task.active);
        assert!(task.days.is_empty());
        assert_eq!(task.priority, 0);
        assert!(task.subtasks.is_empty());
    }

    #[test]
    fn stats_accept_summary_without_rates() {
        let stats: Stats = serde_json::from_value(serde_json::json!({
            "summary": { "total_created": 4, "total_completed_ever": 3 },
            "history": [{ "date": "2026-01-05", "percent": 50 }]
        }))
        .unwrap();
        assert_eq!(stats.summary.today_percent, None);
        assert_eq!(stats.history[0].percent, 50.0);
    }
}
