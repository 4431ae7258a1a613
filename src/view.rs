use crate::errors::ClientError;
use crate::models::{DayHistory, Stats, Task, TaskDraft};
use chrono::NaiveDate;
use serde_json::Value;

pub const WEEKDAYS: [(u8, &str); 7] = [
    (1, "Mon"),
    (2, "Tue"),
    (3, "Wed"),
    (4, "Thu"),
    (5, "Fri"),
    (6, "Sat"),
    (7, "Sun"),
];

/// Stable ascending sort on priority.
pub fn sort_by_priority(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| task.priority);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub search: String,
    pub days: Vec<u8>,
}

impl TaskFilter {
    pub fn new(search: impl Into<String>, days: Vec<u8>) -> Self {
        Self {
            search: search.into(),
            days,
        }
    }

    /// Title contains the search text (case-insensitive) and, when any day is
    /// selected, the task is scheduled on at least one of them.
    pub fn matches(&self, task: &Task) -> bool {
        let needle = self.search.trim().to_lowercase();
        let text_match = task.title.to_lowercase().contains(&needle);
        let day_match = self.days.is_empty() || self.days.iter().any(|day| task.days.contains(day));
        text_match && day_match
    }

    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }
}

/// Comma or whitespace separated weekday numbers; anything outside 1-7 is
/// ignored.
pub fn parse_days(raw: &str) -> Vec<u8> {
    let mut days: Vec<u8> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter_map(|part| part.trim().parse::<u8>().ok())
        .filter(|day| (1..=7).contains(day))
        .collect();
    days.sort_unstable();
    days.dedup();
    days
}

/// Comma separated task ids in display order.
pub fn parse_order(raw: &str) -> Option<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<i64>().ok())
        .collect()
}

/// A draft that may be sent for creation: needs a title and at least one day.
pub fn validate_draft(title: &str, days: Vec<u8>) -> Option<TaskDraft> {
    let title = title.trim();
    if title.is_empty() || days.is_empty() {
        return None;
    }
    Some(TaskDraft {
        title: title.to_string(),
        days,
    })
}

/// Reads a bulk-import file: a JSON array of `{title, days}` objects.
/// Entries without a title or a days array are skipped.
pub fn parse_import(text: &str) -> Result<Vec<TaskDraft>, ClientError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| ClientError::MalformedImport(err.to_string()))?;
    let Value::Array(entries) = value else {
        return Err(ClientError::MalformedImport("expected a JSON array".to_string()));
    };

    Ok(entries.iter().filter_map(import_entry).collect())
}

fn import_entry(entry: &Value) -> Option<TaskDraft> {
    let title = entry.get("title")?.as_str()?.trim();
    if title.is_empty() {
        return None;
    }
    let days = entry
        .get("days")?
        .as_array()?
        .iter()
        .filter_map(Value::as_u64)
        .filter_map(|day| u8::try_from(day).ok())
        .collect();
    Some(TaskDraft {
        title: title.to_string(),
        days,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatLevel {
    None,
    Low,
    Medium,
    High,
}

impl HeatLevel {
    pub fn for_percent(percent: f64) -> Self {
        if percent > 80.0 {
            Self::High
        } else if percent > 40.0 {
            Self::Medium
        } else if percent > 0.0 {
            Self::Low
        } else {
            Self::None
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::None => "#ebedf0",
            Self::Low => "#9be9a8",
            Self::Medium => "#40c463",
            Self::High => "#216e39",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatCell {
    pub date: String,
    pub label: String,
    pub percent: f64,
    pub level: HeatLevel,
}

impl From<&DayHistory> for HeatCell {
    fn from(day: &DayHistory) -> Self {
        let label = match NaiveDate::parse_from_str(&day.date, "%Y-%m-%d") {
            Ok(date) => date.format("%a %d %b").to_string(),
            Err(_) => day.date.clone(),
        };
        let mut label = format!("{label}: {}%", day.percent.round());
        if let (Some(done), Some(scheduled)) = (day.completed, day.scheduled) {
            label.push_str(&format!(" ({done}/{scheduled})"));
        }
        Self {
            date: day.date.clone(),
            label,
            percent: day.percent,
            level: HeatLevel::for_percent(day.percent),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsView {
    pub total_created: u64,
    pub total_completed: u64,
    pub success_rate: u64,
    pub today_rate: u64,
    pub heatmap: Vec<HeatCell>,
}

impl From<&Stats> for StatsView {
    fn from(stats: &Stats) -> Self {
        let summary = &stats.summary;
        let success_rate = match summary.success_rate {
            Some(rate) => rate.round().max(0.0) as u64,
            None if summary.total_created == 0 => 0,
            None => ((summary.total_completed_ever as f64 / summary.total_created as f64) * 100.0)
                .round() as u64,
        };

        Self {
            total_created: summary.total_created,
            total_completed: summary.total_completed_ever,
            success_rate,
            today_rate: summary.today_percent.unwrap_or(0.0).round().max(0.0) as u64,
            heatmap: stats.history.iter().map(HeatCell::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatsSummary;

    fn task(id: i64, title: &str, days: &[u8], priority: i64) -> Task {
        Task {
            id,
            title: title.to_string(),
            active: true,
            days: days.to_vec(),
            completed: false,
            priority,
            has_subtasks: false,
            subtasks: Vec::new(),
        }
    }

    #[test]
    fn sorts_ascending_by_priority() {
        let mut tasks = vec![task(1, "a", &[], 3), task(2, "b", &[], 1), task(3, "c", &[], 2)];
        sort_by_priority(&mut tasks);
        let priorities: Vec<_> = tasks.iter().map(|t| t.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3]);
    }

    #[test]
    fn sort_is_stable_for_equal_priorities() {
        let mut tasks = vec![task(1, "a", &[], 0), task(2, "b", &[], 0), task(3, "c", &[], -1)];
        sort_by_priority(&mut tasks);
        let ids: Vec<_> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn filter_by_search_and_days() {
        let tasks = vec![task(1, "Buy milk", &[1, 3], 0), task(2, "Run", &[2], 0)];

        let by_text = TaskFilter::new("mil", Vec::new()).apply(&tasks);
        assert_eq!(by_text.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1]);

        let by_day = TaskFilter::new("", vec![2]).apply(&tasks);
        assert_eq!(by_day.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);

        let upper = TaskFilter::new("MILK", Vec::new()).apply(&tasks);
        assert_eq!(upper.len(), 1);

        assert_eq!(TaskFilter::default().apply(&tasks).len(), 2);
        assert!(TaskFilter::new("run", vec![1]).apply(&tasks).is_empty());
    }

    #[test]
    fn parse_days_keeps_valid_weekdays() {
        assert_eq!(parse_days("3, 1 9,x,1"), vec![1, 3]);
        assert!(parse_days("").is_empty());
    }

    #[test]
    fn parse_order_rejects_garbage() {
        assert_eq!(parse_order("5,2,8"), Some(vec![5, 2, 8]));
        assert_eq!(parse_order(""), Some(Vec::new()));
        assert_eq!(parse_order("5,a"), None);
    }

    #[test]
    fn drafts_need_title_and_days() {
        assert!(validate_draft("  ", vec![1]).is_none());
        assert!(validate_draft("Run", Vec::new()).is_none());
        assert_eq!(
            validate_draft(" Run ", vec![2]),
            Some(TaskDraft {
                title: "Run".to_string(),
                days: vec![2]
            })
        );
    }

    #[test]
    fn import_skips_incomplete_entries() {
        let drafts = parse_import(
            r#"[{"title": "Run", "days": [1, 2]}, {"title": "No days"}, {"days": [3]}, {"title": "", "days": []}]"#,
        )
        .unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].days, vec![1, 2]);
    }

    #[test]
    fn import_rejects_non_arrays() {
        assert!(matches!(
            parse_import(r#"{"title": "Run"}"#),
            Err(ClientError::MalformedImport(_))
        ));
        assert!(matches!(
            parse_import("not json"),
            Err(ClientError::MalformedImport(_))
        ));
    }

    #[test]
    fn heat_levels_follow_thresholds() {
        assert_eq!(HeatLevel::for_percent(0.0), HeatLevel::None);
        assert_eq!(HeatLevel::for_percent(10.0), HeatLevel::Low);
        assert_eq!(HeatLevel::for_percent(40.0), HeatLevel::Low);
        assert_eq!(HeatLevel::for_percent(41.0), HeatLevel::Medium);
        assert_eq!(HeatLevel::for_percent(81.0), HeatLevel::High);
    }

    #[test]
    fn stats_view_computes_success_rate_when_missing() {
        let stats = Stats {
            summary: StatsSummary {
                total_created: 3,
                total_completed_ever: 2,
                today_percent: None,
                success_rate: None,
            },
            history: vec![DayHistory {
                date: "2026-01-05".to_string(),
                percent: 50.0,
                completed: Some(1),
                scheduled: Some(2),
            }],
        };
        let view = StatsView::from(&stats);
        assert_eq!(view.success_rate, 67);
        assert_eq!(view.today_rate, 0);
        assert_eq!(view.heatmap[0].level, HeatLevel::Medium);
        assert_eq!(view.heatmap[0].label, "Mon 05 Jan: 50% (1/2)");
    }

    #[test]
    fn stats_view_handles_no_tasks() {
        let stats = Stats {
            summary: StatsSummary {
                total_created: 0,
                total_completed_ever: 0,
                today_percent: Some(12.4),
                success_rate: None,
            },
            history: Vec::new(),
        };
        let view = StatsView::from(&stats);
        assert_eq!(view.success_rate, 0);
        assert_eq!(view.today_rate, 12);
    }
}
