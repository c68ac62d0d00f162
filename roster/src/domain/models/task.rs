use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;

use super::{wire, TaskId};
use crate::domain::ValidationError;

/// Task priority. Stored with the store's original labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "Rendah", alias = "Low")]
    Low,
    #[default]
    #[serde(rename = "Sedang", alias = "Medium")]
    Medium,
    #[serde(rename = "Tinggi", alias = "High")]
    High,
}

impl Priority {
    /// Sort rank: High first.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        f.write_str(label)
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" | "rendah" => Ok(Self::Low),
            "medium" | "sedang" => Ok(Self::Medium),
            "high" | "tinggi" => Ok(Self::High),
            other => Err(format!("unknown priority '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "todo")]
    Todo,
    #[serde(rename = "inprogress", alias = "inProgress")]
    InProgress,
    #[serde(rename = "done")]
    Done,
}

impl Status {
    pub fn is_done(self) -> bool {
        self == Self::Done
    }

    /// The status a "mark done" toggle moves to.
    pub fn toggled(self) -> Self {
        if self.is_done() {
            Self::InProgress
        } else {
            Self::Done
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Todo => "todo",
            Self::InProgress => "in progress",
            Self::Done => "done",
        };
        f.write_str(label)
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "todo" => Ok(Self::Todo),
            "inprogress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

/// A work item as stored in the `pekerjaan` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "judul")]
    pub title: String,
    #[serde(rename = "tenggat", default, with = "wire::blank_date")]
    pub due_date: Option<Date>,
    #[serde(rename = "prioritas")]
    pub priority: Priority,
    #[serde(rename = "bagian", default)]
    pub section: Option<String>,
    pub status: Status,
}

/// User input for creating or editing a task.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub due_date: Option<Date>,
    pub priority: Priority,
    pub section: String,
    /// Applied by edits only. `None` keeps the current status; new tasks start as `todo`.
    pub status: Option<Status>,
}

/// A validated task row, ready to insert or update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRow {
    #[serde(rename = "judul")]
    pub title: String,
    #[serde(rename = "tenggat", with = "wire::iso_date")]
    pub due_date: Date,
    #[serde(rename = "prioritas")]
    pub priority: Priority,
    #[serde(rename = "bagian")]
    pub section: Option<String>,
    pub status: Status,
}

/// Only the status column, for toggles.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TaskStatusPatch {
    pub status: Status,
}

impl TaskDraft {
    /// Pre-fills the draft from an existing task.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            due_date: task.due_date,
            priority: task.priority,
            section: task.section.clone().unwrap_or_default(),
            status: None,
        }
    }

    pub fn validate(&self, status: Status) -> Result<TaskRow, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        let due_date = self.due_date.ok_or(ValidationError::MissingField("due date"))?;

        Ok(TaskRow {
            title: title.to_string(),
            due_date,
            priority: self.priority,
            section: wire::trimmed_or_none(&self.section),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    #[test]
    fn decodes_store_row() {
        let task: Task = serde_json::from_value(json!({
            "id": 3,
            "judul": "Fix login",
            "tenggat": "2024-05-02",
            "prioritas": "Tinggi",
            "bagian": "Backend",
            "status": "inprogress"
        }))
        .unwrap();

        assert_eq!(task.id, TaskId::new(3));
        assert_eq!(task.due_date, Some(date!(2024 - 05 - 02)));
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.status, Status::InProgress);
    }

    #[test]
    fn missing_optional_columns_are_none() {
        let task: Task = serde_json::from_value(json!({
            "id": 4, "judul": "Write docs", "tenggat": null,
            "prioritas": "Rendah", "status": "todo"
        }))
        .unwrap();
        assert_eq!(task.due_date, None);
        assert_eq!(task.section, None);
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        let bad_priority = json!({
            "id": 5, "judul": "x", "tenggat": null, "prioritas": "Urgent", "status": "todo"
        });
        assert!(serde_json::from_value::<Task>(bad_priority).is_err());

        let bad_status = json!({
            "id": 5, "judul": "x", "tenggat": null, "prioritas": "Sedang", "status": "blocked"
        });
        assert!(serde_json::from_value::<Task>(bad_status).is_err());
    }

    #[test]
    fn toggle_moves_between_done_and_in_progress() {
        assert_eq!(Status::Done.toggled(), Status::InProgress);
        assert_eq!(Status::InProgress.toggled(), Status::Done);
        assert_eq!(Status::Todo.toggled(), Status::Done);
    }

    #[test]
    fn draft_validation() {
        let mut draft = TaskDraft {
            title: "   ".to_string(),
            due_date: Some(date!(2024 - 01 - 10)),
            ..Default::default()
        };
        assert_eq!(
            draft.validate(Status::Todo).unwrap_err(),
            ValidationError::MissingField("title")
        );

        draft.title = " Deploy ".to_string();
        draft.section = "  ".to_string();
        let row = draft.validate(Status::Todo).unwrap();
        assert_eq!(row.title, "Deploy");
        assert_eq!(row.section, None);

        let written = serde_json::to_value(&row).unwrap();
        assert_eq!(written["tenggat"], "2024-01-10");
        assert_eq!(written["prioritas"], "Sedang");
        assert_eq!(written["status"], "todo");

        draft.due_date = None;
        assert_eq!(
            draft.validate(Status::Todo).unwrap_err(),
            ValidationError::MissingField("due date")
        );
    }

    #[test]
    fn draft_from_task_keeps_status_unset() {
        let task = Task {
            id: TaskId::new(9),
            title: "Ship".to_string(),
            due_date: Some(date!(2024 - 02 - 01)),
            priority: Priority::Low,
            section: Some("Ops".to_string()),
            status: Status::Done,
        };
        let draft = TaskDraft::from_task(&task);
        assert_eq!(draft.status, None);
        assert_eq!(draft.section, "Ops");
        assert_eq!(draft.validate(task.status).unwrap().status, Status::Done);
    }

    #[test]
    fn parses_cli_style_labels() {
        assert_eq!("in-progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("later".parse::<Status>().is_err());
    }
}
