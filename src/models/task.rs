use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::FieldError;

pub const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Numeric rank used by the sort engine (High outranks Low).
    pub fn ordinal(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

/// A single to-do item. This is the canonical schema; documents written by
/// the legacy client (`text`/`notes`/`category`) are folded into it when a
/// file is loaded, see [`Task::fold_legacy_category`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(alias = "text")]
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    // Legacy single-category field; consumed at load time, never written back.
    #[serde(default, skip_serializing)]
    category: Option<String>,
    #[serde(default, deserialize_with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "notes", skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            completed: false,
            priority: Priority::default(),
            tags: Vec::new(),
            category: None,
            due_date: None,
            memo: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Merge a legacy `category` into `tags`. One-time normalization applied
    /// at the file-loading boundary; downstream code only ever sees `tags`.
    pub fn fold_legacy_category(&mut self) {
        if let Some(category) = self.category.take() {
            if !category.is_empty() && !self.tags.contains(&category) {
                self.tags.push(category);
            }
        }
    }

    /// Flip completion, stamping `completed_at` on the way in and clearing
    /// it on the way out.
    pub fn set_completed(&mut self, completed: bool) {
        let now = Utc::now();
        self.completed = completed;
        self.completed_at = if completed { Some(now) } else { None };
        self.updated_at = now;
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Parse a due date from user input. Accepts RFC 3339 timestamps and bare
/// `YYYY-MM-DD` dates (interpreted as UTC midnight).
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDate>()
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// Stored documents may carry hand-edited or truncated date strings; an
// unparsable due date loads as "no deadline" instead of failing the file.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_due_date))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaskRequest {
    pub title: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
}

impl NewTaskRequest {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        validate_title(&self.title, &mut errors);
        validate_due_date(self.due_date.as_deref(), &mut errors);
        errors
    }

    pub fn into_task(self) -> Task {
        let mut task = Task::new(self.title.trim());
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
        task.due_date = self.due_date.as_deref().and_then(parse_due_date);
        task.memo = self.memo.filter(|m| !m.is_empty());
        task
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    // Double options: absent = leave untouched, null = clear.
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub memo: Option<Option<String>>,
}

impl UpdateTaskRequest {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if let Some(title) = &self.title {
            validate_title(title, &mut errors);
        }
        if let Some(Some(raw)) = &self.due_date {
            validate_due_date(Some(raw), &mut errors);
        }
        errors
    }

    /// Merge the patch onto an existing task and refresh `updated_at`.
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title.trim().to_string();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date.as_deref().and_then(parse_due_date);
        }
        if let Some(memo) = self.memo {
            task.memo = memo.filter(|m| !m.is_empty());
        }
        task.touch();
    }
}

fn validate_title(title: &str, errors: &mut Vec<FieldError>) {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new("title", "Title must not be empty"));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        errors.push(FieldError::new(
            "title",
            format!("Title must be at most {MAX_TITLE_LEN} characters"),
        ));
    }
}

fn validate_due_date(raw: Option<&str>, errors: &mut Vec<FieldError>) {
    if let Some(raw) = raw {
        if !raw.is_empty() && parse_due_date(raw).is_none() {
            errors.push(FieldError::new("dueDate", "Due date must be a valid date"));
        }
    }
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
