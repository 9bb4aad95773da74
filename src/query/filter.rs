use serde::Deserialize;

use crate::models::{Priority, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMode {
    #[default]
    Any,
    All,
}

/// Filter configuration. Every field defaults to its disabled state, so the
/// default config is the identity filter.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    pub status: StatusFilter,
    pub priority: Option<Priority>,
    pub tags: Vec<String>,
    pub tag_mode: TagMode,
    pub search: String,
}

/// Apply the filter, keeping input order for tasks that pass. Predicates are
/// independent and ANDed; a disabled predicate keeps everything.
pub fn apply_filter(tasks: &[Task], filter: &FilterConfig) -> Vec<Task> {
    let needle = filter.search.trim().to_lowercase();
    tasks
        .iter()
        .filter(|t| matches_status(t, filter.status))
        .filter(|t| matches_priority(t, filter.priority))
        .filter(|t| matches_tags(t, &filter.tags, filter.tag_mode))
        .filter(|t| matches_search(t, &needle))
        .cloned()
        .collect()
}

fn matches_status(task: &Task, status: StatusFilter) -> bool {
    match status {
        StatusFilter::All => true,
        StatusFilter::Active => !task.completed,
        StatusFilter::Completed => task.completed,
    }
}

fn matches_priority(task: &Task, priority: Option<Priority>) -> bool {
    priority.is_none_or(|p| task.priority == p)
}

fn matches_tags(task: &Task, tags: &[String], mode: TagMode) -> bool {
    if tags.is_empty() {
        return true;
    }
    match mode {
        TagMode::Any => tags.iter().any(|tag| task.tags.contains(tag)),
        TagMode::All => tags.iter().all(|tag| task.tags.contains(tag)),
    }
}

fn matches_search(task: &Task, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    task.title.to_lowercase().contains(needle)
        || task
            .memo
            .as_deref()
            .is_some_and(|m| m.to_lowercase().contains(needle))
        || task.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}
