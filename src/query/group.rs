use std::collections::BTreeMap;

use chrono::{DateTime, Days, Local, NaiveDate, Utc};

use crate::models::Task;

/// Which timestamp drives grouping. Creation-date grouping feeds the main
/// list view; completion-date grouping feeds the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Created,
    Updated,
    Completed,
}

/// Tasks bucketed by local calendar day (`YYYY-MM-DD` keys). ISO keys sort
/// lexicographically, so reverse key iteration is reverse-chronological.
pub type TasksByDate = BTreeMap<String, Vec<Task>>;

/// Partition tasks into calendar-day buckets. Every task lands in exactly
/// one bucket; within a bucket, input order is preserved.
pub fn group_by_date(tasks: &[Task], field: GroupField) -> TasksByDate {
    let mut groups = TasksByDate::new();
    for task in tasks {
        let key = day_key(timestamp_of(task, field));
        groups.entry(key).or_default().push(task.clone());
    }
    groups
}

fn timestamp_of(task: &Task, field: GroupField) -> DateTime<Utc> {
    match field {
        GroupField::Created => task.created_at,
        GroupField::Updated => task.updated_at,
        // Older documents can lack completedAt; fall back to the last edit.
        GroupField::Completed => task.completed_at.unwrap_or(task.updated_at),
    }
}

pub fn day_key(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// Human label for a date key: "Today", "Yesterday", or a weekday-prefixed
/// calendar date. Unparsable keys fall back to the raw key.
pub fn day_label(key: &str, today: NaiveDate) -> String {
    let Ok(date) = key.parse::<NaiveDate>() else {
        return key.to_string();
    };
    if date == today {
        "Today".to_string()
    } else if Some(date) == today.checked_sub_days(Days::new(1)) {
        "Yesterday".to_string()
    } else {
        date.format("%a, %b %-d, %Y").to_string()
    }
}
