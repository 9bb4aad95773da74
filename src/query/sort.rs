use std::cmp::Ordering;

use serde::Deserialize;

use crate::models::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Title,
    Priority,
    DueDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy)]
pub struct SortConfig {
    pub field: SortField,
    pub direction: Direction,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: Direction::Desc,
        }
    }
}

/// Sort a snapshot of the collection. The sort is stable, so equal-key tasks
/// keep their relative input order.
pub fn apply_sort(tasks: &[Task], sort: &SortConfig) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| compare(a, b, sort));
    sorted
}

fn compare(a: &Task, b: &Task, sort: &SortConfig) -> Ordering {
    match sort.field {
        SortField::Title => directed(
            a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            sort.direction,
        ),
        SortField::Priority => directed(
            a.priority.ordinal().cmp(&b.priority.ordinal()),
            sort.direction,
        ),
        // Undated tasks trail in BOTH directions; only the ordering among
        // dated tasks responds to `direction`.
        SortField::DueDate => match (a.due_date, b.due_date) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => directed(x.cmp(&y), sort.direction),
        },
        SortField::CreatedAt => directed(a.created_at.cmp(&b.created_at), sort.direction),
        SortField::UpdatedAt => directed(a.updated_at.cmp(&b.updated_at), sort.direction),
    }
}

fn directed(ordering: Ordering, direction: Direction) -> Ordering {
    match direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}
