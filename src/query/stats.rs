use chrono::{DateTime, Datelike, Days, Local};
use serde::Serialize;

use crate::models::Task;

/// Aggregate counts over completed tasks. `this_week` is a superset of
/// `today`, so `total >= this_week >= today` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveStats {
    pub total: usize,
    pub today: usize,
    pub this_week: usize,
}

/// Count completed tasks overall, since local midnight, and since the start
/// of the current week (Sunday, local midnight). A completed task with no
/// completion timestamp counts toward the total only.
pub fn archive_stats(tasks: &[Task], now: DateTime<Local>) -> ArchiveStats {
    let today = now.date_naive();
    let week_start = today
        .checked_sub_days(Days::new(u64::from(now.weekday().num_days_from_sunday())))
        .unwrap_or(today);

    let mut stats = ArchiveStats::default();
    for task in tasks.iter().filter(|t| t.completed) {
        stats.total += 1;
        let Some(completed_at) = task.completed_at else {
            continue;
        };
        let completed_day = completed_at.with_timezone(&Local).date_naive();
        if completed_day >= week_start {
            stats.this_week += 1;
        }
        if completed_day >= today {
            stats.today += 1;
        }
    }
    stats
}
