pub mod filter;
pub mod group;
pub mod sort;
pub mod stats;

pub use filter::{FilterConfig, StatusFilter, TagMode, apply_filter};
pub use group::{GroupField, TasksByDate, day_label, group_by_date};
pub use sort::{Direction, SortConfig, SortField, apply_sort};
pub use stats::{ArchiveStats, archive_stats};
