pub mod task;

pub use task::{NewTaskRequest, Priority, Task, UpdateTaskRequest, parse_due_date};
