pub mod models;
pub mod tasks;

pub use models::{display_name, ModelCatalog, ModelEntry, DEFAULT_MODEL};
pub use tasks::{task_by_id, tasks_by_category, Category, TaskTemplate, TASKS};
