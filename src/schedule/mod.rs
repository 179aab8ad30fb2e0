//! The date-resolution engine.
//!
//! [`calculate_task_dates`] is the entry point; the submodules are the
//! pieces it is built from plus the graph and duration helpers an editor
//! calls around it.

pub mod adjust;
pub mod engine;
pub mod graph;
pub mod resolve;
pub mod stages;
pub mod workdays;

pub use engine::calculate_task_dates;
pub use graph::{find_dependency_cycle, get_dependency_chain, would_create_cycle};
pub use stages::preview_stage_dates;
pub use workdays::{add_work_days, checked_add_work_days, count_work_days};
