pub mod palette;
pub mod project;
pub mod task;

pub use palette::{StagePalette, StageType, StatusColors};
pub use project::{Project, StageEdit};
pub use task::{Stage, StageStatus, Task};
