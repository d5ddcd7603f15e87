mod progress;

pub use progress::{StageStyle, StagedProgress};
