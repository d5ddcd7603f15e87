mod analyzer;
mod model;

pub use model::{CategoryStats, PRIORITY_LADDER};
