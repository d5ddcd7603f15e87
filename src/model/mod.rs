mod config;
mod issue;
mod result;

pub use config::{Args, Config, SmtpSettings, WikiSettings};
pub use issue::{partition_rows, Category, IssueRow};
pub use result::Result;
