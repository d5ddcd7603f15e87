mod client;
mod error;

pub use client::JiraClient;
pub use error::JiraError;

/// One issue exactly as the Agile API returned it; discarded after parsing.
pub type RawIssue = serde_json::Value;
