use chrono::NaiveDate;
use log::warn;
use serde_json::Value;

use crate::model::{Config, Result};

/// Statuses counting as finished. Matched case-insensitively as substrings so
/// that workflow variants like "Done-Pending-Review" still count.
pub const DONE_VOCABULARY: [&str; 3] = ["done", "closed", "resolved"];
pub const IN_PROGRESS_VOCABULARY: [&str; 2] = ["in progress", "development"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Story,
    Defect,
    Excluded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssueRow {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: String,
    pub reporter: String,
    pub issue_type: String,
    pub priority: String,
    pub story_points: f64,
    pub created: Option<NaiveDate>,
    pub updated: Option<NaiveDate>,
}

// Parser
impl IssueRow {
    pub fn parse(issue: &Value, points_field: &str) -> Result<Self> {
        let Some(key) = issue["key"].as_str() else {
            return Err("Not found 'key' field".into());
        };
        let fields = &issue["fields"];
        Ok(Self {
            key: key.to_string(),
            summary: fields["summary"].as_str().unwrap_or("").to_string(),
            status: fields["status"]["name"].as_str().unwrap_or("Unknown").to_string(),
            assignee: fields["assignee"]["displayName"]
                .as_str()
                .unwrap_or("Unassigned")
                .to_string(),
            reporter: fields["reporter"]["displayName"]
                .as_str()
                .unwrap_or("Unknown")
                .to_string(),
            issue_type: fields["issuetype"]["name"].as_str().unwrap_or("Unknown").to_string(),
            priority: fields["priority"]["name"].as_str().unwrap_or("None").to_string(),
            story_points: fields[points_field].as_f64().unwrap_or(0.0),
            created: parse_date(fields["created"].as_str()),
            updated: parse_date(fields["updated"].as_str()),
        })
    }
}

// Classifier
impl IssueRow {
    pub fn categorize(&self, story_types: &[String], defect_types: &[String]) -> Category {
        let name = self.issue_type.trim();
        if story_types.iter().any(|t| t == name) {
            Category::Story
        } else if defect_types.iter().any(|t| t == name) {
            Category::Defect
        } else {
            Category::Excluded
        }
    }

    pub fn is_done_like(&self) -> bool {
        status_matches(&self.status, &DONE_VOCABULARY)
    }

    pub fn is_in_progress(&self) -> bool {
        status_matches(&self.status, &IN_PROGRESS_VOCABULARY)
    }
}

fn status_matches(status: &str, vocabulary: &[&str]) -> bool {
    let status = status.to_lowercase();
    vocabulary.iter().any(|term| status.contains(term))
}

/// Jira timestamps carry an offset without a colon, so only the date part is
/// kept, matching the report's date-only columns.
fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let date = raw?.get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Splits fetched issues into stories and defects by their type name, newest
/// update first. Issues matching neither set are dropped; the count of
/// dropped issues is returned for the run summary.
pub fn partition_rows(issues: &[Value], config: &Config) -> (Vec<IssueRow>, Vec<IssueRow>, usize) {
    let mut rows = Vec::new();
    for issue in issues {
        match IssueRow::parse(issue, &config.story_points_field) {
            Ok(row) => rows.push(row),
            Err(e) => warn!(
                "skipping issue {}: {e}",
                issue["key"].as_str().unwrap_or("unknown")
            ),
        }
    }
    rows.sort_by(|a, b| b.updated.cmp(&a.updated));

    let mut stories = Vec::new();
    let mut defects = Vec::new();
    let mut excluded = 0;
    for row in rows {
        match row.categorize(&config.story_types, &config.defect_types) {
            Category::Story => stories.push(row),
            Category::Defect => defects.push(row),
            Category::Excluded => excluded += 1,
        }
    }
    (stories, defects, excluded)
}
