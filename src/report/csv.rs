use std::path::Path;

use crate::model::{IssueRow, Result};

const COLUMNS: [&str; 10] = [
    "Task ID",
    "Task Name",
    "Status",
    "Assigned To",
    "Reporter",
    "Issue Type",
    "Priority",
    "Story Points",
    "Created",
    "Last Updated",
];

/// Writes one category to disk, overwriting any previous export.
pub fn export_rows(path: &Path, rows: &[IssueRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(COLUMNS)?;
    for row in rows {
        let points = row.story_points.to_string();
        let created = fmt_date(row.created);
        let updated = fmt_date(row.updated);
        writer.write_record([
            row.key.as_str(),
            row.summary.as_str(),
            row.status.as_str(),
            row.assignee.as_str(),
            row.reporter.as_str(),
            row.issue_type.as_str(),
            row.priority.as_str(),
            points.as_str(),
            created.as_str(),
            updated.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn fmt_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::model::IssueRow;

    #[test]
    fn exports_header_and_rows() {
        let rows = vec![IssueRow {
            key: "PROJ-7".to_string(),
            summary: "Fix, with comma".to_string(),
            status: "Done".to_string(),
            assignee: "Avery".to_string(),
            reporter: "Kim".to_string(),
            issue_type: "Bug".to_string(),
            priority: "High".to_string(),
            story_points: 2.0,
            created: NaiveDate::from_ymd_opt(2026, 1, 2),
            updated: NaiveDate::from_ymd_opt(2026, 1, 9),
        }];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sprint_defects.csv");
        export_rows(&path, &rows).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Task ID,Task Name,Status,Assigned To,Reporter,Issue Type,Priority,Story Points,Created,Last Updated"
        );
        let record = lines.next().unwrap();
        assert!(record.starts_with("PROJ-7,"));
        assert!(record.contains("\"Fix, with comma\""));
        assert!(record.contains("2026-01-09"));
    }
}
