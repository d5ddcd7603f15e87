use indexmap::IndexMap;

use crate::model::IssueRow;

/// Fixed priority order for the breakdown chart; priorities outside the
/// ladder are not charted, matching the report's historical shape.
pub const PRIORITY_LADDER: [&str; 5] = ["Highest", "High", "Medium", "Low", "None"];

const UNASSIGNED: &str = "Unassigned";

/// Summary statistics of one issue category. A pure function of the rows it
/// was built from; maps keep first-seen order so rendering stays stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryStats {
    pub total: usize,
    pub done: usize,
    pub in_progress: usize,
    pub points_total: f64,
    pub points_done: f64,
    pub by_status: IndexMap<String, usize>,
    pub by_assignee: IndexMap<String, usize>,
    pub by_priority: IndexMap<String, usize>,
}

// Aggregation
impl CategoryStats {
    pub fn from_rows(rows: &[IssueRow]) -> Self {
        let mut stats = rows.iter().fold(Self::default(), |mut acc, row| {
            acc.total += 1;
            acc.points_total += row.story_points;
            if row.is_done_like() {
                acc.done += 1;
                acc.points_done += row.story_points;
            } else if row.is_in_progress() {
                acc.in_progress += 1;
            }
            *acc.by_status.entry(row.status.clone()).or_insert(0) += 1;
            *acc.by_assignee.entry(row.assignee.clone()).or_insert(0) += 1;
            *acc.by_priority.entry(row.priority.clone()).or_insert(0) += 1;
            acc
        });
        stats.by_assignee.entry(UNASSIGNED.to_string()).or_insert(0);
        stats.by_priority = reindex_priorities(&stats.by_priority);
        stats
    }
}

fn reindex_priorities(counts: &IndexMap<String, usize>) -> IndexMap<String, usize> {
    PRIORITY_LADDER
        .iter()
        .map(|priority| (priority.to_string(), counts.get(*priority).copied().unwrap_or(0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, assignee: &str, priority: &str, points: f64) -> IssueRow {
        IssueRow {
            key: "K-1".to_string(),
            summary: String::new(),
            status: status.to_string(),
            assignee: assignee.to_string(),
            reporter: "Kim".to_string(),
            issue_type: "Story".to_string(),
            priority: priority.to_string(),
            story_points: points,
            created: None,
            updated: None,
        }
    }

    #[test]
    fn zero_rows_aggregate_to_zeroes() {
        let stats = CategoryStats::from_rows(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.done, 0);
        assert_eq!(stats.points_total, 0.0);
        assert!(stats.by_status.is_empty());
    }

    #[test]
    fn counts_and_points_accumulate() {
        let rows = vec![
            row("Done", "Avery", "High", 5.0),
            row("In Progress", "Avery", "Medium", 3.0),
            row("To Do", "Sam", "Low", 2.0),
        ];
        let stats = CategoryStats::from_rows(&rows);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.done, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.points_total, 10.0);
        assert_eq!(stats.points_done, 5.0);
        assert_eq!(stats.by_assignee["Avery"], 2);
    }

    #[test]
    fn status_order_is_first_seen() {
        let rows = vec![
            row("To Do", "A", "High", 1.0),
            row("Done", "A", "High", 1.0),
            row("To Do", "A", "High", 1.0),
        ];
        let stats = CategoryStats::from_rows(&rows);
        let statuses: Vec<&String> = stats.by_status.keys().collect();
        assert_eq!(statuses, ["To Do", "Done"]);
    }

    #[test]
    fn priorities_are_reindexed_over_the_ladder() {
        let rows = vec![row("Open", "A", "High", 0.0), row("Open", "A", "Blocker", 0.0)];
        let stats = CategoryStats::from_rows(&rows);
        let priorities: Vec<&String> = stats.by_priority.keys().collect();
        assert_eq!(priorities, ["Highest", "High", "Medium", "Low", "None"]);
        assert_eq!(stats.by_priority["High"], 1);
        assert_eq!(stats.by_priority["Medium"], 0);
    }

    #[test]
    fn unassigned_always_appears_in_workload() {
        let stats = CategoryStats::from_rows(&[row("Open", "Avery", "High", 0.0)]);
        assert_eq!(stats.by_assignee["Unassigned"], 0);
    }
}
