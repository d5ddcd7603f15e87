use crate::analyze::CategoryStats;

// Derived metrics
impl CategoryStats {
    /// Done points over total points, as a percentage. Zero when the
    /// category carries no points at all.
    pub fn completion_rate(&self) -> f64 {
        if self.points_total == 0.0 {
            0.0
        } else {
            self.points_done / self.points_total * 100.0
        }
    }

    /// Done rows over total rows, as a percentage. This is the figure shown
    /// on the summary cards.
    pub fn done_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 / self.total as f64 * 100.0
        }
    }

    /// Story points completed in the sprint.
    pub fn velocity(&self) -> f64 {
        self.points_done
    }

    pub fn todo(&self) -> usize {
        self.total - self.done - self.in_progress
    }

    pub fn open(&self) -> usize {
        self.total - self.done
    }
}
