use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use itertools::Itertools;
use serde_json::{json, Value};

use crate::analyze::CategoryStats;
use crate::model::{IssueRow, Result};

const TABLE_COLUMNS: [&str; 10] = [
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

const STATUS_COLORS: [(&str, &str); 10] = [
    ("Done", "#28a745"),
    ("Closed", "#20c997"),
    ("Resolved", "#17a2b8"),
    ("In Progress", "#ffc107"),
    ("Development", "#fd7e14"),
    ("To Do", "#6c757d"),
    ("Open", "#dc3545"),
    ("Reopened", "#e83e8c"),
    ("FORMAL TEST", "#007bff"),
    ("INFORMAL TEST", "#6610f2"),
];

const FALLBACK_PALETTE: [&str; 4] = ["#007bff", "#6610f2", "#e83e8c", "#20c997"];

const PRIORITY_COLORS: [(&str, &str); 5] = [
    ("Highest", "#dc3545"),
    ("High", "#fd7e14"),
    ("Medium", "#ffc107"),
    ("Low", "#28a745"),
    ("None", "#e9ecef"),
];

pub struct SprintReport<'a> {
    pub sprint_name: &'a str,
    pub generated_at: NaiveDateTime,
    pub stories: &'a [IssueRow],
    pub defects: &'a [IssueRow],
    pub story_stats: &'a CategoryStats,
    pub defect_stats: &'a CategoryStats,
}

pub trait HtmlReport {
    /// Renders the whole report. Byte-identical for identical input,
    /// including the generation timestamp, which is an input rather than a
    /// clock read.
    fn render(&self) -> String;

    fn report_create(&self, path: &Path) -> Result<()>;
}

impl HtmlReport for SprintReport<'_> {
    fn render(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sprint Report - {name}</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css">
    <link rel="stylesheet" href="https://cdn.datatables.net/1.13.6/css/dataTables.bootstrap5.min.css">
    <script src="https://cdn.plot.ly/plotly-2.27.0.min.js" charset="utf-8"></script>
    <script src="https://code.jquery.com/jquery-3.7.0.min.js"></script>
    <script src="https://cdn.datatables.net/1.13.6/js/jquery.dataTables.min.js"></script>
    <script src="https://cdn.datatables.net/1.13.6/js/dataTables.bootstrap5.min.js"></script>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <div class="header" id="header-section">
            <h1>Sprint Report</h1>
            <div class="meta-info">
                <strong>{name}</strong><br>
                Generated on {generated}
            </div>
        </div>
        <div class="content">
{summary}
{charts}
{tables}
        </div>
        <div class="footer">
            <p>Auto-generated Sprint Report | Jira Agile API</p>
        </div>
    </div>
    <script>
        $(document).ready(function() {{
            $('.data-table').DataTable({{
                pageLength: 25,
                order: [[9, 'desc']],
                responsive: true,
                language: {{
                    search: "Filter records:",
                    lengthMenu: "Show _MENU_ entries per page",
                    info: "Showing _START_ to _END_ of _TOTAL_ entries"
                }}
            }});
        }});
    </script>
</body>
</html>
"#,
            name = escape(self.sprint_name),
            generated = self.generated_at.format("%B %d, %Y at %I:%M %p"),
            css = STYLESHEET,
            summary = self.summary_section(),
            charts = self.charts_section(),
            tables = self.tables_section(),
        )
    }

    fn report_create(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())?;
        Ok(())
    }
}

// Sections
impl SprintReport<'_> {
    fn summary_section(&self) -> String {
        let stories = self.story_stats;
        let defects = self.defect_stats;
        format!(
            r#"<div class="summary-cards" id="summary-section">
    <div class="summary-card">
        <h3>Total Stories</h3>
        <div class="big-number">{story_total}</div>
        <div class="progress-bar"><div class="progress-fill" style="width: {story_rate:.1}%"></div></div>
        <div class="stat-detail">{story_done} Done &bull; {story_wip} In Progress &bull; {story_todo} To Do</div>
    </div>
    <div class="summary-card">
        <h3>Total Defects</h3>
        <div class="big-number">{defect_total}</div>
        <div class="progress-bar"><div class="progress-fill defect" style="width: {defect_rate:.1}%"></div></div>
        <div class="stat-detail">{defect_done} Resolved &bull; {defect_open} Open</div>
    </div>
    <div class="summary-card">
        <h3>Completion Rate</h3>
        <div class="big-number">{story_rate:.1}%</div>
        <div class="stat-detail">Story Completion &bull; {velocity} of {points_total} story points</div>
    </div>
    <div class="summary-card">
        <h3>Defect Resolution</h3>
        <div class="big-number">{defect_rate:.1}%</div>
        <div class="stat-detail">Defects Resolved</div>
    </div>
</div>"#,
            story_total = stories.total,
            story_rate = stories.done_rate(),
            story_done = stories.done,
            story_wip = stories.in_progress,
            story_todo = stories.todo(),
            defect_total = defects.total,
            defect_rate = defects.done_rate(),
            defect_done = defects.done,
            defect_open = defects.open(),
            velocity = stories.velocity(),
            points_total = stories.points_total,
        )
    }

    fn charts_section(&self) -> String {
        let mut sections = String::new();
        if !self.stories.is_empty() {
            sections.push_str(&format!(
                r#"<div class="chart-section" id="story-charts-section">
    <h2>&#128202; Story Metrics</h2>
    <div class="charts-row">
{}
{}
    </div>
</div>
"#,
                status_pie(self.story_stats, "Stories", "story-status-chart"),
                assignee_bar(self.story_stats, "Stories", "story-assignee-chart"),
            ));
        }
        if !self.defects.is_empty() {
            sections.push_str(&format!(
                r#"<div class="chart-section" id="defect-charts-section">
    <h2>&#128027; Defect Metrics</h2>
    <div class="charts-row">
{}
{}
    </div>
    <div class="charts-row">
{}
    </div>
</div>
"#,
                status_pie(self.defect_stats, "Defects", "defect-status-chart"),
                assignee_bar(self.defect_stats, "Defects", "defect-assignee-chart"),
                priority_bar(self.defect_stats, "defect-priority-chart"),
            ));
        }
        sections
    }

    fn tables_section(&self) -> String {
        let mut sections = String::new();
        if !self.stories.is_empty() {
            sections.push_str(&table_section(
                "stories-table-section",
                "stories_table",
                &format!("&#128221; Stories ({} total)", self.stories.len()),
                self.stories,
            ));
        }
        if !self.defects.is_empty() {
            sections.push_str(&table_section(
                "defects-table-section",
                "defects_table",
                &format!("&#128027; Defects ({} total)", self.defects.len()),
                self.defects,
            ));
        }
        sections
    }
}

// Charts
fn status_pie(stats: &CategoryStats, title: &str, element_id: &str) -> String {
    let labels: Vec<&String> = stats.by_status.keys().collect();
    let colors: Vec<&str> = labels
        .iter()
        .enumerate()
        .map(|(position, status)| status_color(status, position))
        .collect();
    let trace = json!({
        "type": "pie",
        "labels": labels,
        "values": stats.by_status.values().collect::<Vec<_>>(),
        "hole": 0.4,
        "textinfo": "label+percent",
        "textposition": "outside",
        "marker": {"colors": colors, "line": {"color": "white", "width": 2}},
        "hovertemplate": "<b>%{label}</b><br>Count: %{value}<br>Percentage: %{percent}<extra></extra>",
    });
    let layout = json!({
        "title": {"text": format!("{title} - Status Distribution"), "x": 0.5, "xanchor": "center"},
        "height": 500,
        "showlegend": true,
        "margin": {"t": 80, "b": 100, "l": 40, "r": 40},
    });
    chart(element_id, "chart-container", trace, layout)
}

fn assignee_bar(stats: &CategoryStats, title: &str, element_id: &str) -> String {
    let counts: Vec<&usize> = stats.by_assignee.values().collect();
    let trace = json!({
        "type": "bar",
        "orientation": "h",
        "x": counts,
        "y": stats.by_assignee.keys().collect::<Vec<_>>(),
        "text": counts,
        "textposition": "auto",
        "marker": {"color": counts, "colorscale": "Viridis", "showscale": true},
        "hovertemplate": "<b>%{y}</b> Tasks: %{x}<extra></extra>",
    });
    let layout = json!({
        "title": format!("{title} - Assignment Distribution"),
        "xaxis": {"title": "Number of Tasks"},
        "height": 400,
        "margin": {"t": 50, "b": 50, "l": 150, "r": 20},
    });
    chart(element_id, "chart-container", trace, layout)
}

fn priority_bar(stats: &CategoryStats, element_id: &str) -> String {
    let labels: Vec<&String> = stats.by_priority.keys().collect();
    let colors: Vec<&str> = labels.iter().map(|priority| priority_color(priority)).collect();
    let counts: Vec<&usize> = stats.by_priority.values().collect();
    let trace = json!({
        "type": "bar",
        "x": labels,
        "y": counts,
        "text": counts,
        "textposition": "auto",
        "marker": {"color": colors},
        "hovertemplate": "<b>Priority: %{x}</b> Count: %{y}<extra></extra>",
    });
    let layout = json!({
        "title": "Defects - Priority Distribution",
        "xaxis": {"title": "Priority"},
        "yaxis": {"title": "Count"},
        "height": 350,
        "margin": {"t": 50, "b": 50, "l": 50, "r": 20},
    });
    chart(element_id, "chart-container full-width", trace, layout)
}

fn chart(element_id: &str, class: &str, trace: Value, layout: Value) -> String {
    // keep a literal </script> out of the inline JSON
    let data = Value::Array(vec![trace]).to_string().replace("</", "<\\/");
    let layout = layout.to_string().replace("</", "<\\/");
    format!(
        "        <div class=\"{class}\" id=\"{element_id}\"></div>\n        \
         <script>Plotly.newPlot('{element_id}', {data}, {layout}, {{responsive: true}});</script>"
    )
}

fn status_color(status: &str, position: usize) -> &'static str {
    STATUS_COLORS
        .iter()
        .find(|(name, _)| *name == status)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_PALETTE[position % FALLBACK_PALETTE.len()])
}

fn priority_color(priority: &str) -> &'static str {
    PRIORITY_COLORS
        .iter()
        .find(|(name, _)| *name == priority)
        .map(|(_, color)| *color)
        .unwrap_or("#007bff")
}

// Tables
fn table_section(section_id: &str, table_id: &str, heading: &str, rows: &[IssueRow]) -> String {
    let head = TABLE_COLUMNS.iter().map(|column| format!("<th>{column}</th>")).join("");
    let body = rows.iter().map(table_row).join("\n");
    format!(
        r#"<div class="table-section" id="{section_id}">
    <h2>{heading}</h2>
    <table id="{table_id}" class="display data-table">
        <thead><tr>{head}</tr></thead>
        <tbody>
{body}
        </tbody>
    </table>
</div>
"#
    )
}

fn table_row(row: &IssueRow) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        escape(&row.key),
        escape(&row.summary),
        escape(&row.status),
        escape(&row.assignee),
        escape(&row.reporter),
        escape(&row.issue_type),
        escape(&row.priority),
        row.story_points,
        fmt_date(row.created),
        fmt_date(row.updated),
    )
}

fn fmt_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const STYLESHEET: &str = r#"
:root {
    --primary-color: #0066cc;
    --secondary-color: #6c757d;
    --success-color: #28a745;
    --warning-color: #ffc107;
    --danger-color: #dc3545;
    --dark-text: #212529;
}
* { margin: 0; padding: 0; box-sizing: border-box; }
body {
    font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
    color: var(--dark-text);
    line-height: 1.6;
    padding: 20px;
}
.container {
    max-width: 1400px;
    margin: 0 auto;
    background: white;
    border-radius: 12px;
    box-shadow: 0 10px 40px rgba(0, 0, 0, 0.2);
    overflow: hidden;
}
.header {
    background: linear-gradient(135deg, var(--primary-color) 0%, #004999 100%);
    color: white;
    padding: 40px;
    text-align: center;
}
.header h1 { font-size: 2.5rem; margin-bottom: 10px; font-weight: 700; }
.header .meta-info { font-size: 1rem; opacity: 0.9; }
.content { padding: 40px; }
.summary-cards {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(250px, 1fr));
    gap: 20px;
    margin-bottom: 40px;
}
.summary-card {
    background: linear-gradient(135deg, #f5f7fa 0%, #c3cfe2 100%);
    border-radius: 12px;
    padding: 25px;
    box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1);
}
.summary-card h3 {
    font-size: 1rem;
    color: var(--secondary-color);
    margin-bottom: 15px;
    text-transform: uppercase;
    letter-spacing: 1px;
}
.big-number {
    font-size: 3rem;
    font-weight: 700;
    color: var(--primary-color);
    margin-bottom: 15px;
}
.progress-bar {
    height: 8px;
    background: #e9ecef;
    border-radius: 4px;
    overflow: hidden;
    margin-bottom: 10px;
}
.progress-fill {
    height: 100%;
    background: linear-gradient(90deg, var(--success-color) 0%, #20c997 100%);
}
.progress-fill.defect {
    background: linear-gradient(90deg, var(--warning-color) 0%, #fd7e14 100%);
}
.stat-detail { font-size: 0.9rem; color: var(--secondary-color); }
.chart-section { margin-bottom: 50px; }
.chart-section h2, .table-section h2 {
    font-size: 1.8rem;
    margin-bottom: 25px;
    color: var(--dark-text);
    border-bottom: 3px solid var(--primary-color);
    padding-bottom: 10px;
}
.charts-row {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(400px, 1fr));
    gap: 30px;
    margin-bottom: 30px;
}
.chart-container {
    background: white;
    border-radius: 8px;
    padding: 20px;
    box-shadow: 0 2px 8px rgba(0, 0, 0, 0.1);
}
.chart-container.full-width { grid-column: 1 / -1; }
.table-section { margin-bottom: 50px; }
.data-table { width: 100% !important; font-size: 0.9rem; }
.data-table thead th {
    background: var(--primary-color);
    color: white;
    font-weight: 600;
    text-transform: uppercase;
    font-size: 0.85rem;
    letter-spacing: 0.5px;
    padding: 12px 8px;
}
.data-table tbody td { padding: 10px 8px; vertical-align: middle; }
.footer {
    background: #2c3e50;
    color: white;
    text-align: center;
    padding: 25px;
    font-size: 0.9rem;
}
@media (max-width: 768px) {
    .header h1 { font-size: 2rem; }
    .charts-row { grid-template-columns: 1fr; }
    .summary-cards { grid-template-columns: 1fr; }
}
"#;
