use std::path::PathBuf;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::analyze::CategoryStats;
use crate::model::Config;

/// Mail clients render the sections in this fixed order regardless of
/// capture order.
const SECTION_ORDER: [(&str, &str); 6] = [
    ("header", "Sprint Report Header"),
    ("summary", "Sprint Summary"),
    ("story_charts", "Story Metrics"),
    ("defect_charts", "Defect Metrics"),
    ("stories_table", "Stories Table"),
    ("defects_table", "Defects Table"),
];

/// One composed message, handed unchanged to every configured channel.
#[derive(Debug, Clone)]
pub struct Digest {
    pub subject: String,
    pub sprint_name: String,
    pub html_body: String,
    pub images: IndexMap<String, PathBuf>,
    pub report_url: Option<String>,
    pub stories_total: usize,
    pub stories_done: usize,
    pub defects_total: usize,
    pub defects_resolved: usize,
    pub story_completion: f64,
    pub defect_resolution: f64,
}

// Compose
impl Digest {
    pub fn compose(
        config: &Config,
        story_stats: &CategoryStats,
        defect_stats: &CategoryStats,
        images: IndexMap<String, PathBuf>,
    ) -> Self {
        Self {
            subject: format!("Sprint Report - {}", config.sprint_name),
            sprint_name: config.sprint_name.clone(),
            html_body: build_email_html(&images),
            images,
            report_url: config.report_url.clone(),
            stories_total: story_stats.total,
            stories_done: story_stats.done,
            defects_total: defect_stats.total,
            defects_resolved: defect_stats.done,
            story_completion: story_stats.done_rate(),
            defect_resolution: defect_stats.done_rate(),
        }
    }

    pub fn headline(&self) -> String {
        format!(
            "{} stories ({} done), {} defects ({} resolved)",
            self.stories_total, self.stories_done, self.defects_total, self.defects_resolved
        )
    }
}

/// Table-layout body with one CID image per captured section; missing
/// sections are left out entirely.
fn build_email_html(images: &IndexMap<String, PathBuf>) -> String {
    let rows = SECTION_ORDER
        .iter()
        .filter(|(name, _)| images.contains_key(*name))
        .map(|(name, alt)| {
            format!(
                r#"        <tr>
            <td align="center" style="padding: 0;">
                <img src="cid:{name}" alt="{alt}" class="section-image" />
            </td>
        </tr>"#
            )
        })
        .join("\n        <tr><td class=\"spacer\"></td></tr>\n");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <style>
        body {{ margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4; }}
        .email-container {{ max-width: 800px; margin: 0 auto; background-color: #ffffff; }}
        .section-image {{ width: 100%; height: auto; display: block; margin: 0; padding: 0; }}
        .spacer {{ height: 20px; background-color: #f4f4f4; }}
    </style>
</head>
<body>
    <table class="email-container" cellpadding="0" cellspacing="0" border="0" width="100%">
{rows}
    </table>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images(names: &[&str]) -> IndexMap<String, PathBuf> {
        names
            .iter()
            .map(|name| (name.to_string(), PathBuf::from(format!("{name}.png"))))
            .collect()
    }

    #[test]
    fn sections_keep_the_fixed_order() {
        // captured out of order on purpose
        let html = build_email_html(&images(&["summary", "header"]));
        let header = html.find("cid:header").unwrap();
        let summary = html.find("cid:summary").unwrap();
        assert!(header < summary);
    }

    #[test]
    fn missing_sections_are_omitted() {
        let html = build_email_html(&images(&["header", "stories_table"]));
        assert!(html.contains("cid:header"));
        assert!(html.contains("cid:stories_table"));
        assert!(!html.contains("cid:defect_charts"));
    }

    #[test]
    fn empty_image_set_still_builds_a_body() {
        let html = build_email_html(&IndexMap::new());
        assert!(html.contains("email-container"));
        assert!(!html.contains("cid:"));
    }
}
