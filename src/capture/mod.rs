use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use image::imageops::FilterType;
use indexmap::IndexMap;
use log::{info, warn};

use crate::model::Result;

/// Report regions to photograph, keyed by the name the mail body refers to.
pub const REPORT_SECTIONS: [(&str, &str); 6] = [
    ("header", "#header-section"),
    ("summary", "#summary-section"),
    ("story_charts", "#story-charts-section"),
    ("defect_charts", "#defect-charts-section"),
    ("stories_table", "#stories-table-section"),
    ("defects_table", "#defects-table-section"),
];

const SCREENSHOT_DIR: &str = "report_screenshots";
const RESIZED_DIR: &str = "report_screenshots_resized";
const PAGE_TIMEOUT: Duration = Duration::from_secs(30);
// Plotly draws after load; give it a moment before photographing.
const CHART_RENDER_WAIT: Duration = Duration::from_secs(3);

/// Opens the rendered report in a headless Chromium and captures one PNG per
/// known region. A region that fails (or is absent because its category is
/// empty) is skipped; the rest are still captured.
pub fn capture_sections(html_path: &Path, width: u32) -> Result<IndexMap<String, PathBuf>> {
    let options = LaunchOptions::default_builder()
        .headless(true)
        .window_size(Some((width, 1080)))
        .build()?;
    let browser = Browser::new(options)?;
    let tab = browser.new_tab()?;
    tab.set_default_timeout(PAGE_TIMEOUT);

    let url = format!("file://{}", html_path.canonicalize()?.display());
    tab.navigate_to(&url)?.wait_until_navigated()?;
    std::thread::sleep(CHART_RENDER_WAIT);

    fs::create_dir_all(SCREENSHOT_DIR)?;
    let mut shots = IndexMap::new();
    for (name, selector) in REPORT_SECTIONS {
        match capture_element(&tab, name, selector) {
            Ok(path) => {
                info!("captured {name} ({selector})");
                shots.insert(name.to_string(), path);
            }
            Err(e) => warn!("section {name} not captured ({selector}): {e}"),
        }
    }
    info!("captured {} of {} report sections", shots.len(), REPORT_SECTIONS.len());
    Ok(shots)
}

fn capture_element(tab: &Tab, name: &str, selector: &str) -> Result<PathBuf> {
    let element = tab.find_element(selector)?;
    let png = element.capture_screenshot(CaptureScreenshotFormatOption::Png)?;
    let path = Path::new(SCREENSHOT_DIR).join(format!("{name}.png"));
    fs::write(&path, png)?;
    Ok(path)
}

/// Shrinks every captured image to the configured transport width. A resize
/// failure keeps the original file so the mail still carries the section.
pub fn resize_for_email(
    shots: &IndexMap<String, PathBuf>,
    max_width: u32,
) -> Result<IndexMap<String, PathBuf>> {
    fs::create_dir_all(RESIZED_DIR)?;
    let mut resized = IndexMap::new();
    for (name, path) in shots {
        match resize_one(path, max_width) {
            Ok(target) => {
                resized.insert(name.clone(), target);
            }
            Err(e) => {
                warn!("could not resize {name}: {e}, keeping the original");
                resized.insert(name.clone(), path.clone());
            }
        }
    }
    Ok(resized)
}

fn resize_one(path: &Path, max_width: u32) -> Result<PathBuf> {
    let img = image::open(path)?;
    if img.width() <= max_width {
        return Ok(path.to_path_buf());
    }
    let ratio = max_width as f64 / img.width() as f64;
    let height = (img.height() as f64 * ratio).round() as u32;
    let scaled = img.resize_exact(max_width, height, FilterType::Lanczos3);

    let file_name = path.file_name().ok_or("screenshot path has no file name")?;
    let target = Path::new(RESIZED_DIR).join(file_name);
    scaled.save(&target)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::CategoryStats;
    use crate::model::IssueRow;
    use crate::report::html::{HtmlReport, SprintReport};
    use chrono::NaiveDate;

    #[test]
    fn every_capture_selector_exists_in_a_full_report() {
        let rows = vec![IssueRow {
            key: "S-1".to_string(),
            summary: "Login".to_string(),
            status: "Done".to_string(),
            assignee: "Avery".to_string(),
            reporter: "Kim".to_string(),
            issue_type: "Story".to_string(),
            priority: "High".to_string(),
            story_points: 3.0,
            created: None,
            updated: None,
        }];
        let stats = CategoryStats::from_rows(&rows);
        let html = SprintReport {
            sprint_name: "Sprint 42",
            generated_at: NaiveDate::from_ymd_opt(2026, 1, 15)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            stories: &rows,
            defects: &rows,
            story_stats: &stats,
            defect_stats: &stats,
        }
        .render();
        for (_, selector) in REPORT_SECTIONS {
            let id = selector.trim_start_matches('#');
            assert!(html.contains(&format!("id=\"{id}\"")), "missing {selector}");
        }
    }
}
