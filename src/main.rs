mod analyze;
mod capture;
mod jira;
mod model;
mod notify;
mod report;
mod utils;

use std::path::Path;

use chrono::Local;
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar};
use log::{error, info, warn};

use crate::analyze::CategoryStats;
use crate::capture::{capture_sections, resize_for_email};
use crate::jira::{JiraClient, RawIssue};
use crate::model::{partition_rows, Args, Config, Result};
use crate::notify::{send_all, Channel, Digest};
use crate::report::csv::export_rows;
use crate::report::html::{HtmlReport, SprintReport};
use crate::utils::{StageStyle, StagedProgress};

const REPORT_FILE: &str = "sprint_report.html";
const STORIES_CSV: &str = "sprint_stories.csv";
const DEFECTS_CSV: &str = "sprint_defects.csv";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(e) = run(&args).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<()> {
    let config = Config::from_args(args)?;
    info!("Sprint: {}  Project: {}", config.sprint_name, config.project_key);

    let client = JiraClient::new(&config)?;
    let sprint_id = match &config.sprint_id {
        Some(id) => id.clone(),
        None => {
            info!(
                "JIRA_SPRINT_ID not set, resolving the active sprint of board {}",
                config.board_id
            );
            client.resolve_active_sprint(&config.board_id).await?
        }
    };

    let issues = fetch_issues(&client, &config, &sprint_id).await?;
    if issues.is_empty() {
        warn!("sprint {sprint_id} has no issues, producing an empty report");
    }

    let (stories, defects, excluded) = partition_rows(&issues, &config);
    info!(
        "Stories: {}  Defects: {}  Excluded: {}",
        stories.len(),
        defects.len(),
        excluded
    );

    let story_stats = CategoryStats::from_rows(&stories);
    let defect_stats = CategoryStats::from_rows(&defects);

    if !stories.is_empty() {
        export_rows(Path::new(STORIES_CSV), &stories)?;
        info!("✅ Stories exported to {STORIES_CSV}");
    }
    if !defects.is_empty() {
        export_rows(Path::new(DEFECTS_CSV), &defects)?;
        info!("✅ Defects exported to {DEFECTS_CSV}");
    }

    let report = SprintReport {
        sprint_name: &config.sprint_name,
        generated_at: Local::now().naive_local(),
        stories: &stories,
        defects: &defects,
        story_stats: &story_stats,
        defect_stats: &defect_stats,
    };
    report.report_create(Path::new(REPORT_FILE))?;
    info!("✅ HTML report: {REPORT_FILE}");

    let channels = Channel::from_config(&config);
    if channels.is_empty() {
        info!("No delivery channels configured, report left on disk");
        return Ok(());
    }

    let width = config.screenshot_width;
    let shots =
        tokio::task::spawn_blocking(move || capture_sections(Path::new(REPORT_FILE), width))
            .await??;
    if shots.is_empty() {
        warn!("no report sections captured, sending without images");
    }
    let shots = resize_for_email(&shots, config.email_image_max_width)?;

    let digest = Digest::compose(&config, &story_stats, &defect_stats, shots);
    for (channel, delivered) in send_all(&channels, &config, &digest).await {
        if delivered {
            info!("✅ Delivered via {channel}");
        } else {
            warn!("✗ Delivery via {channel} failed");
        }
    }
    Ok(())
}

async fn fetch_issues(
    client: &JiraClient,
    config: &Config,
    sprint_id: &str,
) -> Result<Vec<RawIssue>> {
    let multi_progress = MultiProgress::default();
    let pb = multi_progress.add_stage(ProgressBar::no_length(), StageStyle::counter());
    let issues = client
        .sprint_issues(
            sprint_id,
            &config.story_points_field,
            config.page_size,
            config.max_pages,
            &pb,
        )
        .await?;
    pb.set_style(StageStyle::message());
    pb.finish_with_message(format!(
        "✅ Completed fetch sprint issues (find {} issues)",
        issues.len()
    ));
    Ok(issues)
}
