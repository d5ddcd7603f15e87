use std::time::Duration;

use base64::engine::general_purpose;
use base64::Engine as _;
use indicatif::ProgressBar;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::time::sleep;

use crate::jira::error::{JiraError, Result};
use crate::model::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SPRINT_PAGE_SIZE: usize = 50;

pub struct JiraClient {
    http: Client,
    base_url: String,
    auth_header: String,
    max_retries: usize,
    retry_delay_ms: u64,
}

// Create
impl JiraClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let credentials = format!("{}:{}", config.username, config.api_token);
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            auth_header: format!("Basic {}", general_purpose::STANDARD.encode(credentials)),
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }
}

// Agile API
impl JiraClient {
    /// Fetches every issue of the sprint, page by page, until a short page
    /// or the page cap. The pagination contract is trusted as-is.
    pub async fn sprint_issues(
        &self,
        sprint_id: &str,
        points_field: &str,
        page_size: usize,
        max_pages: usize,
        pb: &ProgressBar,
    ) -> Result<Vec<Value>> {
        let url = format!("{}/rest/agile/1.0/sprint/{}/issue", self.base_url, sprint_id);
        let fields = format!(
            "key,summary,status,assignee,reporter,issuetype,priority,created,updated,{points_field}"
        );

        let mut issues: Vec<Value> = Vec::new();
        let mut start_at = 0usize;
        for page in 0..max_pages {
            pb.set_message(format!("Fetch sprint issues (#{} page) ...", page + 1));
            let body = self
                .get_json(
                    &url,
                    &[
                        ("startAt", start_at.to_string()),
                        ("maxResults", page_size.to_string()),
                        ("fields", fields.clone()),
                    ],
                )
                .await?;

            let page_issues = body["issues"].as_array().cloned().unwrap_or_default();
            let total = body["total"].as_u64().unwrap_or(0);
            let fetched = page_issues.len();
            issues.extend(page_issues);

            pb.set_length(total);
            pb.set_position(issues.len() as u64);
            debug!("fetched {}/{} sprint issues", issues.len(), total);

            if fetched < page_size {
                return Ok(issues);
            }
            start_at += page_size;
        }
        warn!(
            "stopped fetching {url} after {max_pages} pages ({} issues)",
            issues.len()
        );
        Ok(issues)
    }

    /// Walks the board's sprint list and returns the id of the active one.
    /// Used when JIRA_SPRINT_ID is not configured.
    pub async fn resolve_active_sprint(&self, board_id: &str) -> Result<String> {
        let url = format!("{}/rest/agile/1.0/board/{}/sprint", self.base_url, board_id);
        let mut start_at = 0usize;
        loop {
            let body = self
                .get_json(
                    &url,
                    &[
                        ("startAt", start_at.to_string()),
                        ("maxResults", SPRINT_PAGE_SIZE.to_string()),
                        ("state", "active".to_string()),
                    ],
                )
                .await?;
            let sprints = body["values"].as_array().cloned().unwrap_or_default();
            if let Some(id) = sprints.iter().find_map(|sprint| sprint["id"].as_u64()) {
                return Ok(id.to_string());
            }
            if sprints.is_empty() || body["isLast"].as_bool().unwrap_or(true) {
                return Err(JiraError::NotFound(format!("active sprint of board {board_id}")));
            }
            start_at += SPRINT_PAGE_SIZE;
        }
    }
}

// Transport
impl JiraClient {
    /// GET with bounded exponential-backoff retry. Connection failures, 429
    /// and 5xx retry; 401/403 and 404 fail fast with their classified error;
    /// other client errors fail without retry.
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let mut last_error: Option<JiraError> = None;

        for attempt in 0..=self.max_retries {
            let request = self
                .http
                .get(url)
                .query(query)
                .header("Accept", "application/json")
                .header("Authorization", &self.auth_header);

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!("request to {url} failed: {e}");
                    last_error = Some(JiraError::Network(e));
                    if attempt < self.max_retries {
                        self.backoff(attempt).await;
                    }
                    continue;
                }
            };

            let status = response.status();
            match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    return Err(JiraError::Auth(url.to_string()));
                }
                StatusCode::NOT_FOUND => return Err(JiraError::NotFound(url.to_string())),
                status if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() => {
                    warn!("Jira returned {status} for {url}, retrying");
                    last_error = Some(JiraError::Api {
                        status: status.as_u16(),
                        body: response.text().await.unwrap_or_default(),
                    });
                    if attempt < self.max_retries {
                        self.backoff(attempt).await;
                    }
                }
                status if status.is_success() => return Ok(response.json::<Value>().await?),
                status => {
                    return Err(JiraError::Api {
                        status: status.as_u16(),
                        body: response.text().await.unwrap_or_default(),
                    });
                }
            }
        }

        Err(last_error.unwrap_or_else(|| JiraError::Api {
            status: 0,
            body: format!("request to {url} failed after {} attempts", self.max_retries + 1),
        }))
    }

    async fn backoff(&self, attempt: usize) {
        sleep(Duration::from_millis(
            self.retry_delay_ms * 2u64.pow(attempt as u32),
        ))
        .await;
    }
}
