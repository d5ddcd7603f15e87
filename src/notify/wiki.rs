use log::info;
use serde_json::{json, Value};

use crate::model::{Config, Result, WikiSettings};
use crate::notify::Digest;
use crate::report::html::escape;

/// Creates the configured wiki page or, when it already exists, updates it
/// with a bumped version number.
pub async fn publish_page(wiki: &WikiSettings, config: &Config, digest: &Digest) -> Result<()> {
    let client = reqwest::Client::new();
    let content_url = format!("{}/rest/api/content", wiki.base_url);

    let existing = client
        .get(&content_url)
        .basic_auth(&config.username, Some(&config.api_token))
        .query(&[
            ("title", wiki.page_title.as_str()),
            ("spaceKey", wiki.space_key.as_str()),
            ("expand", "version"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json::<Value>()
        .await?;

    let body = page_body(digest);
    let response = match existing["results"].get(0) {
        Some(page) => {
            let id = page["id"].as_str().ok_or("wiki content id missing")?;
            let version = page["version"]["number"].as_u64().unwrap_or(1) + 1;
            info!("updating wiki page '{}' to version {version}", wiki.page_title);
            client
                .put(format!("{content_url}/{id}"))
                .basic_auth(&config.username, Some(&config.api_token))
                .json(&json!({
                    "id": id,
                    "type": "page",
                    "title": wiki.page_title,
                    "space": {"key": wiki.space_key},
                    "version": {"number": version},
                    "body": {"storage": {"value": body, "representation": "storage"}},
                }))
                .send()
                .await?
        }
        None => {
            info!("creating wiki page '{}'", wiki.page_title);
            client
                .post(&content_url)
                .basic_auth(&config.username, Some(&config.api_token))
                .json(&json!({
                    "type": "page",
                    "title": wiki.page_title,
                    "space": {"key": wiki.space_key},
                    "body": {"storage": {"value": body, "representation": "storage"}},
                }))
                .send()
                .await?
        }
    };

    if !response.status().is_success() {
        return Err(format!(
            "wiki returned {} for page '{}'",
            response.status(),
            wiki.page_title
        )
        .into());
    }
    Ok(())
}

fn page_body(digest: &Digest) -> String {
    let link = digest
        .report_url
        .as_ref()
        .map(|url| format!("<p><a href=\"{}\">Full interactive report</a></p>", escape(url)))
        .unwrap_or_default();
    format!(
        "<h2>{}</h2>\
         <p>{}</p>\
         <ul>\
         <li>Story completion: {:.1}%</li>\
         <li>Defect resolution: {:.1}%</li>\
         </ul>\
         {link}",
        escape(&digest.sprint_name),
        escape(&digest.headline()),
        digest.story_completion,
        digest.defect_resolution,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn page_body_carries_rates_and_link() {
        let digest = Digest {
            subject: "Sprint Report - Sprint 42".to_string(),
            sprint_name: "Sprint <42>".to_string(),
            html_body: String::new(),
            images: IndexMap::new(),
            report_url: Some("https://reports.example.com/s42".to_string()),
            stories_total: 35,
            stories_done: 30,
            defects_total: 10,
            defects_resolved: 7,
            story_completion: 85.7,
            defect_resolution: 70.0,
        };
        let body = page_body(&digest);
        assert!(body.contains("Sprint &lt;42&gt;"));
        assert!(body.contains("Story completion: 85.7%"));
        assert!(body.contains("https://reports.example.com/s42"));
    }
}
