use serde_json::{json, Value};

use crate::model::Result;
use crate::notify::Digest;

/// POSTs the sprint summary as JSON to the configured chat webhook.
pub async fn post_summary(url: &str, digest: &Digest) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client.post(url).json(&payload(digest)).send().await?;
    if !response.status().is_success() {
        return Err(format!("webhook returned {}", response.status()).into());
    }
    Ok(())
}

fn payload(digest: &Digest) -> Value {
    let mut payload = json!({
        "title": digest.subject,
        "sprint": digest.sprint_name,
        "summary": digest.headline(),
        "stories_total": digest.stories_total,
        "stories_done": digest.stories_done,
        "story_completion": format!("{:.1}%", digest.story_completion),
        "defects_total": digest.defects_total,
        "defects_resolved": digest.defects_resolved,
        "defect_resolution": format!("{:.1}%", digest.defect_resolution),
    });
    if let Some(link) = &digest.report_url {
        payload["actions"] = json!([{"type": "button", "text": "View Report", "url": link}]);
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn digest(report_url: Option<&str>) -> Digest {
        Digest {
            subject: "Sprint Report - Sprint 42".to_string(),
            sprint_name: "Sprint 42".to_string(),
            html_body: String::new(),
            images: IndexMap::new(),
            report_url: report_url.map(String::from),
            stories_total: 35,
            stories_done: 30,
            defects_total: 10,
            defects_resolved: 7,
            story_completion: 85.7,
            defect_resolution: 70.0,
        }
    }

    #[test]
    fn payload_carries_the_summary_fields() {
        let payload = payload(&digest(None));
        assert_eq!(payload["sprint"], "Sprint 42");
        assert_eq!(payload["stories_total"], 35);
        assert_eq!(payload["story_completion"], "85.7%");
        assert_eq!(payload["summary"], "35 stories (30 done), 10 defects (7 resolved)");
        assert!(payload.get("actions").is_none());
    }

    #[test]
    fn report_link_becomes_an_action_button() {
        let payload = payload(&digest(Some("https://reports.example.com/sprint42")));
        assert_eq!(payload["actions"][0]["type"], "button");
        assert_eq!(payload["actions"][0]["url"], "https://reports.example.com/sprint42");
    }

    #[tokio::test]
    async fn unreachable_webhook_reports_failure() {
        let result = post_summary("http://127.0.0.1:1/hook", &digest(None)).await;
        assert!(result.is_err());
    }
}
