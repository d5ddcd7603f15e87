mod digest;
mod email;
mod webhook;
mod wiki;

use futures::future;
use log::error;

use crate::model::{Config, SmtpSettings, WikiSettings};

pub use digest::Digest;

/// The closed set of delivery channels. Every variant implements the same
/// capability: take the composed digest, return success or failure.
#[derive(Debug, Clone)]
pub enum Channel {
    MailClient,
    Smtp(SmtpSettings),
    Webhook { url: String },
    Wiki(WikiSettings),
}

impl Channel {
    /// Channels are selected purely by which settings are present.
    pub fn from_config(config: &Config) -> Vec<Channel> {
        let mut channels = Vec::new();
        if config.use_mail_client {
            channels.push(Channel::MailClient);
        }
        if let Some(smtp) = &config.smtp {
            channels.push(Channel::Smtp(smtp.clone()));
        }
        if let Some(url) = &config.webhook_url {
            channels.push(Channel::Webhook { url: url.clone() });
        }
        if let Some(wiki) = &config.wiki {
            channels.push(Channel::Wiki(wiki.clone()));
        }
        channels
    }

    pub fn name(&self) -> &'static str {
        match self {
            Channel::MailClient => "mail-client",
            Channel::Smtp(_) => "smtp",
            Channel::Webhook { .. } => "webhook",
            Channel::Wiki(_) => "wiki",
        }
    }

    pub async fn send(&self, config: &Config, digest: &Digest) -> bool {
        let outcome = match self {
            Channel::MailClient => email::open_in_mail_client(config, digest).await,
            Channel::Smtp(smtp) => email::send_via_smtp(smtp, config, digest).await,
            Channel::Webhook { url } => webhook::post_summary(url, digest).await,
            Channel::Wiki(wiki) => wiki::publish_page(wiki, config, digest).await,
        };
        match outcome {
            Ok(()) => true,
            Err(e) => {
                error!("{} delivery failed: {e}", self.name());
                false
            }
        }
    }
}

/// Attempts every configured channel; one failing channel never blocks the
/// others.
pub async fn send_all(
    channels: &[Channel],
    config: &Config,
    digest: &Digest,
) -> Vec<(&'static str, bool)> {
    future::join_all(
        channels
            .iter()
            .map(|channel| async move { (channel.name(), channel.send(config, digest).await) }),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            base_url: "https://jira.example.com".to_string(),
            username: "u".to_string(),
            api_token: "t".to_string(),
            board_id: "1".to_string(),
            sprint_id: Some("42".to_string()),
            project_key: "PROJ".to_string(),
            sprint_name: "Sprint 42".to_string(),
            story_types: vec!["Story".to_string()],
            defect_types: vec!["Bug".to_string()],
            story_points_field: "customfield_10016".to_string(),
            page_size: 50,
            max_pages: 100,
            max_retries: 3,
            retry_delay_ms: 1,
            email_recipients: vec![],
            email_cc_recipients: vec![],
            smtp: None,
            use_mail_client: false,
            webhook_url: None,
            report_url: None,
            wiki: None,
            screenshot_width: 1400,
            email_image_max_width: 1000,
        }
    }

    #[test]
    fn no_settings_means_no_channels() {
        assert!(Channel::from_config(&config()).is_empty());
    }

    #[test]
    fn channels_follow_configuration_presence() {
        let mut config = config();
        config.use_mail_client = true;
        config.webhook_url = Some("https://chat.example.com/hook".to_string());
        config.smtp = Some(SmtpSettings {
            server: "smtp.example.com".to_string(),
            port: 465,
            user: "mailer@example.com".to_string(),
            password: "secret".to_string(),
        });
        let names: Vec<&str> = Channel::from_config(&config).iter().map(Channel::name).collect();
        assert_eq!(names, ["mail-client", "smtp", "webhook"]);
    }

    #[tokio::test]
    async fn unreachable_channel_returns_a_failure_result() {
        let mut config = config();
        config.webhook_url = Some("http://127.0.0.1:1/hook".to_string());
        let channels = Channel::from_config(&config);
        let digest = Digest::compose(
            &config,
            &crate::analyze::CategoryStats::default(),
            &crate::analyze::CategoryStats::default(),
            indexmap::IndexMap::new(),
        );
        let results = send_all(&channels, &config, &digest).await;
        assert_eq!(results, vec![("webhook", false)]);
    }
}
