use clap::Parser;

use crate::model::Result;

#[derive(Parser, Debug, Clone)]
pub struct Args {
    #[arg(long, env = "JIRA_BASE_URL")]
    pub jira_url: String,
    #[arg(long, env = "JIRA_USERNAME")]
    pub jira_username: String,
    #[arg(long, env = "JIRA_API_KEY", hide_env_values = true)]
    pub jira_token: String,
    #[arg(long, env = "JIRA_BOARD_ID")]
    pub board_id: String,
    #[arg(long, env = "JIRA_SPRINT_ID")]
    pub sprint_id: Option<String>,
    #[arg(long, env = "JIRA_PROJECT")]
    pub project: String,
    #[arg(long, env = "SPRINT_NAME")]
    pub sprint_name: String,
    #[arg(long, env = "STORY_TYPES", default_value = "Story")]
    pub story_types: String,
    #[arg(long, env = "DEFECT_TYPES", default_value = "Escaped Defect,Bug,Defect")]
    pub defect_types: String,
    #[arg(long, env = "STORY_POINTS_FIELD", default_value = "customfield_10016")]
    pub story_points_field: String,
    #[arg(long, env = "PAGE_SIZE", default_value = "50")]
    pub page_size: usize,
    #[arg(long, env = "MAX_PAGES", default_value = "100")]
    pub max_pages: usize,
    #[arg(long, env = "MAX_RETRIES", default_value = "3")]
    pub max_retries: usize,
    #[arg(long, env = "RETRY_DELAY_MS", default_value = "1000")]
    pub retry_delay_ms: u64,
    #[arg(long, env = "EMAIL_RECIPIENTS", default_value = "")]
    pub email_recipients: String,
    #[arg(long, env = "EMAIL_CC_RECIPIENTS", default_value = "")]
    pub email_cc_recipients: String,
    #[arg(long, env = "SMTP_SERVER")]
    pub smtp_server: Option<String>,
    #[arg(long, env = "SMTP_PORT", default_value = "587")]
    pub smtp_port: u16,
    #[arg(long, env = "EMAIL_USER")]
    pub email_user: Option<String>,
    #[arg(long, env = "EMAIL_PASSWORD", hide_env_values = true)]
    pub email_password: Option<String>,
    #[arg(long, env = "USE_MAIL_CLIENT")]
    pub use_mail_client: bool,
    #[arg(long, env = "CHAT_WEBHOOK_URL")]
    pub webhook_url: Option<String>,
    #[arg(long, env = "REPORT_URL")]
    pub report_url: Option<String>,
    #[arg(long, env = "WIKI_BASE_URL")]
    pub wiki_url: Option<String>,
    #[arg(long, env = "WIKI_SPACE_KEY")]
    pub wiki_space: Option<String>,
    #[arg(long, env = "WIKI_PAGE_TITLE")]
    pub wiki_page_title: Option<String>,
    #[arg(long, env = "SCREENSHOT_WIDTH", default_value = "1400")]
    pub screenshot_width: u32,
    #[arg(long, env = "EMAIL_IMAGE_MAX_WIDTH", default_value = "1000")]
    pub email_image_max_width: u32,
}

/// Everything the pipeline needs, loaded once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub username: String,
    pub api_token: String,
    pub board_id: String,
    pub sprint_id: Option<String>,
    pub project_key: String,
    pub sprint_name: String,
    pub story_types: Vec<String>,
    pub defect_types: Vec<String>,
    pub story_points_field: String,
    pub page_size: usize,
    pub max_pages: usize,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
    pub email_recipients: Vec<String>,
    pub email_cc_recipients: Vec<String>,
    pub smtp: Option<SmtpSettings>,
    pub use_mail_client: bool,
    pub webhook_url: Option<String>,
    pub report_url: Option<String>,
    pub wiki: Option<WikiSettings>,
    pub screenshot_width: u32,
    pub email_image_max_width: u32,
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct WikiSettings {
    pub base_url: String,
    pub space_key: String,
    pub page_title: String,
}

// Create
impl Config {
    pub fn from_args(args: &Args) -> Result<Self> {
        let smtp = match (&args.smtp_server, &args.email_user, &args.email_password) {
            (Some(server), Some(user), Some(password)) => Some(SmtpSettings {
                server: server.clone(),
                port: args.smtp_port,
                user: user.clone(),
                password: password.clone(),
            }),
            (None, None, None) => None,
            _ => {
                return Err(
                    "SMTP_SERVER, EMAIL_USER and EMAIL_PASSWORD must be set together".into(),
                )
            }
        };

        let wiki = match (&args.wiki_url, &args.wiki_space, &args.wiki_page_title) {
            (Some(base_url), Some(space_key), Some(page_title)) => Some(WikiSettings {
                base_url: base_url.trim_end_matches('/').to_string(),
                space_key: space_key.clone(),
                page_title: page_title.clone(),
            }),
            (None, None, None) => None,
            _ => {
                return Err(
                    "WIKI_BASE_URL, WIKI_SPACE_KEY and WIKI_PAGE_TITLE must be set together".into(),
                )
            }
        };

        Ok(Self {
            base_url: args.jira_url.trim_end_matches('/').to_string(),
            username: args.jira_username.clone(),
            api_token: args.jira_token.clone(),
            board_id: args.board_id.clone(),
            sprint_id: args.sprint_id.clone(),
            project_key: args.project.clone(),
            sprint_name: args.sprint_name.clone(),
            story_types: split_list(&args.story_types),
            defect_types: split_list(&args.defect_types),
            story_points_field: args.story_points_field.clone(),
            page_size: args.page_size,
            max_pages: args.max_pages,
            max_retries: args.max_retries,
            retry_delay_ms: args.retry_delay_ms,
            email_recipients: split_list(&args.email_recipients),
            email_cc_recipients: split_list(&args.email_cc_recipients),
            smtp,
            use_mail_client: args.use_mail_client,
            webhook_url: args.webhook_url.clone(),
            report_url: args.report_url.clone(),
            wiki,
            screenshot_width: args.screenshot_width,
            email_image_max_width: args.email_image_max_width,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            jira_url: "https://jira.example.com/".to_string(),
            jira_username: "reporter@example.com".to_string(),
            jira_token: "token".to_string(),
            board_id: "7".to_string(),
            sprint_id: Some("42".to_string()),
            project: "PROJ".to_string(),
            sprint_name: "Sprint 42".to_string(),
            story_types: "Story".to_string(),
            defect_types: "Escaped Defect, Bug ,Defect".to_string(),
            story_points_field: "customfield_10016".to_string(),
            page_size: 50,
            max_pages: 100,
            max_retries: 3,
            retry_delay_ms: 1000,
            email_recipients: " a@example.com , b@example.com,".to_string(),
            email_cc_recipients: String::new(),
            smtp_server: None,
            smtp_port: 587,
            email_user: None,
            email_password: None,
            use_mail_client: false,
            webhook_url: None,
            report_url: None,
            wiki_url: None,
            wiki_space: None,
            wiki_page_title: None,
            screenshot_width: 1400,
            email_image_max_width: 1000,
        }
    }

    #[test]
    fn lists_are_trimmed_and_emptied() {
        let config = Config::from_args(&args()).unwrap();
        assert_eq!(config.defect_types, vec!["Escaped Defect", "Bug", "Defect"]);
        assert_eq!(config.email_recipients, vec!["a@example.com", "b@example.com"]);
        assert!(config.email_cc_recipients.is_empty());
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let config = Config::from_args(&args()).unwrap();
        assert_eq!(config.base_url, "https://jira.example.com");
    }

    #[test]
    fn partial_smtp_settings_are_rejected() {
        let mut args = args();
        args.smtp_server = Some("smtp.example.com".to_string());
        assert!(Config::from_args(&args).is_err());
    }

    #[test]
    fn complete_smtp_settings_are_accepted() {
        let mut args = args();
        args.smtp_server = Some("smtp.example.com".to_string());
        args.email_user = Some("mailer@example.com".to_string());
        args.email_password = Some("secret".to_string());
        let config = Config::from_args(&args).unwrap();
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.server, "smtp.example.com");
        assert_eq!(smtp.port, 587);
    }
}
