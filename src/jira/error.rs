use std::error::Error;
use std::fmt;

/// Failure classes of the Jira Agile API. Credentials and missing-resource
/// failures are terminal; everything else may be retried by the transport.
#[derive(Debug)]
pub enum JiraError {
    Auth(String),
    NotFound(String),
    Api { status: u16, body: String },
    Network(reqwest::Error),
}

pub type Result<T> = std::result::Result<T, JiraError>;

impl fmt::Display for JiraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JiraError::Auth(endpoint) => write!(
                f,
                "Jira rejected the credentials for {endpoint}: check JIRA_USERNAME and JIRA_API_KEY"
            ),
            JiraError::NotFound(endpoint) => write!(
                f,
                "{endpoint} does not exist: verify JIRA_SPRINT_ID / JIRA_BOARD_ID"
            ),
            JiraError::Api { status, body } => write!(f, "Jira API returned {status}: {body}"),
            JiraError::Network(e) => write!(f, "network error talking to Jira: {e}"),
        }
    }
}

impl Error for JiraError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            JiraError::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for JiraError {
    fn from(e: reqwest::Error) -> Self {
        JiraError::Network(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_point_at_credentials() {
        let message = JiraError::Auth("https://jira/rest".to_string()).to_string();
        assert!(message.contains("JIRA_API_KEY"));
    }

    #[test]
    fn not_found_errors_point_at_identifiers() {
        let message = JiraError::NotFound("https://jira/rest".to_string()).to_string();
        assert!(message.contains("JIRA_SPRINT_ID"));
    }
}
