use std::fs;
use std::path::Path;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::info;

use crate::model::{Config, Result, SmtpSettings};
use crate::notify::Digest;

const EML_FILE: &str = "sprint_report.eml";
const SMTPS_PORT: u16 = 465;

pub async fn send_via_smtp(smtp: &SmtpSettings, config: &Config, digest: &Digest) -> Result<()> {
    if config.email_recipients.is_empty() {
        return Err("EMAIL_RECIPIENTS is empty, nothing to send".into());
    }
    let message = build_message(
        &smtp.user,
        &config.email_recipients,
        &config.email_cc_recipients,
        digest,
    )?;

    info!("connecting to {}:{}", smtp.server, smtp.port);
    let transport = if smtp.port == SMTPS_PORT {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.server)?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.server)?
    }
    .port(smtp.port)
    .credentials(Credentials::new(smtp.user.clone(), smtp.password.clone()))
    .build();

    transport.send(message).await?;
    Ok(())
}

/// Writes the composed mail to disk and hands it to the platform's default
/// mail client for review before sending.
pub async fn open_in_mail_client(config: &Config, digest: &Digest) -> Result<()> {
    let from = config
        .smtp
        .as_ref()
        .map(|smtp| smtp.user.clone())
        .unwrap_or_else(|| format!("{}@localhost", whoami()));
    // a draft without recipients still needs a To header
    let recipients = if config.email_recipients.is_empty() {
        vec![from.clone()]
    } else {
        config.email_recipients.clone()
    };
    let message = build_message(&from, &recipients, &config.email_cc_recipients, digest)?;

    let path = Path::new(EML_FILE);
    fs::write(path, message.formatted())?;
    info!("composed {EML_FILE}, opening the mail client");
    open::that(path)?;
    Ok(())
}

fn build_message(
    from: &str,
    recipients: &[String],
    cc: &[String],
    digest: &Digest,
) -> Result<Message> {
    let mut builder = Message::builder()
        .from(from.parse::<Mailbox>()?)
        .subject(digest.subject.clone());
    for recipient in recipients {
        builder = builder.to(recipient.parse::<Mailbox>()?);
    }
    for recipient in cc {
        builder = builder.cc(recipient.parse::<Mailbox>()?);
    }

    let mut related = MultiPart::related().singlepart(
        SinglePart::builder()
            .header(ContentType::TEXT_HTML)
            .body(digest.html_body.clone()),
    );
    for (cid, path) in &digest.images {
        let content = fs::read(path)?;
        related = related.singlepart(
            Attachment::new_inline(cid.clone()).body(content, ContentType::parse("image/png")?),
        );
    }

    Ok(builder.multipart(related)?)
}

fn whoami() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "sprint-reporter".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn digest() -> Digest {
        Digest {
            subject: "Sprint Report - Sprint 42".to_string(),
            sprint_name: "Sprint 42".to_string(),
            html_body: "<html><body>report</body></html>".to_string(),
            images: IndexMap::new(),
            report_url: None,
            stories_total: 35,
            stories_done: 30,
            defects_total: 10,
            defects_resolved: 7,
            story_completion: 85.7,
            defect_resolution: 70.0,
        }
    }

    #[test]
    fn builds_a_multipart_message() {
        let message = build_message(
            "reporter@example.com",
            &["team@example.com".to_string()],
            &[],
            &digest(),
        )
        .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Sprint Report - Sprint 42"));
        assert!(raw.contains("To: team@example.com"));
        assert!(raw.contains("multipart/related"));
    }

    #[test]
    fn invalid_recipient_is_an_error() {
        assert!(build_message("reporter@example.com", &["not an address".to_string()], &[], &digest()).is_err());
    }

    #[test]
    fn inline_images_are_attached_by_cid() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("summary.png");
        std::fs::write(&img, [137u8, 80, 78, 71]).unwrap();
        let mut d = digest();
        d.images.insert("summary".to_string(), img);
        let message =
            build_message("reporter@example.com", &["team@example.com".to_string()], &[], &d).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Content-ID: <summary>"));
        assert!(raw.contains("Content-Disposition: inline"));
    }
}
