// src/services/email.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::common::safe_email_log;

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail provider not configured")]
    NotConfigured,

    #[error("mail request failed: {0}")]
    RequestFailed(String),

    #[error("mail provider rejected message with status {0}")]
    Rejected(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub email: String,
    pub name: Option<String>,
}

impl Address {
    pub fn new(email: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            email: email.into(),
            name: name.map(str::to_string),
        }
    }
}

/// A single plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: Address,
    pub to: Address,
    pub subject: String,
    pub content: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// Mailer used when no provider key is configured; every send fails with
/// `MailError::NotConfigured`.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _mail: OutgoingMail) -> Result<(), MailError> {
        Err(MailError::NotConfigured)
    }
}

pub struct SendGridMailer {
    http: Client,
    api_key: String,
}

impl SendGridMailer {
    pub fn new(api_key: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
        }
    }
}

// SendGrid v3 request body
#[derive(Serialize)]
struct SendGridRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: SendGridAddress<'a>,
    subject: &'a str,
    content: Vec<SendGridContent<'a>>,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: Vec<SendGridAddress<'a>>,
}

#[derive(Serialize)]
struct SendGridAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct SendGridContent<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

impl<'a> From<&'a Address> for SendGridAddress<'a> {
    fn from(address: &'a Address) -> Self {
        Self {
            email: &address.email,
            name: address.name.as_deref(),
        }
    }
}

fn sendgrid_body(mail: &OutgoingMail) -> SendGridRequest<'_> {
    SendGridRequest {
        personalizations: vec![Personalization {
            to: vec![(&mail.to).into()],
        }],
        from: (&mail.from).into(),
        subject: &mail.subject,
        content: vec![SendGridContent {
            content_type: "text/plain",
            value: &mail.content,
        }],
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        debug!(
            to = %safe_email_log(&mail.to.email),
            subject = %mail.subject,
            "Sending mail via SendGrid"
        );

        let response = self
            .http
            .post(SENDGRID_SEND_URL)
            .bearer_auth(&self.api_key)
            .json(&sendgrid_body(&mail))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "SendGrid request failed");
                MailError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(http_status = %status, "SendGrid rejected message");
            return Err(MailError::Rejected(status.as_u16()));
        }

        info!(to = %safe_email_log(&mail.to.email), "Mail accepted by SendGrid");
        Ok(())
    }
}
