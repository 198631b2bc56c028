use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use std::time::Duration;

use crate::config::MailConfig;

#[derive(thiserror::Error, Debug)]
pub enum MailerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Mail relay error: {0}")]
    RelayError(String),

    #[error("Invalid relay URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
}

/// Sends email through an HTTP mail relay.
///
/// Without a relay configured, messages are logged and dropped.
#[derive(Clone)]
pub struct Mailer {
    client: Client,
    config: Option<MailConfig>,
}

impl Mailer {
    pub fn new(config: Option<MailConfig>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self { client, config }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    #[tracing::instrument(skip(self, message), fields(subject = %message.subject, recipients = message.to.len()))]
    pub async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        let Some(config) = &self.config else {
            tracing::debug!("Mail relay not configured, dropping email");
            return Ok(());
        };

        if message.to.is_empty() {
            return Ok(());
        }

        let url = config.relay_url.join("send")?;
        let response = self
            .client
            .post(url)
            .bearer_auth(config.api_key.expose_secret())
            .json(&RelayRequest {
                from: &config.sender,
                to: &message.to,
                subject: &message.subject,
                html: &message.html,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MailerError::RelayError(format!("HTTP {}: {}", status, body)));
        }

        tracing::info!("Email sent");
        Ok(())
    }

    /// Sends in a background task; failures are logged, never returned
    pub fn dispatch(&self, message: EmailMessage) {
        let mailer = self.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send(&message).await {
                tracing::warn!(error = %e, subject = %message.subject, "Failed to send email");
            }
        });
    }
}

fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

pub fn referral_received(to: String, sender_name: &str, contact_name: &str) -> EmailMessage {
    EmailMessage {
        to: vec![to],
        subject: "New Referral Received!".to_string(),
        html: format!(
            "<h1>You have a new referral!</h1><p>From: {}</p><p>Contact: {}</p>",
            escape(sender_name),
            escape(contact_name)
        ),
    }
}

pub fn thank_you_slip(
    to: String,
    sender_name: &str,
    amount: f64,
    notes: Option<&str>,
) -> EmailMessage {
    EmailMessage {
        to: vec![to],
        subject: format!("New Thank You Slip from {}", sender_name),
        html: format!(
            "<h1>You received a Thank You Slip!</h1>\
             <p><strong>From:</strong> {}</p>\
             <p><strong>Amount:</strong> \u{20b9}{:.2}</p>\
             <p><strong>Notes:</strong> {}</p>\
             <p>Great job generating business for the chapter!</p>",
            escape(sender_name),
            amount,
            escape(notes.unwrap_or("No notes"))
        ),
    }
}

pub fn event_registration(to: String, event_title: &str) -> EmailMessage {
    EmailMessage {
        to: vec![to],
        subject: "Event Registration Confirmed".to_string(),
        html: format!(
            "<h1>You have registered for {}!</h1>",
            escape(event_title)
        ),
    }
}

pub fn broadcast(to: Vec<String>, subject: &str, content: &str) -> EmailMessage {
    EmailMessage {
        to,
        subject: subject.to_string(),
        html: format!("<p>{}</p>", escape(content).replace('\n', "<br>")),
    }
}
