use eyre::Result;
use lazy_static::lazy_static;
use log::{error, info};
use regex::Regex;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::error::Error;

const RESEND_URL: &str = "https://api.resend.com/emails";

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").expect("valid tag pattern");
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: String,
}

#[derive(Deserialize)]
struct ResendResponse {
    id: String,
}

/// Delivery backend, picked from configuration at startup.
#[derive(Clone)]
pub enum Mailer {
    Resend {
        client: ReqwestClient,
        api_key: String,
        from: String,
    },
    /// Development only: the message is written to the log instead of sent.
    Log,
    Disabled,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Self {
        match &config.resend_api_key {
            Some(api_key) => Mailer::Resend {
                client: ReqwestClient::new(),
                api_key: api_key.clone(),
                from: config.email_from.clone(),
            },
            None if config.is_development() => Mailer::Log,
            None => Mailer::Disabled,
        }
    }

    /// Sends the message and returns the provider's message id.
    pub async fn send(&self, message: &EmailMessage) -> Result<String> {
        match self {
            Mailer::Resend {
                client,
                api_key,
                from,
            } => {
                let body = ResendRequest {
                    from,
                    to: [message.to.as_str()],
                    subject: &message.subject,
                    html: &message.html,
                    text: message
                        .text
                        .clone()
                        .unwrap_or_else(|| strip_tags(&message.html)),
                };
                let response = client
                    .post(RESEND_URL)
                    .bearer_auth(api_key)
                    .json(&body)
                    .send()
                    .await?;
                if !response.status().is_success() {
                    let detail: Value = response.json().await.unwrap_or_default();
                    error!("Resend API error: {}", detail);
                    let reason = detail["message"].as_str().unwrap_or("Unknown error");
                    return Err(Error::EmailDelivery(reason.to_string()).into());
                }
                let sent: ResendResponse = response.json().await?;
                info!("Email sent successfully: {}", sent.id);
                Ok(sent.id)
            }
            Mailer::Log => {
                info!(
                    "Email (development mode, not sent) to {}: {}\n{}",
                    message.to, message.subject, message.html
                );
                Ok("dev-mode".to_string())
            }
            Mailer::Disabled => Err(Error::EmailNotConfigured.into()),
        }
    }
}

#[derive(Clone)]
pub struct EmailService {
    pub mailer: Mailer,
    pub site_url: String,
}

impl EmailService {
    pub async fn send_welcome(&self, name: &str, email: &str) -> Result<String> {
        let message = welcome_email(name, email, &self.site_url);
        self.mailer.send(&message).await
    }
}

pub fn welcome_email(name: &str, email: &str, site_url: &str) -> EmailMessage {
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Welcome to Amisag</title></head>
<body style="font-family: sans-serif; color: #333; max-width: 600px; margin: 0 auto;">
<h1>Welcome to Amisag!</h1>
<p>Hi {name},</p>
<p>Your account is ready. Amisag connects professionals across Africa, so here is where to start:</p>
<ul>
<li>Connect with professionals across the continent</li>
<li>Join communities in your industry</li>
<li>Find mentors, co-founders and collaborators</li>
</ul>
<p><a href="{site_url}/network">Get Started</a></p>
<p>The Amisag Team</p>
</body>
</html>"#,
        name = escape_html(name),
        site_url = site_url.trim_end_matches('/'),
    );
    EmailMessage {
        to: email.to_string(),
        subject: "Welcome to Amisag!".to_string(),
        html,
        text: None,
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub fn strip_tags(html: &str) -> String {
    HTML_TAG.replace_all(html, "").to_string()
}
