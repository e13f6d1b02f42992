use crate::domain::ContactEmail;
use crate::notifier::{DeliveryError, EmailSender};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

pub mod send;

pub struct EmailClient {
    api_token: Secret<String>,
    sender: ContactEmail,
    http_client: Client,
    base_url: reqwest::Url,
}

impl EmailClient {
    pub fn new(
        base_url: reqwest::Url,
        sender: ContactEmail,
        api_token: Secret<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            base_url,
            sender,
            http_client: Client::builder().timeout(timeout).build()?,
            api_token,
        })
    }
}

#[async_trait]
impl EmailSender for EmailClient {
    #[tracing::instrument(name = "Sending email.", skip_all, fields(%recipient))]
    async fn send_email(
        &self,
        recipient: &ContactEmail,
        subject: &str,
        text_content: &str,
        html_content: &str,
    ) -> Result<(), DeliveryError> {
        let url =
            format!("{}/email", self.base_url.as_str().trim_end_matches('/'));
        let request_body = SendEmailRequest {
            from: self.sender.as_ref(),
            to: recipient.as_ref(),
            subject,
            html_body: html_content,
            text_body: text_content,
        };
        self.http_client
            .post(url)
            .header("X-Postmark-Server-Token", self.api_token.expose_secret())
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
}
