//! Outbound delivery ports used after a booking commits.
//!
//! Both senders are best effort: callers log a [`DeliveryError`] and move on.

use async_trait::async_trait;

use crate::domain::{ContactEmail, PhoneNumber};

#[derive(thiserror::Error, Debug)]
pub enum DeliveryError {
    #[error("The delivery provider could not be reached or refused the message.")]
    Transport(#[from] reqwest::Error),
    #[error("Could not render message: {0}")]
    Rendering(String),
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(
        &self,
        recipient: &ContactEmail,
        subject: &str,
        text_content: &str,
        html_content: &str,
    ) -> Result<(), DeliveryError>;
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_sms(
        &self,
        recipient: &PhoneNumber,
        body: &str,
    ) -> Result<(), DeliveryError>;
}
