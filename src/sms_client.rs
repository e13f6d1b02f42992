use crate::domain::PhoneNumber;
use crate::notifier::{DeliveryError, SmsSender};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

/// Client for a Twilio-style messages API.
pub struct SmsClient {
    http_client: Client,
    base_url: reqwest::Url,
    account_sid: String,
    auth_token: Secret<String>,
    from_number: String,
}

impl SmsClient {
    pub fn new(
        base_url: reqwest::Url,
        account_sid: String,
        auth_token: Secret<String>,
        from_number: String,
        timeout: std::time::Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http_client: Client::builder().timeout(timeout).build()?,
            base_url,
            account_sid,
            auth_token,
            from_number,
        })
    }
}

#[async_trait]
impl SmsSender for SmsClient {
    #[tracing::instrument(name = "Sending SMS.", skip_all, fields(%recipient))]
    async fn send_sms(
        &self,
        recipient: &PhoneNumber,
        body: &str,
    ) -> Result<(), DeliveryError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url.as_str().trim_end_matches('/'),
            self.account_sid
        );
        self.http_client
            .post(url)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&[
                ("To", recipient.as_ref()),
                ("From", self.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
