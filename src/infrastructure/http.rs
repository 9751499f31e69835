//! HTTP SMS gateway channel.
//!
//! Speaks the Twilio-style Messages API: a form-encoded POST to
//! `{base_url}/Accounts/{account_sid}/Messages.json` authenticated with HTTP
//! basic auth, answered by a JSON message resource.
//!
//! **Requires the `http` feature.**

use crate::application::ports::DispatchChannel;
use crate::domain::config::ConfigError;
use crate::domain::message::SmsMessage;
use crate::domain::recipient::RecipientKey;
use async_trait::async_trait;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default API root for the hosted gateway.
pub const DEFAULT_API_BASE_URL: &str = "https://api.twilio.com/2010-04-01";

/// Placeholder body for a rejection whose response body could not be read.
pub const UNREADABLE_BODY: &str = "<unreadable body>";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Credentials and endpoint for [`HttpSmsChannel`].
#[derive(Clone)]
pub struct HttpSmsConfig {
    /// Account identifier, also the basic-auth user name
    pub account_sid: String,
    /// Basic-auth password
    pub auth_token: String,
    /// Sender number, in E.164 form
    pub from_number: String,
    /// API root without a trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl HttpSmsConfig {
    /// Create a config for the default hosted endpoint.
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_number: from_number.into(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read the config from the environment.
    ///
    /// Reads `SMS_ACCOUNT_SID`, `SMS_AUTH_TOKEN` and `SMS_FROM_NUMBER`, plus
    /// `SMS_API_BASE_URL` when set.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingEnv`] naming the first required
    /// variable that is unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(
            required_env("SMS_ACCOUNT_SID")?,
            required_env("SMS_AUTH_TOKEN")?,
            required_env("SMS_FROM_NUMBER")?,
        );
        if let Ok(base_url) = env::var("SMS_API_BASE_URL") {
            if !base_url.trim().is_empty() {
                config = config.with_base_url(base_url);
            }
        }
        Ok(config)
    }

    /// Point the channel at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/Accounts/{}/Messages.json", self.base_url, self.account_sid)
    }
}

fn required_env(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv(name)),
    }
}

impl fmt::Debug for HttpSmsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSmsConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from_number", &self.from_number)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Message resource returned by the gateway on acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SmsReceipt {
    /// Provider message id
    pub sid: String,
    /// Provider delivery status, e.g. `queued`
    pub status: String,
}

/// Failure talking to the SMS gateway.
#[derive(Debug, Error)]
pub enum HttpChannelError {
    /// Connection, timeout or body decoding failure.
    #[error("sms gateway transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The gateway answered with a non-success status.
    #[error("sms gateway rejected message with status {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body as returned by the gateway
        body: String,
    },
}

/// Channel delivering [`SmsMessage`]s through an HTTP SMS gateway.
#[derive(Debug, Clone)]
pub struct HttpSmsChannel {
    client: reqwest::Client,
    config: HttpSmsConfig,
}

impl HttpSmsChannel {
    /// Create a channel with its own HTTP client.
    ///
    /// # Errors
    /// Returns [`HttpChannelError::Transport`] if the HTTP client cannot be
    /// initialised.
    pub fn new(config: HttpSmsConfig) -> Result<Self, HttpChannelError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Create a channel sharing an existing HTTP client.
    ///
    /// The client's own timeout applies; `config.timeout` is ignored.
    pub fn with_client(client: reqwest::Client, config: HttpSmsConfig) -> Self {
        Self { client, config }
    }

    /// Get the channel configuration.
    pub fn config(&self) -> &HttpSmsConfig {
        &self.config
    }
}

#[async_trait]
impl DispatchChannel for HttpSmsChannel {
    type Payload = SmsMessage;
    type Response = SmsReceipt;
    type Error = HttpChannelError;

    async fn send(
        &self,
        recipient: &RecipientKey,
        payload: &SmsMessage,
    ) -> Result<SmsReceipt, HttpChannelError> {
        let form = [
            ("To", recipient.as_str()),
            ("From", self.config.from_number.as_str()),
            ("Body", payload.body()),
        ];

        let response = self
            .client
            .post(self.config.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(status = status.as_u16(), error = %e, "failed to read rejection body");
                    UNREADABLE_BODY.to_string()
                }
            };
            return Err(HttpChannelError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<SmsReceipt>().await?)
    }
}
