// Automation API authentication
//
// Token-based logon. The logon endpoint returns an opaque token which
// is sent as `Authorization: Basic {token}` on every later call.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::{AutomationClient, preview};
use crate::error::Error;

/// Credentials for logging on to the automation server.
///
/// `domain` scopes the session to a lab domain; most installs use `Global`.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    pub domain: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: SecretString,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password,
            domain: domain.into(),
        }
    }
}

impl AutomationClient {
    /// Log on and keep the returned session token for later calls.
    ///
    /// `PUT /api/login` with `{username, password, domain}`; the body of a
    /// successful response is the token as a JSON string.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), Error> {
        let url = self.base_url().join("api/login")?;
        debug!(user = %credentials.username, domain = %credentials.domain, "logging in at {url}");

        let body = json!({
            "username": credentials.username,
            "password": credentials.password.expose_secret(),
            "domain": credentials.domain,
        });

        let resp = self.http().put(url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("logon failed (HTTP {status}): {}", preview(&body)),
            });
        }

        let raw = resp.text().await?;
        let token: String = serde_json::from_str(&raw).unwrap_or_else(|_| raw.trim().to_owned());
        if token.is_empty() {
            return Err(Error::Authentication {
                message: "logon returned an empty token".into(),
            });
        }

        self.set_token(SecretString::from(token));
        debug!("logon successful");
        Ok(())
    }
}
