// Automation API HTTP client
//
// Wraps `reqwest::Client` with base-URL handling, token injection, and
// envelope unwrapping. Operation groups (reservations, resources) are
// implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// The `{ Success, ErrorCode, ErrorMessage, Response }` envelope every
/// operation answers with.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    error_message: Option<String>,
    response: Option<T>,
}

/// Raw HTTP client for the automation API.
///
/// Every operation is `POST {base}/api/{Operation}` with a JSON object of
/// named parameters. Methods return the unwrapped `Response` payload --
/// the envelope is stripped before the caller sees it.
pub struct AutomationClient {
    http: reqwest::Client,
    base_url: Url,
    /// Session token captured by `login()`.
    token: RwLock<Option<SecretString>>,
}

impl AutomationClient {
    /// Create a client for the server at `base_url` (e.g. `http://lab:8032`).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(base_url, http)
    }

    /// Wrap a pre-built `reqwest::Client`.
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            token: RwLock::new(None),
        })
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The server base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether a session token is held.
    pub fn is_logged_in(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn set_token(&self, token: SecretString) {
        trace!("storing session token");
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn auth_header(&self) -> Result<String, Error> {
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .map(|t| format!("Basic {}", t.expose_secret()))
            .ok_or(Error::NotAuthenticated)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Invoke `operation` and return its `Response` payload.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        self.send::<T>(operation, body)
            .await?
            .ok_or_else(|| Error::Deserialization {
                message: format!("{operation}: response payload missing"),
                body: String::new(),
            })
    }

    /// Invoke `operation`, discarding any payload.
    pub(crate) async fn call_void(
        &self,
        operation: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        self.send::<IgnoredAny>(operation, body).await.map(|_| ())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<Option<T>, Error> {
        let url = self.base_url.join(&format!("api/{operation}"))?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header()?)
            .json(body)
            .send()
            .await?;

        parse_envelope(operation, resp).await
    }
}

/// Make sure the base URL ends with `/` so relative joins keep its path.
fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    Ok(url)
}

/// First 200 characters of a response body, for error messages.
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

/// Parse the envelope, returning `Response` on success or an
/// `Error::Api` carrying the server message when `Success` is false.
async fn parse_envelope<T: DeserializeOwned>(
    operation: &str,
    resp: reqwest::Response,
) -> Result<Option<T>, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::Authentication {
            message: "session expired or invalid credentials".into(),
        });
    }

    let body = resp.text().await?;

    let envelope: Envelope<T> = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(Error::Http {
                status: status.as_u16(),
                message: preview(&body),
            });
        }
        Err(e) => {
            return Err(Error::Deserialization {
                message: format!("{operation}: {e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            });
        }
    };

    if envelope.success {
        Ok(envelope.response)
    } else {
        Err(Error::Api {
            message: envelope
                .error_message
                .unwrap_or_else(|| format!("{operation} failed (HTTP {status})")),
            code: envelope.error_code,
        })
    }
}
