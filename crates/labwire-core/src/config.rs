// ── Runtime connection configuration ──
//
// These types describe *how* to reach the automation server and where
// notifications go. They carry credential data but never touch disk.
// The CLI constructs them (via labwire-config) and hands them in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Logon credentials for the automation server.
#[derive(Debug, Clone)]
pub struct BackendCredentials {
    pub username: String,
    pub password: SecretString,
    /// Lab domain; `Global` on most installs.
    pub domain: String,
}

/// Configuration for connecting to the automation server.
///
/// Built by the CLI, passed to [`Reservation::connect`](crate::Reservation::connect).
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Server URL (e.g., `http://lab-server:8032`).
    pub url: Url,
    pub credentials: BackendCredentials,
    pub tls: TlsVerification,
    /// Request timeout applied by the HTTP client.
    pub timeout: Duration,
}

/// Where cable request mails go and how the reservation link is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub from: String,
    pub to: Vec<String>,
    /// Portal address up to the reservation id, without scheme
    /// (e.g. `lab.example.com:8080/RM/Diagram/Index/`).
    pub portal_prefix: String,
    /// Use `https://` for portal links.
    pub portal_secure: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            smtp_server: "localhost".into(),
            smtp_port: 25,
            from: "no-reply@localhost".into(),
            to: Vec::new(),
            portal_prefix: "localhost/RM/Diagram/Index/".into(),
            portal_secure: false,
        }
    }
}

impl NotificationConfig {
    /// Portal link to a reservation's diagram.
    pub fn portal_link(&self, reservation_id: &str) -> String {
        let scheme = if self.portal_secure { "https" } else { "http" };
        format!("{scheme}://{}{reservation_id}", self.portal_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portal_link_follows_scheme_flag() {
        let mut cfg = NotificationConfig {
            portal_prefix: "lab.example.com:8080/RM/Diagram/Index/".into(),
            ..NotificationConfig::default()
        };
        assert_eq!(
            cfg.portal_link("abc"),
            "http://lab.example.com:8080/RM/Diagram/Index/abc"
        );
        cfg.portal_secure = true;
        assert!(cfg.portal_link("abc").starts_with("https://"));
    }
}
