//! Configuration for the labwire CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `labwire_core::BackendConfig` / `NotificationConfig`.
//! The CLI layers its global flags on top of what this crate resolves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use labwire_core::{BackendConfig, BackendCredentials, NotificationConfig, TlsVerification};

const KEYRING_SERVICE: &str = "labwire";
const ENV_PREFIX: &str = "LABWIRE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named automation server profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,

    /// Cable request mail settings.
    #[serde(default)]
    pub notifications: Notifications,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
            notifications: Notifications::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named automation server profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL (e.g., "http://lab-server:8032").
    pub server: String,

    /// Lab domain the session is scoped to.
    #[serde(default = "default_domain")]
    pub domain: String,

    pub username: Option<String>,

    /// Password (plaintext: prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

fn default_domain() -> String {
    "Global".into()
}

/// `[notifications]` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Notifications {
    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default = "default_from")]
    pub from: String,

    #[serde(default)]
    pub to: Vec<String>,

    /// Portal address up to the reservation id, without scheme.
    #[serde(default = "default_portal_prefix")]
    pub portal_prefix: String,

    #[serde(default)]
    pub portal_secure: bool,
}

impl Default for Notifications {
    fn default() -> Self {
        let core = NotificationConfig::default();
        Self {
            smtp_server: core.smtp_server,
            smtp_port: core.smtp_port,
            from: core.from,
            to: core.to,
            portal_prefix: core.portal_prefix,
            portal_secure: core.portal_secure,
        }
    }
}

fn default_smtp_server() -> String {
    NotificationConfig::default().smtp_server
}
fn default_smtp_port() -> u16 {
    NotificationConfig::default().smtp_port
}
fn default_from() -> String {
    NotificationConfig::default().from
}
fn default_portal_prefix() -> String {
    NotificationConfig::default().portal_prefix
}

impl Notifications {
    pub fn to_notification_config(&self) -> NotificationConfig {
        NotificationConfig {
            smtp_server: self.smtp_server.clone(),
            smtp_port: self.smtp_port,
            from: self.from.clone(),
            to: self.to.clone(),
            portal_prefix: self.portal_prefix.clone(),
            portal_secure: self.portal_secure,
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }

    /// Copy with every plaintext password replaced by `"********"`.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        for profile in cfg.profiles.values_mut() {
            if profile.password.is_some() {
                profile.password = Some("********".into());
            }
        }
        cfg
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "labwire", "labwire").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("labwire");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file yields the defaults.
///
/// Nested keys use a double underscore in env vars, e.g.
/// `LABWIRE_NOTIFICATIONS__SMTP_SERVER`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Credential resolution (without CLI flags) ───────────────────────

pub fn resolve_username(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    profile
        .username
        .clone()
        .or_else(|| std::env::var("LABWIRE_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Resolve the logon password.
///
/// Order: the env var named by `password_env`, `LABWIRE_PASSWORD`, the
/// system keyring, then the plaintext `password` field.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Global env var
    if let Ok(pw) = std::env::var("LABWIRE_PASSWORD") {
        return Ok(SecretString::from(pw));
    }

    // 3. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a password in the system keyring for `profile_name`.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
        .and_then(|entry| entry.set_password(password))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

/// Parse and validate a server URL.
pub fn parse_server_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "server".into(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Build a `BackendConfig` from a profile: no CLI flag overrides.
pub fn profile_to_backend_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<BackendConfig, ConfigError> {
    let url = parse_server_url(&profile.server)?;

    let credentials = BackendCredentials {
        username: resolve_username(profile, profile_name)?,
        password: resolve_password(profile, profile_name)?,
        domain: profile.domain.clone(),
    };

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(BackendConfig {
        url,
        credentials,
        tls,
        timeout,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
output = "json"
timeout = 45

[profiles.lab]
server = "http://lab-server:8032"
username = "admin"
password = "hunter2"
password_env = "LABWIRE_TEST_UNSET_PASSWORD_VAR"

[profiles.secure]
server = "https://lab.example.com"
domain = "Engineering"
ca_cert = "/etc/ssl/lab-ca.pem"
timeout = 5

[notifications]
smtp_server = "mail-relay.example.com"
from = "no-reply@example.com"
to = ["ops@example.com", "lab@example.com"]
portal_prefix = "lab.example.com:8080/RM/Diagram/Index/"
portal_secure = true
"#;

    fn write_sample() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_profiles_and_defaults() {
        let file = write_sample();
        let cfg = load_config_from(file.path()).unwrap();

        assert_eq!(cfg.default_profile_name(), "lab");
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.color, "auto");
        assert_eq!(cfg.profiles.len(), 2);
        assert_eq!(cfg.profile("lab").unwrap().domain, "Global");
        assert_eq!(cfg.profile("secure").unwrap().domain, "Engineering");
        assert!(matches!(
            cfg.profile("missing"),
            Err(ConfigError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert!(cfg.profiles.is_empty());
        assert_eq!(cfg.notifications.smtp_port, 25);
    }

    #[test]
    fn notifications_translate_to_core_config() {
        let file = write_sample();
        let cfg = load_config_from(file.path()).unwrap();
        let notify = cfg.notifications.to_notification_config();

        assert_eq!(notify.smtp_server, "mail-relay.example.com");
        assert_eq!(notify.smtp_port, 25);
        assert_eq!(notify.to.len(), 2);
        assert_eq!(
            notify.portal_link("abc"),
            "https://lab.example.com:8080/RM/Diagram/Index/abc"
        );
    }

    #[test]
    fn backend_config_uses_profile_tls_and_timeout() {
        let file = write_sample();
        let cfg = load_config_from(file.path()).unwrap();
        let mut secure = cfg.profile("secure").unwrap().clone();
        secure.username = Some("ops".into());
        secure.password = Some("pw".into());

        let backend = profile_to_backend_config(&secure, "secure", &cfg.defaults).unwrap();

        assert_eq!(backend.url.as_str(), "https://lab.example.com/");
        assert_eq!(backend.credentials.domain, "Engineering");
        assert_eq!(
            backend.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/lab-ca.pem"))
        );
        assert_eq!(backend.timeout, Duration::from_secs(5));
    }

    #[test]
    fn plaintext_password_is_last_resort() {
        if std::env::var("LABWIRE_PASSWORD").is_ok() {
            return;
        }
        let file = write_sample();
        let cfg = load_config_from(file.path()).unwrap();
        let lab = cfg.profile("lab").unwrap();

        let pw = resolve_password(lab, "labwire-test-profile-without-keyring").unwrap();
        assert_eq!(pw.expose_secret(), "hunter2");
    }

    #[test]
    fn rejects_non_http_server() {
        assert!(parse_server_url("ftp://lab").is_err());
        assert!(parse_server_url("not a url").is_err());
        assert!(parse_server_url("http://lab:8032").is_ok());
    }

    #[test]
    fn redaction_hides_plaintext_passwords() {
        let file = write_sample();
        let cfg = load_config_from(file.path()).unwrap().redacted();

        assert_eq!(
            cfg.profile("lab").unwrap().password.as_deref(),
            Some("********")
        );
        assert_eq!(cfg.profile("secure").unwrap().password, None);
    }
}
