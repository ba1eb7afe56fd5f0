//! CLI configuration: thin wrapper around `labwire_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--server,
//! --username, --domain, --insecure, --timeout) and hands the merged
//! profile to `labwire_config::profile_to_backend_config`.

use labwire_config::{Config, Profile};
use labwire_core::BackendConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use labwire_config::{config_path, load_config_or_default};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Profile from the config file with flag overrides applied, or one built
/// from flags alone when the file has no such profile.
fn effective_profile(
    global: &GlobalOpts,
    config: &Config,
    profile_name: &str,
) -> Result<Profile, CliError> {
    let mut profile = match config.profiles.get(profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name.to_owned(),
                available: config
                    .profiles
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
        None => Profile {
            server: global.server.clone().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?,
            domain: "Global".into(),
            username: None,
            password: None,
            password_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        },
    };

    if let Some(ref server) = global.server {
        profile.server.clone_from(server);
    }
    if let Some(ref domain) = global.domain {
        profile.domain.clone_from(domain);
    }
    if global.username.is_some() {
        profile.username.clone_from(&global.username);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
    Ok(profile)
}

/// Build a `BackendConfig` from the config file, profile, and CLI flags.
///
/// CLI flag overrides take priority over profile values, which take
/// priority over `[defaults]`.
pub fn build_backend_config(global: &GlobalOpts) -> Result<BackendConfig, CliError> {
    let config = load_config_or_default();
    let profile_name = active_profile_name(global, &config);
    let profile = effective_profile(global, &config, &profile_name)?;

    Ok(labwire_config::profile_to_backend_config(
        &profile,
        &profile_name,
        &config.defaults,
    )?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["labwire"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["config", "path"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with_lab_profile() -> Config {
        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                server: "http://qs.lab:9000".into(),
                domain: "Global".into(),
                username: Some("admin".into()),
                password: None,
                password_env: None,
                ca_cert: None,
                insecure: None,
                timeout: Some(90),
            },
        );
        config
    }

    #[test]
    fn profile_timeout_survives_without_flag() {
        let config = config_with_lab_profile();
        let opts = GlobalOpts {
            timeout: None,
            ..global(&[])
        };

        let profile = effective_profile(&opts, &config, "default").unwrap();

        assert_eq!(profile.timeout, Some(90));
    }

    #[test]
    fn flags_override_profile_values() {
        let config = config_with_lab_profile();
        let opts = GlobalOpts {
            timeout: Some(5),
            insecure: true,
            ..global(&["--domain", "Lab"])
        };

        let profile = effective_profile(&opts, &config, "default").unwrap();

        assert_eq!(profile.timeout, Some(5));
        assert_eq!(profile.insecure, Some(true));
        assert_eq!(profile.domain, "Lab");
        assert_eq!(profile.server, "http://qs.lab:9000");
    }
}
