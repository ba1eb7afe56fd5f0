//! Config subcommand handlers. None of these touch the server.

use labwire_config::Config;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct ProfileSummary {
    name: String,
    server: String,
    domain: String,
    username: Option<String>,
    default: bool,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "User")]
    username: String,
    #[tabled(rename = "Default")]
    default: String,
}

impl From<&ProfileSummary> for ProfileRow {
    fn from(p: &ProfileSummary) -> Self {
        Self {
            name: p.name.clone(),
            server: p.server.clone(),
            domain: p.domain.clone(),
            username: p.username.clone().unwrap_or_default(),
            default: if p.default { "*".into() } else { String::new() },
        }
    }
}

fn summaries(cfg: &Config) -> Vec<ProfileSummary> {
    let default = cfg.default_profile_name();
    cfg.profiles
        .iter()
        .map(|(name, p)| ProfileSummary {
            name: name.clone(),
            server: p.server.clone(),
            domain: p.domain.clone(),
            username: p.username.clone(),
            default: name == default,
        })
        .collect()
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default().redacted();
            let rendered = toml::to_string_pretty(&cfg)?;
            let out = output::render_single(&global.output, &cfg, |_| rendered.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let profiles = summaries(&cfg);
            let out = output::render_list(&global.output, &profiles, |p| ProfileRow::from(p), |p| {
                p.name.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
                    name,
                });
            }

            let password = dialoguer::Password::new()
                .with_prompt(format!("Password for profile '{name}'"))
                .interact()
                .map_err(prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }

            labwire_config::store_password(&name, &password)?;
            if !global.quiet {
                eprintln!("Password for '{name}' stored in system keyring");
            }
            Ok(())
        }
    }
}
