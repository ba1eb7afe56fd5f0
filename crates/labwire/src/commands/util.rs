//! Shared helpers for command handlers.

use std::io::IsTerminal;

use labwire_core::{BackendConfig, MatchRule, Reservation};

use crate::cli::{DeviceSelectArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Reservation ids are GUIDs; reject anything else before calling out.
pub fn validate_reservation_id(raw: &str) -> Result<String, CliError> {
    let trimmed = raw.trim();
    uuid::Uuid::parse_str(trimmed)
        .map(|_| trimmed.to_owned())
        .map_err(|e| CliError::Validation {
            field: "reservation".into(),
            reason: format!("'{trimmed}' is not a reservation id: {e}"),
        })
}

/// Build a `MatchRule` from `--device` / `--family` / `--model`.
pub fn match_rule(args: &DeviceSelectArgs) -> MatchRule {
    let mut rule = MatchRule::new();
    if let Some(ref name) = args.device {
        rule = rule.exact_name(name);
    }
    if let Some(ref family) = args.family {
        rule = rule.family(family);
    }
    if let Some(ref model) = args.model {
        rule = rule.model(model);
    }
    rule
}

/// Log on and bind to `reservation_id`.
pub async fn connect(
    config: &BackendConfig,
    reservation_id: &str,
    global: &GlobalOpts,
) -> Result<Reservation, CliError> {
    Reservation::connect(config, reservation_id)
        .await
        .map_err(|e| match CliError::from(e) {
            CliError::AuthFailed { message, .. } => CliError::AuthFailed {
                profile: config::active_profile_name(global, &config::load_config_or_default()),
                message,
            },
            other => other,
        })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal on stdin there is nobody to ask, so `--yes` is required.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.to_owned(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
