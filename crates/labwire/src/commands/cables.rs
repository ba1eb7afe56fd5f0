//! Cable command handlers.

use labwire_core::{
    BackendConfig, CableOutcome, CableRequestOutcome, Reservation, RouteDescriptor, SmtpNotifier,
};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{CablesArgs, CablesCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Status};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CableRow {
    #[tabled(rename = "Cable")]
    route: String,
    #[tabled(rename = "Result")]
    result: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    backend: &BackendConfig,
    reservation_id: Option<String>,
    args: CablesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CablesCommand::Convert { ids } => {
            let ids = ids
                .iter()
                .map(|id| util::validate_reservation_id(id))
                .collect::<Result<Vec<_>, _>>()?;

            if !ids.is_empty() {
                let session = util::connect(backend, &ids[0], global).await?;
                let mut invalid = Vec::new();
                for id in &ids {
                    if !convert_checked(&session.for_reservation(id.as_str()), global).await? {
                        invalid.push(id.clone());
                    }
                }
                return match invalid.into_iter().next() {
                    Some(id) => Err(CliError::InvalidReservation { id }),
                    None => Ok(()),
                };
            }

            if let Some(id) = reservation_id {
                let reservation = util::connect(backend, &id, global).await?;
                return if convert_checked(&reservation, global).await? {
                    Ok(())
                } else {
                    Err(CliError::InvalidReservation { id })
                };
            }

            prompt_loop(backend, global).await
        }

        CablesCommand::Request => {
            let id = reservation_id.ok_or(CliError::ReservationRequired)?;
            let notifications = config::load_config_or_default()
                .notifications
                .to_notification_config();
            let notifier = SmtpNotifier::new(&notifications)?;
            let reservation = util::connect(backend, &id, global).await?;

            match reservation.request_cables(&notifier, &notifications).await? {
                CableRequestOutcome::NothingRequested => {
                    if !global.quiet {
                        eprintln!("No cables requested in reservation {id}");
                    }
                    Ok(())
                }
                CableRequestOutcome::Requested { cables, delivered } => {
                    if !global.quiet {
                        eprintln!("Requested {cables} cable(s)");
                    }
                    if delivered {
                        Ok(())
                    } else {
                        Err(CliError::Notification {
                            message: format!("cable request mail for {id} was not delivered"),
                        })
                    }
                }
            }
        }
    }
}

/// Ask for reservation ids until the operator types `exit` or `0`.
async fn prompt_loop(backend: &BackendConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let session = util::connect(backend, "", global).await?;
    loop {
        let raw: String = dialoguer::Input::new()
            .with_prompt("Reservation ID (exit to quit)")
            .interact_text()
            .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("exit") || raw == "0" {
            return Ok(());
        }

        let Ok(id) = util::validate_reservation_id(raw) else {
            eprintln!("Invalid ID");
            continue;
        };
        if !convert_checked(&session.for_reservation(id), global).await? {
            eprintln!("Invalid ID");
        }
    }
}

/// Convert cables if the reservation is active. Returns `false` for an
/// unknown or ended reservation.
async fn convert_checked(reservation: &Reservation, global: &GlobalOpts) -> Result<bool, CliError> {
    match reservation.is_active().await {
        Ok(true) => {}
        Ok(false) => return Ok(false),
        Err(e) => {
            tracing::debug!(
                reservation = reservation.id(),
                error = %e,
                "reservation lookup failed"
            );
            return Ok(false);
        }
    }

    let outcome = reservation.convert_cables_to_routes().await?;
    render(&outcome, reservation.id(), global);
    Ok(true)
}

/// One converted or failed cable, flattened for rendering.
#[derive(Serialize)]
struct CableResult<'a> {
    #[serde(flatten)]
    route: &'a RouteDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

fn render(outcome: &CableOutcome, reservation_id: &str, global: &GlobalOpts) {
    let CableOutcome::Processed { converted, failed } = outcome else {
        if !global.quiet {
            eprintln!("No cables to convert in reservation {reservation_id}");
        }
        return;
    };

    let results: Vec<CableResult<'_>> = converted
        .iter()
        .map(|route| CableResult { route, error: None })
        .chain(failed.iter().map(|f| CableResult {
            route: &f.route,
            error: Some(f.message.as_str()),
        }))
        .collect();

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &results,
        |r| CableRow {
            route: r.route.to_string(),
            result: match r.error {
                Some(e) => output::status_cell(e, Status::Failed, color),
                None => output::status_cell("converted", Status::Ok, color),
            },
        },
        |r| format!("{}\t{}", r.route, r.error.unwrap_or("converted")),
    );
    output::print_output(&out, global.quiet);
}
