//! Route command handlers.

use labwire_core::{EvaluateBy, Reservation, RouteDescriptor, RouteReport, RouteTypeFilter};
use tabled::Tabled;

use crate::cli::{
    EvaluateByArg, GlobalOpts, RouteSelectArgs, RouteTypeArg, RoutesArgs, RoutesCommand,
};
use crate::error::CliError;
use crate::output::{self, Status};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Type")]
    mapping_type: String,
}

impl From<&RouteDescriptor> for RouteRow {
    fn from(r: &RouteDescriptor) -> Self {
        Self {
            source: r.source.to_string(),
            target: r.target.to_string(),
            mapping_type: r.mapping_type.label().to_owned(),
        }
    }
}

#[derive(Tabled)]
struct BatchRow {
    #[tabled(rename = "Type")]
    mapping_type: String,
    #[tabled(rename = "Routes")]
    pairs: usize,
    #[tabled(rename = "Result")]
    result: String,
}

// ── Arg conversions ─────────────────────────────────────────────────

fn type_filter(arg: RouteTypeArg) -> RouteTypeFilter {
    match arg {
        RouteTypeArg::Bi => RouteTypeFilter::Bi,
        RouteTypeArg::Uni => RouteTypeFilter::Uni,
        RouteTypeArg::All => RouteTypeFilter::All,
    }
}

fn evaluate_by(arg: EvaluateByArg) -> EvaluateBy {
    match arg {
        EvaluateByArg::Source => EvaluateBy::Source,
        EvaluateByArg::Target => EvaluateBy::Target,
        EvaluateByArg::Either => EvaluateBy::Either,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    reservation: &Reservation,
    args: RoutesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        RoutesCommand::List { requested } => {
            let snapshot = reservation.snapshot().await?;
            let routes = if requested {
                &snapshot.requested_routes
            } else {
                &snapshot.topology_routes
            };
            let out = output::render_list(&global.output, routes, |r| RouteRow::from(r), |r| {
                format!("{}\t{}\t{}", r.source, r.target, r.mapping_type)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RoutesCommand::Connect(select) => {
            let report = run_selection(reservation, &select, Action::Connect).await?;
            finish(report, "connect routes", global)
        }

        RoutesCommand::Disconnect(select) => {
            if !util::confirm(
                &format!("Disconnect routes in reservation {}?", reservation.id()),
                global.yes,
            )? {
                return Ok(());
            }
            let report = run_selection(reservation, &select, Action::Disconnect).await?;
            finish(report, "disconnect routes", global)
        }
    }
}

#[derive(Clone, Copy)]
enum Action {
    Connect,
    Disconnect,
}

/// Device flags pick the by-device variant, `--type` alone the by-type
/// variant, and no selector at all means every route.
async fn run_selection(
    reservation: &Reservation,
    select: &RouteSelectArgs,
    action: Action,
) -> Result<RouteReport, CliError> {
    let filter = select.route_type.map(type_filter);
    let report = if !select.devices.is_empty() {
        let rule = util::match_rule(&select.devices);
        let by = evaluate_by(select.evaluate_by);
        match action {
            Action::Connect => {
                reservation
                    .connect_routes_by_device_type(&rule, filter, by)
                    .await?
            }
            Action::Disconnect => {
                reservation
                    .disconnect_routes_by_device_type(&rule, filter, by)
                    .await?
            }
        }
    } else if filter.is_some() {
        match action {
            Action::Connect => reservation.connect_routes_by_type(filter).await?,
            Action::Disconnect => reservation.disconnect_routes_by_type(filter).await?,
        }
    } else {
        match action {
            Action::Connect => reservation.connect_all_routes().await?,
            Action::Disconnect => reservation.disconnect_all_routes().await?,
        }
    };
    Ok(report)
}

fn finish(report: RouteReport, operation: &str, global: &GlobalOpts) -> Result<(), CliError> {
    for (device, message) in &report.lookup_errors {
        tracing::warn!(device = %device, "{message}");
    }

    if report.batches.is_empty() {
        if !global.quiet {
            eprintln!("No matching routes");
        }
        return Ok(());
    }

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &report.batches,
        |b| BatchRow {
            mapping_type: b
                .mapping_type
                .map_or_else(|| "Any".to_owned(), |m| m.label().to_owned()),
            pairs: b.pairs,
            result: match b.error {
                Some(ref e) => output::status_cell(e, Status::Failed, color),
                None => output::status_cell("ok", Status::Ok, color),
            },
        },
        |b| {
            let kind = b
                .mapping_type
                .map_or_else(|| "any".to_owned(), |m| m.to_string());
            format!("{kind}\t{}\t{}", b.pairs, b.error.as_deref().unwrap_or("ok"))
        },
    );
    output::print_output(&out, global.quiet);

    if report.any_succeeded() {
        Ok(())
    } else {
        Err(CliError::OperationFailed {
            operation: operation.into(),
            failures: report.batches.len(),
        })
    }
}
