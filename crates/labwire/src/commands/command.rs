//! Device and service command handlers.

use labwire_core::{
    CommandRequest, CommandTarget, DispatchResult, Outcome, Reservation, RunMode, TargetOutcome,
};
use tabled::Tabled;

use crate::cli::{CommandArgs, CommandCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Status};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn status_label(outcome: &Outcome) -> (&str, Status) {
    match outcome {
        Outcome::Executed => ("executed", Status::Ok),
        Outcome::Enqueued => ("enqueued", Status::Ok),
        Outcome::ConnectedExecuted => ("executed (connected)", Status::Ok),
        Outcome::Skipped => ("not defined", Status::Skipped),
        Outcome::Failed { message } => (message.as_str(), Status::Failed),
    }
}

fn request_from(name: String, execute: bool, inputs: Vec<(String, String)>) -> CommandRequest {
    let mode = if execute {
        RunMode::Execute
    } else {
        RunMode::Enqueue
    };
    inputs
        .into_iter()
        .fold(CommandRequest::new(name).run_mode(mode), |req, (k, v)| {
            req.input(k, v)
        })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    reservation: &Reservation,
    args: CommandArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (target, request) = match args.command {
        CommandCommand::Run {
            name,
            devices,
            execute,
            inputs,
        } => {
            let target = if devices.is_empty() {
                CommandTarget::AllDevices
            } else {
                CommandTarget::Devices(util::match_rule(&devices))
            };
            (target, request_from(name, execute, inputs))
        }
        CommandCommand::Service {
            service,
            name,
            execute,
            inputs,
        } => (
            CommandTarget::Service(service),
            request_from(name, execute, inputs),
        ),
    };

    if request.is_blank() {
        return Err(CliError::Validation {
            field: "command".into(),
            reason: "command name must not be empty".into(),
        });
    }

    let result = reservation.run_command(&target, &request).await?;
    render(&result, &request.command_name, global)
}

fn render(result: &DispatchResult, command: &str, global: &GlobalOpts) -> Result<(), CliError> {
    if result.outcomes.is_empty() {
        if !global.quiet {
            eprintln!("No targets selected for '{command}'");
        }
        return Ok(());
    }

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &result.outcomes,
        |o: &TargetOutcome| {
            let (label, status) = status_label(&o.outcome);
            OutcomeRow {
                target: o.target.clone(),
                status: output::status_cell(label, status, color),
            }
        },
        |o| format!("{}\t{}", o.target, status_label(&o.outcome).0),
    );
    output::print_output(&out, global.quiet);

    if !result.any_succeeded && !result.per_device_errors.is_empty() {
        return Err(CliError::OperationFailed {
            operation: format!("command '{command}'"),
            failures: result.per_device_errors.len(),
        });
    }
    if !result.any_succeeded && !global.quiet {
        eprintln!("Command '{command}' is not defined on any selected target");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_keeps_input_order_and_mode() {
        let req = request_from(
            "Power".into(),
            true,
            vec![("state".into(), "on".into()), ("delay".into(), "5".into())],
        );
        assert_eq!(req.run_mode, RunMode::Execute);
        let names: Vec<_> = req.parameters.keys().cloned().collect();
        assert_eq!(names, ["state", "delay"]);
    }

    #[test]
    fn failed_outcome_label_is_the_message() {
        let outcome = Outcome::Failed {
            message: "boom".into(),
        };
        assert_eq!(status_label(&outcome).0, "boom");
        assert_eq!(status_label(&Outcome::Skipped).0, "not defined");
    }
}
