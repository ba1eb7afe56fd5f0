// ── Device command dispatcher ──
//
// Sends one command to each selected device, choosing the execution
// surface from where the command is defined. A failure on one device is
// recorded and reported; the remaining devices are still processed.

use serde::Serialize;
use tracing::{debug, info};

use crate::backend::{AutomationBackend, TargetKind};
use crate::catalog::{classify, resolve_catalog, resolve_service_catalog};
use crate::error::CoreError;
use crate::model::{CommandClass, CommandInput, CommandRequest, RunMode};
use crate::report::OutputChannel;

/// What happened for one dispatch target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Executed,
    Enqueued,
    ConnectedExecuted,
    /// Command not defined for this target.
    Skipped,
    Failed { message: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Executed | Self::Enqueued | Self::ConnectedExecuted
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetOutcome {
    pub target: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Aggregate of one dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    /// At least one target accepted the command.
    pub any_succeeded: bool,
    /// `(target, message)` for every failed remote call.
    pub per_device_errors: Vec<(String, String)>,
    pub outcomes: Vec<TargetOutcome>,
}

impl DispatchResult {
    fn push(&mut self, target: &str, outcome: Outcome) {
        if outcome.is_success() {
            self.any_succeeded = true;
        }
        if let Outcome::Failed { message } = &outcome {
            self.per_device_errors
                .push((target.to_owned(), message.clone()));
        }
        self.outcomes.push(TargetOutcome {
            target: target.to_owned(),
            outcome,
        });
    }

    /// Record a failure that happened before dispatch, e.g. an inventory
    /// lookup.
    pub fn record_failure(&mut self, target: &str, message: String) {
        self.push(target, Outcome::Failed { message });
    }

    async fn fail(&mut self, output: &OutputChannel<'_>, target: &str, error: &CoreError) {
        output.report(error).await;
        self.push(
            target,
            Outcome::Failed {
                message: error.operator_message(),
            },
        );
    }
}

async fn submit(
    backend: &dyn AutomationBackend,
    reservation_id: &str,
    target: &str,
    kind: TargetKind,
    request: &CommandRequest,
    inputs: &[CommandInput],
) -> Result<Outcome, CoreError> {
    match request.run_mode {
        RunMode::Execute => {
            backend
                .execute_command(reservation_id, target, kind, &request.command_name, inputs)
                .await?;
            Ok(Outcome::Executed)
        }
        RunMode::Enqueue => {
            backend
                .enqueue_command(reservation_id, target, kind, &request.command_name, inputs)
                .await?;
            Ok(Outcome::Enqueued)
        }
    }
}

/// Send `request` to each device in `device_ids`, in order.
///
/// Each device's catalog decides the surface: regular commands go through
/// execute or enqueue per the run mode, connected commands always through
/// connected-execute, and devices without the command are skipped. A blank
/// command name sends nothing.
pub async fn dispatch(
    backend: &dyn AutomationBackend,
    output: &OutputChannel<'_>,
    reservation_id: &str,
    device_ids: &[String],
    request: &CommandRequest,
) -> DispatchResult {
    let mut result = DispatchResult::default();
    if request.is_blank() {
        debug!("blank command name, nothing to dispatch");
        return result;
    }

    let inputs = request.inputs();
    for device in device_ids {
        let catalog = match resolve_catalog(backend, device).await {
            Ok(catalog) => catalog,
            Err(e) => {
                result.fail(output, device, &e).await;
                continue;
            }
        };

        let sent = match classify(&catalog, &request.command_name) {
            CommandClass::Regular => {
                submit(
                    backend,
                    reservation_id,
                    device,
                    TargetKind::Resource,
                    request,
                    &inputs,
                )
                .await
            }
            CommandClass::Connected => backend
                .execute_connected_command(reservation_id, device, &request.command_name, &inputs)
                .await
                .map(|()| Outcome::ConnectedExecuted),
            CommandClass::Absent => Ok(Outcome::Skipped),
        };

        match sent {
            Ok(outcome) => {
                debug!(device = %device, ?outcome, "command dispatched");
                result.push(device, outcome);
            }
            Err(e) => result.fail(output, device, &e).await,
        }
    }

    info!(
        command = %request.command_name,
        devices = device_ids.len(),
        failures = result.per_device_errors.len(),
        "dispatch finished"
    );
    result
}

/// Send `request` to a reserved service.
///
/// The command must be defined on the service and the service must be
/// part of the reservation (names compared case-insensitively); otherwise
/// nothing is sent.
pub async fn dispatch_service(
    backend: &dyn AutomationBackend,
    output: &OutputChannel<'_>,
    reservation_id: &str,
    reserved_services: &[String],
    service_name: &str,
    request: &CommandRequest,
) -> DispatchResult {
    let mut result = DispatchResult::default();
    if request.is_blank() {
        return result;
    }

    let commands = match resolve_service_catalog(backend, service_name).await {
        Ok(commands) => commands,
        Err(e) => {
            result.fail(output, service_name, &e).await;
            return result;
        }
    };
    if !commands.iter().any(|c| *c == request.command_name) {
        debug!(service = service_name, command = %request.command_name, "command not on service");
        result.push(service_name, Outcome::Skipped);
        return result;
    }

    let Some(service) = reserved_services
        .iter()
        .find(|s| s.eq_ignore_ascii_case(service_name))
    else {
        debug!(service = service_name, "service not in reservation");
        result.push(service_name, Outcome::Skipped);
        return result;
    };

    let inputs = request.inputs();
    match submit(
        backend,
        reservation_id,
        service,
        TargetKind::Service,
        request,
        &inputs,
    )
    .await
    {
        Ok(outcome) => result.push(service, outcome),
        Err(e) => result.fail(output, service, &e).await,
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::DeviceRecord;
    use crate::testing::{Call, FakeBackend};

    const RES: &str = "res-1";

    fn three_devices() -> FakeBackend {
        FakeBackend::new(RES)
            .with_device(DeviceRecord::unresolved("d1"), &["Reboot"], &[])
            .with_device(DeviceRecord::unresolved("d2"), &["Reboot"], &[])
            .with_device(DeviceRecord::unresolved("d3"), &["Reboot"], &[])
    }

    fn ids(backend: &FakeBackend) -> Vec<String> {
        backend.snapshot.devices.clone()
    }

    #[tokio::test]
    async fn blank_command_makes_no_calls() {
        let backend = three_devices();
        let output = OutputChannel::new(&backend, RES);

        let request = CommandRequest::new("  ");
        let result = dispatch(&backend, &output, RES, &ids(&backend), &request).await;

        assert!(!result.any_succeeded);
        assert!(result.per_device_errors.is_empty());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn failure_on_one_device_does_not_stop_the_rest() {
        let backend = three_devices().failing("enqueue:d2");
        let output = OutputChannel::new(&backend, RES);

        let request = CommandRequest::new("Reboot");
        let result = dispatch(&backend, &output, RES, &ids(&backend), &request).await;

        assert!(result.any_succeeded);
        assert_eq!(result.per_device_errors.len(), 1);
        assert_eq!(result.per_device_errors[0].0, "d2");
        let enqueued: Vec<_> = backend
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Enqueue(target, ..) => Some(target),
                _ => None,
            })
            .collect();
        assert_eq!(enqueued, ["d1", "d2", "d3"]);
        assert_eq!(backend.messages(), ["enqueue failed for d2"]);
    }

    #[tokio::test]
    async fn connected_command_ignores_run_mode() {
        let backend = FakeBackend::new(RES).with_device(
            DeviceRecord::unresolved("pdu-a"),
            &["Save"],
            &["PowerCycle"],
        );
        let output = OutputChannel::new(&backend, RES);
        let request = CommandRequest::new("PowerCycle")
            .run_mode(RunMode::Execute)
            .input("delay", "5");

        let result = dispatch(&backend, &output, RES, &ids(&backend), &request).await;

        assert!(result.any_succeeded);
        assert_eq!(
            backend.calls().last(),
            Some(&Call::ExecuteConnected(
                "pdu-a".into(),
                "PowerCycle".into(),
                vec![CommandInput {
                    name: "delay".into(),
                    value: "5".into()
                }]
            ))
        );
    }

    #[tokio::test]
    async fn regular_execute_targets_resource() {
        let backend = three_devices();
        let output = OutputChannel::new(&backend, RES);
        let request = CommandRequest::new("Reboot").run_mode(RunMode::Execute);

        let result = dispatch(&backend, &output, RES, &["d1".to_string()], &request).await;

        assert_eq!(result.outcomes[0].outcome, Outcome::Executed);
        assert!(backend.calls().contains(&Call::Execute(
            "d1".into(),
            TargetKind::Resource,
            "Reboot".into(),
            vec![]
        )));
    }

    #[tokio::test]
    async fn absent_command_is_skipped_silently() {
        let backend = three_devices();
        let output = OutputChannel::new(&backend, RES);

        let request = CommandRequest::new("Nope");
        let result = dispatch(&backend, &output, RES, &ids(&backend), &request).await;

        assert!(!result.any_succeeded);
        assert!(result.per_device_errors.is_empty());
        assert!(result.outcomes.iter().all(|o| o.outcome == Outcome::Skipped));
        assert!(backend.messages().is_empty());
    }

    #[tokio::test]
    async fn catalog_failure_is_a_device_error() {
        let backend = three_devices().failing("commands:d1");
        let output = OutputChannel::new(&backend, RES);

        let request = CommandRequest::new("Reboot");
        let result = dispatch(&backend, &output, RES, &ids(&backend), &request).await;

        assert!(result.any_succeeded);
        assert_eq!(result.per_device_errors[0].0, "d1");
        assert_eq!(result.outcomes.len(), 3);
    }

    #[tokio::test]
    async fn service_command_targets_reserved_service_name() {
        let mut backend = FakeBackend::new(RES).with_service("Traffic Gen", &["Start"]);
        backend.service.insert("traffic gen".into(), vec!["Start".into()]);
        let output = OutputChannel::new(&backend, RES);
        let services = backend.snapshot.services.clone();

        let result = dispatch_service(
            &backend,
            &output,
            RES,
            &services,
            "traffic gen",
            &CommandRequest::new("Start"),
        )
        .await;

        assert!(result.any_succeeded);
        assert!(backend.calls().contains(&Call::Enqueue(
            "Traffic Gen".into(),
            TargetKind::Service,
            "Start".into(),
            vec![]
        )));
    }

    #[tokio::test]
    async fn service_outside_reservation_is_skipped() {
        let mut backend = FakeBackend::new(RES);
        backend.service.insert("Other".into(), vec!["Start".into()]);
        let output = OutputChannel::new(&backend, RES);

        let result =
            dispatch_service(&backend, &output, RES, &[], "Other", &CommandRequest::new("Start"))
                .await;

        assert_eq!(result.outcomes[0].outcome, Outcome::Skipped);
        assert!(!backend
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Enqueue(..) | Call::Execute(..))));
    }
}
