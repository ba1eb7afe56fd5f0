// ── Reservation facade ──
//
// Entry point for consumers. Binds a backend to one reservation id and
// exposes the route and command operations. Each operation reads a fresh
// snapshot, computes its work items, and forwards them one call at a
// time. A failure inside a batch, device, or cable is reported to the
// reservation output and does not stop the remaining units; only a failed
// snapshot read is returned as an error.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use labwire_api::transport::{TlsMode, TransportConfig};
use labwire_api::{AutomationClient, Credentials};

use crate::backend::AutomationBackend;
use crate::cable::{self, CableOutcome, CableRequestOutcome};
use crate::config::{BackendConfig, NotificationConfig, TlsVerification};
use crate::dispatch::{self, DispatchResult};
use crate::error::CoreError;
use crate::filter::{filter_devices, resolve_inventory};
use crate::model::{
    CommandRequest, CommandTarget, DeviceRecord, EndpointBatch, MappingType, MatchRule,
    ReservationSnapshot,
};
use crate::notify::Notifier;
use crate::report::{self, OutputChannel};
use crate::routes::{
    EvaluateBy, RouteBatches, RouteTypeFilter, build_batches, build_disconnect_batch,
    select_routes_for_devices,
};

// ── Route operation results ─────────────────────────────────────────

/// One forwarded batch. `mapping_type` is `None` for the untyped
/// disconnect-all call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub mapping_type: Option<MappingType>,
    pub pairs: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteReport {
    pub batches: Vec<BatchOutcome>,
    /// Devices whose inventory lookup failed (by-device variants only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lookup_errors: Vec<(String, String)>,
}

impl RouteReport {
    /// At least one batch call succeeded.
    pub fn any_succeeded(&self) -> bool {
        self.batches.iter().any(|b| b.error.is_none())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteAction {
    Connect,
    Disconnect,
}

// ── Reservation ─────────────────────────────────────────────────────

/// A backend session scoped to one reservation.
///
/// Cheap to re-scope with [`for_reservation`](Self::for_reservation); the
/// backend is shared.
pub struct Reservation<B = AutomationClient> {
    backend: Arc<B>,
    id: String,
}

fn build_transport(config: &BackendConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
    }
}

impl Reservation<AutomationClient> {
    /// Log on to the automation server and bind to `reservation_id`.
    pub async fn connect(
        config: &BackendConfig,
        reservation_id: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let client = AutomationClient::new(config.url.as_str(), &build_transport(config))?;
        let creds = &config.credentials;
        client
            .login(&Credentials::new(
                creds.username.clone(),
                creds.password.clone(),
                creds.domain.clone(),
            ))
            .await?;
        info!(url = %config.url, user = %creds.username, "logged on to automation server");
        Ok(Self::new(client, reservation_id))
    }
}

impl<B: AutomationBackend> Reservation<B> {
    pub fn new(backend: B, reservation_id: impl Into<String>) -> Self {
        Self {
            backend: Arc::new(backend),
            id: reservation_id.into(),
        }
    }

    /// The same backend session, bound to another reservation.
    #[must_use]
    pub fn for_reservation(&self, reservation_id: impl Into<String>) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            id: reservation_id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn output(&self) -> OutputChannel<'_> {
        OutputChannel::new(self.backend.as_ref(), &self.id)
    }

    pub async fn snapshot(&self) -> Result<ReservationSnapshot, CoreError> {
        self.backend.reservation_details(&self.id).await
    }

    /// Whether the reservation exists and has not ended.
    pub async fn is_active(&self) -> Result<bool, CoreError> {
        Ok(self.snapshot().await?.active)
    }

    // ── Route forwarding ─────────────────────────────────────────────

    async fn forward(
        &self,
        action: RouteAction,
        batches: RouteBatches,
        message: fn(MappingType, usize) -> String,
    ) -> RouteReport {
        let output = self.output();
        let mut report = RouteReport::default();
        for (mapping_type, batch) in batches {
            let pairs = batch.pair_count();
            output.write(&message(mapping_type, pairs)).await;
            let sent = match action {
                RouteAction::Connect => {
                    self.backend
                        .connect_routes(&self.id, &batch, mapping_type)
                        .await
                }
                RouteAction::Disconnect => {
                    self.backend
                        .disconnect_routes(&self.id, &batch, Some(mapping_type))
                        .await
                }
            };
            let error = match sent {
                Ok(()) => {
                    info!(?action, %mapping_type, pairs, "route batch sent");
                    None
                }
                Err(e) => {
                    output.report(&e).await;
                    Some(e.operator_message())
                }
            };
            report.batches.push(BatchOutcome {
                mapping_type: Some(mapping_type),
                pairs,
                error,
            });
        }
        report
    }

    /// Connect every BI and UNI topology route, one call per mapping type.
    pub async fn connect_all_routes(&self) -> Result<RouteReport, CoreError> {
        let snapshot = self.snapshot().await?;
        let batches = build_batches(&snapshot.topology_routes, None);
        Ok(self
            .forward(RouteAction::Connect, batches, report::connect_all_queued)
            .await)
    }

    /// Disconnect every topology route in a single untyped call.
    pub async fn disconnect_all_routes(&self) -> Result<RouteReport, CoreError> {
        let snapshot = self.snapshot().await?;
        let batch: EndpointBatch = build_disconnect_batch(&snapshot.topology_routes);
        let mut report = RouteReport::default();
        if batch.is_empty() {
            return Ok(report);
        }

        let output = self.output();
        let pairs = batch.pair_count();
        output.write(&report::disconnect_all_queued(pairs)).await;
        let error = match self.backend.disconnect_routes(&self.id, &batch, None).await {
            Ok(()) => None,
            Err(e) => {
                output.report(&e).await;
                Some(e.operator_message())
            }
        };
        report.batches.push(BatchOutcome {
            mapping_type: None,
            pairs,
            error,
        });
        Ok(report)
    }

    /// Connect routes of one type. Without a filter nothing is sent.
    pub async fn connect_routes_by_type(
        &self,
        type_filter: Option<RouteTypeFilter>,
    ) -> Result<RouteReport, CoreError> {
        let Some(filter) = type_filter else {
            return Ok(RouteReport::default());
        };
        let snapshot = self.snapshot().await?;
        let batches = build_batches(&snapshot.topology_routes, Some(filter));
        Ok(self
            .forward(RouteAction::Connect, batches, report::connect_queued)
            .await)
    }

    /// Disconnect routes of one type. Without a filter nothing is sent.
    pub async fn disconnect_routes_by_type(
        &self,
        type_filter: Option<RouteTypeFilter>,
    ) -> Result<RouteReport, CoreError> {
        let Some(filter) = type_filter else {
            return Ok(RouteReport::default());
        };
        let snapshot = self.snapshot().await?;
        let batches = build_batches(&snapshot.topology_routes, Some(filter));
        Ok(self
            .forward(RouteAction::Disconnect, batches, report::disconnect_queued)
            .await)
    }

    /// Reserved devices matching `rule`, plus lookup failures.
    ///
    /// Exact-name rules match on the id alone, so no inventory lookup is
    /// made for them.
    async fn select_devices(
        &self,
        snapshot: &ReservationSnapshot,
        rule: &MatchRule,
    ) -> (Vec<DeviceRecord>, Vec<(String, String)>) {
        if rule.is_unscoped() {
            return (Vec::new(), Vec::new());
        }
        if rule.exact_name_value().is_some() {
            let inventory: Vec<DeviceRecord> = snapshot
                .devices
                .iter()
                .map(DeviceRecord::unresolved)
                .collect();
            return (filter_devices(&inventory, rule), Vec::new());
        }

        let resolved = resolve_inventory(self.backend.as_ref(), &snapshot.devices).await;
        let output = self.output();
        let mut errors = Vec::with_capacity(resolved.failures.len());
        for (device, e) in &resolved.failures {
            output.report(e).await;
            errors.push((device.clone(), e.operator_message()));
        }
        (filter_devices(&resolved.devices, rule), errors)
    }

    async fn routes_by_device(
        &self,
        action: RouteAction,
        rule: &MatchRule,
        type_filter: Option<RouteTypeFilter>,
        evaluate_by: EvaluateBy,
    ) -> Result<RouteReport, CoreError> {
        let snapshot = self.snapshot().await?;
        let (devices, lookup_errors) = self.select_devices(&snapshot, rule).await;
        debug!(matched = devices.len(), "devices selected for route operation");

        let selected = select_routes_for_devices(&snapshot.topology_routes, &devices, evaluate_by);
        let batches = build_batches(selected, type_filter);
        let message: fn(MappingType, usize) -> String = match action {
            RouteAction::Connect => report::connect_queued,
            RouteAction::Disconnect => report::disconnect_queued,
        };
        let mut report = self.forward(action, batches, message).await;
        report.lookup_errors = lookup_errors;
        Ok(report)
    }

    /// Connect routes touching devices matched by `rule`, one call per
    /// mapping type. A failing BI call does not prevent the UNI call.
    pub async fn connect_routes_by_device_type(
        &self,
        rule: &MatchRule,
        type_filter: Option<RouteTypeFilter>,
        evaluate_by: EvaluateBy,
    ) -> Result<RouteReport, CoreError> {
        self.routes_by_device(RouteAction::Connect, rule, type_filter, evaluate_by)
            .await
    }

    /// Disconnect routes touching devices matched by `rule`.
    pub async fn disconnect_routes_by_device_type(
        &self,
        rule: &MatchRule,
        type_filter: Option<RouteTypeFilter>,
        evaluate_by: EvaluateBy,
    ) -> Result<RouteReport, CoreError> {
        self.routes_by_device(RouteAction::Disconnect, rule, type_filter, evaluate_by)
            .await
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Send `request` to every reserved device.
    pub async fn run_resource_command_on_all(
        &self,
        request: &CommandRequest,
    ) -> Result<DispatchResult, CoreError> {
        if request.is_blank() {
            return Ok(DispatchResult::default());
        }
        let snapshot = self.snapshot().await?;
        let output = self.output();
        Ok(dispatch::dispatch(
            self.backend.as_ref(),
            &output,
            &self.id,
            &snapshot.devices,
            request,
        )
        .await)
    }

    /// Send `request` to the reserved devices matched by `rule`.
    pub async fn run_resource_command_on_select(
        &self,
        rule: &MatchRule,
        request: &CommandRequest,
    ) -> Result<DispatchResult, CoreError> {
        if request.is_blank() {
            return Ok(DispatchResult::default());
        }
        let snapshot = self.snapshot().await?;
        let (devices, lookup_errors) = self.select_devices(&snapshot, rule).await;
        let ids: Vec<String> = devices.into_iter().map(|d| d.id).collect();

        let output = self.output();
        let mut result =
            dispatch::dispatch(self.backend.as_ref(), &output, &self.id, &ids, request).await;
        for (device, message) in lookup_errors {
            result.record_failure(&device, message);
        }
        Ok(result)
    }

    /// Send `request` to a reserved service.
    pub async fn run_service_command(
        &self,
        service_name: &str,
        request: &CommandRequest,
    ) -> Result<DispatchResult, CoreError> {
        if request.is_blank() {
            return Ok(DispatchResult::default());
        }
        let snapshot = self.snapshot().await?;
        let output = self.output();
        Ok(dispatch::dispatch_service(
            self.backend.as_ref(),
            &output,
            &self.id,
            &snapshot.services,
            service_name,
            request,
        )
        .await)
    }

    /// Send `request` wherever `target` points.
    pub async fn run_command(
        &self,
        target: &CommandTarget,
        request: &CommandRequest,
    ) -> Result<DispatchResult, CoreError> {
        match target {
            CommandTarget::AllDevices => self.run_resource_command_on_all(request).await,
            CommandTarget::Devices(rule) => {
                self.run_resource_command_on_select(rule, request).await
            }
            CommandTarget::Service(name) => self.run_service_command(name, request).await,
        }
    }

    // ── Cables ───────────────────────────────────────────────────────

    pub async fn convert_cables_to_routes(&self) -> Result<CableOutcome, CoreError> {
        let snapshot = self.snapshot().await?;
        Ok(cable::convert_cables(
            self.backend.as_ref(),
            &self.output(),
            &self.id,
            &snapshot,
        )
        .await)
    }

    pub async fn request_cables(
        &self,
        notifier: &dyn Notifier,
        notifications: &NotificationConfig,
    ) -> Result<CableRequestOutcome, CoreError> {
        let snapshot = self.snapshot().await?;
        let link = notifications.portal_link(&self.id);
        Ok(cable::request_cables(
            self.backend.as_ref(),
            &self.output(),
            notifier,
            &self.id,
            &snapshot,
            &link,
        )
        .await)
    }
}
