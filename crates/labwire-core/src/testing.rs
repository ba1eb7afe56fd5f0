// In-memory `AutomationBackend` for unit tests. Records every call in
// order and fails the calls named in its failure set.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::{AutomationBackend, TargetKind};
use crate::error::CoreError;
use crate::model::{
    CommandInput, DeviceRecord, EndpointBatch, EndpointPath, MappingType, ReservationSnapshot,
    RouteDescriptor, UserContact,
};
use crate::notify::{Email, Notifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    ReservationDetails,
    Connect(Vec<String>, MappingType),
    Disconnect(Vec<String>, Option<MappingType>),
    Remove(Vec<String>, MappingType),
    Add(String, String, MappingType),
    UpdatePhysical(String, String, bool),
    ResourceDetails(String),
    ResourceCommands(String),
    ConnectedCommands(String),
    ServiceCommands(String),
    Execute(String, TargetKind, String, Vec<CommandInput>),
    Enqueue(String, TargetKind, String, Vec<CommandInput>),
    ExecuteConnected(String, String, Vec<CommandInput>),
    Message(String),
    UserDetails(String),
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    pub snapshot: ReservationSnapshot,
    pub records: HashMap<String, DeviceRecord>,
    pub regular: HashMap<String, Vec<String>>,
    pub connected: HashMap<String, Vec<String>>,
    pub service: HashMap<String, Vec<String>>,
    pub user: UserContact,
    /// Failure keys: `"<op>"` or `"<op>:<subject>"`, e.g. `"connect:bi"`,
    /// `"execute:sw2"`, `"commands:sw3"`, `"message"`.
    pub failing: HashSet<String>,
    calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    pub fn new(reservation_id: &str) -> Self {
        Self {
            snapshot: ReservationSnapshot {
                id: reservation_id.into(),
                owner: "alice".into(),
                active: true,
                ..ReservationSnapshot::default()
            },
            ..Self::default()
        }
    }

    pub fn with_routes(mut self, routes: Vec<RouteDescriptor>) -> Self {
        self.snapshot.topology_routes = routes;
        self
    }

    pub fn with_requested(mut self, routes: Vec<RouteDescriptor>) -> Self {
        self.snapshot.requested_routes = routes;
        self
    }

    pub fn with_device(
        mut self,
        record: DeviceRecord,
        regular: &[&str],
        connected: &[&str],
    ) -> Self {
        let id = record.id.clone();
        self.snapshot.devices.push(id.clone());
        self.regular
            .insert(id.clone(), regular.iter().map(ToString::to_string).collect());
        self.connected
            .insert(id.clone(), connected.iter().map(ToString::to_string).collect());
        self.records.insert(id, record);
        self
    }

    pub fn with_service(mut self, name: &str, commands: &[&str]) -> Self {
        self.snapshot.services.push(name.into());
        self.service
            .insert(name.into(), commands.iter().map(ToString::to_string).collect());
        self
    }

    pub fn failing(mut self, key: &str) -> Self {
        self.failing.insert(key.into());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Messages written to the output channel, in order.
    pub fn messages(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Message(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: &str, subject: &str) -> Result<(), CoreError> {
        if self.failing.contains(op) || self.failing.contains(&format!("{op}:{subject}")) {
            return Err(CoreError::Backend {
                message: format!("{op} failed for {subject}"),
                code: Some(100),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AutomationBackend for FakeBackend {
    async fn reservation_details(&self, id: &str) -> Result<ReservationSnapshot, CoreError> {
        self.record(Call::ReservationDetails);
        self.check("reservation", id)?;
        Ok(self.snapshot.clone())
    }

    async fn connect_routes(
        &self,
        _reservation_id: &str,
        endpoints: &EndpointBatch,
        mapping_type: MappingType,
    ) -> Result<(), CoreError> {
        self.record(Call::Connect(endpoints.to_wire(), mapping_type));
        self.check("connect", mapping_type.as_ref())
    }

    async fn disconnect_routes(
        &self,
        _reservation_id: &str,
        endpoints: &EndpointBatch,
        mapping_type: Option<MappingType>,
    ) -> Result<(), CoreError> {
        self.record(Call::Disconnect(endpoints.to_wire(), mapping_type));
        let subject = mapping_type.map_or_else(|| "any".to_string(), |m| m.to_string());
        self.check("disconnect", &subject)
    }

    async fn remove_routes(
        &self,
        _reservation_id: &str,
        endpoints: &EndpointBatch,
        mapping_type: MappingType,
    ) -> Result<(), CoreError> {
        let wire = endpoints.to_wire();
        self.record(Call::Remove(wire.clone(), mapping_type));
        self.check("remove", wire.first().map_or("", String::as_str))
    }

    async fn add_route(
        &self,
        _reservation_id: &str,
        source: &EndpointPath,
        target: &EndpointPath,
        mapping_type: MappingType,
    ) -> Result<(), CoreError> {
        self.record(Call::Add(source.to_string(), target.to_string(), mapping_type));
        self.check("add", source.as_str())
    }

    async fn update_physical_connection(
        &self,
        port_a: &EndpointPath,
        port_b: &EndpointPath,
        override_existing: bool,
    ) -> Result<(), CoreError> {
        self.record(Call::UpdatePhysical(
            port_a.to_string(),
            port_b.to_string(),
            override_existing,
        ));
        self.check("physical", port_a.as_str())
    }

    async fn resource_details(&self, device_id: &str) -> Result<DeviceRecord, CoreError> {
        self.record(Call::ResourceDetails(device_id.into()));
        self.check("details", device_id)?;
        Ok(self
            .records
            .get(device_id)
            .cloned()
            .unwrap_or_else(|| DeviceRecord::unresolved(device_id)))
    }

    async fn resource_commands(&self, device_id: &str) -> Result<Vec<String>, CoreError> {
        self.record(Call::ResourceCommands(device_id.into()));
        self.check("commands", device_id)?;
        Ok(self.regular.get(device_id).cloned().unwrap_or_default())
    }

    async fn resource_connected_commands(
        &self,
        device_id: &str,
    ) -> Result<Vec<String>, CoreError> {
        self.record(Call::ConnectedCommands(device_id.into()));
        self.check("connected-commands", device_id)?;
        Ok(self.connected.get(device_id).cloned().unwrap_or_default())
    }

    async fn service_commands(&self, service_name: &str) -> Result<Vec<String>, CoreError> {
        self.record(Call::ServiceCommands(service_name.into()));
        self.check("service-commands", service_name)?;
        Ok(self.service.get(service_name).cloned().unwrap_or_default())
    }

    async fn execute_command(
        &self,
        _reservation_id: &str,
        target_name: &str,
        target_kind: TargetKind,
        command_name: &str,
        inputs: &[CommandInput],
    ) -> Result<(), CoreError> {
        self.record(Call::Execute(
            target_name.into(),
            target_kind,
            command_name.into(),
            inputs.to_vec(),
        ));
        self.check("execute", target_name)
    }

    async fn enqueue_command(
        &self,
        _reservation_id: &str,
        target_name: &str,
        target_kind: TargetKind,
        command_name: &str,
        inputs: &[CommandInput],
    ) -> Result<(), CoreError> {
        self.record(Call::Enqueue(
            target_name.into(),
            target_kind,
            command_name.into(),
            inputs.to_vec(),
        ));
        self.check("enqueue", target_name)
    }

    async fn execute_connected_command(
        &self,
        _reservation_id: &str,
        device_id: &str,
        command_name: &str,
        inputs: &[CommandInput],
    ) -> Result<(), CoreError> {
        self.record(Call::ExecuteConnected(
            device_id.into(),
            command_name.into(),
            inputs.to_vec(),
        ));
        self.check("connected", device_id)
    }

    async fn write_message(&self, _reservation_id: &str, message: &str) -> Result<(), CoreError> {
        self.record(Call::Message(message.into()));
        self.check("message", "")
    }

    async fn user_details(&self, username: &str) -> Result<UserContact, CoreError> {
        self.record(Call::UserDetails(username.into()));
        self.check("user", username)?;
        Ok(self.user.clone())
    }
}

/// `Notifier` that keeps sent mail in memory, or refuses every send.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    sent: Mutex<Vec<Email>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: &Email) -> Result<(), CoreError> {
        if self.fail {
            return Err(CoreError::Notification {
                message: "relay refused".into(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}
