// ── Backend seam ──
//
// Every remote operation the core issues goes through `AutomationBackend`.
// `labwire_api::AutomationClient` is the production implementation; tests
// use an in-memory fake.

use async_trait::async_trait;
use labwire_api::{AutomationClient, InputNameValue, TargetType};

use crate::convert;
use crate::error::CoreError;
use crate::model::{
    CommandInput, DeviceRecord, EndpointBatch, EndpointPath, MappingType, ReservationSnapshot,
    UserContact,
};

/// What an execute/enqueue call is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Resource,
    Service,
}

/// Remote operations of the reservation backend.
///
/// Calls are awaited one at a time by the core; implementations need not
/// support concurrent use beyond `Send + Sync`.
#[async_trait]
pub trait AutomationBackend: Send + Sync {
    async fn reservation_details(
        &self,
        reservation_id: &str,
    ) -> Result<ReservationSnapshot, CoreError>;

    async fn connect_routes(
        &self,
        reservation_id: &str,
        endpoints: &EndpointBatch,
        mapping_type: MappingType,
    ) -> Result<(), CoreError>;

    async fn disconnect_routes(
        &self,
        reservation_id: &str,
        endpoints: &EndpointBatch,
        mapping_type: Option<MappingType>,
    ) -> Result<(), CoreError>;

    async fn remove_routes(
        &self,
        reservation_id: &str,
        endpoints: &EndpointBatch,
        mapping_type: MappingType,
    ) -> Result<(), CoreError>;

    async fn add_route(
        &self,
        reservation_id: &str,
        source: &EndpointPath,
        target: &EndpointPath,
        mapping_type: MappingType,
    ) -> Result<(), CoreError>;

    async fn update_physical_connection(
        &self,
        port_a: &EndpointPath,
        port_b: &EndpointPath,
        override_existing: bool,
    ) -> Result<(), CoreError>;

    async fn resource_details(&self, device_id: &str) -> Result<DeviceRecord, CoreError>;

    async fn resource_commands(&self, device_id: &str) -> Result<Vec<String>, CoreError>;

    async fn resource_connected_commands(&self, device_id: &str)
    -> Result<Vec<String>, CoreError>;

    async fn service_commands(&self, service_name: &str) -> Result<Vec<String>, CoreError>;

    async fn execute_command(
        &self,
        reservation_id: &str,
        target_name: &str,
        target_kind: TargetKind,
        command_name: &str,
        inputs: &[CommandInput],
    ) -> Result<(), CoreError>;

    async fn enqueue_command(
        &self,
        reservation_id: &str,
        target_name: &str,
        target_kind: TargetKind,
        command_name: &str,
        inputs: &[CommandInput],
    ) -> Result<(), CoreError>;

    async fn execute_connected_command(
        &self,
        reservation_id: &str,
        device_id: &str,
        command_name: &str,
        inputs: &[CommandInput],
    ) -> Result<(), CoreError>;

    async fn write_message(&self, reservation_id: &str, message: &str) -> Result<(), CoreError>;

    async fn user_details(&self, username: &str) -> Result<UserContact, CoreError>;
}

// ── Production adapter ──────────────────────────────────────────────

fn wire_inputs(inputs: &[CommandInput]) -> Vec<InputNameValue> {
    inputs
        .iter()
        .map(|i| InputNameValue::new(i.name.clone(), i.value.clone()))
        .collect()
}

fn wire_target(kind: TargetKind) -> TargetType {
    match kind {
        TargetKind::Resource => TargetType::Resource,
        TargetKind::Service => TargetType::Service,
    }
}

#[async_trait]
impl AutomationBackend for AutomationClient {
    async fn reservation_details(
        &self,
        reservation_id: &str,
    ) -> Result<ReservationSnapshot, CoreError> {
        let desc = self.get_reservation_details(reservation_id).await?;
        Ok(convert::reservation_snapshot(desc))
    }

    async fn connect_routes(
        &self,
        reservation_id: &str,
        endpoints: &EndpointBatch,
        mapping_type: MappingType,
    ) -> Result<(), CoreError> {
        self.connect_routes_in_reservation(
            reservation_id,
            &endpoints.to_wire(),
            mapping_type.as_ref(),
        )
        .await?;
        Ok(())
    }

    async fn disconnect_routes(
        &self,
        reservation_id: &str,
        endpoints: &EndpointBatch,
        mapping_type: Option<MappingType>,
    ) -> Result<(), CoreError> {
        let mapping_type = mapping_type.map(|m| m.to_string());
        self.disconnect_routes_in_reservation(
            reservation_id,
            &endpoints.to_wire(),
            mapping_type.as_deref(),
        )
        .await?;
        Ok(())
    }

    async fn remove_routes(
        &self,
        reservation_id: &str,
        endpoints: &EndpointBatch,
        mapping_type: MappingType,
    ) -> Result<(), CoreError> {
        self.remove_routes_from_reservation(
            reservation_id,
            &endpoints.to_wire(),
            mapping_type.as_ref(),
        )
        .await?;
        Ok(())
    }

    async fn add_route(
        &self,
        reservation_id: &str,
        source: &EndpointPath,
        target: &EndpointPath,
        mapping_type: MappingType,
    ) -> Result<(), CoreError> {
        self.add_routes_to_reservation(
            reservation_id,
            &[source.to_string()],
            &[target.to_string()],
            mapping_type.as_ref(),
        )
        .await?;
        Ok(())
    }

    async fn update_physical_connection(
        &self,
        port_a: &EndpointPath,
        port_b: &EndpointPath,
        override_existing: bool,
    ) -> Result<(), CoreError> {
        AutomationClient::update_physical_connection(
            self,
            port_a.as_str(),
            port_b.as_str(),
            override_existing,
        )
        .await?;
        Ok(())
    }

    async fn resource_details(&self, device_id: &str) -> Result<DeviceRecord, CoreError> {
        let details = self.get_resource_details(device_id).await?;
        Ok(convert::device_record(device_id, details))
    }

    async fn resource_commands(&self, device_id: &str) -> Result<Vec<String>, CoreError> {
        let commands = self.get_resource_commands(device_id).await?;
        Ok(convert::command_names(commands))
    }

    async fn resource_connected_commands(
        &self,
        device_id: &str,
    ) -> Result<Vec<String>, CoreError> {
        let commands = self.get_resource_connected_commands(device_id).await?;
        Ok(convert::command_names(commands))
    }

    async fn service_commands(&self, service_name: &str) -> Result<Vec<String>, CoreError> {
        let commands = self.get_service_commands(service_name).await?;
        Ok(convert::command_names(commands))
    }

    async fn execute_command(
        &self,
        reservation_id: &str,
        target_name: &str,
        target_kind: TargetKind,
        command_name: &str,
        inputs: &[CommandInput],
    ) -> Result<(), CoreError> {
        AutomationClient::execute_command(
            self,
            reservation_id,
            target_name,
            wire_target(target_kind),
            command_name,
            &wire_inputs(inputs),
        )
        .await?;
        Ok(())
    }

    async fn enqueue_command(
        &self,
        reservation_id: &str,
        target_name: &str,
        target_kind: TargetKind,
        command_name: &str,
        inputs: &[CommandInput],
    ) -> Result<(), CoreError> {
        AutomationClient::enqueue_command(
            self,
            reservation_id,
            target_name,
            wire_target(target_kind),
            command_name,
            &wire_inputs(inputs),
        )
        .await?;
        Ok(())
    }

    async fn execute_connected_command(
        &self,
        reservation_id: &str,
        device_id: &str,
        command_name: &str,
        inputs: &[CommandInput],
    ) -> Result<(), CoreError> {
        self.execute_resource_connected_command(
            reservation_id,
            device_id,
            command_name,
            &wire_inputs(inputs),
        )
        .await?;
        Ok(())
    }

    async fn write_message(&self, reservation_id: &str, message: &str) -> Result<(), CoreError> {
        self.write_message_to_reservation_output(reservation_id, message)
            .await?;
        Ok(())
    }

    async fn user_details(&self, username: &str) -> Result<UserContact, CoreError> {
        let user = self.get_user_details(username).await?;
        Ok(UserContact {
            name: user.name,
            email: user.email,
        })
    }
}
