// Resource, service, and user operations
//
// Inventory details, command catalogs, and the three command execution
// surfaces (execute, enqueue, connected-execute).

use serde_json::json;
use tracing::debug;

use crate::client::AutomationClient;
use crate::error::Error;
use crate::types::{
    CommandInfo, CommandListInfo, InputNameValue, ResourceDetails, TargetType, UserDetails,
};

impl AutomationClient {
    /// `POST /api/GetResourceDetails`
    pub async fn get_resource_details(&self, resource: &str) -> Result<ResourceDetails, Error> {
        debug!(resource, "fetching resource details");
        self.call(
            "GetResourceDetails",
            &json!({ "resourceFullPath": resource }),
        )
        .await
    }

    /// Commands defined by the resource's own driver.
    ///
    /// `POST /api/GetResourceCommands`
    pub async fn get_resource_commands(&self, resource: &str) -> Result<Vec<CommandInfo>, Error> {
        debug!(resource, "fetching resource commands");
        let list: CommandListInfo = self
            .call(
                "GetResourceCommands",
                &json!({ "resourceFullPath": resource }),
            )
            .await?;
        Ok(list.commands)
    }

    /// Commands the resource inherits through its connections (e.g. power).
    ///
    /// `POST /api/GetResourceConnectedCommands`
    pub async fn get_resource_connected_commands(
        &self,
        resource: &str,
    ) -> Result<Vec<CommandInfo>, Error> {
        debug!(resource, "fetching connected commands");
        let list: CommandListInfo = self
            .call(
                "GetResourceConnectedCommands",
                &json!({ "resourceFullPath": resource }),
            )
            .await?;
        Ok(list.commands)
    }

    /// `POST /api/GetServiceCommands`
    pub async fn get_service_commands(&self, service: &str) -> Result<Vec<CommandInfo>, Error> {
        debug!(service, "fetching service commands");
        let list: CommandListInfo = self
            .call("GetServiceCommands", &json!({ "serviceName": service }))
            .await?;
        Ok(list.commands)
    }

    /// Run a command and wait for it to finish.
    ///
    /// `POST /api/ExecuteCommand`
    pub async fn execute_command(
        &self,
        reservation_id: &str,
        target_name: &str,
        target_type: TargetType,
        command_name: &str,
        inputs: &[InputNameValue],
    ) -> Result<(), Error> {
        debug!(target_name, ?target_type, command_name, "executing command");
        self.call_void(
            "ExecuteCommand",
            &command_body(reservation_id, target_name, target_type, command_name, inputs),
        )
        .await
    }

    /// Queue a command without waiting for the target to finish it.
    ///
    /// `POST /api/EnqueueCommand`
    pub async fn enqueue_command(
        &self,
        reservation_id: &str,
        target_name: &str,
        target_type: TargetType,
        command_name: &str,
        inputs: &[InputNameValue],
    ) -> Result<(), Error> {
        debug!(target_name, ?target_type, command_name, "enqueueing command");
        self.call_void(
            "EnqueueCommand",
            &command_body(reservation_id, target_name, target_type, command_name, inputs),
        )
        .await
    }

    /// Run a connected command on a resource. Always blocking.
    ///
    /// `POST /api/ExecuteResourceConnectedCommand`
    pub async fn execute_resource_connected_command(
        &self,
        reservation_id: &str,
        resource: &str,
        command_name: &str,
        parameters: &[InputNameValue],
    ) -> Result<(), Error> {
        debug!(resource, command_name, "executing connected command");
        self.call_void(
            "ExecuteResourceConnectedCommand",
            &json!({
                "reservationId": reservation_id,
                "resourceFullPath": resource,
                "commandName": command_name,
                "parameterValues": parameters,
            }),
        )
        .await
    }

    /// `POST /api/GetUserDetails`
    pub async fn get_user_details(&self, username: &str) -> Result<UserDetails, Error> {
        debug!(username, "fetching user details");
        self.call("GetUserDetails", &json!({ "username": username }))
            .await
    }
}

fn command_body(
    reservation_id: &str,
    target_name: &str,
    target_type: TargetType,
    command_name: &str,
    inputs: &[InputNameValue],
) -> serde_json::Value {
    json!({
        "reservationId": reservation_id,
        "targetName": target_name,
        "targetType": target_type,
        "commandName": command_name,
        "commandInputs": inputs,
    })
}
