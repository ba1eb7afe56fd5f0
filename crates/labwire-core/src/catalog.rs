// ── Command catalog resolver ──

use tracing::debug;

use crate::backend::AutomationBackend;
use crate::error::CoreError;
use crate::model::{CommandCatalog, CommandClass};

/// Fetch a device's regular commands, then its connected commands.
pub async fn resolve_catalog(
    backend: &dyn AutomationBackend,
    device_id: &str,
) -> Result<CommandCatalog, CoreError> {
    let regular_commands = backend.resource_commands(device_id).await?;
    let connected_commands = backend.resource_connected_commands(device_id).await?;
    debug!(
        device = device_id,
        regular = regular_commands.len(),
        connected = connected_commands.len(),
        "command catalog resolved"
    );
    Ok(CommandCatalog {
        regular_commands,
        connected_commands,
    })
}

/// Command names defined on a service.
pub async fn resolve_service_catalog(
    backend: &dyn AutomationBackend,
    service_name: &str,
) -> Result<Vec<String>, CoreError> {
    backend.service_commands(service_name).await
}

/// Where `command_name` is defined. Regular wins when both lists have it.
///
/// Names are compared exactly.
pub fn classify(catalog: &CommandCatalog, command_name: &str) -> CommandClass {
    if catalog.regular_commands.iter().any(|c| c == command_name) {
        CommandClass::Regular
    } else if catalog.connected_commands.iter().any(|c| c == command_name) {
        CommandClass::Connected
    } else {
        CommandClass::Absent
    }
}
