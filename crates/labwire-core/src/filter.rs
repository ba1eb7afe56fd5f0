// ── Device filter ──
//
// Selects reserved devices by a `MatchRule`. Exactly one clause of the
// rule decides, in this order: exact name, family + model, model, family.

use tracing::{debug, warn};

use crate::backend::AutomationBackend;
use crate::error::CoreError;
use crate::model::{DeviceRecord, MatchRule};

fn eq_upper(field: &str, expected: &str) -> bool {
    field.to_uppercase() == expected
}

/// Whether `device` satisfies `rule`.
///
/// Rule values are already upper-cased; record fields are upper-cased here.
pub fn matches(device: &DeviceRecord, rule: &MatchRule) -> bool {
    if let Some(name) = rule.exact_name_value() {
        return eq_upper(&device.id, name);
    }
    match (rule.family_value(), rule.model_value()) {
        (Some(family), Some(model)) => {
            eq_upper(&device.family_name, family) && eq_upper(&device.model_name, model)
        }
        (None, Some(model)) => eq_upper(&device.model_name, model),
        (Some(family), None) => eq_upper(&device.family_name, family),
        (None, None) => false,
    }
}

/// Matching devices, in inventory order. An unscoped rule matches nothing.
pub fn filter_devices(inventory: &[DeviceRecord], rule: &MatchRule) -> Vec<DeviceRecord> {
    inventory
        .iter()
        .filter(|device| matches(device, rule))
        .cloned()
        .collect()
}

/// Inventory lookup result: resolved records plus per-device failures.
#[derive(Debug, Default)]
pub struct ResolvedInventory {
    pub devices: Vec<DeviceRecord>,
    pub failures: Vec<(String, CoreError)>,
}

/// Look up family and model for each device id, one call per device.
///
/// A failed lookup is recorded and the device left out; the remaining
/// ids are still resolved.
pub async fn resolve_inventory(
    backend: &dyn AutomationBackend,
    device_ids: &[String],
) -> ResolvedInventory {
    let mut resolved = ResolvedInventory::default();
    for id in device_ids {
        match backend.resource_details(id).await {
            Ok(record) => resolved.devices.push(record),
            Err(e) => {
                warn!(device = %id, error = %e, "inventory lookup failed");
                resolved.failures.push((id.clone(), e));
            }
        }
    }
    debug!(
        resolved = resolved.devices.len(),
        failed = resolved.failures.len(),
        "inventory resolved"
    );
    resolved
}
