// ── Wire → domain conversion ──
//
// Translates `labwire_api` response shapes into the core's value types.
// Unknown route type strings become `MappingType::Other` rather than an
// error, so one odd row never sinks a whole snapshot.

use labwire_api::types::{CommandInfo, ReservationDescription, ResourceDetails, RouteInfo};

use crate::model::{DeviceRecord, MappingType, ReservationSnapshot, RouteDescriptor};

pub(crate) fn route_descriptor(route: RouteInfo) -> RouteDescriptor {
    RouteDescriptor::new(
        route.source,
        route.target,
        MappingType::from_wire(&route.route_type),
    )
}

pub(crate) fn reservation_snapshot(desc: ReservationDescription) -> ReservationSnapshot {
    ReservationSnapshot {
        active: desc.actual_end_time.trim().is_empty(),
        devices: desc.resources.into_iter().map(|r| r.name).collect(),
        services: desc.services.into_iter().map(|s| s.service_name).collect(),
        topology_routes: desc
            .topologies_route_info
            .into_iter()
            .flat_map(|t| t.routes)
            .map(route_descriptor)
            .collect(),
        requested_routes: desc
            .requested_routes_info
            .into_iter()
            .map(route_descriptor)
            .collect(),
        id: desc.id,
        owner: desc.owner,
    }
}

/// `id` is the name the device was looked up by; the backend's own
/// `Name` field may be a display name.
pub(crate) fn device_record(id: &str, details: ResourceDetails) -> DeviceRecord {
    DeviceRecord::new(
        id,
        details.resource_family_name,
        details.resource_model_name,
    )
}

pub(crate) fn command_names(commands: Vec<CommandInfo>) -> Vec<String> {
    commands.into_iter().map(|c| c.name).collect()
}
