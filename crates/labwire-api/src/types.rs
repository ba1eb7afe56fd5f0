// Wire types for the automation API.
//
// Field names follow the server's PascalCase JSON. These types are the
// raw transport shapes; `labwire-core` converts them into its own
// request-scoped domain values.

use serde::{Deserialize, Serialize};

// ── Reservations ────────────────────────────────────────────────────

/// `GetReservationDetails` response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReservationDetails {
    pub reservation_description: ReservationDescription,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReservationDescription {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub status: String,
    /// Empty while the reservation is still running.
    pub actual_end_time: String,
    pub resources: Vec<ReservedResource>,
    pub services: Vec<ReservedService>,
    /// Routes grouped per topology the reservation was built from.
    pub topologies_route_info: Vec<TopologyRoutes>,
    /// Routes requested on the reservation itself (including cables).
    pub requested_routes_info: Vec<RouteInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReservedResource {
    pub name: String,
    pub full_address: String,
    pub resource_family_name: String,
    pub resource_model_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReservedService {
    pub service_name: String,
    pub alias: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TopologyRoutes {
    pub topology_name: String,
    pub routes: Vec<RouteInfo>,
}

/// A single route as reported by the server.
///
/// `route_type` is free text on the wire (`bi`, `uni`, `cable`, ...).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RouteInfo {
    pub source: String,
    pub target: String,
    pub route_type: String,
    pub alias: Option<String>,
}

// ── Resources & commands ────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResourceDetails {
    pub name: String,
    pub resource_family_name: String,
    pub resource_model_name: String,
    pub address: String,
}

/// `GetResourceCommands` / `GetServiceCommands` response body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CommandListInfo {
    pub commands: Vec<CommandInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CommandInfo {
    pub name: String,
    pub description: String,
}

/// One named command input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InputNameValue {
    pub name: String,
    pub value: String,
}

impl InputNameValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// What an `ExecuteCommand` / `EnqueueCommand` call is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetType {
    Resource,
    Service,
}

// ── Users ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserDetails {
    pub name: String,
    pub email: String,
}
