// ── Reservation snapshot ──

use serde::Serialize;

use super::route::RouteTopology;

/// The parts of a reservation the orchestration operations read.
///
/// Fetched fresh per operation, never cached.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReservationSnapshot {
    pub id: String,
    pub owner: String,
    /// `false` once the reservation has an actual end time.
    pub active: bool,
    /// Reserved device ids, in reservation order.
    pub devices: Vec<String>,
    /// Reserved service names.
    pub services: Vec<String>,
    /// Routes of the topologies the reservation was built from.
    pub topology_routes: RouteTopology,
    /// Routes requested on the reservation (cables included).
    pub requested_routes: RouteTopology,
}

/// Name and mail address of a backend user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserContact {
    pub name: String,
    pub email: String,
}
