// Reservation-scoped operations
//
// Reservation snapshots, route connect/disconnect, route add/remove,
// physical connection updates, and the reservation output channel.

use serde_json::json;
use tracing::debug;

use crate::client::AutomationClient;
use crate::error::Error;
use crate::types::{ReservationDescription, ReservationDetails};

impl AutomationClient {
    /// Fetch the full reservation snapshot.
    ///
    /// `POST /api/GetReservationDetails`
    pub async fn get_reservation_details(
        &self,
        reservation_id: &str,
    ) -> Result<ReservationDescription, Error> {
        debug!(reservation_id, "fetching reservation details");
        let details: ReservationDetails = self
            .call(
                "GetReservationDetails",
                &json!({ "reservationId": reservation_id }),
            )
            .await?;
        Ok(details.reservation_description)
    }

    /// Connect routes given as a flat `[source, target, ...]` endpoint list.
    ///
    /// `POST /api/ConnectRoutesInReservation`
    pub async fn connect_routes_in_reservation(
        &self,
        reservation_id: &str,
        endpoints: &[String],
        mapping_type: &str,
    ) -> Result<(), Error> {
        debug!(reservation_id, pairs = endpoints.len() / 2, mapping_type, "connecting routes");
        self.call_void(
            "ConnectRoutesInReservation",
            &json!({
                "reservationId": reservation_id,
                "endpoints": endpoints,
                "mappingType": mapping_type,
            }),
        )
        .await
    }

    /// Disconnect routes. Without a mapping type the server disconnects
    /// whatever route joins each endpoint pair.
    ///
    /// `POST /api/DisconnectRoutesInReservation`
    pub async fn disconnect_routes_in_reservation(
        &self,
        reservation_id: &str,
        endpoints: &[String],
        mapping_type: Option<&str>,
    ) -> Result<(), Error> {
        debug!(reservation_id, pairs = endpoints.len() / 2, ?mapping_type, "disconnecting routes");
        let mut body = json!({
            "reservationId": reservation_id,
            "endpoints": endpoints,
        });
        if let Some(mapping_type) = mapping_type {
            body["mappingType"] = json!(mapping_type);
        }
        self.call_void("DisconnectRoutesInReservation", &body).await
    }

    /// Remove routes from the reservation (the route request, not just
    /// its connection).
    ///
    /// `POST /api/RemoveRoutesFromReservation`
    pub async fn remove_routes_from_reservation(
        &self,
        reservation_id: &str,
        endpoints: &[String],
        mapping_type: &str,
    ) -> Result<(), Error> {
        debug!(reservation_id, mapping_type, "removing routes");
        self.call_void(
            "RemoveRoutesFromReservation",
            &json!({
                "reservationId": reservation_id,
                "endpoints": endpoints,
                "mappingType": mapping_type,
            }),
        )
        .await
    }

    /// Add routes to the reservation.
    ///
    /// `POST /api/AddRoutesToReservation`
    pub async fn add_routes_to_reservation(
        &self,
        reservation_id: &str,
        sources: &[String],
        targets: &[String],
        mapping_type: &str,
    ) -> Result<(), Error> {
        debug!(reservation_id, mapping_type, "adding routes");
        self.call_void(
            "AddRoutesToReservation",
            &json!({
                "reservationId": reservation_id,
                "sourceResourcesFullPath": sources,
                "targetResourcesFullPath": targets,
                "mappingType": mapping_type,
            }),
        )
        .await
    }

    /// Record a physical connection between two ports.
    ///
    /// `POST /api/UpdatePhysicalConnection`
    pub async fn update_physical_connection(
        &self,
        resource_a: &str,
        resource_b: &str,
        override_existing: bool,
    ) -> Result<(), Error> {
        debug!(resource_a, resource_b, override_existing, "updating physical connection");
        self.call_void(
            "UpdatePhysicalConnection",
            &json!({
                "resourceAFullPath": resource_a,
                "resourceBFullPath": resource_b,
                "overrideExistingConnections": override_existing,
            }),
        )
        .await
    }

    /// Append a line to the reservation's output window.
    ///
    /// `POST /api/WriteMessageToReservationOutput`
    pub async fn write_message_to_reservation_output(
        &self,
        reservation_id: &str,
        message: &str,
    ) -> Result<(), Error> {
        self.call_void(
            "WriteMessageToReservationOutput",
            &json!({
                "reservationId": reservation_id,
                "message": message,
            }),
        )
        .await
    }
}
