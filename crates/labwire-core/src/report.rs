// ── Result/message reporter ──
//
// Status lines for the reservation's output window. Writes are best
// effort: a failed write is logged and dropped, never surfaced to the
// operation that produced the message.

use tracing::warn;

use crate::backend::AutomationBackend;
use crate::error::CoreError;
use crate::model::MappingType;

/// Handle to one reservation's output window.
#[derive(Clone, Copy)]
pub struct OutputChannel<'a> {
    backend: &'a dyn AutomationBackend,
    reservation_id: &'a str,
}

impl<'a> OutputChannel<'a> {
    pub fn new(backend: &'a dyn AutomationBackend, reservation_id: &'a str) -> Self {
        Self {
            backend,
            reservation_id,
        }
    }

    pub async fn write(&self, message: &str) {
        if let Err(e) = self.backend.write_message(self.reservation_id, message).await {
            warn!(
                reservation_id = self.reservation_id,
                error = %e,
                "failed to write to reservation output"
            );
        }
    }

    /// Write the operator-facing text of a failed call.
    pub async fn report(&self, error: &CoreError) {
        self.write(&error.operator_message()).await;
    }
}

// ── Message builders ────────────────────────────────────────────────

pub fn connect_all_queued(mapping_type: MappingType, pairs: usize) -> String {
    format!("Queueing {pairs} {} Routes for Connection", mapping_type.label())
}

pub fn disconnect_all_queued(pairs: usize) -> String {
    format!("Queueing {pairs} Routes for disconnection")
}

pub fn connect_queued(mapping_type: MappingType, pairs: usize) -> String {
    format!("Queuing Connection of {pairs} {} Routes", mapping_type.label())
}

pub fn disconnect_queued(mapping_type: MappingType, pairs: usize) -> String {
    format!("Queuing Disconnection of {pairs} {} Routes", mapping_type.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;

    #[test]
    fn message_wording() {
        assert_eq!(
            connect_all_queued(MappingType::Bi, 3),
            "Queueing 3 Bi-Dir Routes for Connection"
        );
        assert_eq!(disconnect_all_queued(1), "Queueing 1 Routes for disconnection");
        assert_eq!(
            disconnect_queued(MappingType::Uni, 2),
            "Queuing Disconnection of 2 Uni-Dir Routes"
        );
    }

    #[tokio::test]
    async fn failed_write_is_swallowed() {
        let backend = FakeBackend::new("res-1").failing("message");
        let output = OutputChannel::new(&backend, "res-1");

        output.write("hello").await;

        assert_eq!(backend.messages(), ["hello"]);
    }
}
