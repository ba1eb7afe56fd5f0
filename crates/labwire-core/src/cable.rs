// ── Cable workflows ──
//
// Requested routes typed `cable` are placeholders for a physical patch
// that someone still has to make. Two workflows handle them: converting
// each cable into a connected bi-directional route once the patch exists,
// and mailing the lab staff a list of cables to patch.

use std::fmt::Write as _;

use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use crate::backend::AutomationBackend;
use crate::error::CoreError;
use crate::model::{EndpointBatch, MappingType, ReservationSnapshot, RouteDescriptor};
use crate::notify::{Email, Notifier};
use crate::report::OutputChannel;

const SEPARATOR: &str = "----------";

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Requested routes of mapping type `cable`, in request order.
pub fn cable_routes(snapshot: &ReservationSnapshot) -> Vec<&RouteDescriptor> {
    snapshot
        .requested_routes
        .iter()
        .filter(|r| r.mapping_type == MappingType::Cable)
        .collect()
}

// ── Conversion ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CableFailure {
    pub route: RouteDescriptor,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CableOutcome {
    /// The reservation has no cable requests.
    NothingToConvert,
    Processed {
        converted: Vec<RouteDescriptor>,
        failed: Vec<CableFailure>,
    },
}

/// Remove the cable request, record the physical connection, then add and
/// connect the same pair as a bi-directional route.
///
/// Stops at the first failing step. Earlier steps are not undone.
async fn convert_one(
    backend: &dyn AutomationBackend,
    reservation_id: &str,
    route: &RouteDescriptor,
) -> Result<(), CoreError> {
    let mut pair = EndpointBatch::new();
    pair.push_route(route);

    backend
        .remove_routes(reservation_id, &pair, MappingType::Bi)
        .await?;
    backend
        .update_physical_connection(&route.source, &route.target, true)
        .await?;
    backend
        .add_route(reservation_id, &route.source, &route.target, MappingType::Bi)
        .await?;
    backend
        .connect_routes(reservation_id, &pair, MappingType::Bi)
        .await
}

/// Convert every cable request of `snapshot` into a connected route.
///
/// Each cable is handled independently: a failure is recorded and the next
/// cable is tried.
pub async fn convert_cables(
    backend: &dyn AutomationBackend,
    output: &OutputChannel<'_>,
    reservation_id: &str,
    snapshot: &ReservationSnapshot,
) -> CableOutcome {
    let cables = cable_routes(snapshot);
    if cables.is_empty() {
        return CableOutcome::NothingToConvert;
    }

    let mut converted = Vec::new();
    let mut failed = Vec::new();
    for route in cables {
        match convert_one(backend, reservation_id, route).await {
            Ok(()) => {
                info!(route = %route, "cable converted to route");
                output.write(SEPARATOR).await;
                output.write(&timestamp()).await;
                output.write("Converted Cable to Route").await;
                output.write(&format!("  {route}")).await;
                output.write(SEPARATOR).await;
                converted.push(route.clone());
            }
            Err(e) => {
                warn!(route = %route, error = %e, "cable conversion failed");
                output
                    .write(&format!("Failed to convert Cable to Route: {route}"))
                    .await;
                output.report(&e).await;
                failed.push(CableFailure {
                    route: route.clone(),
                    message: e.operator_message(),
                });
            }
        }
    }
    CableOutcome::Processed { converted, failed }
}

// ── Request notification ────────────────────────────────────────────

/// Who asked for the cables and where the reservation can be viewed.
#[derive(Debug, Clone)]
pub struct CableRequester<'a> {
    pub owner: &'a str,
    pub email: &'a str,
    pub reservation_id: &'a str,
    pub link: &'a str,
}

/// Plain-text request mail listing `cables` in order, numbered from 1.
pub fn request_email(
    requester: &CableRequester<'_>,
    cables: &[&RouteDescriptor],
    timestamp: &str,
) -> Email {
    let mut body = String::new();
    body.push_str("Lab Request for Cabling\n");
    let _ = writeln!(body, "{timestamp}");
    let _ = writeln!(body, "From User: {} ( {} )", requester.owner, requester.email);
    let _ = writeln!(
        body,
        "Sandbox Id: <a href=\"{}\">{}</a>",
        requester.link, requester.reservation_id
    );
    let _ = writeln!(body, "Link: {}", requester.link);
    body.push('\n');
    body.push_str("Requests:\n");
    for (n, cable) in cables.iter().enumerate() {
        let _ = writeln!(body, "  Cable # {}", n + 1);
        let _ = writeln!(body, "   > From: {}", cable.source);
        let _ = writeln!(body, "   >   To: {}", cable.target);
        body.push('\n');
    }
    body.push_str("-- End of Requests");

    Email {
        subject: format!("Lab Cable Request from {}", requester.owner),
        body,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CableRequestOutcome {
    NothingRequested,
    Requested { cables: usize, delivered: bool },
}

/// Mail the reservation's cable requests and echo them to the output
/// window. A failed send is logged; the output lines are written anyway.
pub async fn request_cables(
    backend: &dyn AutomationBackend,
    output: &OutputChannel<'_>,
    notifier: &dyn Notifier,
    reservation_id: &str,
    snapshot: &ReservationSnapshot,
    portal_link: &str,
) -> CableRequestOutcome {
    let cables = cable_routes(snapshot);
    if cables.is_empty() {
        return CableRequestOutcome::NothingRequested;
    }

    let email = match backend.user_details(&snapshot.owner).await {
        Ok(user) => user.email,
        Err(e) => {
            warn!(owner = %snapshot.owner, error = %e, "owner lookup failed");
            String::new()
        }
    };
    let requester = CableRequester {
        owner: &snapshot.owner,
        email: &email,
        reservation_id,
        link: portal_link,
    };
    let mail = request_email(&requester, &cables, &timestamp());

    let delivered = match notifier.send(&mail).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, body = %mail.body, "unable to send cable request mail");
            false
        }
    };

    output
        .write(&format!("\nRequest for {} Cable(s) made", cables.len()))
        .await;
    for cable in &cables {
        output.write(&format!(" {cable}")).await;
    }

    CableRequestOutcome::Requested {
        cables: cables.len(),
        delivered,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::UserContact;
    use crate::testing::{Call, FakeBackend, RecordingNotifier};

    const RES: &str = "res-1";
    const LINK: &str = "http://lab/x";

    fn requested() -> Vec<RouteDescriptor> {
        vec![
            RouteDescriptor::new("sw1/1", "sw2/1", MappingType::Cable),
            RouteDescriptor::new("sw1/2", "sw2/2", MappingType::Bi),
            RouteDescriptor::new("sw3/1", "sw4/1", MappingType::Cable),
        ]
    }

    #[tokio::test]
    async fn conversion_runs_four_steps_per_cable() {
        let backend = FakeBackend::new(RES).with_requested(requested());
        let output = OutputChannel::new(&backend, RES);

        let outcome = convert_cables(&backend, &output, RES, &backend.snapshot).await;

        let CableOutcome::Processed { converted, failed } = outcome else {
            panic!("expected cables to be processed");
        };
        assert_eq!(converted.len(), 2);
        assert!(failed.is_empty());

        let steps: Vec<Call> = backend
            .calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Message(_)))
            .take(4)
            .collect();
        assert_eq!(
            steps,
            [
                Call::Remove(vec!["sw1/1".into(), "sw2/1".into()], MappingType::Bi),
                Call::UpdatePhysical("sw1/1".into(), "sw2/1".into(), true),
                Call::Add("sw1/1".into(), "sw2/1".into(), MappingType::Bi),
                Call::Connect(vec!["sw1/1".into(), "sw2/1".into()], MappingType::Bi),
            ]
        );

        let messages = backend.messages();
        assert_eq!(messages.len(), 10);
        assert_eq!(messages[0], SEPARATOR);
        assert_eq!(messages[2], "Converted Cable to Route");
        assert_eq!(messages[3], "  sw1/1 <---> sw2/1");
    }

    #[tokio::test]
    async fn failed_cable_does_not_block_the_next() {
        let backend = FakeBackend::new(RES)
            .with_requested(requested())
            .failing("physical:sw1/1");
        let output = OutputChannel::new(&backend, RES);

        let outcome = convert_cables(&backend, &output, RES, &backend.snapshot).await;

        let CableOutcome::Processed { converted, failed } = outcome else {
            panic!("expected cables to be processed");
        };
        assert_eq!(converted[0].source.as_str(), "sw3/1");
        assert_eq!(failed[0].route.source.as_str(), "sw1/1");
        assert!(!backend
            .calls()
            .contains(&Call::Add("sw1/1".into(), "sw2/1".into(), MappingType::Bi)));

        let messages = backend.messages();
        assert_eq!(messages[0], "Failed to convert Cable to Route: sw1/1 <---> sw2/1");
        assert_eq!(messages[1], "physical failed for sw1/1");
        assert_eq!(messages[4], "Converted Cable to Route");
    }

    #[tokio::test]
    async fn no_cables_means_nothing_to_convert() {
        let backend = FakeBackend::new(RES);
        let output = OutputChannel::new(&backend, RES);

        let outcome = convert_cables(&backend, &output, RES, &backend.snapshot).await;

        assert_eq!(outcome, CableOutcome::NothingToConvert);
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn request_email_layout() {
        let routes = requested();
        let cables: Vec<&RouteDescriptor> = routes
            .iter()
            .filter(|r| r.mapping_type == MappingType::Cable)
            .collect();
        let requester = CableRequester {
            owner: "alice",
            email: "alice@example.com",
            reservation_id: RES,
            link: "http://lab/RM/Diagram/Index/res-1",
        };

        let mail = request_email(&requester, &cables, "2026-10-19 09:30:00");

        assert_eq!(mail.subject, "Lab Cable Request from alice");
        let expected = "Lab Request for Cabling\n\
            2026-10-19 09:30:00\n\
            From User: alice ( alice@example.com )\n\
            Sandbox Id: <a href=\"http://lab/RM/Diagram/Index/res-1\">res-1</a>\n\
            Link: http://lab/RM/Diagram/Index/res-1\n\
            \n\
            Requests:\n\
            \x20 Cable # 1\n   > From: sw1/1\n   >   To: sw2/1\n\n\
            \x20 Cable # 2\n   > From: sw3/1\n   >   To: sw4/1\n\n\
            -- End of Requests";
        assert_eq!(mail.body, expected);
    }

    #[tokio::test]
    async fn request_writes_output_even_when_send_fails() {
        let mut backend = FakeBackend::new(RES).with_requested(requested());
        backend.user = UserContact {
            name: "alice".into(),
            email: "alice@example.com".into(),
        };
        let output = OutputChannel::new(&backend, RES);
        let notifier = RecordingNotifier::failing();

        let outcome =
            request_cables(&backend, &output, &notifier, RES, &backend.snapshot, LINK).await;

        assert_eq!(
            outcome,
            CableRequestOutcome::Requested {
                cables: 2,
                delivered: false
            }
        );
        assert_eq!(
            backend.messages(),
            [
                "\nRequest for 2 Cable(s) made",
                " sw1/1 <---> sw2/1",
                " sw3/1 <---> sw4/1"
            ]
        );
    }

    #[tokio::test]
    async fn request_sends_one_mail() {
        let backend = FakeBackend::new(RES).with_requested(requested());
        let output = OutputChannel::new(&backend, RES);
        let notifier = RecordingNotifier::default();

        request_cables(&backend, &output, &notifier, RES, &backend.snapshot, LINK).await;

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("From User: alice"));
    }
}
