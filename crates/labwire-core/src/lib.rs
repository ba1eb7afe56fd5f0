//! Route batching and device command dispatch for lab reservations.
//!
//! This crate owns the business logic between `labwire-api` and the CLI:
//!
//! - **[`Reservation`]**: Facade binding a backend session to one
//!   reservation id. Every operation reads a fresh [`ReservationSnapshot`],
//!   computes its work items, and forwards them sequentially.
//!
//! - **Route batch builder** ([`routes`]): Pure partitioning of a route
//!   topology into per-mapping-type [`EndpointBatch`]es, optionally
//!   narrowed by type or by a matched device set.
//!
//! - **Device filter** ([`filter`]) and **command catalog** ([`catalog`]):
//!   Select devices by [`MatchRule`] and decide, per device, whether a
//!   command is regular, connected, or absent.
//!
//! - **Dispatcher** ([`dispatch`]): Sends a [`CommandRequest`] to each
//!   target, isolating failures per device.
//!
//! - **Cable workflows** ([`cable`]): Cable-to-route conversion and the
//!   cable request mail sent through a [`Notifier`].
//!
//! All remote calls go through the [`AutomationBackend`] trait, which
//! `labwire_api::AutomationClient` implements.

pub mod backend;
pub mod cable;
pub mod catalog;
pub mod config;
mod convert;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod model;
pub mod notify;
pub mod report;
pub mod reservation;
pub mod routes;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{AutomationBackend, TargetKind};
pub use cable::{CableFailure, CableOutcome, CableRequestOutcome};
pub use config::{BackendConfig, BackendCredentials, NotificationConfig, TlsVerification};
pub use dispatch::{DispatchResult, Outcome, TargetOutcome};
pub use error::CoreError;
pub use notify::{Email, Notifier, SmtpNotifier};
pub use report::OutputChannel;
pub use reservation::{BatchOutcome, Reservation, RouteReport};
pub use routes::{EvaluateBy, RouteBatches, RouteTypeFilter};

pub use model::{
    CommandCatalog, CommandClass, CommandInput, CommandRequest, CommandTarget, DeviceRecord,
    EndpointBatch, EndpointPath, MappingType, MatchRule, ReservationSnapshot, RouteDescriptor,
    RouteTopology, RunMode, UserContact,
};
