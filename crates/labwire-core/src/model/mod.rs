// ── Domain model ──
//
// Plain, request-scoped value types. Nothing here talks to the backend;
// `crate::convert` builds these from wire types.

pub mod command;
pub mod device;
pub mod reservation;
pub mod route;

pub use command::{
    CommandCatalog, CommandClass, CommandInput, CommandRequest, CommandTarget, RunMode,
};
pub use device::{DeviceRecord, MatchRule};
pub use reservation::{ReservationSnapshot, UserContact};
pub use route::{EndpointBatch, EndpointPath, MappingType, RouteDescriptor, RouteTopology};
