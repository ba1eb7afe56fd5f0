// labwire-api: Async Rust client for the lab reservation automation API

pub mod auth;
pub mod client;
pub mod error;
pub mod reservations;
pub mod resources;
pub mod transport;
pub mod types;

pub use auth::Credentials;
pub use client::AutomationClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    CommandInfo, InputNameValue, ReservationDescription, ResourceDetails, RouteInfo, TargetType,
    TopologyRoutes, UserDetails,
};
