//! Command dispatch: bridges CLI args -> reservation operations -> output.

pub mod cables;
pub mod command;
pub mod config_cmd;
pub mod routes;
pub mod util;

use labwire_core::BackendConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
///
/// `reservation_id` is the validated `--reservation` value, if any.
pub async fn dispatch(
    cmd: Command,
    backend: &BackendConfig,
    reservation_id: Option<String>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Routes(args) => {
            let id = reservation_id.ok_or(CliError::ReservationRequired)?;
            let reservation = util::connect(backend, &id, global).await?;
            routes::handle(&reservation, args, global).await
        }
        Command::Command(args) => {
            let id = reservation_id.ok_or(CliError::ReservationRequired)?;
            let reservation = util::connect(backend, &id, global).await?;
            command::handle(&reservation, args, global).await
        }
        Command::Cables(args) => cables::handle(backend, reservation_id, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
