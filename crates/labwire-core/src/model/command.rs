// ── Command intent model ──

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::device::MatchRule;

/// How a regular command is submitted.
///
/// `Execute` blocks until the backend reports completion; `Enqueue`
/// returns as soon as the backend has accepted the request. Connected
/// commands ignore this and always execute.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RunMode {
    #[default]
    Enqueue,
    Execute,
}

/// A named command input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInput {
    pub name: String,
    pub value: String,
}

/// A command to send, independent of where it is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command_name: String,
    pub run_mode: RunMode,
    pub parameters: IndexMap<String, String>,
}

impl CommandRequest {
    pub fn new(command_name: impl Into<String>) -> Self {
        Self {
            command_name: command_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn run_mode(mut self, run_mode: RunMode) -> Self {
        self.run_mode = run_mode;
        self
    }

    #[must_use]
    pub fn input(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Blank command names turn every dispatch into a no-op.
    pub fn is_blank(&self) -> bool {
        self.command_name.trim().is_empty()
    }

    /// Parameters as name/value pairs for the wire.
    pub fn inputs(&self) -> Vec<CommandInput> {
        self.parameters
            .iter()
            .map(|(name, value)| CommandInput {
                name: name.clone(),
                value: value.clone(),
            })
            .collect()
    }
}

/// Where a [`CommandRequest`] goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandTarget {
    /// Every device in the reservation.
    AllDevices,
    /// Devices selected by a rule.
    Devices(MatchRule),
    /// A service in the reservation, by name.
    Service(String),
}

/// Per-device command names, split by where they are defined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandCatalog {
    /// Commands on the device's own driver.
    pub regular_commands: Vec<String>,
    /// Commands inherited through a connection (e.g. PDU power).
    pub connected_commands: Vec<String>,
}

/// Which catalog list a command was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CommandClass {
    Regular,
    Connected,
    Absent,
}
