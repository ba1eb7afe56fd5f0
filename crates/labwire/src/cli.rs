//! Clap derive structures for the `labwire` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap + clap_complete so `build.rs` can include it.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// labwire -- route and command orchestration for lab reservations
#[derive(Debug, Parser)]
#[command(
    name = "labwire",
    version,
    about = "Connect routes and run device commands in lab reservations",
    long_about = "Drives a lab reservation server from the command line.\n\n\
        Connects and disconnects reservation routes in per-type batches,\n\
        dispatches commands to devices selected by name, family or model,\n\
        and turns cable requests into connected routes.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "LABWIRE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Automation server URL (overrides profile)
    #[arg(long, short = 's', env = "LABWIRE_SERVER", global = true)]
    pub server: Option<String>,

    /// Lab domain (overrides profile)
    #[arg(long, env = "LABWIRE_DOMAIN", global = true)]
    pub domain: Option<String>,

    /// Logon user name (overrides profile)
    #[arg(long, short = 'u', env = "LABWIRE_USERNAME", global = true)]
    pub username: Option<String>,

    /// Reservation (sandbox) id to operate on
    #[arg(long, short = 'r', env = "LABWIRE_RESERVATION_ID", global = true)]
    pub reservation: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "LABWIRE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "LABWIRE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "LABWIRE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, connect and disconnect reservation routes
    #[command(alias = "rt")]
    Routes(RoutesArgs),

    /// Run commands on reserved devices or services
    #[command(alias = "cmd")]
    Command(CommandArgs),

    /// Convert or request physical cables
    Cables(CablesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared selectors ─────────────────────────────────────────────────

/// Device selection. The first one given decides: exact name, then
/// family + model, then model, then family.
#[derive(Debug, Clone, Default, Args)]
pub struct DeviceSelectArgs {
    /// Exact device name (case-insensitive)
    #[arg(long, short = 'd')]
    pub device: Option<String>,

    /// Device family name
    #[arg(long, short = 'f')]
    pub family: Option<String>,

    /// Device model name
    #[arg(long, short = 'm')]
    pub model: Option<String>,
}

impl DeviceSelectArgs {
    pub fn is_empty(&self) -> bool {
        self.device.is_none() && self.family.is_none() && self.model.is_none()
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RouteTypeArg {
    /// Bi-directional routes
    Bi,
    /// Uni-directional routes
    Uni,
    /// Both bi- and uni-directional routes
    All,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum EvaluateByArg {
    /// Match on the route's source device
    Source,
    /// Match on the route's target device
    Target,
    /// Match on either end
    #[default]
    Either,
}

/// Parse a `NAME=VALUE` command input.
pub fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty input name in '{raw}'"));
    }
    Ok((name.to_owned(), value.to_owned()))
}

// ── Routes ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RoutesArgs {
    #[command(subcommand)]
    pub command: RoutesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RoutesCommand {
    /// List the reservation's topology routes
    #[command(alias = "ls")]
    List {
        /// Show requested routes (including cables) instead
        #[arg(long)]
        requested: bool,
    },

    /// Connect routes (all BI and UNI routes by default)
    Connect(RouteSelectArgs),

    /// Disconnect routes (every route by default)
    Disconnect(RouteSelectArgs),
}

#[derive(Debug, Args)]
pub struct RouteSelectArgs {
    /// Only routes of this type
    #[arg(long = "type", short = 't', value_enum)]
    pub route_type: Option<RouteTypeArg>,

    #[command(flatten)]
    pub devices: DeviceSelectArgs,

    /// Which route end must belong to a selected device
    #[arg(long, value_enum, default_value = "either")]
    pub evaluate_by: EvaluateByArg,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CommandArgs {
    #[command(subcommand)]
    pub command: CommandCommand,
}

#[derive(Debug, Subcommand)]
pub enum CommandCommand {
    /// Run a command on every reserved device, or on selected ones
    Run {
        /// Command name (exact)
        name: String,

        #[command(flatten)]
        devices: DeviceSelectArgs,

        /// Wait for completion instead of queueing
        #[arg(long, short = 'e')]
        execute: bool,

        /// Command input as NAME=VALUE (repeatable)
        #[arg(long = "input", short = 'i', value_parser = parse_key_val)]
        inputs: Vec<(String, String)>,
    },

    /// Run a command on a reserved service
    Service {
        /// Service name
        service: String,

        /// Command name (exact)
        name: String,

        /// Wait for completion instead of queueing
        #[arg(long, short = 'e')]
        execute: bool,

        /// Command input as NAME=VALUE (repeatable)
        #[arg(long = "input", short = 'i', value_parser = parse_key_val)]
        inputs: Vec<(String, String)>,
    },
}

// ── Cables ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CablesArgs {
    #[command(subcommand)]
    pub command: CablesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CablesCommand {
    /// Convert requested cables into connected routes
    ///
    /// With no ids, uses --reservation; without that either, prompts for
    /// ids until 'exit' or '0' is entered.
    Convert {
        /// Reservation ids to convert
        ids: Vec<String>,
    },

    /// Mail the reservation's cable requests to lab staff
    Request,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display current configuration (passwords redacted)
    Show,

    /// List configured profiles
    Profiles,

    /// Store a profile's password in the system keyring
    SetPassword {
        /// Profile name (defaults to the active profile)
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
