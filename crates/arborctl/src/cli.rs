//! Clap derive structures for the `arborctl` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

use aps_api::HostList;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// arborctl -- manage Arbor Networks APS allow/block lists
#[derive(Debug, Parser)]
#[command(
    name = "arborctl",
    version,
    about = "Manage Arbor Networks APS allow/block lists from the command line",
    long_about = "A CLI for the Arbor Networks APS on-the-fly host lists.\n\n\
        Authenticates against the appliance's session-cookie REST API and\n\
        adds, removes, and lists blocked or allowed IPs and CIDRs.",
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
    /// Appliance profile to use
    #[arg(long, short = 'p', env = "ARBOR_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Appliance base URL (overrides profile)
    #[arg(long, short = 's', env = "ARBOR_SERVER", global = true)]
    pub server: Option<String>,

    /// Username (overrides profile)
    #[arg(long, short = 'u', env = "ARBOR_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password (prefer ARBOR_PASSWORD or the system keyring)
    #[arg(long, env = "ARBOR_PASSWORD", global = true, hide_env = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ARBOR_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

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
    #[arg(long, short = 'k', env = "ARBOR_INSECURE", global = true)]
    pub insecure: bool,
}

// ── Output Enum ──────────────────────────────────────────────────────

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

// ── List name ────────────────────────────────────────────────────────

/// Public names of the two appliance host lists. The legacy spellings are
/// accepted as aliases.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListName {
    #[value(alias = "blacklist")]
    Blocklist,
    #[value(alias = "whitelist")]
    Allowlist,
}

impl From<ListName> for HostList {
    fn from(name: ListName) -> Self {
        match name {
            ListName::Blocklist => HostList::Block,
            ListName::Allowlist => HostList::Allow,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Verify connectivity and credentials with a login round-trip
    #[command(alias = "test-connectivity")]
    Test,

    /// List the addresses on a host list
    #[command(alias = "list-ips", alias = "ls")]
    List(ListArgs),

    /// Add an IP or CIDR to the blocklist
    Block(IpArgs),

    /// Remove an IP or CIDR from the blocklist
    Unblock(IpArgs),

    /// Add an IP or CIDR to the allowlist
    Allow(IpArgs),

    /// Remove an IP or CIDR from the allowlist
    Unallow(IpArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Which list to read
    #[arg(long, short = 'l', default_value = "blocklist")]
    pub list: ListName,
}

#[derive(Debug, Args)]
pub struct IpArgs {
    /// IPv4 address or CIDR (e.g. 10.0.0.0/24)
    pub ip: String,
}
