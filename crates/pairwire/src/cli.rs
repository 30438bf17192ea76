//! Clap derive structures for the `pairwire` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// pairwire -- provision a cabled switch pair with a transit subnet
#[derive(Debug, Parser)]
#[command(
    name = "pairwire",
    version,
    about = "Provision a cabled device pair with a point-to-point transit subnet",
    long_about = "Creates two devices in a Nautobot-style inventory, cables their first\n\
        interfaces together, and assigns the first free 2-address block of the\n\
        configured pool (10.0.0.0/8 by default) to the link.",
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
    /// Inventory profile to use
    #[arg(long, short = 'p', env = "PAIRWIRE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Inventory URL (overrides profile)
    #[arg(long, short = 'u', env = "PAIRWIRE_URL", global = true)]
    pub url: Option<String>,

    /// API token
    #[arg(long, env = "PAIRWIRE_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format [default: `defaults.output` from the config file, else csv]
    #[arg(long, short = 'o', env = "PAIRWIRE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "PAIRWIRE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "PAIRWIRE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `device,interface,ip_address` lines (default)
    Csv,
    /// Pretty table
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a device pair, cable it, and address the link
    #[command(alias = "p")]
    Provision(ProvisionArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ProvisionArgs {
    /// Location both devices are placed in
    #[arg(long, short = 'l')]
    pub location: String,

    /// Device type model for both devices
    #[arg(long, short = 't')]
    pub device_type: String,

    /// Role for both devices
    #[arg(long, short = 'r')]
    pub role: String,

    /// Log every provisioning step at debug level
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration (tokens masked)
    Show,

    /// Print the config file path
    Path,

    /// Store an API token in the system keyring for the active profile
    SetToken,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
