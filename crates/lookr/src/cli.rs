//! Clap derive structures for the `lookr` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use lookr_core::ResourceKind;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lookr -- declarative management of Looker themes and alerts
#[derive(Debug, Parser)]
#[command(
    name = "lookr",
    version,
    about = "Synchronize Looker themes and alerts from attribute files",
    long_about = "Reads desired state as JSON or YAML attribute maps, applies it \
        through the Looker API and prints the state the server reports back.",
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
    /// Config profile to use
    #[arg(long, short = 'p', env = "LOOKR_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Looker instance URL (overrides profile)
    #[arg(long, env = "LOOKR_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Pre-issued API access token
    #[arg(long, env = "LOOKR_ACCESS_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// API version path segment (e.g. 4.0)
    #[arg(long, global = true)]
    pub api_version: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "LOOKR_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "LOOKR_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "LOOKR_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
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
    /// List every entity of a resource type
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show the observed state of one entity
    #[command(alias = "get")]
    Read(TargetArgs),

    /// Create or update an entity from an attribute file
    Apply(ApplyArgs),

    /// Delete an entity and confirm it is gone
    #[command(alias = "rm")]
    Delete(TargetArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Resource type (theme, alert)
    #[arg(value_parser = parse_kind)]
    pub kind: ResourceKind,
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Resource type (theme, alert)
    #[arg(value_parser = parse_kind)]
    pub kind: ResourceKind,

    /// Entity id
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Resource type (theme, alert)
    #[arg(value_parser = parse_kind)]
    pub kind: ResourceKind,

    /// JSON or YAML attribute file ("-" reads stdin)
    #[arg(long, short = 'f')]
    pub file: PathBuf,

    /// Update this entity instead of creating a new one
    #[arg(long)]
    pub id: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration (secrets masked)
    Show,

    /// Print the config file location
    Path,

    /// Add or replace a profile
    Init(InitArgs),
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Profile name
    #[arg(default_value = "default")]
    pub name: String,

    /// Looker instance URL
    #[arg(long)]
    pub url: String,

    /// API3 client id (log in with client credentials)
    #[arg(long)]
    pub client_id: Option<String>,

    /// Environment variable holding the client secret
    #[arg(long, requires = "client_id")]
    pub client_secret_env: Option<String>,

    /// Environment variable holding an access token
    #[arg(long, conflicts_with = "client_id")]
    pub access_token_env: Option<String>,

    /// Make this the default profile
    #[arg(long)]
    pub set_default: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}

fn parse_kind(name: &str) -> Result<ResourceKind, String> {
    ResourceKind::parse(name).map_err(|e| e.to_string())
}
