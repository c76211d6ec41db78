use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use desk_types::{parse_timestamp, Timestamp};

#[derive(Parser)]
#[command(
    name = "desk",
    about = "Support desk rule engine: SLA policies and ticket merges",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Evaluate SLA policies against tickets
    Sla(SlaArgs),
    /// Inspect SLA policy files
    Policy(PolicyArgs),
    /// Plan and preview ticket merges
    Merge(MergeArgs),
    /// Run simulated background jobs
    Job(JobArgs),
    /// Start the desk HTTP API
    Serve(ServeArgs),
    /// Show the effective configuration
    Config,
}

#[derive(Args)]
pub struct SlaArgs {
    #[command(subcommand)]
    pub action: SlaAction,
}

#[derive(Subcommand)]
pub enum SlaAction {
    /// Find the policy that applies to a ticket and show its deadlines
    Resolve {
        /// JSON file with an array of policies
        #[arg(long)]
        policies: PathBuf,
        /// JSON file with a single ticket
        #[arg(long)]
        ticket: PathBuf,
        /// Evaluation instant (RFC 3339); defaults to the current time
        #[arg(long, value_parser = parse_now)]
        now: Option<Timestamp>,
    },
}

#[derive(Args)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub action: PolicyAction,
}

#[derive(Subcommand)]
pub enum PolicyAction {
    /// Check every policy in a file
    Validate { file: PathBuf },
    /// List policies in evaluation order
    List { file: PathBuf },
}

#[derive(Args)]
pub struct MergeArgs {
    #[command(subcommand)]
    pub action: MergeAction,
}

#[derive(Subcommand)]
pub enum MergeAction {
    /// Detect conflicts and build the merge payload
    Plan(PlanArgs),
}

#[derive(Args)]
pub struct PlanArgs {
    /// JSON file with the selected tickets
    #[arg(long)]
    pub tickets: PathBuf,
    /// Ticket that survives the merge
    #[arg(long)]
    pub target: String,
    #[arg(long)]
    pub no_messages: bool,
    #[arg(long)]
    pub no_tags: bool,
    #[arg(long)]
    pub no_fields: bool,
    /// Leave source tickets open
    #[arg(long)]
    pub keep_open: bool,
    /// Pick a conflicting field's value (repeatable)
    #[arg(long = "resolve", value_parser = parse_key_value)]
    pub resolutions: Vec<(String, String)>,
    /// Apply the merge in memory and print the resulting target ticket
    #[arg(long)]
    pub apply: bool,
}

#[derive(Args)]
pub struct JobArgs {
    #[command(subcommand)]
    pub action: JobAction,
}

#[derive(Subcommand)]
pub enum JobAction {
    /// Run a job and print its progress
    Simulate {
        #[arg(long, default_value = "simulation")]
        name: String,
        #[arg(long)]
        steps: Option<u32>,
        #[arg(long)]
        tick_ms: Option<u64>,
        /// Fail once progress reaches this percentage
        #[arg(long)]
        fail_at: Option<u8>,
    },
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides the config file)
    #[arg(long)]
    pub bind: Option<String>,
    /// JSON state document to seed the in-memory backend
    #[arg(long)]
    pub state: Option<PathBuf>,
}

fn parse_now(raw: &str) -> Result<Timestamp, String> {
    parse_timestamp(raw).map_err(|e| e.to_string())
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}
