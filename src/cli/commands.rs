//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kdig",
    version,
    about = "Dig around a Kubernetes environment with pluggable diagnostic buckets",
    long_about = "kdig is an extensible CLI tool to dig around when you are in a Kubernetes \
cluster. It runs buckets: plugins that scan specific aspects of a container, a node or \
a cluster. Some buckets only read local files, others need a cluster client, which is \
created on demand from your kubeconfig or the in-cluster service account."
)]
pub struct Cli {
    /// Output format (defaults to the config file value, then human)
    #[arg(short = 'o', long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Maximum width of human output
    #[arg(short = 'w', long, global = true)]
    pub width: Option<usize>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run all buckets or specific ones
    #[command(alias = "d")]
    Dig(DigArgs),

    /// List available buckets or describe specific ones
    #[command(name = "ls", alias = "list")]
    List(ListArgs),

    /// Print the version information
    #[command(alias = "v")]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Clone, Debug)]
pub struct DigArgs {
    /// Buckets to run by name or alias, "all" or "a" runs every registered bucket
    #[arg(required = true)]
    pub buckets: Vec<String>,

    /// Enable the buckets that might have side effects on the environment
    #[arg(short = 's', long)]
    pub side_effects: bool,

    /// Kubernetes namespace to use (defaults to the namespace of the context)
    #[arg(short = 'n', long, env = "KDIG_NAMESPACE")]
    pub namespace: Option<String>,

    /// Kubernetes context to use
    #[arg(long, env = "KDIG_CONTEXT")]
    pub context: Option<String>,

    /// Path to the kubeconfig file
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Create admission test pods even without the rights to delete them afterwards
    #[arg(long)]
    pub admission_force: bool,

    /// Create admission test pods for real instead of a server-side dry run
    #[arg(long)]
    pub admission_create: bool,
}

#[derive(Args, Clone, Debug)]
pub struct ListArgs {
    /// Buckets to describe (omit to list every bucket)
    pub buckets: Vec<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
