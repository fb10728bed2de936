//! CLI interface for snapconsole

pub mod commands;
mod output;

pub use output::*;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "snapconsole")]
#[command(version)]
#[command(about = "Console for the Kubernetes volume snapshot manager", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    /// Backend base URL (overrides snapconsole.toml)
    #[arg(long, env = "SNAPCONSOLE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Directory for the persisted session (overrides snapconsole.toml)
    #[arg(long, env = "SNAPCONSOLE_STORAGE_DIR", global = true)]
    pub storage_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a snapconsole.toml configuration file
    Init,

    /// Log in and store the session
    Login {
        #[arg(short, long)]
        username: Option<String>,

        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Clear the stored session
    Logout,

    /// Create a new account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, default_value = "readonly")]
        role: String,

        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Show who the stored session belongs to
    Whoami,

    /// Change the current user's password
    Passwd,

    /// Open a screen by path, e.g. /snapshots
    Open {
        #[arg(default_value = "/")]
        path: String,
    },

    /// List screens and their access requirements
    Routes,

    /// Volume snapshots
    Snapshots {
        #[command(subcommand)]
        action: SnapshotAction,
    },

    /// List snapshot classes
    SnapshotClasses,

    /// List persistent volume claims
    Pvcs {
        #[arg(short, long, default_value = "default")]
        namespace: String,
    },

    /// List namespaces
    Namespaces,

    /// List storage classes
    StorageClasses,

    /// Scheduled snapshot tasks
    Scheduled {
        #[command(subcommand)]
        action: ScheduledAction,
    },

    /// Kubernetes clusters
    Clusters {
        #[command(subcommand)]
        action: ClusterAction,
    },

    /// User accounts (admin only)
    Users {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Ceph cluster information
    Ceph {
        #[command(subcommand)]
        action: CephAction,
    },
}

#[derive(Subcommand)]
pub enum SnapshotAction {
    /// List snapshots
    List {
        /// Namespace to list (all namespaces when omitted)
        #[arg(short, long, default_value = "")]
        namespace: String,
    },

    /// Create a snapshot from a JSON request file
    Create {
        #[arg(short = 'F', long)]
        file: PathBuf,
    },

    /// Delete a snapshot
    Delete {
        namespace: String,
        name: String,

        /// Remove finalizers and delete even if the snapshot is stuck
        #[arg(long)]
        force: bool,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the content bound to a snapshot
    Content { name: String },
}

#[derive(Subcommand)]
pub enum ScheduledAction {
    /// List scheduled tasks
    List,

    /// Create a task from a JSON file
    Create {
        #[arg(short = 'F', long)]
        file: PathBuf,
    },

    /// Replace a task from a JSON file
    Update {
        id: String,

        #[arg(short = 'F', long)]
        file: PathBuf,
    },

    /// Enable or disable a task
    Toggle { id: String },

    /// Delete a task
    Delete {
        id: String,

        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ClusterAction {
    /// List configured clusters
    List,

    /// Show the active cluster
    Current,

    /// Switch the active cluster
    Switch { name: String },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// List all users
    List,

    /// Delete a user
    Delete {
        username: String,

        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum CephAction {
    /// Full cluster information
    Info,

    /// Cluster health status
    Status,

    /// Pool usage
    Pools,

    /// Connection status
    Connection,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}
