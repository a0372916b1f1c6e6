//! Command-line interface definition

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// reqlab - a local API workbench for the command line
#[derive(Parser, Debug)]
#[command(name = "reqlab", version, about, long_about = None)]
pub struct Cli {
    /// Data directory (defaults to ~/.reqlab)
    #[arg(long, env = "REQLAB_DATA_DIR", global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a saved request
    Send {
        /// Request id
        id: String,
    },
    /// Run every request in a project sequentially
    Run {
        /// Project id
        project_id: String,
    },
    /// Inspect or prune execution history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
    /// Manage environments
    Env {
        #[command(subcommand)]
        command: EnvCommand,
    },
    /// Manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    /// Manage saved requests
    Request {
        #[command(subcommand)]
        command: RequestCommand,
    },
    /// Import requests from an OpenAPI document
    ImportOpenapi {
        /// Path to the OpenAPI file (.json, .yaml, or .yml)
        file: PathBuf,
        /// Project to import into
        #[arg(long)]
        project: String,
        /// Force the input format instead of guessing from the extension
        #[arg(long, value_enum)]
        format: Option<SpecFormatArg>,
    },
    /// Manage saved tokens
    Token {
        #[command(subcommand)]
        command: TokenCommand,
    },
    /// Export or restore the whole workspace
    Backup {
        #[command(subcommand)]
        command: BackupCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// Show recent history entries
    List {
        /// Maximum entries to show (0 for all)
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Search history by URL, name, or method
    Search { query: String },
    /// Delete one entry
    Delete { id: String },
    /// Delete every entry
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum EnvCommand {
    /// List environments
    List,
    /// Create an environment
    Create { name: String },
    /// Select the active environment
    Use { id: String },
    /// Set a variable in an environment
    Set {
        id: String,
        key: String,
        value: String,
    },
    /// Delete an environment
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// List projects
    List,
    /// Create a project
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        base_url: String,
    },
    /// Delete a project
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum RequestCommand {
    /// List saved requests
    List {
        /// Only requests in this project
        #[arg(long)]
        project: Option<String>,
    },
    /// Delete a request
    Delete { id: String },
    /// Export a project's requests as JSON to stdout
    Export { project_id: String },
    /// Import a JSON request export into a project
    Import { project_id: String, file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum TokenCommand {
    /// List saved tokens
    List,
    /// Save a token value
    Save {
        name: String,
        value: String,
        /// Header the token is meant for
        #[arg(long, default_value = "Authorization")]
        header: String,
    },
    /// Delete a token
    Delete { id: String },
    /// Fetch a token from an OAuth 2.0 token endpoint and save it
    Fetch {
        /// Name for the saved token
        name: String,
        #[arg(long, value_enum)]
        grant: GrantKind,
        #[arg(long)]
        token_url: String,
        #[arg(long, default_value = "")]
        client_id: String,
        #[arg(long, default_value = "")]
        client_secret: String,
        #[arg(long, default_value = "")]
        scope: String,
        #[arg(long, default_value = "")]
        username: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, default_value = "")]
        refresh_token: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum BackupCommand {
    /// Write a full workspace backup
    Export {
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Merge a backup file into the workspace
    Import { file: PathBuf },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SpecFormatArg {
    Json,
    Yaml,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum GrantKind {
    ClientCredentials,
    Password,
    Refresh,
}
