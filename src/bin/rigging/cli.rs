//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Rigging - compose container projects from pluggable capabilities
#[derive(Parser)]
#[command(name = "rigging")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Clone, Debug, Default)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Implementations to activate, in order (comma-separated)
    #[arg(long, global = true, value_name = "LIST", env = "RIGGING_IMPLEMENTATIONS")]
    pub implementations: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available operations
    List(ListArgs),

    /// Run any operation by id
    Exec(ExecArgs),

    /// Initialize a project in a directory
    Init(InitArgs),

    /// Create and start the project's containers
    Up,

    /// Stop and remove the project's containers
    Down,

    /// Start existing containers
    Start,

    /// Stop running containers
    Stop,

    /// List the project's containers
    Ps(PsArgs),

    /// Show container output
    Logs(LogsArgs),

    /// Run a project command
    Command(CommandArgs),

    /// Read and write project settings
    Setting(SettingArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ExecArgs {
    /// Operation id
    pub id: String,

    /// Property assignment (key=value), repeatable
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

#[derive(Args)]
pub struct InitArgs {
    /// Project name (defaults to directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Write demo services and commands
    #[arg(long)]
    pub demo: bool,

    /// Directory to initialize (defaults to current directory)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct PsArgs {
    /// Services to show (defaults to all)
    pub services: Vec<String>,
}

#[derive(Args)]
pub struct LogsArgs {
    /// Keep streaming output
    #[arg(short, long)]
    pub follow: bool,

    /// Services to show (defaults to all)
    pub services: Vec<String>,
}

#[derive(Args)]
pub struct CommandArgs {
    /// List defined commands instead of running one
    #[arg(long, conflicts_with = "key")]
    pub list: bool,

    /// Command name
    #[arg(required_unless_present = "list")]
    pub key: Option<String>,

    /// Extra arguments passed to the command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct SettingArgs {
    #[command(subcommand)]
    pub command: SettingCommands,
}

#[derive(Subcommand)]
pub enum SettingCommands {
    /// Print a setting
    Get {
        /// Setting name
        key: String,
    },

    /// Change a setting
    Set {
        /// Setting name
        key: String,

        /// New value
        value: String,
    },

    /// List setting names
    List,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
