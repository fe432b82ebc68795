//! Rigging CLI - compose container projects from pluggable capabilities

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.global.verbose {
        EnvFilter::new("rigging=debug")
    } else {
        EnvFilter::new("rigging=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    let global = cli.global;
    match cli.command {
        Commands::List(args) => commands::list::execute(&global, args),
        Commands::Exec(args) => commands::exec::execute(&global, args),
        Commands::Init(args) => commands::init::execute(&global, args),
        Commands::Up => commands::orchestrate::execute(&global, commands::orchestrate::Action::Up),
        Commands::Down => {
            commands::orchestrate::execute(&global, commands::orchestrate::Action::Down)
        }
        Commands::Start => {
            commands::orchestrate::execute(&global, commands::orchestrate::Action::Start)
        }
        Commands::Stop => {
            commands::orchestrate::execute(&global, commands::orchestrate::Action::Stop)
        }
        Commands::Ps(args) => commands::monitor::ps(&global, args),
        Commands::Logs(args) => commands::monitor::logs(&global, args),
        Commands::Command(args) => commands::command::execute(&global, args),
        Commands::Setting(args) => commands::setting::execute(&global, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
