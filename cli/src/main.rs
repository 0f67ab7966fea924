//! # Sysrun Main Entry Point
//!
//! File: cli/src/main.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Command-line driver for the `sysrun` library. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Loading configuration and building the `Runner`
//! - Routing execution to the matching command handler
//!
//! ## Examples
//!
//! ```bash
//! sysrun shell 'ls | wc -l'
//! sysrun exec -- /bin/echo hello
//! sysrun -v redirect --output /tmp/out.txt -- /bin/echo hi
//! ```
//!
//! The process exits with 0 when the command succeeded and 1 otherwise.
//!
use clap::{Parser, Subcommand};
use std::sync::Arc;
use sysrun::common::process::{Runner, TracingReporter};
use sysrun::core::config;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "sysrun",
    about = "Run external commands via fork, exec and wait",
    long_about = "Run a shell command string, an argument vector, or an argument vector\n\
                  with stdout redirected to a file. Exits 0 only when the command\n\
                  exited normally with status 0.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a command string through the configured interpreter
    Shell(commands::shell::ShellArgs),
    /// Run a program directly with the given arguments
    Exec(commands::exec::ExecArgs),
    /// Run a program with its stdout redirected to a file
    Redirect(commands::redirect::RedirectArgs),
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = config::load_config().and_then(|cfg| {
        let runner = Runner::new(cfg.runner, Arc::new(TracingReporter));
        match cli.command {
            Commands::Shell(args) => commands::shell::handle_shell(args, &runner),
            Commands::Exec(args) => commands::exec::handle_exec(args, &runner),
            Commands::Redirect(args) => commands::redirect::handle_redirect(args, &runner),
        }
    });

    if let Err(e) = command_result {
        tracing::debug!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
