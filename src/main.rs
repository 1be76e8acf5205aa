use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use machinery_helper::cli::{Cli, Commands};
use machinery_helper::{HelperContext, commands};
use std::ffi::OsString;
use std::io;
use std::process;
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    // `tar` takes its arguments verbatim, before any flag parsing
    let args: Vec<OsString> = std::env::args_os().collect();
    if args.get(1).is_some_and(|arg| arg == "tar") {
        return commands::tar::execute(&args[2..]);
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::Tar { args }) => commands::tar::execute(&args),
        Some(Commands::Completion { shell }) => {
            print_completions(shell, &mut Cli::command());
            Ok(0)
        }
        None => {
            let mut ctx = HelperContext::new(cli.config.as_deref())?;
            if let Some(root) = cli.root {
                ctx.config.scan.root = root;
            }
            commands::inspect::execute(&ctx)?;
            Ok(0)
        }
    }
}

/// Diagnostics go to stderr; stdout carries only the report
fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
