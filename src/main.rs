use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use memdump::processes::{self, list_processes};
use memdump::{Error, Scanner, render, render_summary};

mod cli;

use cli::{Args, Commands, DumpArgs, LogLevel};

fn setup_logging(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn show() -> Result<()> {
    println!("Showing processes...");
    for process in list_processes().context("failed to list processes")? {
        println!("{}", process);
    }
    Ok(())
}

fn dump(args: &DumpArgs) -> Result<()> {
    let scanner = match (args.pid, &args.maps_file) {
        (Some(pid), _) => Scanner::new(pid),
        (None, Some(path)) => Scanner::from_file(path),
        (None, None) => anyhow::bail!("a PID or --maps-file is required"),
    };

    println!("Dumping memory segments...");
    let scan = scanner
        .scan()
        .with_context(|| format!("failed to scan {}", scanner.path().display()))?;

    print!("{}", render(&scan.categorized, args.selection()));
    if args.summary {
        print!("{}", render_summary(&scan.categorized));
    }
    if !scan.failures.is_empty() {
        info!("{} lines could not be parsed", scan.failures.len());
    }
    Ok(())
}

fn is_permission_denied(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| matches!(cause.downcast_ref::<Error>(), Some(Error::PermissionDenied { .. })))
}

fn main() {
    let args = Args::parse();
    setup_logging(args.log_level);

    let result = match &args.command {
        Commands::Show => show(),
        Commands::Dump(dump_args) => dump(dump_args),
    };

    if let Err(e) = result {
        if is_permission_denied(&e) && !processes::is_root() {
            eprintln!("Permission denied. Please run as sudo.");
        } else {
            eprintln!("Error: {:#}", e);
        }
        process::exit(1);
    }
}
