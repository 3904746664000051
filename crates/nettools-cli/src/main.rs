use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use colored::Colorize;
use nettools_cidr::Radix;
use nettools_core::config::{Settings, LOG_ENV};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod netmask;

use netmask::{Mode, NetmaskOptions};

/// Network command-line utilities
#[derive(Parser)]
#[command(name = "nettools")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Netmask calculations: notations, block ranges and range splitting
    Netmask(NetmaskArgs),
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("mode")
        .args(["binary", "octal", "decimal", "hex", "cisco", "range", "cidr"])
        .multiple(false)
))]
struct NetmaskArgs {
    /// Print address / mask in binary
    #[arg(short, long)]
    binary: bool,

    /// Print address / mask in octal
    #[arg(short, long)]
    octal: bool,

    /// Print address / mask in decimal
    #[arg(short, long)]
    decimal: bool,

    /// Print address / mask in hex
    #[arg(short = 'x', long)]
    hex: bool,

    /// Print address / wildcard mask (Cisco style)
    #[arg(short = 'i', long)]
    cisco: bool,

    /// Print first -> last (count) of each block
    #[arg(short, long)]
    range: bool,

    /// Print each block as bare CIDR (default)
    #[arg(short, long)]
    cidr: bool,

    /// Addresses, CIDR blocks or first-last ranges
    #[arg(value_name = "TARGET", required = true)]
    targets: Vec<String>,
}

impl NetmaskArgs {
    fn mode(&self) -> Option<Mode> {
        let flags = [
            (self.binary, Mode::Format(Radix::Binary)),
            (self.octal, Mode::Format(Radix::Octal)),
            (self.decimal, Mode::Format(Radix::Decimal)),
            (self.hex, Mode::Format(Radix::Hex)),
            (self.cisco, Mode::Format(Radix::Cisco)),
            (self.range, Mode::Range),
            (self.cidr, Mode::Cidr),
        ];
        flags.into_iter().find(|(set, _)| *set).map(|(_, mode)| mode)
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    init_logging(&settings, cli.verbose)?;

    match cli.command {
        Commands::Netmask(args) => handle_netmask(args, &settings, cli.verbose),
    }
}

fn init_logging(settings: &Settings, verbose: bool) -> Result<()> {
    let filter = match settings.log_filter.as_deref() {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("Invalid {} directive: {}", LOG_ENV, directive))?,
        None if verbose => EnvFilter::new("debug"),
        None => EnvFilter::new("warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn handle_netmask(args: NetmaskArgs, settings: &Settings, verbose: bool) -> Result<ExitCode> {
    let options = NetmaskOptions::resolve(args.mode(), settings.default_mode.as_deref())?;

    if verbose {
        eprintln!("{} Netmask mode: {}", "›".blue(), options.mode);
    }

    let summary = netmask::execute(
        &options,
        &args.targets,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    )?;

    if verbose {
        eprintln!(
            "{} Processed {} targets, {} failed",
            "›".blue(),
            summary.processed,
            summary.failed
        );
    }

    if summary.failed == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
