//! The `netmask` command
//!
//! Targets are processed in order. A target that fails is reported on the
//! error stream and the remaining targets are still processed. Lines for a
//! target are only written once its whole computation has succeeded.

use colored::Colorize;
use nettools_cidr::{format_input, CidrError, Radix, Target};
use std::fmt;
use std::io::{self, Write};
use tracing::{debug, error};

/// What to print for each covering block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `<address> / <mask>` in the given notation
    Format(Radix),
    /// `<first> -> <last> (<count>)`
    Range,
    /// Bare `network/prefix`
    Cidr,
}

impl Mode {
    /// Mode from its settings name (`cidr`, `range` or a [`Radix`] name)
    pub fn from_name(name: &str) -> Result<Self, CidrError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "cidr" => Ok(Mode::Cidr),
            "range" => Ok(Mode::Range),
            other => Ok(Mode::Format(other.parse()?)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Format(radix) => write!(f, "{}", radix),
            Mode::Range => write!(f, "range"),
            Mode::Cidr => write!(f, "cidr"),
        }
    }
}

/// Immutable options for one `netmask` invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetmaskOptions {
    pub mode: Mode,
}

impl NetmaskOptions {
    /// Flag wins over the configured default, which wins over [`Mode::Cidr`]
    pub fn resolve(flag: Option<Mode>, default_mode: Option<&str>) -> Result<Self, CidrError> {
        let mode = match (flag, default_mode) {
            (Some(mode), _) => mode,
            (None, Some(name)) => Mode::from_name(name)?,
            (None, None) => Mode::Cidr,
        };
        Ok(Self { mode })
    }
}

/// Outcome of an `execute` run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub processed: usize,
    pub failed: usize,
}

/// Output lines for a single target
pub fn render_target(options: &NetmaskOptions, target: &str) -> Result<Vec<String>, CidrError> {
    match options.mode {
        Mode::Format(radix) => format_input(target, radix),
        Mode::Range => {
            let blocks = Target::parse(target)?.blocks()?;
            Ok(blocks.iter().map(|b| b.range().to_string()).collect())
        }
        Mode::Cidr => {
            let blocks = Target::parse(target)?.blocks()?;
            Ok(blocks.iter().map(ToString::to_string).collect())
        }
    }
}

/// Process every target, writing results to `out` and failures to `err`
pub fn execute<O, E>(
    options: &NetmaskOptions,
    targets: &[String],
    out: &mut O,
    err: &mut E,
) -> io::Result<Summary>
where
    O: Write,
    E: Write,
{
    let mut summary = Summary::default();

    for target in targets {
        summary.processed += 1;

        match render_target(options, target) {
            Ok(lines) => {
                for line in lines {
                    writeln!(out, "{}", line)?;
                }
            }
            Err(e) => {
                summary.failed += 1;
                if e.is_internal() {
                    error!(input = %target, error = %e, "netmask computation failed");
                } else {
                    debug!(input = %target, error = %e, "rejected target");
                }
                writeln!(err, "{} {}: {}", "error:".red(), target, e)?;
            }
        }
    }

    out.flush()?;
    Ok(summary)
}
