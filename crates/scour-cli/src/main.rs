//! scour - Main Entry Point
//!
//! Reads markup from stdin and writes the sanitized result to stdout.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use scour_security::{Mode, Policy, Sanitizer, SanitizerConfig, ThreatDetector};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: scour [OPTIONS] < input.html

Options:
  --diagram          Treat input as a stand-alone SVG diagram
  --allow-svg        Keep inline SVG in HTML content
  --check            Only report whether the input looks malicious
  --json             Print a JSON report instead of bare markup
  --max-bytes <n>    Refuse inputs larger than n bytes
  -h, --help         Show this message";

/// Command line options
#[derive(Debug, Clone, PartialEq, Eq)]
struct Options {
    mode: Mode,
    check: bool,
    json: bool,
    config: SanitizerConfig,
    help: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: Mode::Html,
            check: false,
            json: false,
            config: SanitizerConfig::default(),
            help: false,
        }
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options> {
    let mut options = Options::default();
    let mut diagram = false;
    let mut allow_svg = false;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--diagram" => diagram = true,
            "--allow-svg" => allow_svg = true,
            "--check" => options.check = true,
            "--json" => options.json = true,
            "--max-bytes" => {
                let value = args.next().context("--max-bytes needs a value")?;
                options.config.max_input_bytes = value
                    .parse()
                    .with_context(|| format!("invalid --max-bytes value: {value}"))?;
            }
            "-h" | "--help" => options.help = true,
            other => bail!("unknown argument: {other}"),
        }
    }

    options.mode = match (diagram, allow_svg) {
        (true, true) => bail!("--diagram and --allow-svg are mutually exclusive"),
        (true, false) => Mode::Svg,
        (false, true) => Mode::Mixed,
        (false, false) => Mode::Html,
    };
    Ok(options)
}

fn main() -> Result<ExitCode> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let options = parse_args(std::env::args().skip(1))?;
    if options.help {
        println!("{USAGE}");
        return Ok(ExitCode::SUCCESS);
    }

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read input from stdin")?;

    let threat = ThreatDetector::new().detect(&input);
    if let Some(kind) = threat {
        tracing::warn!("Input matched threat rule: {}", kind);
    }

    let mut stdout = io::stdout().lock();

    if options.check {
        if options.json {
            let report = serde_json::json!({
                "suspicious": threat.is_some(),
                "threat": threat,
            });
            writeln!(stdout, "{report}")?;
        } else {
            match threat {
                Some(kind) => writeln!(stdout, "suspicious: {kind}")?,
                None => writeln!(stdout, "clean")?,
            }
        }
        return Ok(if threat.is_some() { ExitCode::FAILURE } else { ExitCode::SUCCESS });
    }

    let sanitizer = Sanitizer::new(Policy::standard(), options.config);
    let sanitized = sanitizer
        .try_sanitize(&input, options.mode)
        .context("failed to sanitize input")?;

    if options.json {
        let report = serde_json::json!({
            "sanitized": sanitized.html,
            "suspicious": threat.is_some(),
            "threat": threat,
            "stats": sanitized.stats,
        });
        writeln!(stdout, "{report}")?;
    } else {
        write!(stdout, "{}", sanitized.html)?;
    }

    Ok(ExitCode::SUCCESS)
}
