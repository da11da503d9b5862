//! CLI entry point for the crossbar testbench binary.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use arbiter_core::InvalidRequestPolicy;
use testbench as _;
use testbench::runner::{run_vectors, RunConfig, DEFAULT_MAX_TICKS};
use testbench::vectors::parse_vectors;
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: xbar-tb <command> [options]

Commands:
  run   <vectors>  Execute a vector file and report expectation results
  check <vectors>  Parse a vector file without executing it

Options:
  --lenient        Mask out-of-range request lanes instead of faulting
  --trace          Print per-tick output state while running
  --max-ticks <n>  Abort after n ticks (default: 4096)
  -h, --help       Show this help message

Examples:
  xbar-tb run smoke.vec
  xbar-tb run --trace --max-ticks 100 rotation.vec
  xbar-tb check rotation.vec
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(RunArgs),
    Check(CheckArgs),
}

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    input: PathBuf,
    lenient: bool,
    trace: bool,
    max_ticks: u64,
}

#[derive(Debug, PartialEq, Eq)]
struct CheckArgs {
    input: PathBuf,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "run" => parse_run_args(args)
            .map(Command::Run)
            .map(ParseResult::Command),
        "check" => parse_check_args(args)
            .map(Command::Check)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

#[allow(clippy::while_let_on_iterator)]
fn parse_run_args(mut args: impl Iterator<Item = OsString>) -> Result<RunArgs, String> {
    let mut input: Option<PathBuf> = None;
    let mut lenient = false;
    let mut trace = false;
    let mut max_ticks = DEFAULT_MAX_TICKS;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--lenient" {
            lenient = true;
            continue;
        }

        if arg == "--trace" {
            trace = true;
            continue;
        }

        if arg == "--max-ticks" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --max-ticks".to_string())?;
            let text = value.to_string_lossy();
            max_ticks = text
                .parse::<u64>()
                .map_err(|_| format!("invalid value for --max-ticks: {text}"))?;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple vector files provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing vector file path".to_string())?;
    Ok(RunArgs {
        input,
        lenient,
        trace,
        max_ticks,
    })
}

fn parse_check_args(args: impl Iterator<Item = OsString>) -> Result<CheckArgs, String> {
    let mut input: Option<PathBuf> = None;

    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple vector files provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing vector file path".to_string())?;
    Ok(CheckArgs { input })
}

fn load_source(path: &Path) -> Result<String, i32> {
    match fs::read_to_string(path) {
        Ok(source) => Ok(source),
        Err(error) => {
            eprintln!("error: failed to read {}: {error}", path.display());
            Err(1)
        }
    }
}

fn run_run(args: &RunArgs) -> Result<(), i32> {
    let source = load_source(&args.input)?;

    let file = match parse_vectors(&source) {
        Ok(file) => file,
        Err(error) => {
            eprintln!("{}: {error}", args.input.display());
            return Err(1);
        }
    };

    let config = RunConfig {
        policy: if args.lenient {
            InvalidRequestPolicy::TreatAsIdle
        } else {
            InvalidRequestPolicy::Fault
        },
        max_ticks: args.max_ticks,
    };

    let result = match run_vectors(&file, &config) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("{}: {error}", args.input.display());
            return Err(1);
        }
    };

    for report in &result.reports {
        if args.trace {
            println!("{report}");
        }
        for verdict in &report.expectations {
            println!("{verdict}");
        }
    }

    let summary = result.summary();
    println!();
    println!("Summary: {summary} ({} ticks)", summary.ticks);

    if result.all_passed() {
        Ok(())
    } else {
        Err(1)
    }
}

fn run_check(args: &CheckArgs) -> Result<(), i32> {
    let source = load_source(&args.input)?;

    match parse_vectors(&source) {
        Ok(file) => {
            let expectations: usize = file.ticks.iter().map(|tick| tick.expectations.len()).sum();
            println!(
                "OK {} ({} ticks, {} expectations)",
                args.input.display(),
                file.ticks.len(),
                expectations
            );
            Ok(())
        }
        Err(error) => {
            eprintln!("{}: {error}", args.input.display());
            Err(1)
        }
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Run(args))) => match run_run(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Ok(ParseResult::Command(Command::Check(args))) => match run_check(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}
