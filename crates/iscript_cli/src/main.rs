//! isc: the IndentScript transpiler CLI.
//!
//! Usage:
//!   isc --transpile <in> [out]   write JavaScript next to the input
//!   isc --execute <in>           transpile and run in the embedded evaluator
//!   isc --version                print the version
//!   isc --help                   print usage

use clap::{CommandFactory, Parser as ClapParser};
use iscript_emitter::Emitter;
use std::path::{Path, PathBuf};
use std::process;

#[derive(ClapParser, Debug)]
#[command(
    name = "isc",
    about = "isc - An IndentScript to JavaScript transpiler",
    disable_version_flag = true
)]
struct Cli {
    /// Transpile FILE to JavaScript.
    #[arg(short = 't', long = "transpile", value_name = "FILE")]
    transpile: Option<String>,

    /// Transpile FILE and run the result in the embedded evaluator.
    #[arg(short = 'e', long = "execute", value_name = "FILE")]
    execute: Option<String>,

    /// Output path for --transpile (defaults to the input with a .js
    /// extension, next to the input).
    #[arg(value_name = "OUTPUT")]
    output: Option<String>,

    /// Print the transpiler version.
    #[arg(short = 'v', long)]
    version: bool,
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            use clap::error::ErrorKind;
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            process::exit(code);
        }
    };

    if cli.version {
        println!("isc Version {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if let Some(ref input) = cli.transpile {
        process::exit(run_transpile(input, cli.output.as_deref()));
    }

    if let Some(ref input) = cli.execute {
        process::exit(run_execute(input));
    }

    if cli.output.is_some() {
        print_error("OUTPUT is only meaningful with --transpile");
        process::exit(1);
    }

    // No arguments: print usage.
    let _ = Cli::command().print_help();
    println!();
}

fn run_transpile(input: &str, output: Option<&str>) -> i32 {
    let source = match std::fs::read_to_string(input) {
        Ok(source) => source,
        Err(err) => {
            print_error(&format!("Cannot read '{}': {}", input, err));
            return 1;
        }
    };

    let script = match iscript_compiler::transpile(&source) {
        Ok(script) => script,
        Err(err) => {
            print_error(&err.to_string());
            return 1;
        }
    };

    let emitter = Emitter::new();
    let result = match output {
        Some(path) => emitter.emit_to(PathBuf::from(path), script),
        None => emitter.emit(Path::new(input), script),
    };
    if let Err(err) = emitter.write_output_files(&result) {
        let out_path = &result.output_files[0].path;
        print_error(&format!("Cannot write '{}': {}", out_path.display(), err));
        return 1;
    }
    0
}

fn run_execute(input: &str) -> i32 {
    let source = match std::fs::read_to_string(input) {
        Ok(source) => source,
        Err(err) => {
            print_error(&format!("Cannot read '{}': {}", input, err));
            return 1;
        }
    };

    match iscript_compiler::execute(&source) {
        Ok(_) => 0,
        Err(err) => {
            print_error(&err.to_string());
            1
        }
    }
}

fn print_error(msg: &str) {
    if atty_is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

fn atty_is_terminal() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::isatty(2) != 0 }
    }
    #[cfg(not(unix))]
    {
        true
    }
}
