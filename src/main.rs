//! Lumen CLI: run a script, evaluate a string, or start the REPL.

use std::path::PathBuf;
use std::process;
use std::thread;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lumen::interpreter::{Interpreter, Options};
use lumen::repl::Repl;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Deep recursion in scripts needs more than the default main-thread stack.
const INTERPRETER_STACK_SIZE: usize = 256 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "lumen")]
#[command(author, version, about = "The Lumen scripting language")]
struct Cli {
    #[arg(help = "Script to run; starts the REPL when omitted")]
    file: Option<PathBuf>,

    #[arg(short, long, value_name = "CODE", conflicts_with = "file", help = "Evaluate a string")]
    eval: Option<String>,

    #[arg(long, help = "Do not enforce declared types at runtime")]
    no_type_check: bool,

    #[arg(long, default_value_t = 1000, help = "Maximum nested calls")]
    max_depth: usize,

    #[arg(short, long, help = "Enable verbose logging")]
    verbose: bool,

    #[arg(long, help = "Disable colored output")]
    no_color: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "lumen=debug" } else { "lumen=warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let handle = thread::Builder::new()
        .name("lumen".to_string())
        .stack_size(INTERPRETER_STACK_SIZE)
        .spawn(move || execute(cli));
    let code = match handle {
        Ok(handle) => handle.join().unwrap_or_else(|_| {
            eprintln!("{}: interpreter thread panicked", "error".red().bold());
            101
        }),
        Err(e) => {
            eprintln!("{}: cannot start interpreter: {}", "error".red().bold(), e);
            1
        }
    };
    process::exit(code);
}

fn execute(cli: Cli) -> i32 {
    let options = Options {
        type_checks: !cli.no_type_check,
        max_call_depth: cli.max_depth,
    };

    if let Some(code) = cli.eval {
        return run_source(&code, "<eval>", options);
    }

    match cli.file {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(source) => run_source(&source, &path.display().to_string(), options),
            Err(e) => {
                eprintln!(
                    "{}: cannot read '{}': {}",
                    "error".red().bold(),
                    path.display(),
                    e
                );
                1
            }
        },
        None => Repl::new(options).run(),
    }
}

fn run_source(source: &str, filename: &str, options: Options) -> i32 {
    let mut interpreter = Interpreter::with_options(options);
    match lumen::run(source, filename, Some(&mut interpreter)) {
        Some(result) => result.exit_code().unwrap_or(0),
        None => 1,
    }
}
