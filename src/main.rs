use std::process;

use clap::Parser;
use colored::Colorize;
use nsearch::cli::{Cli, Command};
use nsearch::config::validate_input_path;
use nsearch::run::{run_filter, run_merge, run_search};
use nsearch::stats::RunStats;

/// Initialize the tracing subscriber with environment filter.
///
/// Set `RUST_LOG=nsearch=debug` to see debug output.
#[cfg(feature = "tracing")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

fn main() {
    #[cfg(feature = "tracing")]
    init_tracing();

    let cli = Cli::parse();
    let stats = RunStats::new();

    let result = match &cli.command {
        Command::Search(args) => {
            if let Err(e) = args.validate() {
                eprintln!("{}\n {}", "Problem with arguments:".blue().bold(), e.blue());
                process::exit(1);
            }
            for path in [&args.query, &args.db] {
                if let Err(e) = validate_input_path(path) {
                    eprintln!("{}\n {}", "Problem with arguments:".blue().bold(), e.blue());
                    process::exit(1);
                }
            }
            if !args.quiet {
                eprintln!(
                    "{}: {}",
                    "word-size".bold(),
                    args.word_size.to_string().blue().bold()
                );
                eprintln!("{}: {}", "identity".bold(), args.identity.to_string().blue().bold());
                eprintln!(
                    "{}: {}",
                    "strand".bold(),
                    format!("{:?}", args.strand).to_lowercase().blue().bold()
                );
            }
            run_search(args, &stats)
        }
        Command::Merge(args) => {
            for path in [&args.forward, &args.reverse] {
                if let Err(e) = validate_input_path(path) {
                    eprintln!("{}\n {}", "Problem with arguments:".blue().bold(), e.blue());
                    process::exit(1);
                }
            }
            run_merge(args, &stats)
        }
        Command::Filter(args) => {
            if let Err(e) = validate_input_path(&args.input) {
                eprintln!("{}\n {}", "Problem with arguments:".blue().bold(), e.blue());
                process::exit(1);
            }
            run_filter(args, &stats)
        }
    };

    if let Err(e) = result {
        eprintln!("{}\n {}", "Application error:".blue().bold(), e.to_string().blue());
        process::exit(1);
    }
}
