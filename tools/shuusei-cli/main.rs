use clap::{Args, Parser, Subcommand};
use shuusei::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Apply declarative literal-substitution patches to workflow documents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply patches in order and write each target document back
    Apply(RunArgs),
    /// Apply patches in memory and print what would change
    Check(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Patch definition files (.toml or .json), applied in the order given
    #[arg(required = true)]
    patches: Vec<PathBuf>,

    /// Directory that relative patch targets are resolved against
    #[arg(long, env = "SHUUSEI_ROOT", default_value = ".")]
    root: PathBuf,

    /// Workflow document to patch instead of the patch's own target (single patch only)
    #[arg(long)]
    target: Option<PathBuf>,

    /// Do not write a document if any step matched nothing; exit with status 2
    #[arg(long)]
    strict: bool,
}

/// Exit status when strict mode saw a step that matched nothing.
const EXIT_DRIFT: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (args, dry_run) = match cli.command {
        Command::Apply(args) => (args, false),
        Command::Check(args) => (args, true),
    };

    if args.target.is_some() && args.patches.len() > 1 {
        exit_with_error("--target can only be used with a single patch.");
    }

    let options = RunOptions {
        root: args.root,
        target: args.target,
        dry_run,
        strict: args.strict,
    };

    let outcomes = run_sequence(&args.patches, &options)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));

    let mut drifted = false;
    for outcome in &outcomes {
        print_outcome(outcome, dry_run);
        drifted |= outcome.report.has_warnings();
    }

    if options.strict && drifted {
        eprintln!("\nStrict mode: at least one step matched nothing.");
        return ExitCode::from(EXIT_DRIFT);
    }
    ExitCode::SUCCESS
}

fn print_outcome(outcome: &RunOutcome, dry_run: bool) {
    println!("\n{}", ReportFormatter::format_report(&outcome.report));

    if outcome.written {
        println!("  -> Wrote '{}'", outcome.target.display());
    } else if outcome.blocked {
        println!("  -> Not written: '{}'", outcome.target.display());
    } else if dry_run {
        println!("  -> Dry run, '{}' left untouched", outcome.target.display());
    }

    if !outcome.notes.is_empty() && !outcome.blocked {
        println!();
        for note in &outcome.notes {
            println!("  {}", note);
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("shuusei={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
