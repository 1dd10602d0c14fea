use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;

use hxbusy_core::{IndicatorConfig, config};
use hxbusy_validate::{RowKind, Timeline, Trace, replay};

#[derive(Parser)]
#[command(version, about = "Check hxbusy configs and replay htmx event traces")]
struct Cli {
    /// Config file; stock defaults when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config and report problems.
    Check,
    /// Print the effective config and the event table.
    Show,
    /// Replay a trace file and print the resulting timeline.
    Replay {
        trace: PathBuf,
        /// Fail if any indicator is still live after the last step.
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Check => {
            println!(
                "ok: overlay after {}ms, spinner after {}ms, {} events",
                config.overlay_delay_ms,
                config.spinner_delay_ms,
                config.events.len()
            );
        }
        Commands::Show => {
            print!("{}", config::to_toml_string(&config)?);
            println!();
            println!("# event table");
            for (name, kind) in config.events.iter() {
                println!("{name:<28} {kind:?}");
            }
        }
        Commands::Replay { trace, strict } => {
            let trace = Trace::load(trace)?;
            let timeline = replay(&config, &trace)?;
            print_timeline(&timeline);
            if *strict && !timeline.remaining.entries.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn load_config(path: Option<&Path>) -> Result<IndicatorConfig, config::ConfigError> {
    match path {
        Some(path) => config::load_file(path),
        None => Ok(IndicatorConfig::default()),
    }
}

fn print_timeline(timeline: &Timeline) {
    for row in &timeline.rows {
        let what = match &row.kind {
            RowKind::Event { name, outcome } => format!("{name} -> {outcome:?}"),
            RowKind::Timer(timer) => format!("timer {timer}"),
        };
        println!("{:>6}ms  {what}", row.at.as_millis());
        for visual in &row.visuals {
            println!("{:>10}{visual:?}", "");
        }
    }

    if timeline.remaining.entries.is_empty() {
        println!("all indicators torn down");
        return;
    }
    println!("still live:");
    for entry in &timeline.remaining.entries {
        println!(
            "  {} {} {:?} ops={:?}",
            entry.id, entry.scope, entry.state, entry.ops
        );
    }
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}
