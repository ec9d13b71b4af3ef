use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use libmultipress::{
    create_engine, preset_key_file, KeyCandidateTable, KeyEvent, KeyResult, Keyval, Layout,
    MultipressConfig, MultipressEngine, SharedTimerQueue, Signal, SignalLog, TimerQueue,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "libmultipress")]
#[command(about = "Multipress (multi-tap) text entry, as on a phone keypad")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Key file with a [keys] group (overrides the layout)
    #[arg(short, long, global = true)]
    key_file: Option<PathBuf>,

    /// Built-in layout to use when no key file is given
    #[arg(short, long, value_enum, global = true)]
    layout: Option<Layout>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a key sequence through the engine and print what it emits
    ///
    /// Each step is a key name (`2`, `KP_5`, `Shift_L`, `U20AC`), `up:<name>`
    /// for a key release, `wait` or `wait=<ms>` to let time pass, or `reset`.
    Run {
        /// Print one JSON object per step
        #[arg(long)]
        json: bool,
        /// Steps, e.g. `2 2 3 wait 2`
        #[arg(required = true)]
        steps: Vec<String>,
    },
    /// Load a key file and report its entries
    Check {
        /// Key file to check
        file: PathBuf,
    },
    /// Print a built-in layout as a key file
    Preset {
        #[arg(value_enum, default_value_t = Layout::PhoneKeypad)]
        layout: Layout,
    },
}

#[derive(Debug, Serialize)]
struct StepRecord<'a> {
    step: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    handled: Option<bool>,
    signals: Vec<Signal>,
    preedit: String,
}

enum Step {
    Key(KeyEvent),
    Wait(Option<Duration>),
    Reset,
}

fn parse_step(step: &str) -> Result<Step> {
    if step == "wait" {
        return Ok(Step::Wait(None));
    }
    if let Some(ms) = step.strip_prefix("wait=") {
        let ms: u64 = ms.parse().with_context(|| format!("invalid wait \"{}\"", step))?;
        return Ok(Step::Wait(Some(Duration::from_millis(ms))));
    }
    if step == "reset" {
        return Ok(Step::Reset);
    }
    let (name, release) = match step.strip_prefix("up:") {
        Some(name) => (name, true),
        None => (step, false),
    };
    let Some(keyval) = Keyval::from_name(name) else {
        bail!("unknown key name \"{}\"", name);
    };
    Ok(Step::Key(if release {
        KeyEvent::release(keyval)
    } else {
        KeyEvent::press(keyval)
    }))
}

/// Advance virtual time and deliver expired timers.
fn advance(
    engine: &mut MultipressEngine<SharedTimerQueue>,
    queue: &SharedTimerQueue,
    delta: Duration,
) {
    let expired = queue.borrow_mut().advance(delta);
    for id in expired {
        engine.timer_fired(id);
    }
}

fn print_record(record: &StepRecord<'_>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(record)?);
        return Ok(());
    }

    let handled = match record.handled {
        Some(true) => " [handled]",
        Some(false) => " [not handled]",
        None => "",
    };
    println!("{}{}", record.step, handled);
    for signal in &record.signals {
        match signal {
            Signal::Commit(text) => println!("  commit {:?}", text),
            other => println!("  {}", other.kind().name()),
        }
    }
    if !record.preedit.is_empty() {
        println!("  preedit {:?}", record.preedit);
    }
    Ok(())
}

fn run_steps(config: &MultipressConfig, steps: &[String], json: bool) -> Result<()> {
    let queue = TimerQueue::shared();
    let mut engine = create_engine(config, queue.clone());
    let log = SignalLog::new();
    log.attach(engine.signals());

    for raw in steps {
        let mut handled = None;
        match parse_step(raw)? {
            Step::Key(event) => {
                handled = Some(engine.handle_key(event) == KeyResult::Handled);
            }
            Step::Wait(delta) => {
                let delta = delta.unwrap_or_else(|| engine.compose_timeout());
                advance(&mut engine, &queue, delta);
            }
            Step::Reset => engine.reset(),
        }

        let record = StepRecord {
            step: raw,
            handled,
            signals: log.take(),
            preedit: engine.preedit().text,
        };
        print_record(&record, json)?;
    }

    // Let a pending composition time out so the final character is committed
    let remaining = queue.borrow().next_deadline();
    if let Some(deadline) = remaining {
        let now = queue.borrow().now();
        advance(&mut engine, &queue, deadline.saturating_sub(now));
        let record = StepRecord {
            step: "(idle)",
            handled: None,
            signals: log.take(),
            preedit: engine.preedit().text,
        };
        print_record(&record, json)?;
    }
    Ok(())
}

fn check_key_file(file: &Path, config: &MultipressConfig) -> Result<()> {
    let report = KeyCandidateTable::load(file, config.base())
        .with_context(|| format!("cannot load {}", file.display()))?;

    println!("{}: {} entries", file.display(), report.table.len());
    for key in report.table.keys() {
        let candidates = report.table.candidates(key).unwrap_or_default();
        println!("  {} -> {:?}", key, candidates);
    }
    if !report.skipped.is_empty() {
        println!("{} skipped:", report.skipped.len());
        for e in &report.skipped {
            println!("  {}", e);
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<MultipressConfig> {
    let mut config = match &cli.config {
        Some(path) => MultipressConfig::load_toml(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => MultipressConfig::default(),
    };
    if let Some(key_file) = &cli.key_file {
        config.key_file = Some(key_file.clone());
    }
    if let Some(layout) = cli.layout {
        config.layout = layout;
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Run { json, steps } => run_steps(&config, steps, *json),
        Commands::Check { file } => check_key_file(file, &config),
        Commands::Preset { layout } => {
            print!("{}", preset_key_file(*layout, config.base().list_separator));
            Ok(())
        }
    }
}
