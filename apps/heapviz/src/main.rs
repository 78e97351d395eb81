use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use heapviz_config::{VisualizerConfig, load_config, save_config};
use heapviz_core::HeapOrder;
use heapviz_engine::{Heap, heapify};
use heapviz_logging::{LogFormat, LogLevel, LoggingConfig};
use heapviz_render::{render_array, render_dot, render_info, render_levels, render_log, render_step};
use heapviz_session::{HeapCommand, Pacer, Session, SessionEvent, SleepPacer};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "heapviz")]
#[command(about = "Play d-ary heap operations step by step.", long_about = None)]
struct Cli {
    /// Config file (YAML, or JSON by extension).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Branching factor (children per node, at least 2).
    #[arg(short = 'd', long = "branching-factor", global = true)]
    branching_factor: Option<usize>,
    /// "min" or "max".
    #[arg(long, global = true)]
    order: Option<HeapOrder>,
    /// Pause between animation steps.
    #[arg(long, global = true)]
    delay_ms: Option<u64>,
    /// Seed for `random`.
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Log format: plain, json or compact.
    #[arg(long, global = true)]
    log_format: Option<String>,
    /// -v shows swaps, -vv everything.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a `;`-separated command script, printing every step.
    Play {
        /// e.g. "insert 5; insert 3; extract; random; heapify"
        #[arg(required_unless_present = "file")]
        script: Option<String>,
        /// Read the script from a file instead.
        #[arg(long, conflicts_with = "script")]
        file: Option<PathBuf>,
        /// Print session events as JSON lines instead of text.
        #[arg(long)]
        events: bool,
        /// Also print the DOT source of the final heap.
        #[arg(long)]
        dot: bool,
    },
    /// Heapify the given values, printing every step.
    Build {
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<i64>,
    },
    /// Print the Graphviz DOT source of the heapified values.
    Dot {
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<i64>,
        /// Keep the values in the given order.
        #[arg(long)]
        raw: bool,
    },
    /// Print the level arrays of the heapified values.
    Levels {
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<i64>,
        /// Keep the values in the given order.
        #[arg(long)]
        raw: bool,
    },
    /// Write the effective configuration to a file.
    InitConfig { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.cmd {
        Command::Play {
            script,
            file,
            events,
            dot,
        } => {
            let script = match (script, file) {
                (Some(script), _) => script,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read script {}", path.display()))?,
                (None, None) => bail!("no script given"),
            };

            let mut session = Session::new(&config)?;
            if events {
                session.on_any(|event| match serde_json::to_string(event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => eprintln!("WARN: unserializable event: {e}"),
                });
            } else {
                watch_log(&mut session, config.logging.clone());
            }

            session
                .submit_input(&script)
                .context("Invalid script")?;
            play(&mut session, &config, !events);

            if !events {
                print_views(&session, &config.logging);
                if dot {
                    print!("{}", render_dot(session.heap(), &[]));
                }
            }
        }
        Command::Build { values } => {
            let heap = Heap::from_elements(values, config.branching_factor()?, config.order);
            let mut session = Session::from_heap(heap, &config)?;
            watch_log(&mut session, config.logging.clone());
            session.submit(HeapCommand::Heapify);
            play(&mut session, &config, true);
            print_views(&session, &config.logging);
        }
        Command::Dot { values, raw } => {
            let heap = prepared(values, raw, &config)?;
            print!("{}", render_dot(&heap, &[]));
        }
        Command::Levels { values, raw } => {
            let heap = prepared(values, raw, &config)?;
            println!("{}", render_levels(&heap, &[]));
            println!("{}", render_info(&heap));
        }
        Command::InitConfig { path } => {
            save_config(&config, &path)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

/// File config (or defaults) with command-line overrides applied.
fn resolve_config(cli: &Cli) -> Result<VisualizerConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => VisualizerConfig::default(),
    };

    if let Some(d) = cli.branching_factor {
        config.branching_factor = d;
    }
    if let Some(order) = cli.order {
        config.order = order;
    }
    if let Some(delay) = cli.delay_ms {
        config.step_delay_ms = delay;
    }
    if let Some(seed) = cli.seed {
        config.random.seed = Some(seed);
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = parse_log_format(format)?;
    }
    config.logging = apply_verbosity(config.logging, cli.verbose);

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn parse_log_format(s: &str) -> Result<LogFormat> {
    match s.to_ascii_lowercase().as_str() {
        "plain" => Ok(LogFormat::Plain),
        "json" => Ok(LogFormat::Json),
        "compact" => Ok(LogFormat::Compact),
        other => bail!("unknown log format `{other}` (expected plain, json or compact)"),
    }
}

fn apply_verbosity(logging: LoggingConfig, verbose: u8) -> LoggingConfig {
    match verbose {
        0 => logging,
        1 => logging.with_level(LogLevel::Debug),
        _ => logging.with_level(LogLevel::Trace),
    }
}

/// Print accepted log entries as they are recorded.
fn watch_log(session: &mut Session, logging: LoggingConfig) {
    session.on("log", move |event| {
        if let SessionEvent::Log { entry } = event
            && logging.accepts(entry)
        {
            println!("{}", entry.format(&logging));
        }
    });
}

fn play(session: &mut Session, config: &VisualizerConfig, print_steps: bool) {
    let mut pacer = SleepPacer::from_millis(config.step_delay_ms);
    while let Some(step) = session.tick() {
        if print_steps {
            println!(
                "{}",
                render_step(&step, session.heap(), session.highlights())
            );
        }
        pacer.pause(&step);
    }
}

fn print_views(session: &Session, logging: &LoggingConfig) {
    println!();
    println!("Array: {}", render_array(session.heap(), &[]));
    println!("{}", render_levels(session.heap(), &[]));
    println!("{}", render_info(session.heap()));
    if let Some(value) = session.last_extracted() {
        println!("Last extracted: {value}");
    }
    println!();
    println!("Operation log:");
    println!("{}", render_log(session.log(), logging));
}

fn prepared(values: Vec<i64>, raw: bool, config: &VisualizerConfig) -> Result<Heap> {
    let heap = Heap::from_elements(values, config.branching_factor()?, config.order);
    Ok(if raw { heap } else { heapify(heap).0 })
}
