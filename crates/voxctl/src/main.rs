//! Vox Control - terminal front end for the Vox command interpreter.
//!
//! Default invocation starts the REPL; subcommands cover one-shot turns,
//! macro management and pending-timer inspection.

mod knowledge;
mod output;
mod repl;
mod turnlog;
mod weather;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use vox_common::{
    ActionBus, ActionExecutor, Catalog, FallbackEscalator, Interpreter, JsonFileStore,
    KnowledgeSource, KvStore, MacroStore, MemoryStore, NoKnowledge, QuickCommands, ResponseSink,
    TimerService, VoxConfig, WeatherSource,
};

#[derive(Parser)]
#[command(name = "voxctl")]
#[command(about = "Vox - deterministic natural-language command interpreter", long_about = None)]
#[command(version)]
struct Cli {
    /// Print structured intents alongside responses
    #[arg(long)]
    show_intents: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single command and exit
    Once {
        /// The command text
        text: Vec<String>,
    },

    /// Manage stored macros
    Macro {
        #[command(subcommand)]
        action: MacroAction,
    },

    /// List pending timers
    Timers,
}

#[derive(Subcommand)]
enum MacroAction {
    /// Store a macro: a trigger phrase and a `then`-separated body
    Add { trigger: String, body: String },

    /// List stored macros
    List,

    /// Remove a macro by trigger phrase
    Rm { trigger: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = VoxConfig::load();

    let store_path = VoxConfig::store_path().context("no data directory available")?;
    let store: Arc<dyn KvStore> = Arc::new(JsonFileStore::open(&store_path)?);

    match cli.command {
        Some(Commands::Macro { action }) => run_macro(action, store),
        Some(Commands::Timers) => run_timers(store),
        Some(Commands::Once { text }) => {
            let mut interpreter = build_interpreter(&config, store, cli.show_intents);
            repl::run_turn(&mut interpreter, &text.join(" ")).await;
            Ok(())
        }
        None => {
            let mut interpreter = build_interpreter(&config, store, cli.show_intents);
            repl::start_repl(&mut interpreter).await
        }
    }
}

fn build_interpreter(
    config: &VoxConfig,
    store: Arc<dyn KvStore>,
    show_intents: bool,
) -> Interpreter {
    let sink: Arc<dyn ResponseSink> = Arc::new(output::TerminalSink { show_intents });
    let bus: Arc<dyn ActionBus> = Arc::new(output::TerminalBus);

    let knowledge: Arc<dyn KnowledgeSource> =
        match (&config.knowledge.endpoint, &config.knowledge.api_key) {
            (Some(endpoint), Some(api_key)) => Arc::new(knowledge::HttpKnowledge::new(
                endpoint.clone(),
                api_key.clone(),
                config.knowledge.model.clone(),
            )),
            _ => Arc::new(NoKnowledge),
        };
    let weather: Arc<dyn WeatherSource> = Arc::new(weather::OpenMeteoWeather::new());

    let timers = TimerService::new(store.clone(), sink.clone(), bus.clone());
    match timers.rehydrate() {
        Ok(n) if n > 0 => output::display_info(&format!("Rehydrated {n} pending timer(s).")),
        Ok(_) => {}
        Err(e) => output::display_error(&format!("Timer rehydration failed: {e}")),
    }

    let executor = ActionExecutor::new(
        MemoryStore::new(store.clone()),
        timers,
        MacroStore::new(store.clone()),
        weather,
        bus.clone(),
        config.default_location.clone(),
    );

    Interpreter::new(
        Catalog::builtin(),
        MacroStore::new(store),
        executor,
        QuickCommands::new(config.bookmarks.clone(), bus.clone(), sink.clone()),
        FallbackEscalator::new(knowledge, bus),
        sink,
        config.pacing_delay(),
    )
}

fn run_macro(action: MacroAction, store: Arc<dyn KvStore>) -> Result<()> {
    let macros = MacroStore::new(store);
    match action {
        MacroAction::Add { trigger, body } => {
            macros.define(&trigger, &body)?;
            println!("Macro stored: \"{}\" -> {}", trigger.to_lowercase(), body);
        }
        MacroAction::List => {
            let all = macros.all();
            if all.is_empty() {
                println!("No macros stored.");
            } else {
                for (trigger, body) in all {
                    println!("  {} {} {}", trigger.bright_cyan(), "->".dimmed(), body);
                }
            }
        }
        MacroAction::Rm { trigger } => {
            if macros.remove(&trigger)? {
                println!("Macro removed: \"{}\"", trigger.to_lowercase());
            } else {
                println!("No macro stored for \"{}\"", trigger.to_lowercase());
            }
        }
    }
    Ok(())
}

fn run_timers(store: Arc<dyn KvStore>) -> Result<()> {
    let timers = TimerService::new(
        store,
        Arc::new(SilentSink),
        Arc::new(vox_common::NullBus),
    );
    let pending = timers.pending();
    if pending.is_empty() {
        println!("No pending timers.");
        return Ok(());
    }

    let now = chrono::Utc::now().timestamp();
    for timer in pending {
        let remaining = (timer.end_ts - now).max(0);
        println!(
            "  {} {} ({}s remaining)",
            timer.id.dimmed(),
            timer.label.bright_cyan(),
            remaining
        );
    }
    Ok(())
}

/// Listing timers must not speak.
struct SilentSink;

impl ResponseSink for SilentSink {
    fn deliver(&self, _text: &str, _intents: &[vox_common::StructuredIntent]) {}
}
