//! CLI entry point for vibe-chat

mod faults;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{Confirm, Input, Select};
use faults::{BreakingPersonality, FaultyGenerator, InjectedFault};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use vibe_chat_agent::{personality_by_name, ResponsePipeline, PERSONALITY_NAMES};
use vibe_chat_core::config::validate::validate_config;
use vibe_chat_core::config::{Config, ConfigLoader};
use vibe_chat_core::logging::{init_logging, WorkerGuard};
use vibe_chat_core::utils::expand_tilde;
use vibe_chat_core::{HistoryStore, Speaker, Turn};
use vibe_chat_providers::{build_generator, GENERATOR_NAMES};
use tracing::{error, info, warn};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Parser)]
#[command(name = "vibe-chat")]
#[command(about = "A playful terminal chat companion with optional memory")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,

    /// Persist the conversation between runs
    #[arg(long, global = true)]
    memory: bool,

    /// History document path
    #[arg(long, global = true)]
    history_file: Option<String>,

    /// Maximum number of turns kept in the history document
    #[arg(long, global = true)]
    max_turns: Option<usize>,

    /// Personality to chat with
    #[arg(short, long, global = true)]
    personality: Option<String>,

    /// Reply generator
    #[arg(short, long, global = true)]
    generator: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat (default)
    Chat {
        /// Inject a controlled error for testing
        #[arg(long, value_enum)]
        inject_error: Option<InjectedFault>,
    },
    /// Send a single message and print the reply
    Ask {
        /// Message to send
        #[arg(short, long)]
        message: String,
    },
    /// Print the stored conversation
    History,
    /// Erase the stored conversation
    Clear,
    /// Show status information
    Status,
    /// Interactive setup of the configuration file
    Init,
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();

    let loader = match &cli.config_dir {
        Some(dir) => ConfigLoader::with_dir(expand_tilde(&dir.to_string_lossy())),
        None => ConfigLoader::new(),
    };

    let command = cli
        .command
        .take()
        .unwrap_or(Commands::Chat { inject_error: None });

    match command {
        Commands::Init => run_init(&loader),
        Commands::Chat { inject_error } => {
            let (config, _log_guard) = prepare(&loader, &cli)?;
            run_chat(&config, inject_error)
        }
        Commands::Ask { message } => {
            let (config, _log_guard) = prepare(&loader, &cli)?;
            run_ask(&config, &message)
        }
        Commands::History => {
            let (config, _log_guard) = prepare(&loader, &cli)?;
            run_history(&config)
        }
        Commands::Clear => {
            let (config, _log_guard) = prepare(&loader, &cli)?;
            run_clear(&config)
        }
        Commands::Status => {
            let (config, _log_guard) = prepare(&loader, &cli)?;
            run_status(&loader, &config)
        }
    }
}

/// Load configuration and start logging; the guard must outlive the command
fn prepare(loader: &ConfigLoader, cli: &Cli) -> Result<(Config, WorkerGuard)> {
    let config = load_config(loader, cli)?;
    let guard = init_logging(&logging_config(loader, &config));
    info!("Configuration loaded from {}", loader.config_path().display());
    Ok((config, guard))
}

/// Load the config file and apply command-line overrides on top
fn load_config(loader: &ConfigLoader, cli: &Cli) -> Result<Config> {
    let mut config = loader
        .load()
        .with_context(|| format!("Invalid configuration in {}", loader.config_path().display()))?;

    if cli.memory {
        config.history.enabled = true;
    }
    if let Some(path) = &cli.history_file {
        config.history.path = path.clone();
    }
    if let Some(max_turns) = cli.max_turns {
        config.history.max_turns = max_turns;
    }
    if let Some(personality) = &cli.personality {
        config.chat.personality = personality.clone();
    }
    if let Some(generator) = &cli.generator {
        config.chat.generator = generator.clone();
    }

    config.history.path = expand_tilde(&config.history.path)
        .to_string_lossy()
        .into_owned();

    validate_config(&config).context("Invalid command-line options")?;
    Ok(config)
}

/// Relative log directories live under the config directory
fn logging_config(loader: &ConfigLoader, config: &Config) -> vibe_chat_core::config::LoggingConfig {
    let mut logging = config.logging.clone();
    let dir = expand_tilde(&logging.dir);
    let dir = if dir.is_relative() {
        loader.config_dir().join(dir)
    } else {
        dir
    };
    logging.dir = dir.to_string_lossy().into_owned();
    logging
}

fn build_pipeline(config: &Config, fault: Option<InjectedFault>) -> Result<ResponsePipeline> {
    let mut personality = personality_by_name(&config.chat.personality)?;
    if fault == Some(InjectedFault::Personality) {
        personality = BreakingPersonality::wrap(personality);
    }

    let mut generator = build_generator(&config.chat.generator)?;
    if fault == Some(InjectedFault::Provider) {
        generator = FaultyGenerator::wrap(generator);
    }

    let pipeline = ResponsePipeline::from_config(generator, personality, &config.history)?
        .with_fallback(config.chat.fallback_message.clone());
    Ok(pipeline)
}

fn memory_status(config: &Config) -> String {
    if config.history.enabled {
        format!("on ({})", config.history.path)
    } else {
        "off".to_string()
    }
}

fn print_turn(personality: &str, turn: &Turn) {
    match turn.speaker {
        Speaker::User => println!("{} {}", style("You:").cyan(), turn.text),
        Speaker::Bot => println!("{} {}", style(format!("{}:", personality)).magenta(), turn.text),
    }
}

/// Interactive chat over stdin
fn run_chat(config: &Config, fault: Option<InjectedFault>) -> Result<()> {
    if fault == Some(InjectedFault::Startup) {
        anyhow::bail!("Injected startup failure (requested via --inject-error=startup)");
    }

    let mut pipeline = build_pipeline(config, fault)?;

    println!("{}", style("AI Vibe Chat 🌀").green());
    println!("Personality: {}", pipeline.personality_name());
    println!("Memory: {}", memory_status(config));
    println!("Type 'quit' to exit, '/clear' to start over, '/history' to look back.\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} ", style("You:").cyan());
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => {
                println!("\nBye!");
                break;
            }
        };
        match line.trim().to_lowercase().as_str() {
            "quit" | "exit" => {
                println!("Bye!");
                break;
            }
            "/clear" => {
                pipeline.clear();
                println!("{}", style("Conversation cleared.").yellow());
                continue;
            }
            "/history" => {
                let session = pipeline.session();
                println!(
                    "{}",
                    style(format!(
                        "Session started {}, last activity {}",
                        session.started_at().with_timezone(&Local).format(TIME_FORMAT),
                        session.updated_at().with_timezone(&Local).format(TIME_FORMAT)
                    ))
                    .dim()
                );
                if pipeline.history().is_empty() {
                    println!("{}", style("Nothing said yet.").dim());
                }
                for turn in pipeline.history() {
                    print_turn(pipeline.personality_name(), turn);
                }
                continue;
            }
            _ => {}
        }

        match pipeline.respond(&line) {
            Ok(reply) => {
                if fault == Some(InjectedFault::Response) {
                    anyhow::bail!("Injected response failure after generation");
                }
                println!(
                    "{} {}",
                    style(format!("{}:", pipeline.personality_name())).magenta(),
                    reply
                );
            }
            Err(e) => {
                error!("Failed to respond: {}", e);
                eprintln!("{} {}", style("Error:").red().bold(), e);
            }
        }
    }

    info!("Chat ended with {} turns in session", pipeline.history().len());
    Ok(())
}

fn run_ask(config: &Config, message: &str) -> Result<()> {
    let mut pipeline = build_pipeline(config, None)?;
    let reply = pipeline
        .respond(message)
        .context("Failed to process message")?;
    println!("{}", reply);
    Ok(())
}

fn run_history(config: &Config) -> Result<()> {
    let store = HistoryStore::from_config(&config.history)?;
    if !store.path().exists() {
        println!("No stored conversation at {}", store.path().display());
        return Ok(());
    }

    let turns = store.load();
    if turns.is_empty() {
        println!("Stored conversation is empty.");
        return Ok(());
    }
    for turn in &turns {
        print_turn(&config.chat.personality, turn);
    }
    Ok(())
}

fn run_clear(config: &Config) -> Result<()> {
    let store = HistoryStore::from_config(&config.history)?;
    store.clear();
    println!(
        "{} Cleared {}",
        style("✓").green().bold(),
        store.path().display()
    );
    Ok(())
}

fn stored_turns(config: &Config) -> Result<usize> {
    let store = HistoryStore::from_config(&config.history)?;
    if !store.path().exists() {
        return Ok(0);
    }
    Ok(store.load().len())
}

fn run_status(loader: &ConfigLoader, config: &Config) -> Result<()> {
    let config_path = loader.config_path();

    println!("{}", style("Vibe Chat Status").bold().cyan());
    println!("Version: {}\n", env!("CARGO_PKG_VERSION"));

    println!("{}", style("Configuration:").bold());
    let config_state = if config_path.exists() {
        style("found").green()
    } else {
        style("defaults").dim()
    };
    println!("  Config file: {} ({})", config_path.display(), config_state);
    println!("  Personality: {}", config.chat.personality);
    println!("  Generator: {}", config.chat.generator);
    println!();

    println!("{}", style("Memory:").bold());
    let memory = if config.history.enabled {
        style("on").green()
    } else {
        style("off").dim()
    };
    println!("  Persistence: {}", memory);
    println!("  Document: {}", config.history.path);
    println!("  Max turns: {}", config.history.max_turns);
    println!("  Stored turns: {}", stored_turns(config)?);

    Ok(())
}

/// Interactive setup writing `config.json`
fn run_init(loader: &ConfigLoader) -> Result<()> {
    println!("{}", style("Welcome to Vibe Chat!").bold().cyan());
    println!("Let's set up your configuration.\n");

    let config_path = loader.config_path();
    let mut config = if config_path.exists() {
        let overwrite = Confirm::new()
            .with_prompt("Configuration already exists. Overwrite?")
            .default(false)
            .interact()?;
        if !overwrite {
            println!("Init cancelled.");
            return Ok(());
        }
        loader.load().unwrap_or_else(|e| {
            warn!("Ignoring unreadable configuration: {}", e);
            Config::default()
        })
    } else {
        Config::default()
    };

    let personality_idx = Select::new()
        .with_prompt("Pick a personality")
        .items(PERSONALITY_NAMES)
        .default(
            PERSONALITY_NAMES
                .iter()
                .position(|name| *name == config.chat.personality)
                .unwrap_or(0),
        )
        .interact()?;
    config.chat.personality = PERSONALITY_NAMES[personality_idx].to_string();

    let generator_idx = Select::new()
        .with_prompt("Pick a reply generator")
        .items(GENERATOR_NAMES)
        .default(0)
        .interact()?;
    config.chat.generator = GENERATOR_NAMES[generator_idx].to_string();

    config.history.enabled = Confirm::new()
        .with_prompt("Remember conversations between runs?")
        .default(config.history.enabled)
        .interact()?;

    if config.history.enabled {
        config.history.path = Input::new()
            .with_prompt("History file")
            .default(config.history.path.clone())
            .interact_text()?;
        config.history.max_turns = Input::new()
            .with_prompt("Maximum turns to keep")
            .default(config.history.max_turns)
            .validate_with(|value: &usize| {
                if *value > 0 {
                    Ok(())
                } else {
                    Err("must be at least 1")
                }
            })
            .interact_text()?;
    }

    validate_config(&config)?;
    loader.save(&config)?;

    println!(
        "\n{}",
        style("Configuration saved successfully!").green().bold()
    );
    println!("Config location: {}", config_path.display());
    println!("\nYou can now run:");
    println!("  {} - Start chatting", style("vibe-chat").cyan());
    println!(
        "  {} - Send a single message",
        style("vibe-chat ask --message 'Hello!'").cyan()
    );

    Ok(())
}
