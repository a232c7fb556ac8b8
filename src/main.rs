use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod recipes;
mod storage;

use commands::{BagCommand, ConfigCommand, DishCommand, RecipeCommand, TickCommand, ViewCommand};
use config::Config;
use storage::SessionStorage;

#[derive(Parser)]
#[command(name = "prepbag")]
#[command(version)]
#[command(about = "Track prep bags for batch cooking", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage dishes and their prep bags
    Dish(DishCommand),

    /// Inspect and fill individual prep bags
    Bag(BagCommand),

    /// Mark an ingredient as added in every bag that needs it
    Tick(TickCommand),

    /// Aggregated views over all dishes
    View(ViewCommand),

    /// Browse the recipe source
    Recipe(RecipeCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.clone())?;
    let storage = SessionStorage::new(config.data_dir.value.clone());

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("Use --help to see available commands");
            return Ok(());
        }
    };

    let write = match &command {
        Commands::Dish(cmd) => cmd.command.is_write(),
        Commands::Bag(cmd) => cmd.command.is_write(),
        Commands::Tick(_) => true,
        Commands::View(_) | Commands::Recipe(_) | Commands::Config(_) => false,
    };

    // These never touch the saved session
    match &command {
        Commands::Config(cmd) => return cmd.run(&config, cli.config),
        Commands::Recipe(cmd) => return cmd.run(&config),
        _ => {}
    }

    let mut session = storage.open()?;
    session.set_palette(config.palette.value.clone());
    let result = match &command {
        Commands::Dish(cmd) => cmd.run(&mut session, &config),
        Commands::Bag(cmd) => cmd.run(&mut session),
        Commands::Tick(cmd) => cmd.run(&mut session),
        Commands::View(cmd) => cmd.run(&session, &config),
        Commands::Recipe(_) | Commands::Config(_) => Ok(()),
    };
    tracing::debug!(dishes = session.dishes().len(), write, "command finished");

    // A partly applied command (some bags confirmed, some not) is still saved
    if write {
        storage.save(session.into_store().state())?;
    }

    result
}
