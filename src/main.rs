use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

use modbot::application::commands::register_poll_commands;
use modbot::application::messaging::MessageDispatcher;
use modbot::application::services::CommandService;
use modbot::domain::entities::User;
use modbot::domain::traits::PollStore;
use modbot::infrastructure::adapters::console::ConsoleAdapter;
use modbot::infrastructure::config::Config;
use modbot::infrastructure::mods::{load_builtin_mods, ModLoader, ModManifest};
use modbot::infrastructure::storage::MemoryPollStore;
use modbot::mods::{builtin, ModRegistry};

/// User name for lines typed into the console
const CONSOLE_USER: &str = "console";

#[derive(Parser)]
#[command(name = "modbot")]
#[command(about = "A chat bot with polls and mods", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Command prefix (overrides config)
    #[arg(short, long)]
    prefix: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot on the console
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
    /// List builtin mods and the manifests in the mods directory
    Mods,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            let config = load_config(&cli.config, cli.prefix);
            run_bot(config);
        }
        Commands::Version => {
            println!("modbot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
        Commands::Mods => {
            let config = load_config(&cli.config, cli.prefix);
            list_mods(&config);
        }
    }
}

fn load_config(path: &str, prefix_override: Option<String>) -> Config {
    let mut config = if std::path::Path::new(path).exists() {
        Config::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    };

    if let Some(prefix) = prefix_override.filter(|p| !p.is_empty()) {
        config.bot.prefix = prefix;
    }
    config
}

fn load_mods(config: &Config, registry: &ModRegistry) {
    if config.mods.auto_load {
        let loader = ModLoader::new(&config.mods.directory);
        if let Err(e) = loader.ensure_directory_exists() {
            tracing::warn!("Failed to create mods directory: {}", e);
        }
        if let Err(e) = loader.load_from_directory(registry) {
            tracing::warn!("Failed to load mods: {}", e);
        }
    }

    if let Err(e) = load_builtin_mods(&config.mods.enabled, registry) {
        tracing::warn!("Failed to load builtin mods: {}", e);
    }

    tracing::info!("Mod system initialized with {} mods", registry.len());
}

fn run_bot(config: Config) {
    tracing::info!("Starting modbot: {}", config.bot.name);

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            return;
        }
    };

    let mods = Arc::new(ModRegistry::new());
    load_mods(&config, &mods);

    let polls: Arc<dyn PollStore> = Arc::new(MemoryPollStore::new());

    let mut commands = CommandService::new(&config.bot.prefix);
    commands.register_defaults();
    register_poll_commands(&mut commands, Arc::clone(&polls));

    let dispatcher = MessageDispatcher::new(
        ConsoleAdapter::new(&config.bot.name),
        commands,
        mods,
        polls,
    );

    let check_interval = Duration::from_millis(config.polls.check_interval_ms);
    rt.block_on(run_console_bot(dispatcher, config.bot.channels, check_interval));
}

async fn run_console_bot(
    dispatcher: MessageDispatcher<ConsoleAdapter>,
    channels: Vec<String>,
    check_interval: Duration,
) {
    if let Err(e) = dispatcher.connect(&channels).await {
        tracing::error!("Failed to start bot: {}", e);
        return;
    }

    let channel = channels.first().cloned().unwrap_or_else(|| "#console".to_string());
    println!("Chatting in {}. /as <user> <text>, /whisper <text>, /tell <user> <text>, /mods, /quit", channel);

    let mut ticker = tokio::time::interval(check_interval);
    dispatcher.bot().prompt();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match dispatcher.announce_finished_polls().await {
                    Ok(finished) if !finished.is_empty() => dispatcher.bot().prompt(),
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Failed to close finished polls: {}", e),
                }
            }
            line = dispatcher.bot().read_line() => {
                let Some(line) = line else {
                    tracing::info!("End of input, shutting down");
                    break;
                };

                if !line.is_empty() && !handle_console_line(&dispatcher, &channel, &line).await {
                    break;
                }
                dispatcher.bot().prompt();
            }
        }
    }
}

/// Returns false when the console asked to quit
async fn handle_console_line(dispatcher: &MessageDispatcher<ConsoleAdapter>, channel: &str, line: &str) -> bool {
    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));

    let result = match head {
        "/quit" => return false,
        "/mods" => {
            println!("Registered mods: {}", dispatcher.mods().names().join(", "));
            Ok(())
        }
        "/as" => match rest.split_once(' ') {
            Some((user, text)) => dispatcher.handle_message(channel, User::new(user), text).await.map(|_| ()),
            None => {
                println!("usage: /as <user> <text>");
                Ok(())
            }
        },
        "/whisper" => dispatcher.handle_whisper(User::new(CONSOLE_USER), rest).await,
        "/tell" => match rest.split_once(' ') {
            Some((user, text)) => dispatcher.whisper(user, text).await,
            None => {
                println!("usage: /tell <user> <text>");
                Ok(())
            }
        },
        _ => dispatcher.handle_message(channel, User::new(CONSOLE_USER), line).await.map(|_| ()),
    };

    if let Err(e) = result {
        println!("Error: {}", e);
    }
    true
}

fn list_mods(config: &Config) {
    println!("Builtin mods:");
    for factory in builtin::factories() {
        println!("  {:<16} {}", factory.name, factory.description);
    }

    let loader = ModLoader::new(&config.mods.directory);
    println!("\nManifests in {}:", loader.directory().display());
    match loader.manifest_paths() {
        Ok(paths) if paths.is_empty() => println!("  (none)"),
        Ok(paths) => {
            for path in paths {
                match ModManifest::from_file(&path) {
                    Ok(m) => println!(
                        "  {:<16} factory={} enabled={}",
                        m.name,
                        m.factory_name(),
                        m.enabled
                    ),
                    Err(e) => println!("  {} (invalid: {})", path.display(), e),
                }
            }
        }
        Err(e) => println!("  cannot read directory: {}", e),
    }
}

fn init_config() {
    match Config::default().to_yaml() {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => eprintln!("Failed to generate config: {}", e),
    }
}
