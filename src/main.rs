mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Args, Command};
use twin_studio::config::{Config, GEMINI_API_KEY_ENV};

/// Load .env file and warn if no API key is available.
///
/// Does not override existing environment variables.
fn load_env(config: &Config) {
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();

    if config.resolve_api_key().is_empty() {
        eprintln!("Warning: {} environment variable not set.", GEMINI_API_KEY_ENV);
        eprintln!("         Image and video generation will fail until it is.\n");
    }
}

/// Route `log` records through a stderr subscriber filtered by RUST_LOG.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let args = Args::parse();

    let cfg = match args.config.as_deref() {
        Some(path) => Config::load_explicit(path),
        None => Config::load(None),
    };
    let cfg = match cfg {
        Ok(c) => c,
        Err(e) if args.config.is_some() => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Warning: Failed to load config file: {}", e);
            eprintln!("Using default settings.\n");
            Config::default()
        }
    };

    let result = match args.command {
        Command::Studio => {
            load_env(&cfg);
            cli::run_studio(&cfg)
        }
        Command::Generate {
            images,
            category,
            preset,
            details,
            output,
        } => {
            load_env(&cfg);
            cli::run_generate(
                &cfg,
                &images,
                category,
                preset.as_deref(),
                details.as_deref(),
                output.as_deref(),
            )
        }
        Command::Animate {
            image,
            motion,
            vibe,
            details,
            category,
            output,
        } => {
            load_env(&cfg);
            cli::run_animate(
                &cfg,
                &image,
                motion.as_deref(),
                vibe.as_deref(),
                details.as_deref(),
                category,
                output.as_deref(),
            )
        }
        Command::Presets { category } => {
            cli::list_presets(category);
            Ok(())
        }
        Command::Config { action } => {
            let _ = dotenv::dotenv();
            cli::handle_config_action(action, &cfg, args.config.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
