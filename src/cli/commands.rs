//! Subcommand handlers.

use std::path::{Path, PathBuf};

use twin_studio::category::{Category, CINEMATIC_VIBES, MOTION_PRESETS};
use twin_studio::config::{default_path, Config, DEFAULT_CONFIG_TOML, GEMINI_API_KEY_ENV};
use twin_studio::gemini::{GeminiClient, GenerationError};
use twin_studio::media::{MediaItem, MediaKind, ReferenceImage, MAX_REFERENCE_IMAGES};
use twin_studio::studio::{load_references, spawn_listener, Studio};
use twin_studio::supervisor::RequestSupervisor;

use super::args::ConfigAction;
use super::enums::CategoryArg;

/// Create the Gemini client, explaining how to set the key when it is missing.
fn make_client(config: &Config) -> Result<GeminiClient, String> {
    GeminiClient::from_config(config.resolve_api_key(), config).map_err(|e| match e {
        GenerationError::MissingApiKey => format!(
            "{} environment variable is not set.\n\n\
            Add your API key to a .env file:\n\
                echo '{}=your-api-key-here' >> .env\n\n\
            Or set it as an environment variable:\n\
                export {}=\"your-api-key-here\"",
            GEMINI_API_KEY_ENV, GEMINI_API_KEY_ENV, GEMINI_API_KEY_ENV
        ),
        _ => format!("Failed to create Gemini client: {}", e),
    })
}

fn new_runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Runtime::new().map_err(|e| format!("Failed to create async runtime: {}", e))
}

/// Ctrl+C cancels the running request; with nothing running it exits.
fn install_ctrlc_handler(supervisor: &RequestSupervisor) {
    let supervisor = supervisor.clone();
    let result = ctrlc::set_handler(move || {
        if supervisor.cancel_current() {
            eprintln!("\nReceived Ctrl+C, cancelling...");
        } else {
            std::process::exit(130);
        }
    });
    if let Err(e) = result {
        log::warn!("Could not install Ctrl+C handler: {}", e);
    }
}

fn default_output(item: &MediaItem) -> PathBuf {
    let short_id: String = item.id.simple().to_string().chars().take(8).collect();
    PathBuf::from(format!("twin-{}", short_id))
}

/// Run the interactive studio.
pub fn run_studio(config: &Config) -> Result<(), String> {
    let client = make_client(config)?;
    let supervisor = RequestSupervisor::new();
    install_ctrlc_handler(&supervisor);

    let rt = new_runtime()?;
    rt.block_on(async {
        let mut studio = Studio::new(client, supervisor);
        studio.run(spawn_listener()).await;
    });
    Ok(())
}

/// Generate one twin image and write it to disk.
pub fn run_generate(
    config: &Config,
    images: &[PathBuf],
    category: CategoryArg,
    preset: Option<&str>,
    details: Option<&str>,
    output: Option<&Path>,
) -> Result<(), String> {
    if images.len() > MAX_REFERENCE_IMAGES {
        return Err(format!(
            "At most {} reference photos are allowed, got {}",
            MAX_REFERENCE_IMAGES,
            images.len()
        ));
    }

    let client = make_client(config)?;
    let references = load_references(images).map_err(|e| e.to_string())?;

    let mut studio = Studio::new(client, RequestSupervisor::new());
    studio.session.add_references(references);
    studio.session.set_category(category.into());
    if let Some(preset) = preset {
        studio.session.set_preset(preset).map_err(|e| e.to_string())?;
    }
    if let Some(details) = details {
        studio.session.set_details(details);
    }

    let rt = new_runtime()?;
    rt.block_on(async {
        studio.generate(None).await.map_err(|e| e.to_string())?;
        let item = studio.session.item_at(1).map_err(|e| e.to_string())?;
        let dest = output.map(PathBuf::from).unwrap_or_else(|| default_output(item));
        let written = studio.save(1, &dest).map_err(|e| e.to_string())?;
        println!("Twin saved to {}", written.display());
        Ok::<(), String>(())
    })
}

/// Animate one image and write the video to disk.
pub fn run_animate(
    config: &Config,
    image: &Path,
    motion: Option<&str>,
    vibe: Option<&str>,
    details: Option<&str>,
    category: Option<CategoryArg>,
    output: Option<&Path>,
) -> Result<(), String> {
    let client = make_client(config)?;
    let reference = ReferenceImage::from_path(image)
        .map_err(|e| format!("Failed to read '{}': {}", image.display(), e))?;

    let supervisor = RequestSupervisor::new();
    install_ctrlc_handler(&supervisor);

    let mut studio = Studio::new(client, supervisor);
    let source = MediaItem::new(
        MediaKind::Image,
        reference.bytes.to_vec(),
        reference.mime_type,
        reference.label,
        category.map(Category::from),
    );
    studio.session.gallery.push(source);
    studio.session.select_for_animation(1).map_err(|e| e.to_string())?;
    if let Some(motion) = motion {
        studio.session.set_motion(motion).map_err(|e| e.to_string())?;
    }
    if let Some(vibe) = vibe {
        studio.session.set_vibe(vibe).map_err(|e| e.to_string())?;
    }
    if let Some(details) = details {
        studio.session.set_details(details);
    }

    let rt = new_runtime()?;
    rt.block_on(async {
        studio.animate(None).await.map_err(|e| e.to_string())?;
        let item = studio.session.item_at(1).map_err(|e| e.to_string())?;
        let dest = output.map(PathBuf::from).unwrap_or_else(|| default_output(item));
        let written = studio.save(1, &dest).map_err(|e| e.to_string())?;
        println!("Video saved to {}", written.display());
        Ok::<(), String>(())
    })
}

/// Print the preset catalogues.
pub fn list_presets(category: Option<CategoryArg>) {
    let categories: Vec<Category> = match category {
        Some(c) => vec![c.into()],
        None => Category::ALL.to_vec(),
    };

    for category in categories {
        println!("{}:", category);
        for (i, preset) in category.presets().iter().enumerate() {
            println!("  {:>2}. {}", i + 1, preset);
        }
        println!();
    }

    if category.is_none() {
        println!("Motion presets:");
        for (i, motion) in MOTION_PRESETS.iter().enumerate() {
            println!("  {:>2}. {}", i + 1, motion);
        }
        println!();
        println!("Cinematic vibes:");
        for (i, vibe) in CINEMATIC_VIBES.iter().enumerate() {
            println!("  {:>2}. {}", i + 1, vibe);
        }
    }
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, config: &Config, explicit_path: Option<&Path>) -> Result<(), String> {
    let config_path = explicit_path.map(PathBuf::from).unwrap_or_else(default_path);

    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!(
                "  API key:     {}",
                if config.resolve_api_key().is_empty() { "not set" } else { "set" }
            );
            println!("  Base URL:    {}", config.api.base_url);
            println!("  Image model: {}", config.api.image_model);
            println!("  Video model: {}", config.api.video_model);
            println!(
                "  Image:       {} @ {}",
                config.image.aspect_ratio, config.image.image_size
            );
            println!(
                "  Video:       {} @ {}",
                config.video.aspect_ratio, config.video.resolution
            );
            println!(
                "  Polling:     every {}s, at most {} polls, {}s timeout",
                config.video.poll_interval_secs, config.video.max_polls, config.video.timeout_secs
            );
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            if config_path.exists() {
                return Err(format!(
                    "Config file already exists: {}\nUse 'twin-studio config show' to view current settings.",
                    config_path.display()
                ));
            }

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Error creating config directory: {}", e))?;
            }

            std::fs::write(&config_path, DEFAULT_CONFIG_TOML)
                .map_err(|e| format!("Error writing config file: {}", e))?;

            println!("Created config file: {}", config_path.display());
            Ok(())
        }
    }
}
