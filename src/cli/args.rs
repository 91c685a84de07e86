//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::CategoryArg;

/// Digital twin studio: AI portraits and short videos from reference photos
#[derive(Parser, Debug)]
#[command(name = "twin-studio")]
#[command(version, about = "Generate digital twin images and animate them", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Interactive studio
    twin-studio studio

    # One-shot twin with a hair preset
    twin-studio generate -i me.jpg --category hair --preset \"Sleek Glass Hair Bob\" -o twin.png

    # Animate a twin
    twin-studio animate -i twin.png --motion 2 --vibe \"Golden Hour Sun Flare\"

ENVIRONMENT:
    GEMINI_API_KEY    Required. Your Gemini API key (API_KEY is accepted too).
    RUST_LOG          Log filter, e.g. twin_studio=debug")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive studio (generate, animate and gallery screens)
    Studio,

    /// Generate a digital twin image from 1 to 4 reference photos
    Generate {
        /// Reference photo (repeat up to 4 times)
        #[arg(long = "image", short = 'i', required = true, num_args = 1..)]
        images: Vec<PathBuf>,

        /// Style category
        #[arg(long, default_value = "hair")]
        category: CategoryArg,

        /// Style preset, by name or 1-based index within the category
        #[arg(long, short)]
        preset: Option<String>,

        /// Additional free-text details
        #[arg(long, short)]
        details: Option<String>,

        /// Output file (default: twin-<id>.png in the current directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Animate an image into a short video
    Animate {
        /// Image to animate
        #[arg(long, short)]
        image: PathBuf,

        /// Motion preset, by name or 1-based index
        #[arg(long, short)]
        motion: Option<String>,

        /// Cinematic vibe, by name or 1-based index
        #[arg(long, short)]
        vibe: Option<String>,

        /// Additional free-text details
        #[arg(long, short)]
        details: Option<String>,

        /// Category to file the video under (default: scene)
        #[arg(long)]
        category: Option<CategoryArg>,

        /// Output file (default: twin-<id>.mp4 in the current directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List style, motion and vibe presets
    Presets {
        /// Only list presets of this category
        #[arg(long)]
        category: Option<CategoryArg>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_studio_subcommand() {
        let args = Args::parse_from(["twin-studio", "studio"]);
        assert!(matches!(args.command, Command::Studio));
        assert!(args.config.is_none());
    }

    #[test]
    fn test_args_generate_defaults() {
        let args = Args::parse_from(["twin-studio", "generate", "-i", "me.jpg"]);
        match args.command {
            Command::Generate {
                images,
                category,
                preset,
                details,
                output,
            } => {
                assert_eq!(images, vec![PathBuf::from("me.jpg")]);
                assert_eq!(category, CategoryArg::Hair);
                assert!(preset.is_none());
                assert!(details.is_none());
                assert!(output.is_none());
            }
            _ => panic!("Expected Generate subcommand"),
        }
    }

    #[test]
    fn test_args_generate_multiple_images() {
        let args = Args::parse_from([
            "twin-studio",
            "generate",
            "-i",
            "a.jpg",
            "-i",
            "b.jpg",
            "--category",
            "luxury-cars",
            "--preset",
            "Bugatti Chiron",
        ]);
        match args.command {
            Command::Generate {
                images,
                category,
                preset,
                ..
            } => {
                assert_eq!(images.len(), 2);
                assert_eq!(category, CategoryArg::LuxuryCars);
                assert_eq!(preset.as_deref(), Some("Bugatti Chiron"));
            }
            _ => panic!("Expected Generate subcommand"),
        }
    }

    #[test]
    fn test_args_generate_requires_image() {
        assert!(Args::try_parse_from(["twin-studio", "generate"]).is_err());
    }

    #[test]
    fn test_args_animate() {
        let args = Args::parse_from([
            "twin-studio",
            "animate",
            "--image",
            "twin.png",
            "--motion",
            "2",
            "--vibe",
            "Golden Hour Sun Flare",
        ]);
        match args.command {
            Command::Animate {
                image,
                motion,
                vibe,
                category,
                ..
            } => {
                assert_eq!(image, PathBuf::from("twin.png"));
                assert_eq!(motion.as_deref(), Some("2"));
                assert_eq!(vibe.as_deref(), Some("Golden Hour Sun Flare"));
                assert!(category.is_none());
            }
            _ => panic!("Expected Animate subcommand"),
        }
    }

    #[test]
    fn test_args_global_config_option() {
        let args = Args::parse_from(["twin-studio", "presets", "--config", "/tmp/c.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_args_config_init_subcommand() {
        let args = Args::parse_from(["twin-studio", "config", "init"]);
        match args.command {
            Command::Config {
                action: ConfigAction::Init,
            } => (),
            _ => panic!("Expected Config Init subcommand"),
        }
    }
}
