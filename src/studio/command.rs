//! Studio command input.
//!
//! Reads lines from stdin on a background thread and parses them into
//! [`StudioCommand`] values. Plain text sets the free-text details of the
//! current screen; slash commands drive everything else.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;

use tokio::sync::mpsc;

use crate::category::Category;
use crate::media::GalleryFilter;

use super::session::Mode;

/// Commands understood by the interactive studio.
#[derive(Debug, Clone, PartialEq)]
pub enum StudioCommand {
    /// Switch screen.
    Mode(Mode),
    /// Load reference photos from disk.
    Add(Vec<PathBuf>),
    /// Release the reference photo at a 1-based position.
    Remove(usize),
    Category(Category),
    /// Preset by 1-based index or name, resolved against the current category.
    Preset(String),
    /// Free-text details for the current screen. Empty clears them.
    Details(String),
    /// Fill the details with a random inspiration prompt.
    Inspire,
    /// Generate a twin image from the reference photos.
    Generate,
    /// Pick a gallery image (1-based) for animation.
    Select(usize),
    /// Animate the selected image, optionally selecting one first.
    Animate(Option<usize>),
    Motion(String),
    Vibe(String),
    /// Show the gallery, optionally filtered.
    Gallery(GalleryFilter),
    /// Export a gallery item (1-based) to a file.
    Save(usize, PathBuf),
    Presets,
    Status,
    Cancel,
    Help,
    Quit,
}

pub const HELP_TEXT: &str = "\
Commands:
  /mode <generate|animate|gallery>   switch screen
  /add <path>...                     add reference photos (max 4)
  /remove <n>                        remove reference photo n
  /category <name>                   Hair, Makeup, Nails, Scene, Wardrobe, Luxury Cars, General
  /preset <n|name|none>              pick a style preset for the category
  /details <text>                    free-text details (plain text works too)
  /inspire                           random inspiration for the details
  /generate                          create the digital twin
  /select <n>                        pick gallery image n for animation
  /animate [n]                       animate the selected (or gallery n) image
  /motion <n|name|none>              motion preset
  /vibe <n|name|none>                cinematic vibe
  /gallery [category|all]            list generated media
  /save <n> <path>                   export gallery item n
  /presets                           list presets for the current screen
  /status                            show the current form
  /cancel                            cancel the running request
  /quit                              leave the studio";

/// Parse a line of input.
///
/// # Returns
/// - `Ok(None)` for empty input
/// - `Ok(Some(command))` for valid input
/// - `Err(message)` with a usage hint for malformed commands
pub fn parse_input(input: &str) -> Result<Option<StudioCommand>, String> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.starts_with('/') {
        return parse_command(trimmed).map(Some);
    }

    Ok(Some(StudioCommand::Details(trimmed.to_string())))
}

fn parse_index(arg: Option<&str>, usage: &str) -> Result<usize, String> {
    arg.and_then(|a| a.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .ok_or_else(|| format!("Usage: {}", usage))
}

fn parse_command(input: &str) -> Result<StudioCommand, String> {
    let (name, rest) = match input.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (input, ""),
    };
    let first = rest.split_whitespace().next();

    match name.to_lowercase().as_str() {
        "/mode" => match rest.to_lowercase().as_str() {
            "generate" => Ok(StudioCommand::Mode(Mode::Generate)),
            "animate" => Ok(StudioCommand::Mode(Mode::Animate)),
            "gallery" => Ok(StudioCommand::Mode(Mode::Gallery)),
            _ => Err("Usage: /mode <generate|animate|gallery>".to_string()),
        },
        "/add" => {
            let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
            if paths.is_empty() {
                return Err("Usage: /add <path>...".to_string());
            }
            Ok(StudioCommand::Add(paths))
        }
        "/remove" => parse_index(first, "/remove <n>").map(StudioCommand::Remove),
        "/category" => rest
            .parse::<Category>()
            .map(StudioCommand::Category)
            .map_err(|e| e.to_string()),
        "/preset" => Ok(StudioCommand::Preset(rest.to_string())),
        "/details" => Ok(StudioCommand::Details(rest.to_string())),
        "/inspire" => Ok(StudioCommand::Inspire),
        "/generate" => Ok(StudioCommand::Generate),
        "/select" => parse_index(first, "/select <n>").map(StudioCommand::Select),
        "/animate" => match first {
            None => Ok(StudioCommand::Animate(None)),
            Some(_) => parse_index(first, "/animate [n]").map(|n| StudioCommand::Animate(Some(n))),
        },
        "/motion" => Ok(StudioCommand::Motion(rest.to_string())),
        "/vibe" => Ok(StudioCommand::Vibe(rest.to_string())),
        "/gallery" => {
            if rest.is_empty() || rest.eq_ignore_ascii_case("all") {
                Ok(StudioCommand::Gallery(GalleryFilter::All))
            } else {
                rest.parse::<Category>()
                    .map(|c| StudioCommand::Gallery(GalleryFilter::Category(c)))
                    .map_err(|e| e.to_string())
            }
        }
        "/save" => {
            let index = parse_index(first, "/save <n> <path>")?;
            let path = rest
                .split_once(char::is_whitespace)
                .map(|(_, p)| p.trim())
                .filter(|p| !p.is_empty())
                .ok_or_else(|| "Usage: /save <n> <path>".to_string())?;
            Ok(StudioCommand::Save(index, PathBuf::from(path)))
        }
        "/presets" => Ok(StudioCommand::Presets),
        "/status" => Ok(StudioCommand::Status),
        "/cancel" => Ok(StudioCommand::Cancel),
        "/help" | "/?" => Ok(StudioCommand::Help),
        "/quit" | "/exit" => Ok(StudioCommand::Quit),
        _ => Err(format!("Unknown command: {}. Type /help for commands.", name)),
    }
}

/// Start reading stdin lines on a background thread.
///
/// Lines are forwarded unparsed so the caller can decide how to treat them
/// while a request is running. The channel closes on EOF.
pub fn spawn_listener() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(input) => {
                    if tx.send(input).is_err() {
                        break; // Channel closed
                    }
                }
                Err(_) => break, // EOF or read error
            }
        }
    });

    rx
}

/// Print the input prompt for the given screen.
pub fn print_prompt(mode: Mode) {
    print!("{}> ", mode);
    let _ = io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_ignored() {
        assert_eq!(parse_input(""), Ok(None));
        assert_eq!(parse_input("   \t"), Ok(None));
    }

    #[test]
    fn test_plain_text_sets_details() {
        assert_eq!(
            parse_input("  soft golden light  "),
            Ok(Some(StudioCommand::Details("soft golden light".to_string())))
        );
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_input("/mode animate"), Ok(Some(StudioCommand::Mode(Mode::Animate))));
        assert_eq!(parse_input("/MODE Gallery"), Ok(Some(StudioCommand::Mode(Mode::Gallery))));
        assert!(parse_input("/mode sideways").is_err());
    }

    #[test]
    fn test_parse_add_paths() {
        assert_eq!(
            parse_input("/add a.jpg b.png"),
            Ok(Some(StudioCommand::Add(vec![PathBuf::from("a.jpg"), PathBuf::from("b.png")])))
        );
        assert!(parse_input("/add").is_err());
    }

    #[test]
    fn test_parse_indices_are_one_based() {
        assert_eq!(parse_input("/remove 2"), Ok(Some(StudioCommand::Remove(2))));
        assert!(parse_input("/remove 0").is_err());
        assert!(parse_input("/remove x").is_err());
        assert_eq!(parse_input("/animate"), Ok(Some(StudioCommand::Animate(None))));
        assert_eq!(parse_input("/animate 3"), Ok(Some(StudioCommand::Animate(Some(3)))));
    }

    #[test]
    fn test_parse_category_with_space() {
        assert_eq!(
            parse_input("/category Luxury Cars"),
            Ok(Some(StudioCommand::Category(Category::LuxuryCars)))
        );
        assert!(parse_input("/category Shoes").is_err());
    }

    #[test]
    fn test_parse_gallery_filter() {
        assert_eq!(
            parse_input("/gallery"),
            Ok(Some(StudioCommand::Gallery(GalleryFilter::All)))
        );
        assert_eq!(
            parse_input("/gallery nails"),
            Ok(Some(StudioCommand::Gallery(GalleryFilter::Category(Category::Nails))))
        );
    }

    #[test]
    fn test_parse_save() {
        assert_eq!(
            parse_input("/save 1 out/my twin.png"),
            Ok(Some(StudioCommand::Save(1, PathBuf::from("out/my twin.png"))))
        );
        assert!(parse_input("/save 1").is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_input("/teleport").unwrap_err();
        assert!(err.contains("Unknown command: /teleport"));
    }
}
