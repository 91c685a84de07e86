//! Interactive twin studio.
//!
//! The studio owns one [`Session`] and drives generation requests through a
//! [`RequestSupervisor`]. Every failure is reported at the command boundary
//! and the session stays usable.

mod command;
mod session;

use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use crate::category::{random_inspiration, CINEMATIC_VIBES, MOTION_PRESETS};
use crate::gemini::{GeminiClient, GenerationError};
use crate::media::{extension_for_mime, ReferenceImage};
use crate::supervisor::{RequestSlot, RequestSupervisor};

pub use command::{parse_input, print_prompt, spawn_listener, StudioCommand, HELP_TEXT};
pub use session::{Mode, Session, TwinJob, VideoJob};

/// Errors surfaced to the studio user.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("No reference photo at position {0}")]
    NoSuchReference(usize),

    #[error("No gallery item at position {0}")]
    NoSuchItem(usize),

    #[error("Gallery item {0} is not an image")]
    NotAnImage(usize),

    #[error("Select an image to animate first (/select <n>)")]
    NoImageSelected,

    #[error("Unknown preset '{0}'. Use /presets to list them")]
    UnknownPreset(String),

    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Whether the command loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

async fn next_line(input: &mut Option<&mut UnboundedReceiver<String>>) -> Option<String> {
    match input {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Load reference photos from disk.
pub fn load_references(paths: &[PathBuf]) -> Result<Vec<ReferenceImage>, StudioError> {
    paths
        .iter()
        .map(|path| {
            ReferenceImage::from_path(path).map_err(|source| StudioError::Read {
                path: path.clone(),
                source,
            })
        })
        .collect()
}

pub struct Studio {
    client: GeminiClient,
    supervisor: RequestSupervisor,
    pub session: Session,
    quit_requested: bool,
}

impl Studio {
    pub fn new(client: GeminiClient, supervisor: RequestSupervisor) -> Self {
        Self {
            client,
            supervisor,
            session: Session::new(),
            quit_requested: false,
        }
    }

    pub fn supervisor(&self) -> &RequestSupervisor {
        &self.supervisor
    }

    /// Run the interactive loop until `/quit` or end of input.
    pub async fn run(&mut self, mut input: UnboundedReceiver<String>) {
        println!("Digital twin studio. Type /help for commands.");
        print_prompt(self.session.mode);

        while let Some(line) = input.recv().await {
            match parse_input(&line) {
                Ok(Some(command)) => match self.handle(command, Some(&mut input)).await {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => {
                        println!("Error: {}", e);
                        self.session.last_error = Some(e.to_string());
                    }
                },
                Ok(None) => {}
                Err(message) => println!("{}", message),
            }
            print_prompt(self.session.mode);
        }
        println!();
    }

    /// Execute one command. `input` lets `/cancel` reach a running request.
    pub async fn handle(
        &mut self,
        command: StudioCommand,
        input: Option<&mut UnboundedReceiver<String>>,
    ) -> Result<Flow, StudioError> {
        let session = &mut self.session;
        match command {
            StudioCommand::Mode(mode) => {
                session.mode = mode;
                if mode == Mode::Gallery {
                    self.print_gallery();
                }
            }
            StudioCommand::Add(paths) => {
                let images = load_references(&paths)?;
                let offered = images.len();
                let accepted = session.add_references(images);
                println!(
                    "Added {} photo(s) ({}/4).",
                    accepted,
                    session.references.len()
                );
                if accepted < offered {
                    println!("Only 4 reference photos are allowed; {} ignored.", offered - accepted);
                }
            }
            StudioCommand::Remove(position) => {
                let removed = session.remove_reference(position)?;
                println!("Removed {} ({}/4).", removed.label, session.references.len());
            }
            StudioCommand::Category(category) => {
                session.set_category(category);
                println!("Category: {}", category);
            }
            StudioCommand::Preset(choice) => match session.set_preset(&choice)? {
                Some(preset) => println!("Style/Focus: {}", preset),
                None => println!("Preset cleared."),
            },
            StudioCommand::Details(text) => session.set_details(&text),
            StudioCommand::Inspire => {
                let inspiration = random_inspiration();
                session.set_details(inspiration);
                println!("Details: {}", inspiration);
            }
            StudioCommand::Generate => {
                let result = self.generate(input).await;
                if self.take_quit_request() {
                    return Ok(Flow::Quit);
                }
                let id = result?;
                println!("Twin ready (gallery #1, {}). /animate to bring it to life, /save 1 <path> to export.", id);
            }
            StudioCommand::Select(position) => {
                session.select_for_animation(position)?;
                println!("Selected gallery #{} for animation.", position);
            }
            StudioCommand::Animate(position) => {
                if let Some(position) = position {
                    session.select_for_animation(position)?;
                } else if session.selected.is_none() {
                    session.select_last_result();
                }
                let result = self.animate(input).await;
                if self.take_quit_request() {
                    return Ok(Flow::Quit);
                }
                let id = result?;
                println!("Video ready (gallery #1, {}). Complete!", id);
            }
            StudioCommand::Motion(choice) => match session.set_motion(&choice)? {
                Some(motion) => println!("Motion: {}", motion),
                None => println!("Motion cleared."),
            },
            StudioCommand::Vibe(choice) => match session.set_vibe(&choice)? {
                Some(vibe) => println!("Vibe: {}", vibe),
                None => println!("Vibe cleared."),
            },
            StudioCommand::Gallery(filter) => {
                session.gallery_filter = filter;
                session.mode = Mode::Gallery;
                self.print_gallery();
            }
            StudioCommand::Save(position, path) => {
                let dest = self.save(position, &path)?;
                println!("Saved to {}", dest.display());
            }
            StudioCommand::Presets => self.print_presets(),
            StudioCommand::Status => self.print_status(),
            StudioCommand::Cancel => println!("Nothing to cancel."),
            StudioCommand::Help => println!("{}", HELP_TEXT),
            StudioCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Generate a twin from the current form and add it to the gallery.
    pub async fn generate(
        &mut self,
        input: Option<&mut UnboundedReceiver<String>>,
    ) -> Result<Uuid, StudioError> {
        self.session.last_error = None;
        let job = self.session.twin_job()?;
        let slot = self.supervisor.try_begin("twin image")?;

        println!("Creating your digital twin ({})...", job.label);
        let mut quit = false;
        let media = self
            .drive(&slot, self.client.generate_twin(&job.images, &job.prompt), input, &mut quit)
            .await;
        self.quit_requested |= quit;
        let media = media?;
        drop(slot);

        Ok(self.session.complete_twin(&job, media))
    }

    /// Animate the selected image and add the video to the gallery.
    pub async fn animate(
        &mut self,
        input: Option<&mut UnboundedReceiver<String>>,
    ) -> Result<Uuid, StudioError> {
        self.session.last_error = None;
        let job = self.session.video_job()?;
        let slot = self.supervisor.try_begin("video")?;

        let policy = self.client.poll_policy();
        let video = self.client.generate_video_with_policy(
            &job.image,
            &job.prompt,
            policy,
            slot.token(),
            |status| println!("  {}", status),
        );
        let mut quit = false;
        let media = self.drive(&slot, video, input, &mut quit).await;
        self.quit_requested |= quit;
        let media = media?;
        drop(slot);

        Ok(self.session.complete_video(&job, media))
    }

    /// Await a request while still answering user input.
    ///
    /// `/cancel` cancels the request. `/quit` cancels it and sets `quit`.
    /// Anything else is rejected as busy.
    async fn drive<T, F>(
        &self,
        slot: &RequestSlot,
        request: F,
        mut input: Option<&mut UnboundedReceiver<String>>,
        quit: &mut bool,
    ) -> Result<T, GenerationError>
    where
        F: Future<Output = Result<T, GenerationError>>,
    {
        tokio::pin!(request);
        let mut input_open = input.is_some();

        loop {
            tokio::select! {
                biased;
                _ = slot.token().cancelled() => return Err(GenerationError::Cancelled),
                result = &mut request => return result,
                line = next_line(&mut input), if input_open => match line {
                    Some(line) => *quit |= self.handle_while_busy(&line),
                    None => input_open = false,
                },
            }
        }
    }

    /// Answer one input line while a request runs. Returns true on `/quit`.
    fn handle_while_busy(&self, line: &str) -> bool {
        match parse_input(line) {
            Ok(Some(StudioCommand::Cancel)) => {
                if self.supervisor.cancel_current() {
                    println!("Cancelling...");
                }
                false
            }
            Ok(Some(StudioCommand::Quit)) => {
                self.supervisor.cancel_current();
                println!("Cancelling and quitting...");
                true
            }
            Ok(None) => false,
            _ => {
                println!(
                    "Busy: {} is still running. /cancel to abort.",
                    self.supervisor.current().unwrap_or_else(|| "a request".to_string())
                );
                false
            }
        }
    }

    fn take_quit_request(&mut self) -> bool {
        std::mem::take(&mut self.quit_requested)
    }

    /// Export a gallery item. A path without extension gets one from the MIME type.
    pub fn save(&self, position: usize, path: &Path) -> Result<PathBuf, StudioError> {
        let item = self.session.item_at(position)?;
        let dest = if path.extension().is_none() {
            path.with_extension(extension_for_mime(&item.mime_type))
        } else {
            path.to_path_buf()
        };
        item.export(&dest).map_err(|source| StudioError::Write {
            path: dest.clone(),
            source,
        })?;
        Ok(dest)
    }

    fn print_gallery(&self) {
        let view = self.session.gallery_view();
        if view.is_empty() {
            println!("Gallery is empty.");
            return;
        }
        for (position, item) in view {
            println!(
                "  #{:<3} {:<5} {:<11} {:>9} bytes  {}  {}",
                position,
                item.kind.to_string(),
                item.category.map(|c| c.label()).unwrap_or("-"),
                item.bytes().len(),
                item.created_at.format("%H:%M:%S"),
                item.prompt
            );
        }
    }

    fn print_presets(&self) {
        let (title, presets): (String, &[&str]) = match self.session.mode {
            Mode::Animate => {
                println!("Motion presets:");
                for (i, motion) in MOTION_PRESETS.iter().enumerate() {
                    println!("  {:>2}. {}", i + 1, motion);
                }
                ("Cinematic vibes".to_string(), CINEMATIC_VIBES)
            }
            Mode::Generate | Mode::Gallery => (
                format!("{} presets", self.session.category),
                self.session.category.presets(),
            ),
        };
        println!("{}:", title);
        for (i, preset) in presets.iter().enumerate() {
            println!("  {:>2}. {}", i + 1, preset);
        }
    }

    fn print_status(&self) {
        let s = &self.session;
        println!("Screen:     {}", s.mode);
        println!("Photos:     {}/4", s.references.len());
        for (i, image) in s.references.images().enumerate() {
            println!("  {}. {}", i + 1, image.label);
        }
        println!("Category:   {}", s.category);
        println!("Preset:     {}", s.preset.unwrap_or("-"));
        println!("Details:    {}", if s.details.is_empty() { "-" } else { s.details.as_str() });
        println!(
            "Animate:    {}",
            s.selected_item().map(|i| i.prompt.as_str()).unwrap_or("(no image selected)")
        );
        println!("Motion:     {}", s.motion.unwrap_or("-"));
        println!("Vibe:       {}", s.vibe.unwrap_or("-"));
        println!("Gallery:    {} item(s)", s.gallery.len());
        if let Some(error) = &s.last_error {
            println!("Last error: {}", error);
        }
    }
}
