//! Studio session state: the form fields of each screen plus the gallery.

use std::fmt;

use uuid::Uuid;

use crate::category::{resolve_choice, Category, CINEMATIC_VIBES, MOTION_PRESETS};
use crate::gemini::{GeneratedMedia, GenerationError};
use crate::media::{
    GalleryFilter, MediaItem, MediaKind, MediaStore, ReferenceImage, ReferenceSet,
    MAX_REFERENCE_IMAGES,
};
use crate::prompt::{compose_twin_prompt, compose_video_prompt, gallery_label};

use super::StudioError;

/// Screen the studio is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Generate,
    Animate,
    Gallery,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Generate => write!(f, "generate"),
            Mode::Animate => write!(f, "animate"),
            Mode::Gallery => write!(f, "gallery"),
        }
    }
}

/// Inputs of one twin image request.
#[derive(Debug, Clone)]
pub struct TwinJob {
    pub images: Vec<ReferenceImage>,
    pub prompt: String,
    pub label: String,
    pub category: Category,
}

/// Inputs of one animation request.
#[derive(Debug, Clone)]
pub struct VideoJob {
    pub image: ReferenceImage,
    pub prompt: String,
    pub category: Category,
}

fn is_clear(input: &str) -> bool {
    let input = input.trim();
    input.is_empty() || input.eq_ignore_ascii_case("none")
}

/// All mutable state of one studio session. Nothing outlives the process.
#[derive(Debug, Default)]
pub struct Session {
    pub mode: Mode,
    pub references: ReferenceSet,
    pub category: Category,
    pub preset: Option<&'static str>,
    pub details: String,
    pub motion: Option<&'static str>,
    pub vibe: Option<&'static str>,
    pub video_details: String,
    pub selected: Option<Uuid>,
    pub last_result: Option<Uuid>,
    pub last_error: Option<String>,
    pub gallery: MediaStore,
    pub gallery_filter: GalleryFilter,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add reference photos; returns how many fit into the free slots.
    pub fn add_references(&mut self, images: Vec<ReferenceImage>) -> usize {
        let accepted = self.references.add_many(images).len();
        if accepted > 0 {
            self.last_result = None;
        }
        accepted
    }

    /// Remove the reference photo at a 1-based position.
    pub fn remove_reference(&mut self, position: usize) -> Result<ReferenceImage, StudioError> {
        position
            .checked_sub(1)
            .and_then(|i| self.references.remove(i))
            .map(|(_, image)| image)
            .ok_or(StudioError::NoSuchReference(position))
    }

    /// Change category. The preset belongs to the old category and is cleared.
    pub fn set_category(&mut self, category: Category) {
        if self.category != category {
            self.preset = None;
        }
        self.category = category;
    }

    pub fn set_preset(&mut self, input: &str) -> Result<Option<&'static str>, StudioError> {
        if is_clear(input) {
            self.preset = None;
            return Ok(None);
        }
        let preset = resolve_choice(self.category.presets(), input)
            .ok_or_else(|| StudioError::UnknownPreset(input.trim().to_string()))?;
        self.preset = Some(preset);
        Ok(self.preset)
    }

    pub fn set_motion(&mut self, input: &str) -> Result<Option<&'static str>, StudioError> {
        self.motion = if is_clear(input) {
            None
        } else {
            Some(
                resolve_choice(MOTION_PRESETS, input)
                    .ok_or_else(|| StudioError::UnknownPreset(input.trim().to_string()))?,
            )
        };
        Ok(self.motion)
    }

    pub fn set_vibe(&mut self, input: &str) -> Result<Option<&'static str>, StudioError> {
        self.vibe = if is_clear(input) {
            None
        } else {
            Some(
                resolve_choice(CINEMATIC_VIBES, input)
                    .ok_or_else(|| StudioError::UnknownPreset(input.trim().to_string()))?,
            )
        };
        Ok(self.vibe)
    }

    /// Set free-text details for the current screen.
    pub fn set_details(&mut self, text: &str) {
        let text = text.trim().to_string();
        match self.mode {
            Mode::Animate => self.video_details = text,
            Mode::Generate | Mode::Gallery => self.details = text,
        }
    }

    /// Build the twin request from the current form.
    pub fn twin_job(&self) -> Result<TwinJob, StudioError> {
        if self.references.is_empty() {
            return Err(GenerationError::InvalidImageCount {
                count: 0,
                max: MAX_REFERENCE_IMAGES,
            }
            .into());
        }

        Ok(TwinJob {
            images: self.references.to_vec(),
            prompt: compose_twin_prompt(self.category, self.preset, Some(&self.details)),
            label: gallery_label(self.preset, Some(&self.details)),
            category: self.category,
        })
    }

    /// Record a generated twin image in the gallery.
    pub fn complete_twin(&mut self, job: &TwinJob, media: GeneratedMedia) -> Uuid {
        let item = MediaItem::new(
            MediaKind::Image,
            media.bytes,
            media.mime_type,
            job.label.clone(),
            Some(job.category),
        );
        let id = item.id;
        self.gallery.push(item);
        self.last_result = Some(id);
        id
    }

    /// Gallery item at a 1-based position (most recent first).
    pub fn item_at(&self, position: usize) -> Result<&MediaItem, StudioError> {
        position
            .checked_sub(1)
            .and_then(|i| self.gallery.items().get(i))
            .ok_or(StudioError::NoSuchItem(position))
    }

    /// Pick a gallery image for animation and switch to the animate screen.
    pub fn select_for_animation(&mut self, position: usize) -> Result<Uuid, StudioError> {
        let item = self.item_at(position)?;
        if item.kind != MediaKind::Image {
            return Err(StudioError::NotAnImage(position));
        }
        let id = item.id;
        self.selected = Some(id);
        self.mode = Mode::Animate;
        Ok(id)
    }

    /// Select the most recent result, as the "animate this" shortcut after generating.
    pub fn select_last_result(&mut self) -> Option<Uuid> {
        let id = self.last_result?;
        self.selected = Some(id);
        self.mode = Mode::Animate;
        Some(id)
    }

    pub fn selected_item(&self) -> Option<&MediaItem> {
        self.selected.and_then(|id| self.gallery.get(id))
    }

    /// Build the animation request from the selected image and current form.
    pub fn video_job(&self) -> Result<VideoJob, StudioError> {
        let item = self.selected_item().ok_or(StudioError::NoImageSelected)?;
        Ok(VideoJob {
            image: ReferenceImage::from(item),
            prompt: compose_video_prompt(self.motion, self.vibe, Some(&self.video_details)),
            category: item.category.unwrap_or(Category::Scene),
        })
    }

    /// Record a generated video in the gallery.
    pub fn complete_video(&mut self, job: &VideoJob, media: GeneratedMedia) -> Uuid {
        let item = MediaItem::new(
            MediaKind::Video,
            media.bytes,
            media.mime_type,
            job.prompt.clone(),
            Some(job.category),
        );
        let id = item.id;
        self.gallery.push(item);
        self.last_result = Some(id);
        id
    }

    /// Gallery entries visible under the current filter, with their 1-based positions.
    pub fn gallery_view(&self) -> Vec<(usize, &MediaItem)> {
        self.gallery
            .items()
            .iter()
            .enumerate()
            .filter(|(_, item)| self.gallery_filter.matches(item))
            .map(|(i, item)| (i + 1, item))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(label: &str) -> ReferenceImage {
        ReferenceImage::new(vec![1, 2, 3], "image/jpeg", label)
    }

    fn png(bytes: &[u8]) -> GeneratedMedia {
        GeneratedMedia {
            bytes: bytes.to_vec(),
            mime_type: "image/png".to_string(),
        }
    }

    #[test]
    fn test_twin_job_requires_references() {
        let session = Session::new();
        assert!(matches!(
            session.twin_job(),
            Err(StudioError::Generation(GenerationError::InvalidImageCount { count: 0, .. }))
        ));
    }

    #[test]
    fn test_twin_job_composes_prompt_and_label() {
        let mut session = Session::new();
        session.add_references(vec![reference("me.jpg")]);
        session.set_category(Category::Hair);
        session.set_preset("Sleek Glass Hair Bob").unwrap();

        let job = session.twin_job().unwrap();
        assert_eq!(job.prompt, "Category: Hair. Style/Focus: Sleek Glass Hair Bob. ");
        assert_eq!(job.label, "Sleek Glass Hair Bob");
        assert_eq!(job.images.len(), 1);
    }

    #[test]
    fn test_category_change_clears_preset() {
        let mut session = Session::new();
        session.set_preset("2").unwrap();
        assert_eq!(session.preset, Some("Sleek Glass Hair Bob"));

        session.set_category(Category::Hair);
        assert!(session.preset.is_some());

        session.set_category(Category::Nails);
        assert!(session.preset.is_none());
        assert!(matches!(
            session.set_preset("Sleek Glass Hair Bob"),
            Err(StudioError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_details_follow_mode() {
        let mut session = Session::new();
        session.set_details("editorial");
        session.mode = Mode::Animate;
        session.set_details("slow spin");
        assert_eq!(session.details, "editorial");
        assert_eq!(session.video_details, "slow spin");
    }

    #[test]
    fn test_complete_twin_then_animate() {
        let mut session = Session::new();
        session.add_references(vec![reference("a")]);
        session.set_category(Category::Makeup);
        let job = session.twin_job().unwrap();
        let id = session.complete_twin(&job, png(b"twin"));
        assert_eq!(session.gallery.len(), 1);

        assert_eq!(session.select_last_result(), Some(id));
        assert_eq!(session.mode, Mode::Animate);
        session.set_motion("Walking confidently towards camera").unwrap();
        session.set_vibe("1").unwrap();

        let video = session.video_job().unwrap();
        assert_eq!(
            video.prompt,
            "Walking confidently towards camera, Golden Hour Sun Flare lighting and atmosphere"
        );
        assert_eq!(video.category, Category::Makeup);
        assert_eq!(&*video.image.bytes, b"twin");

        session.complete_video(
            &video,
            GeneratedMedia {
                bytes: b"mp4".to_vec(),
                mime_type: "video/mp4".to_string(),
            },
        );
        assert_eq!(session.gallery.items()[0].kind, MediaKind::Video);
        assert_eq!(session.gallery.items()[0].category, Some(Category::Makeup));
    }

    #[test]
    fn test_video_job_requires_selection() {
        let session = Session::new();
        assert!(matches!(session.video_job(), Err(StudioError::NoImageSelected)));
    }

    #[test]
    fn test_videos_cannot_be_selected_for_animation() {
        let mut session = Session::new();
        session.gallery.push(MediaItem::new(MediaKind::Video, vec![0], "video/mp4", "v", None));
        assert!(matches!(session.select_for_animation(1), Err(StudioError::NotAnImage(1))));
        assert!(matches!(session.select_for_animation(2), Err(StudioError::NoSuchItem(2))));
    }

    #[test]
    fn test_remove_reference_positions() {
        let mut session = Session::new();
        session.add_references(vec![reference("a"), reference("b")]);
        assert_eq!(session.remove_reference(2).unwrap().label, "b");
        assert!(matches!(session.remove_reference(0), Err(StudioError::NoSuchReference(0))));
        assert!(matches!(session.remove_reference(5), Err(StudioError::NoSuchReference(5))));
        assert_eq!(session.references.len(), 1);
    }

    #[test]
    fn test_gallery_view_keeps_global_positions() {
        let mut session = Session::new();
        session.gallery.push(MediaItem::new(MediaKind::Image, vec![0], "image/png", "hair", Some(Category::Hair)));
        session.gallery.push(MediaItem::new(MediaKind::Image, vec![1], "image/png", "nails", Some(Category::Nails)));
        session.gallery_filter = GalleryFilter::Category(Category::Hair);

        let view = session.gallery_view();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].0, 2);
        assert_eq!(view[0].1.prompt, "hair");
    }

    #[test]
    fn test_motion_none_clears() {
        let mut session = Session::new();
        session.set_motion("3").unwrap();
        assert!(session.motion.is_some());
        session.set_motion("none").unwrap();
        assert!(session.motion.is_none());
    }
}
