//! Ephemeral media store for reference images and generated results.
//!
//! Nothing here is persisted. Blob handles live as long as the process.

use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::category::Category;

/// Maximum number of reference photos per generation request.
pub const MAX_REFERENCE_IMAGES: usize = 4;

/// Guess an image MIME type from a file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}

/// File extension to use when exporting a payload of the given MIME type.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/jpeg" => "jpg",
        "video/webm" => "webm",
        m if m.starts_with("video/") => "mp4",
        _ => "bin",
    }
}

/// A reference photo to send along with a generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceImage {
    pub bytes: Arc<[u8]>,
    pub mime_type: String,
    pub label: String,
}

impl ReferenceImage {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
            label: label.into(),
        }
    }

    /// Read a reference photo from disk.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(bytes, mime_for_path(path), label))
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

impl From<&MediaItem> for ReferenceImage {
    fn from(item: &MediaItem) -> Self {
        let MediaLocation::Blob(bytes) = &item.location;
        Self {
            bytes: Arc::clone(bytes),
            mime_type: item.mime_type.clone(),
            label: item.prompt.clone(),
        }
    }
}

/// Handle to a reference image slot. Handles are never reissued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReferenceHandle(u64);

impl ReferenceHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// The active set of up to [`MAX_REFERENCE_IMAGES`] reference photos.
#[derive(Debug, Default)]
pub struct ReferenceSet {
    entries: Vec<(ReferenceHandle, ReferenceImage)>,
    next_handle: u64,
}

impl ReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn remaining_slots(&self) -> usize {
        MAX_REFERENCE_IMAGES - self.entries.len()
    }

    /// Add images until the set is full. Returns the handles of the accepted
    /// images; images beyond the free slots are dropped.
    pub fn add_many<I>(&mut self, images: I) -> Vec<ReferenceHandle>
    where
        I: IntoIterator<Item = ReferenceImage>,
    {
        let remaining = self.remaining_slots();
        images
            .into_iter()
            .take(remaining)
            .map(|image| {
                let handle = ReferenceHandle(self.next_handle);
                self.next_handle += 1;
                self.entries.push((handle, image));
                handle
            })
            .collect()
    }

    /// Remove and release the image at `index`.
    pub fn remove(&mut self, index: usize) -> Option<(ReferenceHandle, ReferenceImage)> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn handles(&self) -> impl Iterator<Item = ReferenceHandle> + '_ {
        self.entries.iter().map(|(h, _)| *h)
    }

    pub fn images(&self) -> impl Iterator<Item = &ReferenceImage> {
        self.entries.iter().map(|(_, image)| image)
    }

    /// Snapshot of the images for one request.
    pub fn to_vec(&self) -> Vec<ReferenceImage> {
        self.images().cloned().collect()
    }
}

/// Kind of generated media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Session-scoped address of a media payload.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaLocation {
    Blob(Arc<[u8]>),
}

impl MediaLocation {
    pub fn bytes(&self) -> &[u8] {
        match self {
            MediaLocation::Blob(bytes) => bytes,
        }
    }
}

/// A generated image or video. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub id: Uuid,
    pub kind: MediaKind,
    pub location: MediaLocation,
    pub mime_type: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
    pub category: Option<Category>,
}

impl MediaItem {
    pub fn new(
        kind: MediaKind,
        bytes: Vec<u8>,
        mime_type: impl Into<String>,
        prompt: impl Into<String>,
        category: Option<Category>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            location: MediaLocation::Blob(bytes.into()),
            mime_type: mime_type.into(),
            prompt: prompt.into(),
            created_at: Utc::now(),
            category,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        self.location.bytes()
    }

    /// `data:` URL for embedding the payload.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(self.bytes()))
    }

    /// Write the payload to `dest`, creating parent directories.
    pub fn export(&self, dest: &Path) -> std::io::Result<()> {
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(dest, self.bytes())
    }
}

/// Gallery tab selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GalleryFilter {
    #[default]
    All,
    Category(Category),
}

impl GalleryFilter {
    pub fn matches(&self, item: &MediaItem) -> bool {
        match self {
            GalleryFilter::All => true,
            GalleryFilter::Category(c) => item.category == Some(*c),
        }
    }
}

/// Append-only gallery, most recent first.
#[derive(Debug, Default)]
pub struct MediaStore {
    items: Vec<MediaItem>,
}

impl MediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: MediaItem) {
        log::debug!("Stored {} {} ({} bytes)", item.kind, item.id, item.bytes().len());
        self.items.insert(0, item);
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn get(&self, id: Uuid) -> Option<&MediaItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn filter(&self, filter: GalleryFilter) -> impl Iterator<Item = &MediaItem> {
        self.items.iter().filter(move |item| filter.matches(item))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
