use serde::{Deserialize, Serialize};

/// Extensions the gallery actually lists. Narrower than what
/// [`MediaKind::classify`] recognizes; recognized-but-excluded kinds
/// (gif, webm, ...) stay hidden from the grid.
pub const GALLERY_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "mp4", "mov"];

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm", "3gp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    #[default]
    Unknown,
}

impl MediaKind {
    /// Maps a filename to its media kind from the extension alone.
    ///
    /// Total: empty input and missing/unrecognized extensions all land on
    /// `Unknown`. Matching is case-insensitive on the substring after the
    /// last `.`.
    #[must_use]
    pub fn classify(filename: &str) -> Self {
        if filename.is_empty() {
            return Self::Unknown;
        }

        let extension = filename
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Self::Image
        } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
            Self::Video
        } else {
            Self::Unknown
        }
    }

    #[must_use]
    pub const fn is_image(self) -> bool {
        matches!(self, Self::Image)
    }

    #[must_use]
    pub const fn is_video(self) -> bool {
        matches!(self, Self::Video)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Unknown => "unknown",
        }
    }
}

/// One entry in the gallery grid, built fresh on every listing pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    pub name: String,
    pub uri: String,
    pub kind: MediaKind,
}

impl MediaFile {
    #[must_use]
    pub fn new(document_directory: &str, name: impl Into<String>) -> Self {
        let name = name.into();
        let uri = format!("{document_directory}{name}");
        let kind = MediaKind::classify(&name);
        Self { name, uri, kind }
    }
}

/// True when the filename's extension is in the gallery allow-list.
#[must_use]
pub fn is_gallery_file(name: &str) -> bool {
    let extension = name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    GALLERY_EXTENSIONS.contains(&extension.as_str())
}

/// Builds the gallery listing from a raw directory listing: classify each
/// name, keep only allow-listed extensions, in listing order.
#[must_use]
pub fn gallery_files(document_directory: &str, names: &[String]) -> Vec<MediaFile> {
    names
        .iter()
        .filter(|name| is_gallery_file(name))
        .map(|name| MediaFile::new(document_directory, name.clone()))
        .collect()
}
