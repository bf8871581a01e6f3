use serde::Serialize;
use std::path::PathBuf;

/// Public locator for a media file, e.g. `/static/media/birthday.mp4`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Reference(String);

impl Reference {
    pub fn new(prefix: &str, file_name: &str) -> Self {
        Self(format!(
            "{}/{}",
            prefix.trim_end_matches('/'),
            urlencoding::encode(file_name)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What the page can show and play.
///
/// When `video` is present it is the displayed medium; `image` is only a
/// fallback for a missing video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetSet {
    pub video: Option<Reference>,
    pub audio: Option<Reference>,
    pub image: Option<Reference>,
}

impl AssetSet {
    /// Image that should actually be displayed, if any.
    pub fn display_image(&self) -> Option<&Reference> {
        match self.video {
            Some(_) => None,
            None => self.image.as_ref(),
        }
    }

    pub fn presence(&self) -> MediaPresence {
        MediaPresence {
            video: self.video.is_some(),
            audio: self.audio.is_some(),
        }
    }
}

/// The part of an [`AssetSet`] the client player cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaPresence {
    pub video: bool,
    pub audio: bool,
}

/// Snapshot of what the server sees on disk, served by `/debug_assets`.
#[derive(Debug, Clone, Serialize)]
pub struct AssetReport {
    pub video_exists: bool,
    pub video_url: Option<Reference>,
    pub audio_exists: bool,
    pub audio_url: Option<Reference>,
    pub media_list: Vec<String>,
    pub audio_list: Vec<String>,
}

/// Which static directory a `/static/...` request addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Media,
    Audio,
}

impl MediaKind {
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "media" => Some(MediaKind::Media),
            "audio" => Some(MediaKind::Audio),
            _ => None,
        }
    }
}

/// Directories and file names the resolver looks for.
#[derive(Debug, Clone)]
pub struct AssetConfig {
    pub static_dir: PathBuf,
    pub media_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub video_file: String,
    pub audio_file: String,
    pub media_prefix: String,
    pub audio_prefix: String,
}

impl AssetConfig {
    /// Standard layout: `<static_dir>/media` and `<static_dir>/audio`,
    /// published under `/static/media` and `/static/audio`.
    pub fn under(
        static_dir: impl Into<PathBuf>,
        video_file: impl Into<String>,
        audio_file: impl Into<String>,
    ) -> Self {
        let static_dir = static_dir.into();
        Self {
            media_dir: static_dir.join("media"),
            audio_dir: static_dir.join("audio"),
            static_dir,
            video_file: video_file.into(),
            audio_file: audio_file.into(),
            media_prefix: "/static/media".to_string(),
            audio_prefix: "/static/audio".to_string(),
        }
    }
}
