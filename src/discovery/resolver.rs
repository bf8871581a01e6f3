use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::discovery::models::{AssetConfig, AssetReport, AssetSet, MediaKind, Reference};

const FALLBACK_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Looks at the static directories and works out which media the page can use.
///
/// Every call goes to the filesystem; nothing is cached, so files dropped in
/// while the server runs are picked up by the next request.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    config: AssetConfig,
}

impl AssetResolver {
    pub fn new(config: AssetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    /// Resolve the video, audio and fallback image references.
    ///
    /// Missing files are absent references, never errors.
    pub async fn resolve(&self) -> AssetSet {
        let video = self.video_reference().await;
        let audio = self.audio_reference().await;
        let image = self.fallback_image().await;

        debug!(
            video = video.as_ref().map(Reference::as_str),
            audio = audio.as_ref().map(Reference::as_str),
            image = image.as_ref().map(Reference::as_str),
            "resolved assets"
        );

        AssetSet { video, audio, image }
    }

    /// What the server currently sees on disk.
    pub async fn inspect(&self) -> AssetReport {
        let video_url = self.video_reference().await;
        let audio_url = self.audio_reference().await;

        AssetReport {
            video_exists: video_url.is_some(),
            video_url,
            audio_exists: audio_url.is_some(),
            audio_url,
            media_list: list_dir(&self.config.media_dir).await.unwrap_or_default(),
            audio_list: list_dir(&self.config.audio_dir).await.unwrap_or_default(),
        }
    }

    /// Create the static, media and audio directories if they are missing.
    pub async fn ensure_directories(&self) -> Result<()> {
        for dir in [
            &self.config.static_dir,
            &self.config.media_dir,
            &self.config.audio_dir,
        ] {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }

    /// Log each directory together with what it holds.
    pub async fn log_inventory(&self) {
        info!("Static dir: {}", self.config.static_dir.display());
        for dir in [&self.config.media_dir, &self.config.audio_dir] {
            let contents = list_dir(dir).await.unwrap_or_default();
            info!("{} contains: {:?}", dir.display(), contents);
        }
    }

    /// Map a public `/static/{media,audio}/<file>` request onto the disk.
    ///
    /// Only bare file names are accepted.
    pub fn locate(&self, kind: MediaKind, file_name: &str) -> Option<PathBuf> {
        if !is_bare_file_name(file_name) {
            return None;
        }
        let dir = match kind {
            MediaKind::Media => &self.config.media_dir,
            MediaKind::Audio => &self.config.audio_dir,
        };
        Some(dir.join(file_name))
    }

    async fn video_reference(&self) -> Option<Reference> {
        let path = self.config.media_dir.join(&self.config.video_file);
        is_file(&path)
            .await
            .then(|| Reference::new(&self.config.media_prefix, &self.config.video_file))
    }

    async fn audio_reference(&self) -> Option<Reference> {
        let path = self.config.audio_dir.join(&self.config.audio_file);
        is_file(&path)
            .await
            .then(|| Reference::new(&self.config.audio_prefix, &self.config.audio_file))
    }

    /// First qualifying image in lexical order, so the pick does not depend
    /// on the platform's directory enumeration order.
    async fn fallback_image(&self) -> Option<Reference> {
        let names = match list_dir(&self.config.media_dir).await {
            Ok(names) => names,
            Err(e) => {
                debug!("Media dir unreadable, no fallback image: {e}");
                return None;
            }
        };

        for name in names.into_iter().filter(|n| is_fallback_image(n)) {
            if is_file(&self.config.media_dir.join(&name)).await {
                return Some(Reference::new(&self.config.media_prefix, &name));
            }
        }
        None
    }
}

/// Whether `name` ends in `.jpg`, `.jpeg` or `.png`, ignoring case.
pub fn is_fallback_image(name: &str) -> bool {
    let Some((_, ext)) = name.rsplit_once('.') else {
        return false;
    };
    FALLBACK_IMAGE_EXTENSIONS
        .iter()
        .any(|candidate| ext.eq_ignore_ascii_case(candidate))
}

fn is_bare_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Entry names of `dir`, sorted.
async fn list_dir(dir: &Path) -> io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_resolver() -> (AssetResolver, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = AssetConfig::under(temp_dir.path().join("static"), "wish.mp4", "song.mp3");
        (AssetResolver::new(config), temp_dir)
    }

    async fn touch(dir: &Path, name: &str) {
        tokio::fs::create_dir_all(dir).await.unwrap();
        tokio::fs::write(dir.join(name), b"x").await.unwrap();
    }

    #[test]
    fn test_fallback_image_extensions() {
        assert!(is_fallback_image("cake.jpg"));
        assert!(is_fallback_image("cake.JPEG"));
        assert!(is_fallback_image("Cake.Png"));
        assert!(!is_fallback_image("cake.gif"));
        assert!(!is_fallback_image("cake.jpg.txt"));
        assert!(!is_fallback_image("png"));
    }

    #[tokio::test]
    async fn test_missing_directories_resolve_to_nothing() {
        let (resolver, _tmp) = create_test_resolver();
        assert_eq!(resolver.resolve().await, AssetSet::default());

        let report = resolver.inspect().await;
        assert!(!report.video_exists);
        assert!(report.media_list.is_empty());
        assert!(report.audio_list.is_empty());
    }

    #[tokio::test]
    async fn test_video_and_audio_found_by_exact_name() {
        let (resolver, _tmp) = create_test_resolver();
        resolver.ensure_directories().await.unwrap();
        touch(&resolver.config().media_dir, "wish.mp4").await;
        touch(&resolver.config().audio_dir, "song.mp3").await;
        touch(&resolver.config().audio_dir, "other.mp3").await;

        let assets = resolver.resolve().await;
        assert_eq!(assets.video.unwrap().as_str(), "/static/media/wish.mp4");
        assert_eq!(assets.audio.unwrap().as_str(), "/static/audio/song.mp3");
        assert!(assets.image.is_none());
    }

    #[tokio::test]
    async fn test_fallback_image_is_lexically_first() {
        let (resolver, _tmp) = create_test_resolver();
        let media = resolver.config().media_dir.clone();
        touch(&media, "notes.txt").await;
        touch(&media, "zebra.png").await;
        touch(&media, "balloons.JPG").await;
        touch(&media, "cake.jpeg").await;

        let assets = resolver.resolve().await;
        assert!(assets.video.is_none());
        assert_eq!(assets.image.unwrap().as_str(), "/static/media/balloons.JPG");
    }

    #[tokio::test]
    async fn test_directory_named_like_an_image_is_skipped() {
        let (resolver, _tmp) = create_test_resolver();
        let media = resolver.config().media_dir.clone();
        tokio::fs::create_dir_all(media.join("a.png")).await.unwrap();
        touch(&media, "b.png").await;

        let assets = resolver.resolve().await;
        assert_eq!(assets.image.unwrap().as_str(), "/static/media/b.png");
    }

    #[tokio::test]
    async fn test_inspect_tracks_filesystem_changes() {
        let (resolver, _tmp) = create_test_resolver();
        resolver.ensure_directories().await.unwrap();
        assert!(!resolver.inspect().await.video_exists);

        touch(&resolver.config().media_dir, "wish.mp4").await;
        let report = resolver.inspect().await;
        assert!(report.video_exists);
        assert_eq!(report.media_list, vec!["wish.mp4".to_string()]);

        tokio::fs::remove_file(resolver.config().media_dir.join("wish.mp4"))
            .await
            .unwrap();
        let report = resolver.inspect().await;
        assert!(!report.video_exists);
        assert!(report.video_url.is_none());
    }

    #[test]
    fn test_locate_rejects_paths() {
        let (resolver, _tmp) = create_test_resolver();
        assert!(resolver.locate(MediaKind::Media, "../secret").is_none());
        assert!(resolver.locate(MediaKind::Audio, "..").is_none());
        assert!(resolver.locate(MediaKind::Audio, "").is_none());
        assert_eq!(
            resolver.locate(MediaKind::Audio, "song.mp3"),
            Some(resolver.config().audio_dir.join("song.mp3"))
        );
    }
}
