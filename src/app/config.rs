use serde::Deserialize;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::discovery::models::AssetConfig;
use crate::models::models::{PageTemplates, DEFAULT_NAME};

pub const CONFIG_ENV: &str = "WISHCAST_CONFIG";
pub const CONFIG_FILE: &str = "wishcast.toml";

#[derive(Debug, Clone)]
pub struct WishConfig {
    pub host: String,
    pub port: u16,
    pub assets: AssetConfig,
    pub page: PageSettings,
    pub debug_assets: bool,
}

/// Page text and presentation switches.
#[derive(Debug, Clone, Deserialize)]
pub struct PageSettings {
    #[serde(default = "default_redirect_name")]
    pub redirect_name: String,
    #[serde(flatten)]
    pub templates: PageTemplates,
    #[serde(default = "default_true")]
    pub show_asset_panel: bool,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            redirect_name: default_redirect_name(),
            templates: PageTemplates::default(),
            show_asset_panel: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    assets: AssetsSection,
    #[serde(default)]
    page: PageSettings,
    #[serde(default)]
    debug: DebugSection,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AssetsSection {
    #[serde(default = "default_static_dir")]
    static_dir: PathBuf,
    #[serde(default = "default_video_file")]
    video_file: String,
    #[serde(default = "default_audio_file")]
    audio_file: String,
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            static_dir: default_static_dir(),
            video_file: default_video_file(),
            audio_file: default_audio_file(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DebugSection {
    #[serde(default = "default_true")]
    assets_endpoint: bool,
}

impl Default for DebugSection {
    fn default() -> Self {
        Self {
            assets_endpoint: true,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_video_file() -> String {
    "birthday.mp4".to_string()
}

fn default_audio_file() -> String {
    "bday_song.mp3".to_string()
}

fn default_redirect_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for WishConfig {
    fn default() -> Self {
        Self::from_file_config(FileConfig::default())
    }
}

impl WishConfig {
    /// `WISHCAST_CONFIG` or `./wishcast.toml` if present, else environment
    /// variables over the defaults.
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = config_path() {
            return Self::from_path(&path);
        }
        Ok(Self::from_env())
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let parsed: FileConfig = toml::from_str(contents)?;
        Ok(Self::from_file_config(parsed))
    }

    fn from_file_config(file: FileConfig) -> Self {
        Self {
            host: file.server.host,
            port: file.server.port,
            assets: AssetConfig::under(
                file.assets.static_dir,
                file.assets.video_file,
                file.assets.audio_file,
            ),
            page: file.page,
            debug_assets: file.debug.assets_endpoint,
        }
    }

    fn from_env() -> Self {
        let host = env::var("WISHCAST_HOST").unwrap_or_else(|_| default_host());
        let port = env::var("WISHCAST_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or_else(default_port);
        let static_dir = env::var("WISHCAST_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_static_dir());
        let video_file = env::var("WISHCAST_VIDEO_FILE").unwrap_or_else(|_| default_video_file());
        let audio_file = env::var("WISHCAST_AUDIO_FILE").unwrap_or_else(|_| default_audio_file());
        let redirect_name =
            env::var("WISHCAST_REDIRECT_NAME").unwrap_or_else(|_| default_redirect_name());
        let debug_assets = env::var("WISHCAST_DEBUG_ASSETS")
            .ok()
            .and_then(|value| value.parse::<bool>().ok())
            .unwrap_or(true);

        Self {
            host,
            port,
            assets: AssetConfig::under(static_dir, video_file, audio_file),
            page: PageSettings {
                redirect_name,
                ..PageSettings::default()
            },
            debug_assets,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    let local = Path::new(CONFIG_FILE);
    local.exists().then(|| local.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WishConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.assets.media_dir, PathBuf::from("static/media"));
        assert_eq!(config.assets.audio_dir, PathBuf::from("static/audio"));
        assert_eq!(config.page.redirect_name, "Friend");
        assert!(config.page.show_asset_panel);
        assert!(config.debug_assets);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = WishConfig::from_toml(
            r#"
            [server]
            port = 8080

            [assets]
            static_dir = "/srv/wish"
            video_file = "party.mp4"

            [page]
            redirect_name = "Babai"
            message = "Many happy returns, {name}!"

            [debug]
            assets_endpoint = false
            "#,
        )
        .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.assets.media_dir, PathBuf::from("/srv/wish/media"));
        assert_eq!(config.assets.video_file, "party.mp4");
        assert_eq!(config.assets.audio_file, "bday_song.mp3");
        assert_eq!(config.page.redirect_name, "Babai");
        assert_eq!(config.page.templates.message, "Many happy returns, {name}!");
        assert_eq!(
            config.page.templates.headline,
            PageTemplates::default().headline
        );
        assert!(!config.debug_assets);
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(WishConfig::from_toml("[server]\nport = \"many\"").is_err());
    }
}
