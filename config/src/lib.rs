#[macro_use]
extern crate tracing;

use color_eyre::Result;
use eyre::Context as _;
use serde::{
    Deserialize,
    Serialize,
};
use std::path::{
    Path,
    PathBuf,
};

/// The legacy room path used by the original deployment.
pub const LEGACY_ROOM_PATH: &str = "/ng/";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Path prefix below which rooms live.
    pub room_path: String,
    /// Entry page to redirect to when the environment lacks the required
    /// real-time media capabilities.
    pub entry_path: String,
    pub production: bool,
    pub show_invitation: bool,
    pub show_invitation_hint: bool,
    pub show_fullscreen: bool,
    pub show_settings: bool,
    pub show_share: bool,
    pub show_chat: bool,
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

impl Default for ClientConfig {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl ClientConfig {
    /// Load the configuration, layering an optional overlay file over the
    /// embedded defaults.
    pub fn load(overlay: Option<PathBuf>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml));

        if let Some(path) = overlay {
            debug!(?path, "loading config overlay");
            let source = config::File::from(path).format(config::FileFormat::Yaml).required(false);
            builder = builder.add_source(source);
        }

        builder.build()?.try_deserialize()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path, content).wrap_err_with(|| format!("Failed to write config to {:?}", path))
    }

    /// The original deployment served rooms below `/ng/` and additionally
    /// accepted the `/ngs/` form. Room resolution treats that prefix
    /// specially.
    pub fn is_legacy_room_path(&self) -> bool {
        self.room_path == LEGACY_ROOM_PATH
    }

    /// The room path without a trailing slash, the target of address
    /// rewrites when no room is active.
    pub fn bare_room_path(&self) -> String {
        if self.room_path == "/" {
            "/".to_string()
        } else {
            self.room_path.trim_end_matches('/').to_string()
        }
    }
}
