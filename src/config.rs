//! Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::AssetsVersion;

/// Engine configuration. Every field has a sensible default, so an empty
/// config document is valid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Root HTML template wrapping every first-load response.
    #[serde(default = "default_root_template")]
    pub root_template: PathBuf,

    /// Asset manifest hashed into the version when none is configured.
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,

    /// Fixed asset version. When absent the version is derived from the
    /// manifest file (see [`crate::version::VersionCache`]).
    #[serde(default)]
    pub assets_version: Option<AssetsVersion>,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub ssr: SsrConfig,
}

/// History-tracking defaults applied to every page.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Encrypt client history entries by default.
    #[serde(default)]
    pub encrypt: bool,
}

/// Server-side-rendering gateway settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SsrConfig {
    /// Consult an SSR server on first-load responses.
    #[serde(default)]
    pub enabled: bool,

    /// Render endpoint of the SSR server.
    #[serde(default = "default_ssr_url")]
    pub server_url: String,
}

fn default_root_template() -> PathBuf {
    PathBuf::from("inertia/index.html")
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("build/manifest.json")
}

fn default_ssr_url() -> String {
    "http://127.0.0.1:13714/render".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            root_template: default_root_template(),
            manifest_path: default_manifest_path(),
            assets_version: None,
            history: HistoryConfig::default(),
            ssr: SsrConfig::default(),
        }
    }
}

impl Default for SsrConfig {
    fn default() -> Self {
        SsrConfig {
            enabled: false,
            server_url: default_ssr_url(),
        }
    }
}
