//! Asset version resolution.
//!
//! The protocol stamps every page with the server's current asset version so
//! clients can detect stale bundles. The version is, in order of precedence:
//!
//! 1. whatever was stored with [`VersionCache::set_version`],
//! 2. the configured fixed version,
//! 3. the SHA-256 hex digest of the asset manifest file,
//! 4. the literal `"1"` when the manifest is missing (logged once per
//!    compute, never an error — a missing manifest is a dev-mode fact of
//!    life, not a render failure).

use std::path::PathBuf;

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::types::AssetsVersion;

/// Process-wide cache of the current asset version.
#[derive(Debug)]
pub struct VersionCache {
    manifest_path: PathBuf,
    cached: RwLock<Option<AssetsVersion>>,
}

impl VersionCache {
    /// Create a cache over `manifest_path`, pre-seeded with a configured
    /// version when one is given.
    pub fn new(manifest_path: impl Into<PathBuf>, configured: Option<AssetsVersion>) -> Self {
        VersionCache {
            manifest_path: manifest_path.into(),
            cached: RwLock::new(configured),
        }
    }

    /// Build a cache from the application config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.manifest_path, config.assets_version.clone())
    }

    /// The current asset version, computing and caching it on first use.
    pub async fn version(&self) -> AssetsVersion {
        if let Some(version) = self.cached.read().await.clone() {
            return version;
        }

        let version = self.compute_from_manifest().await;
        *self.cached.write().await = Some(version.clone());
        version
    }

    /// Override the cached version, e.g. after a hot deploy.
    pub async fn set_version(&self, version: AssetsVersion) {
        *self.cached.write().await = Some(version);
    }

    async fn compute_from_manifest(&self) -> AssetsVersion {
        match tokio::fs::read(&self.manifest_path).await {
            Ok(bytes) => {
                let mut hasher = Sha256::new();
                hasher.update(&bytes);
                AssetsVersion::String(format!("{:x}", hasher.finalize()))
            }
            Err(err) => {
                tracing::warn!(
                    "asset manifest not readable at {}: {}. Falling back to version \"1\"",
                    self.manifest_path.display(),
                    err
                );
                AssetsVersion::new("1")
            }
        }
    }
}
