//! Asset version identifier.
//!
//! Inertia pages carry the server's current asset version so clients can
//! detect stale bundles and force a full reload. Versions are either strings
//! (hashes, timestamps) or integers (sequential deploy numbers) and
//! serialize to JSON as their underlying value:
//!
//! ```
//! use inertia_rs::AssetsVersion;
//!
//! let v = AssetsVersion::new("abc123");
//! assert_eq!(serde_json::json!(v), serde_json::json!("abc123"));
//!
//! let v = AssetsVersion::Integer(42);
//! assert_eq!(serde_json::json!(v), serde_json::json!(42));
//! ```

use std::fmt;

/// A version identifier for the client asset bundle.
///
/// # Creating Versions
///
/// ```
/// use inertia_rs::AssetsVersion;
///
/// let v1 = AssetsVersion::new("abc123");
/// let v2: AssetsVersion = "def456".into();
/// let v3: AssetsVersion = 7.into();
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum AssetsVersion {
    /// String-based version: a manifest hash, commit id, timestamp, …
    String(String),
    /// Integer-based version: a sequential deploy number.
    Integer(i64),
}

impl AssetsVersion {
    /// Create a string version.
    pub fn new(version: impl Into<String>) -> Self {
        AssetsVersion::String(version.into())
    }
}

impl From<&str> for AssetsVersion {
    fn from(value: &str) -> Self {
        AssetsVersion::String(value.to_string())
    }
}

impl From<String> for AssetsVersion {
    fn from(value: String) -> Self {
        AssetsVersion::String(value)
    }
}

impl From<i64> for AssetsVersion {
    fn from(value: i64) -> Self {
        AssetsVersion::Integer(value)
    }
}

impl fmt::Display for AssetsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetsVersion::String(s) => f.write_str(s),
            AssetsVersion::Integer(i) => write!(f, "{}", i),
        }
    }
}
