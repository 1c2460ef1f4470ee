//! The local module manifest: the scanned codebase's own module path and its
//! required modules.
//!
//! This is the language-neutral stand-in for the source tree's dependency
//! manifest. It tells the classifier which packages are local and supplies
//! version strings for dependencies declared without one.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The default manifest filename next to `kure.toml`.
pub const MANIFEST_FILE: &str = "module.toml";

/// A module the scanned codebase requires, with its resolved version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub path: String,
    pub version: String,
}

/// The local module descriptor.
///
/// # Example TOML
///
/// ```toml
/// module = "example.dev/guestbook"
/// language = "1.22"
///
/// [[require]]
/// path = "k8s.io/apimachinery"
/// version = "v0.29.2"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleManifest {
    /// The module path all local packages live under.
    pub module: String,
    /// Source language version, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Required modules, name → version.
    #[serde(default)]
    pub require: Vec<Requirement>,
}

impl ModuleManifest {
    /// Loads a manifest from a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`](crate::ConfigError::Io) if the file cannot be
    /// read, [`ConfigError::Toml`](crate::ConfigError::Toml) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Returns `true` when `package` lives inside the local module.
    pub fn is_local(&self, package: &str) -> bool {
        within_module(&self.module, package)
    }

    /// Finds the required module a package path belongs to.
    pub fn requirement(&self, package: &str) -> Option<&Requirement> {
        self.require
            .iter()
            .find(|req| within_module(&req.path, package))
    }

    /// Looks up a requirement by its exact module path.
    pub fn required_version(&self, module_path: &str) -> Option<&str> {
        self.require
            .iter()
            .find(|req| req.path == module_path)
            .map(|req| req.version.as_str())
    }
}

/// Returns `true` when `package` equals `module` or lives under it.
pub fn within_module(module: &str, package: &str) -> bool {
    package == module || package.starts_with(&format!("{module}/"))
}
