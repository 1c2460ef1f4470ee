//! Error types for configuration and module manifest handling.

use thiserror::Error;

/// Errors that can occur while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing failure.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A dependency has neither an explicit version nor a module path to
    /// resolve one from.
    #[error("dependency {0:?}: no path or version set")]
    MissingDependencyPath(String),

    /// A dependency's module path is not required by the local module.
    #[error("dependency {name:?}: {path} not required by the module manifest")]
    MissingRequirement { name: String, path: String },

    /// A required module carries a version string semver cannot parse.
    #[error("dependency {name:?}: invalid version {version:?}: {source}")]
    InvalidVersion {
        name: String,
        version: String,
        #[source]
        source: semver::Error,
    },
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
