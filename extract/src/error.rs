//! Error types for the extraction engine.
//!
//! Every stage adds one layer of context (the definition, field, or
//! group-version it was working on) and propagates the underlying cause
//! unchanged.

use thiserror::Error;

/// Errors that can occur during translation, merging, or bundling.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// File I/O failure while loading package models or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A type construct the translator does not support.
    #[error("unimplemented type: {0}")]
    UnsupportedType(String),

    /// A map key type other than a string.
    #[error("map keys must be strings, not {0}")]
    InvalidMapKey(String),

    /// An inline struct field whose type is not a named type.
    #[error("an inline field must be a named type")]
    InlineFieldNotNamed,

    /// A resource struct with inherited parents.
    #[error("resources cannot have inline fields")]
    ResourceWithParents,

    /// A malformed `kubebuilder:validation:Enum` marker value.
    #[error("invalid Enum marker: {0}")]
    InvalidEnumMarker(String),

    /// A referenced package with no export or extern declaration.
    #[error("undeclared package {0}")]
    UndeclaredPackage(String),

    /// An extern whose package name is not a declared dependency.
    #[error("extern package {0:?} not a declared dependency")]
    UndeclaredDependency(String),

    /// A target package with no API group attached.
    #[error("API group not defined for {0}")]
    MissingGroup(String),

    /// An exported package absent from the scanned set.
    #[error("exported package {0} was not scanned")]
    PackageNotScanned(String),

    /// An artifact with no matching export declaration.
    #[error("no export declaration for {0}/{1}")]
    MissingExport(String, String),

    /// A merge whose target artifact does not exist.
    #[error("merge target not found for {0}/{1}")]
    MissingMergeTarget(String, String),

    /// Context wrapper: the struct field being translated.
    #[error("field {field}: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<ExtractError>,
    },

    /// Context wrapper: the definition being translated.
    #[error("{name}: {source}")]
    Definition {
        name: String,
        #[source]
        source: Box<ExtractError>,
    },

    /// Context wrapper: the group-version being generated.
    #[error("generate {group}/{version}: {source}")]
    Generate {
        group: String,
        version: String,
        #[source]
        source: Box<ExtractError>,
    },

    /// Bundle assembly failure.
    #[error(transparent)]
    Bundle(#[from] kure_schema_core::BundleError),

    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] kure_ingest_config::ConfigError),
}

impl ExtractError {
    /// Wraps an error with the field it occurred in.
    pub(crate) fn in_field(self, field: impl Into<String>) -> Self {
        ExtractError::Field {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// Wraps an error with the definition it occurred in.
    pub(crate) fn in_definition(self, name: impl Into<String>) -> Self {
        ExtractError::Definition {
            name: name.into(),
            source: Box::new(self),
        }
    }
}

/// Convenience alias for results with [`ExtractError`].
pub type Result<T> = std::result::Result<T, ExtractError>;
