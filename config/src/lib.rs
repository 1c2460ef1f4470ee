//! Configuration and module manifest handling for kure-ingest.
//!
//! This crate owns the two inputs that parameterize schema extraction:
//!
//! - [`Config`] — the `kure.toml` file declaring the API name, exported
//!   packages ([`Export`]), dependencies ([`Dependency`]), and external
//!   package mappings ([`Extern`]).
//! - [`ModuleManifest`] — the scanned codebase's module descriptor, used to
//!   classify packages as local and to resolve dependency versions.
//!
//! After [`Config::resolve_versions`] the configuration is read-only for the
//! rest of the pipeline.

mod config;
mod error;
mod module;

pub use config::{Config, Dependency, Export, Extern, Merge, ResolvedPackage};
pub use error::{ConfigError, Result};
pub use module::{within_module, ModuleManifest, Requirement, MANIFEST_FILE};
