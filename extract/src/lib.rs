//! Schema extraction engine for Kure API bundles.
//!
//! This crate turns a typed package model into a language-neutral schema
//! bundle:
//!
//! - [`model`] — the narrow input interface: packages, type declarations
//!   with syntactic right-hand sides, constants, and comments, as produced
//!   by a language frontend.
//! - [`Comment`] — doc-comment splitting and `+marker` handling.
//! - [`classify_packages`] — locality and API group attachment.
//! - [`Generator`] — the type translator, one group-version per export.
//! - [`prune_definitions`] — reachability pruning from resource roots.
//! - [`apply_merges`] — folding group-versions together with reference
//!   rewriting.
//! - [`generate_bundle`] — the phase driver tying it all together.
//! - [`write_bundle`] — serializing a bundle to its file tree.
//!
//! # Example
//!
//! ```
//! use kure_ingest_config::{Config, ModuleManifest};
//! use kure_ingest_extract::model::{Package, TypeDecl, TypeExpr, BasicKind};
//! use kure_ingest_extract::{classify_packages, generate_bundle};
//!
//! let config = Config::parse(r#"
//! name = "example"
//!
//! [[export]]
//! path = "example.dev/api/v1"
//! group = "example.dev"
//! version = "v1"
//! "#).unwrap();
//!
//! let manifest: ModuleManifest = toml::from_str(r#"module = "example.dev""#).unwrap();
//!
//! let package = Package {
//!     path: "example.dev/api/v1".into(),
//!     types: vec![TypeDecl {
//!         name: "Phase".into(),
//!         exported: true,
//!         rhs: TypeExpr::basic(BasicKind::String),
//!         ..Default::default()
//!     }],
//!     ..Default::default()
//! };
//!
//! let packages = classify_packages(&config, &manifest, vec![package]);
//! let bundle = generate_bundle(&config, &packages).unwrap();
//! assert_eq!(bundle.api.name, "example");
//! assert_eq!(bundle.versions[0].definitions[0].name(), "Phase");
//! ```

mod classify;
mod comment;
mod error;
mod generate;
mod merge;
pub mod model;
mod output;
mod pipeline;
mod prune;

pub use classify::{classify_packages, group_for_package, PackageGroup, ScannedPackage, APIMACHINERY};
pub use comment::{scan_enum_values, Comment, CommentIndex};
pub use error::{ExtractError, Result};
pub use generate::{Generator, GeneratorContext, METAV1};
pub use merge::apply_merges;
pub use output::write_bundle;
pub use pipeline::generate_bundle;
pub use prune::prune_definitions;
