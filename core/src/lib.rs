//! Core schema model and bundle primitives.
//!
//! This crate defines the language-neutral data model for Kure API schema
//! bundles:
//!
//! - [`Type`] — the tagged schema type (strings, objects, arrays, maps,
//!   unions, optionals, references, resources, ...).
//! - [`Definition`] / [`Property`] — named schema entries and object members.
//! - [`ResourceMeta`] — serving metadata of cluster-managed resources.
//! - [`ApiGroupVersion`] — one (group, version) artifact of definitions.
//! - [`Bundle`] — the complete API: header, groups, and artifacts, with
//!   [`Bundle::new`] enforcing cross-group invariants.
//!
//! Validation ([`validate_bundle`], [`validate_artifact`]) catches structural
//! errors such as duplicate definition names and dangling same-group
//! references.
//!
//! # Example
//!
//! ```
//! use kure_schema_core::*;
//!
//! let gv = ApiGroupVersion {
//!     api_version: API_VERSION.into(),
//!     kind: "APIGroupVersion".into(),
//!     api: "example".into(),
//!     group: ApiGroupIdentifier::new(None, "core"),
//!     version: "v1".into(),
//!     dependencies: Vec::new(),
//!     definitions: vec![Definition {
//!         meta: DefinitionMeta { name: "Toleration".into(), ..Default::default() },
//!         value: Type::string(),
//!     }],
//! };
//!
//! let bundle = Bundle::new(vec![gv]).unwrap();
//! assert_eq!(bundle.groups[0].versions, vec!["v1"]);
//! assert!(validate_bundle(&bundle).is_empty());
//! ```

mod api;
mod resource;
mod types;
mod validate;

pub use api::{Api, ApiDependency, ApiGroup, ApiGroupVersion, Bundle, BundleError, API_VERSION};
pub use resource::{ResourceMeta, ResourceScope, Subresources};
pub use types::*;
pub use validate::{validate_artifact, validate_bundle, ValidationError};
