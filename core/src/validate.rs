//! Bundle and artifact validation.
//!
//! Validates structural invariants of bundles and group-version artifacts,
//! catching problems such as duplicate definition names, dangling same-group
//! references, and dependency inconsistencies before a bundle is written.
//!
//! Unresolved references are reported but are not fatal to the caller:
//! resolution across externally-owned packages cannot be checked without
//! their definitions at hand.
//!
//! # Examples
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
//!         meta: DefinitionMeta { name: "Foo".into(), ..Default::default() },
//!         value: Type::reference("Missing"),
//!     }],
//! };
//!
//! let errors = validate_artifact(&gv);
//! assert!(errors.iter().any(|e| matches!(e, ValidationError::UnresolvedReference { .. })));
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::api::{ApiGroupVersion, Bundle};
use crate::types::Type;

/// Structural problems found in a bundle or artifact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Two definitions in one artifact share a name.
    #[error("duplicate definition {name} in {group}/{version}")]
    DuplicateDefinition {
        group: String,
        version: String,
        name: String,
    },
    /// A scope-less reference names a definition absent from its own
    /// group-version.
    #[error("unresolved reference {name} in {group}/{version}")]
    UnresolvedReference {
        group: String,
        version: String,
        name: String,
    },
    /// An artifact's API name differs from the bundle header's.
    #[error("artifact {group}/{version} has API name {actual:?}, bundle has {expected:?}")]
    ApiNameMismatch {
        group: String,
        version: String,
        expected: String,
        actual: String,
    },
    /// An artifact references a dependency version that disagrees with the
    /// bundle header.
    #[error("dependency {package} pinned to {expected} but {group}/{version} uses {actual}")]
    DependencyVersionMismatch {
        group: String,
        version: String,
        package: String,
        expected: String,
        actual: String,
    },
}

/// Validates a complete bundle.
///
/// Checks header consistency (API name and dependency versions across all
/// artifacts) and validates each artifact individually.
pub fn validate_bundle(bundle: &Bundle) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for gv in &bundle.versions {
        if gv.api != bundle.api.name {
            errors.push(ValidationError::ApiNameMismatch {
                group: gv.group.name.clone(),
                version: gv.version.clone(),
                expected: bundle.api.name.clone(),
                actual: gv.api.clone(),
            });
        }

        for dep in &gv.dependencies {
            let pinned = bundle
                .api
                .dependencies
                .iter()
                .find(|d| d.package == dep.package);
            if let Some(pinned) = pinned {
                if pinned.version != dep.version {
                    errors.push(ValidationError::DependencyVersionMismatch {
                        group: gv.group.name.clone(),
                        version: gv.version.clone(),
                        package: dep.package.clone(),
                        expected: pinned.version.clone(),
                        actual: dep.version.clone(),
                    });
                }
            }
        }

        errors.extend(validate_artifact(gv));
    }

    errors
}

/// Validates one group-version artifact.
///
/// Checks definition-name uniqueness and that every scope-less reference
/// resolves to a definition in the same artifact.
pub fn validate_artifact(gv: &ApiGroupVersion) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut names: HashSet<&str> = HashSet::new();
    for def in &gv.definitions {
        if !names.insert(def.name()) {
            errors.push(ValidationError::DuplicateDefinition {
                group: gv.group.name.clone(),
                version: gv.version.clone(),
                name: def.name().to_string(),
            });
        }
    }

    let mut dangling: Vec<String> = Vec::new();
    for def in &gv.definitions {
        collect_dangling(&def.value, &names, &mut dangling);
    }
    dangling.dedup();
    for name in dangling {
        errors.push(ValidationError::UnresolvedReference {
            group: gv.group.name.clone(),
            version: gv.version.clone(),
            name,
        });
    }

    errors
}

fn collect_dangling(t: &Type, names: &HashSet<&str>, dangling: &mut Vec<String>) {
    match t {
        Type::Reference { target } => {
            if target.scope.is_none() && !names.contains(target.name.as_str()) {
                dangling.push(target.name.clone());
            }
        }
        Type::Array { values } | Type::Map { values } => collect_dangling(values, names, dangling),
        Type::Optional { value } => collect_dangling(value, names, dangling),
        Type::Object {
            inherit,
            properties,
        } => {
            for parent in inherit {
                collect_dangling(parent, names, dangling);
            }
            for prop in properties {
                collect_dangling(&prop.value, names, dangling);
            }
        }
        Type::Resource { properties, .. } => {
            for prop in properties {
                collect_dangling(&prop.value, names, dangling);
            }
        }
        Type::Union { values } => {
            for value in values {
                collect_dangling(value, names, dangling);
            }
        }
        Type::String { .. }
        | Type::Integer { .. }
        | Type::Float { .. }
        | Type::Boolean
        | Type::Unknown => {}
    }
}
