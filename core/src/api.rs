//! Bundle-level documents: the API header, groups, and group-version
//! artifacts, plus the invariant-checking bundle constructor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ApiGroupIdentifier, Definition};

/// The `apiVersion` stamped on every serialized bundle document.
pub const API_VERSION: &str = "spec.kure.sh/v1alpha1";

/// Errors raised while assembling a [`Bundle`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BundleError {
    /// Two artifacts in the same bundle carry different API names.
    #[error("conflicting API names {0:?} ≠ {1:?}")]
    ConflictingApiNames(String, String),
    /// The same dependency package is referenced with two different versions.
    #[error("version mismatch of dependency {0}")]
    DependencyVersionConflict(String),
}

/// An externally-owned package some artifact references, pinned to one
/// version per bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDependency {
    pub package: String,
    pub version: String,
}

/// The bundle header, written as `index.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Api {
    #[serde(
        rename = "apiVersion",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    pub dependencies: Vec<ApiDependency>,

    pub groups: Vec<ApiGroupIdentifier>,
}

/// One API group and the versions that appear for it, written as
/// `group.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiGroup {
    #[serde(
        rename = "apiVersion",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    pub api: String,
    #[serde(flatten)]
    pub identifier: ApiGroupIdentifier,

    pub versions: Vec<String>,
    #[serde(rename = "preferredVersion")]
    pub preferred_version: Option<String>,
}

/// One (group, version) artifact holding definitions, written as
/// `<version>.json`.
///
/// Artifacts are produced once per export by the translator, mutated in
/// place by the pruner and merger, and finally collected into a [`Bundle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiGroupVersion {
    #[serde(
        rename = "apiVersion",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    pub api: String,
    pub group: ApiGroupIdentifier,
    pub version: String,

    pub dependencies: Vec<ApiDependency>,

    pub definitions: Vec<Definition>,
}

/// A complete schema bundle: the API header, its groups, and all
/// group-version artifacts.
///
/// # Examples
///
/// ```
/// use kure_schema_core::{ApiGroupIdentifier, ApiGroupVersion, Bundle, API_VERSION};
///
/// let gv = ApiGroupVersion {
///     api_version: API_VERSION.into(),
///     kind: "APIGroupVersion".into(),
///     api: "example".into(),
///     group: ApiGroupIdentifier::new(None, "core"),
///     version: "v1".into(),
///     dependencies: Vec::new(),
///     definitions: Vec::new(),
/// };
///
/// let bundle = Bundle::new(vec![gv]).unwrap();
/// assert_eq!(bundle.api.name, "example");
/// assert_eq!(bundle.groups.len(), 1);
/// assert_eq!(bundle.groups[0].versions, vec!["v1"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub api: Api,
    pub groups: Vec<ApiGroup>,
    pub versions: Vec<ApiGroupVersion>,
}

impl Bundle {
    /// Assembles a bundle from group-version artifacts.
    ///
    /// Deduplicates groups by identifier (collecting each group's versions in
    /// encounter order) and dependencies by package name.
    ///
    /// # Errors
    ///
    /// [`BundleError::ConflictingApiNames`] when two artifacts disagree on
    /// the API name, [`BundleError::DependencyVersionConflict`] when one
    /// dependency package appears with two versions.
    pub fn new(artifacts: Vec<ApiGroupVersion>) -> Result<Self, BundleError> {
        let mut api_name = String::new();
        let mut groups: Vec<ApiGroup> = Vec::new();
        let mut deps: Vec<ApiDependency> = Vec::new();

        for gv in &artifacts {
            if api_name.is_empty() {
                api_name = gv.api.clone();
            } else if api_name != gv.api {
                return Err(BundleError::ConflictingApiNames(api_name, gv.api.clone()));
            }

            match groups.iter_mut().find(|g| g.identifier.same(&gv.group)) {
                Some(group) => group.versions.push(gv.version.clone()),
                None => groups.push(ApiGroup {
                    api_version: API_VERSION.to_string(),
                    kind: "APIGroup".to_string(),
                    api: api_name.clone(),
                    identifier: gv.group.clone(),
                    versions: vec![gv.version.clone()],
                    preferred_version: None,
                }),
            }

            for dep in &gv.dependencies {
                match deps.iter().find(|d| d.package == dep.package) {
                    Some(existing) if existing.version != dep.version => {
                        return Err(BundleError::DependencyVersionConflict(dep.package.clone()));
                    }
                    Some(_) => {}
                    None => deps.push(dep.clone()),
                }
            }
        }

        let group_ids = groups.iter().map(|g| g.identifier.clone()).collect();

        let api = Api {
            api_version: API_VERSION.to_string(),
            kind: "API".to_string(),
            name: api_name,
            version: String::new(),
            dependencies: deps,
            groups: group_ids,
        };

        Ok(Bundle {
            api,
            groups,
            versions: artifacts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(group: ApiGroupIdentifier, version: &str) -> ApiGroupVersion {
        ApiGroupVersion {
            api_version: API_VERSION.into(),
            kind: "APIGroupVersion".into(),
            api: "example".into(),
            group,
            version: version.into(),
            dependencies: Vec::new(),
            definitions: Vec::new(),
        }
    }

    #[test]
    fn test_groups_deduplicated_with_versions_in_order() {
        let core = ApiGroupIdentifier::new(None, "core");
        let apps = ApiGroupIdentifier::new(Some("apps".into()), "apps");

        let bundle = Bundle::new(vec![
            artifact(core.clone(), "v1"),
            artifact(apps.clone(), "v1"),
            artifact(core.clone(), "v2"),
        ])
        .unwrap();

        assert_eq!(bundle.groups.len(), 2);
        assert_eq!(bundle.groups[0].versions, vec!["v1", "v2"]);
        assert_eq!(bundle.groups[1].versions, vec!["v1"]);
        assert_eq!(bundle.api.groups, vec![core, apps]);
    }

    #[test]
    fn test_conflicting_api_names_rejected() {
        let mut a = artifact(ApiGroupIdentifier::new(None, "core"), "v1");
        let b = artifact(ApiGroupIdentifier::new(None, "apps"), "v1");
        a.api = "other".into();

        let err = Bundle::new(vec![a, b]).unwrap_err();
        assert!(matches!(err, BundleError::ConflictingApiNames(_, _)));
    }

    #[test]
    fn test_dependency_version_conflict_rejected() {
        let mut a = artifact(ApiGroupIdentifier::new(None, "core"), "v1");
        let mut b = artifact(ApiGroupIdentifier::new(None, "apps"), "v1");
        a.dependencies.push(ApiDependency {
            package: "kubernetes".into(),
            version: "1.29".into(),
        });
        b.dependencies.push(ApiDependency {
            package: "kubernetes".into(),
            version: "1.30".into(),
        });

        let err = Bundle::new(vec![a, b]).unwrap_err();
        assert_eq!(
            err,
            BundleError::DependencyVersionConflict("kubernetes".into())
        );
    }

    #[test]
    fn test_dependencies_deduplicated() {
        let mut a = artifact(ApiGroupIdentifier::new(None, "core"), "v1");
        let mut b = artifact(ApiGroupIdentifier::new(None, "apps"), "v1");
        let dep = ApiDependency {
            package: "kubernetes".into(),
            version: "1.29".into(),
        };
        a.dependencies.push(dep.clone());
        b.dependencies.push(dep.clone());

        let bundle = Bundle::new(vec![a, b]).unwrap();
        assert_eq!(bundle.api.dependencies, vec![dep]);
    }
}
