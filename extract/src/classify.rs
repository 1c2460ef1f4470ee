//! Package classification: locality, API group attachment, and export
//! candidate selection.

use tracing::debug;

use kure_ingest_config::{Config, ModuleManifest};
use kure_schema_core::ApiGroupIdentifier;

use crate::model::Package;

/// The path every cluster-API package transitively depends on.
pub const APIMACHINERY: &str = "k8s.io/apimachinery";

/// The (group, version) a classified package contributes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageGroup {
    pub identifier: ApiGroupIdentifier,
    pub version: String,
}

/// A scanned package with its classification attached.
///
/// Packages without a configuration entry keep `group: None`; they are never
/// translated directly but stay available as reference targets.
#[derive(Debug, Clone)]
pub struct ScannedPackage {
    pub package: Package,
    /// Whether the package lives inside the local module.
    pub local: bool,
    /// The API group-version assigned by the configuration, if any.
    pub group: Option<PackageGroup>,
}

impl ScannedPackage {
    /// The package's import path.
    pub fn path(&self) -> &str {
        &self.package.path
    }

    /// Whether the package is a candidate cluster-API package.
    pub fn is_api_package(&self) -> bool {
        self.package.imports_module(APIMACHINERY)
    }
}

/// Classifies every scanned package against the configuration and module
/// manifest.
pub fn classify_packages(
    config: &Config,
    manifest: &ModuleManifest,
    packages: Vec<Package>,
) -> Vec<ScannedPackage> {
    packages
        .into_iter()
        .map(|package| {
            let local = manifest.is_local(&package.path);
            let group = group_for_package(config, &package.path);

            let scanned = ScannedPackage {
                local,
                group,
                package,
            };

            if scanned.is_api_package() {
                debug!(path = scanned.path(), local, "API package candidate");
            }

            scanned
        })
        .collect()
}

/// Resolves a package's group-version from the configuration, normalizing
/// empty modules away.
pub fn group_for_package(config: &Config, path: &str) -> Option<PackageGroup> {
    let resolved = config.resolve(path)?;

    Some(PackageGroup {
        identifier: resolved.group_identifier(),
        version: resolved.version().to_string(),
    })
}
