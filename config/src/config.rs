//! The `kure.toml` configuration: which packages are exported as API
//! group-versions, which dependencies they may reference, and which external
//! packages map to externally-owned APIs.
//!
//! # Example TOML
//!
//! ```toml
//! name = "guestbook"
//!
//! [[export]]
//! path = "example.dev/guestbook/api/v1"
//! group = "guestbook.example.dev"
//! version = "v1"
//! prune = true
//!
//! [[dependency]]
//! name = "kubernetes"
//! path = "k8s.io/api"
//!
//! [[extern]]
//! path = "k8s.io/apimachinery/pkg/apis/meta/v1"
//! package = "kubernetes"
//! module = "meta"
//! group = "meta"
//! version = "v1"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use kure_schema_core::{ApiGroupIdentifier, ApiGroupVersion};

use crate::error::{ConfigError, Result};
use crate::module::ModuleManifest;

/// Top-level ingestion configuration, loaded from `kure.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// The API name shared by every produced group-version.
    pub name: String,
    #[serde(rename = "export", default)]
    pub exports: Vec<Export>,
    #[serde(rename = "dependency", default)]
    pub dependencies: Vec<Dependency>,
    #[serde(rename = "extern", default)]
    pub externs: Vec<Extern>,
}

/// A scanned package exported as one API group-version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Export {
    /// Package path, matched exactly against scanned packages.
    pub path: String,
    #[serde(default)]
    pub module: Option<String>,
    pub group: String,
    pub version: String,

    /// Definition-name globs to include. Carried for the surrounding tooling;
    /// the translator itself does not filter on them.
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,

    /// When set, pointers to basic types stay plain instead of becoming
    /// `optional`.
    #[serde(rename = "explicit-null", default)]
    pub explicit_null: bool,
    /// Drop definitions unreachable from any resource.
    #[serde(default)]
    pub prune: bool,
    /// Fold this group-version's definitions into another one.
    #[serde(default)]
    pub merge: Option<Merge>,
}

impl Export {
    /// The export's group identifier.
    pub fn group_identifier(&self) -> ApiGroupIdentifier {
        ApiGroupIdentifier::new(self.module.clone(), &self.group)
    }

    /// Returns `true` when `gv` is the artifact this export produced.
    pub fn is(&self, gv: &ApiGroupVersion) -> bool {
        gv.group.same(&self.group_identifier()) && gv.version == self.version
    }
}

/// A merge declaration: where an export's definitions end up.
///
/// The target artifact is located by (module, version); a missing version
/// inherits the export's own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Merge {
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Definition names to carry over; empty means all of them.
    #[serde(default)]
    pub include: Vec<String>,
}

/// An externally-owned package schemas may depend on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    /// Module path used to resolve the version from the module manifest.
    #[serde(default)]
    pub path: Option<String>,
    /// Explicit `MAJOR.MINOR` version; resolved from the manifest if absent.
    #[serde(default)]
    pub version: Option<String>,
}

/// Maps a referenced package path to a dependency's API group-version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extern {
    pub path: String,
    /// The owning dependency's package name.
    pub package: String,
    #[serde(default)]
    pub module: Option<String>,
    pub group: String,
    pub version: String,
}

impl Extern {
    /// The extern's group identifier.
    pub fn group_identifier(&self) -> ApiGroupIdentifier {
        ApiGroupIdentifier::new(self.module.clone(), &self.group)
    }
}

/// A package path resolved against the configuration: either a scanned
/// export or a declared extern.
#[derive(Debug, Clone, Copy)]
pub enum ResolvedPackage<'a> {
    Export(&'a Export),
    Extern(&'a Extern),
}

impl ResolvedPackage<'_> {
    /// The owning dependency's package name; `None` for local exports.
    pub fn dependency(&self) -> Option<&str> {
        match self {
            ResolvedPackage::Export(_) => None,
            ResolvedPackage::Extern(ext) => Some(&ext.package),
        }
    }

    /// The group identifier references into this package carry.
    pub fn group_identifier(&self) -> ApiGroupIdentifier {
        match self {
            ResolvedPackage::Export(export) => export.group_identifier(),
            ResolvedPackage::Extern(ext) => ext.group_identifier(),
        }
    }

    /// The version references into this package carry.
    pub fn version(&self) -> &str {
        match self {
            ResolvedPackage::Export(export) => &export.version,
            ResolvedPackage::Extern(ext) => &ext.version,
        }
    }
}

impl Config {
    /// Loads and normalizes a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parses and normalizes a configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        config.normalize();
        Ok(config)
    }

    /// Normalizes empty module strings to `None` so downstream identifier
    /// equality behaves.
    pub fn normalize(&mut self) {
        fn clear_empty(module: &mut Option<String>) {
            if module.as_deref() == Some("") {
                *module = None;
            }
        }

        for export in &mut self.exports {
            clear_empty(&mut export.module);
            if let Some(merge) = &mut export.merge {
                clear_empty(&mut merge.module);
                if merge.version.as_deref() == Some("") {
                    merge.version = None;
                }
            }
        }
        for ext in &mut self.externs {
            clear_empty(&mut ext.module);
        }
    }

    /// Looks up an export by exact package path.
    pub fn export(&self, path: &str) -> Option<&Export> {
        self.exports.iter().find(|export| export.path == path)
    }

    /// Looks up the export that produced an artifact.
    pub fn export_for(&self, gv: &ApiGroupVersion) -> Option<&Export> {
        self.exports.iter().find(|export| export.is(gv))
    }

    /// Looks up a dependency by name.
    pub fn dependency(&self, name: &str) -> Option<&Dependency> {
        self.dependencies.iter().find(|dep| dep.name == name)
    }

    /// Resolves a package path against exports first, then externs.
    pub fn resolve(&self, path: &str) -> Option<ResolvedPackage<'_>> {
        if let Some(export) = self.export(path) {
            return Some(ResolvedPackage::Export(export));
        }
        self.externs
            .iter()
            .find(|ext| ext.path == path)
            .map(ResolvedPackage::Extern)
    }

    /// Fills in missing dependency versions from the module manifest.
    ///
    /// Each unversioned dependency must name a module path required by the
    /// manifest; its version is reduced to `MAJOR.MINOR`. A `kubernetes`
    /// dependency at major 0 is published as major 1.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingDependencyPath`],
    /// [`ConfigError::MissingRequirement`], or
    /// [`ConfigError::InvalidVersion`].
    pub fn resolve_versions(&mut self, manifest: &ModuleManifest) -> Result<()> {
        for dep in &mut self.dependencies {
            if dep.version.is_some() {
                continue;
            }

            let path = dep
                .path
                .as_deref()
                .filter(|p| !p.is_empty())
                .ok_or_else(|| ConfigError::MissingDependencyPath(dep.name.clone()))?;

            let required = manifest.required_version(path).ok_or_else(|| {
                ConfigError::MissingRequirement {
                    name: dep.name.clone(),
                    path: path.to_string(),
                }
            })?;

            let version = semver::Version::parse(required.trim_start_matches('v')).map_err(
                |source| ConfigError::InvalidVersion {
                    name: dep.name.clone(),
                    version: required.to_string(),
                    source,
                },
            )?;

            let mut major = version.major;
            if dep.name == "kubernetes" && major == 0 {
                major = 1;
            }

            dep.version = Some(format!("{major}.{}", version.minor));
        }

        Ok(())
    }
}
