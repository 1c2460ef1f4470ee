//! The phase driver: translate every export, prune, merge, bundle.

use tracing::info;

use kure_ingest_config::Config;
use kure_schema_core::{ApiGroupVersion, Bundle};

use crate::classify::ScannedPackage;
use crate::error::{ExtractError, Result};
use crate::generate::{Generator, GeneratorContext};
use crate::merge::apply_merges;
use crate::prune::prune_definitions;

/// Runs the full extraction pipeline over classified packages.
///
/// Each export's package is translated into a group-version artifact, then
/// unreachable definitions are pruned, merges are applied, and the surviving
/// artifacts are bundled.
pub fn generate_bundle(config: &Config, packages: &[ScannedPackage]) -> Result<Bundle> {
    let ctx = GeneratorContext::new(config, packages);
    let mut artifacts: Vec<ApiGroupVersion> = Vec::new();

    for export in &config.exports {
        let package = ctx
            .package(&export.path)
            .ok_or_else(|| ExtractError::PackageNotScanned(export.path.clone()))?;

        let gv = Generator::new(&ctx, package, export)
            .generate()
            .map_err(|source| ExtractError::Generate {
                group: export.group.clone(),
                version: export.version.clone(),
                source: Box::new(source),
            })?;

        info!(
            group = %gv.group.name,
            version = %gv.version,
            definitions = gv.definitions.len(),
            "generated group-version"
        );

        artifacts.push(gv);
    }

    prune_definitions(config, &mut artifacts);

    let merged = apply_merges(config, artifacts)?;

    Ok(Bundle::new(merged)?)
}
