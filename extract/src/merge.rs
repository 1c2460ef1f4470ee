//! Merging: fold one group-version's definitions into another and rewrite
//! inbound references.
//!
//! Merges are processed in the order exports appear, so a chain of merges
//! accumulates correctly. Reference rewriting runs once after all merges so
//! transitive merges resolve against the final destination.

use tracing::debug;

use kure_ingest_config::{Config, Merge};
use kure_schema_core::{ApiGroupIdentifier, ApiGroupVersion, Type};

use crate::error::{ExtractError, Result};

/// Applies every export's merge declaration, returning the surviving
/// artifacts with their references rewritten.
pub fn apply_merges(
    config: &Config,
    mut artifacts: Vec<ApiGroupVersion>,
) -> Result<Vec<ApiGroupVersion>> {
    struct Rewrite {
        from: ApiGroupIdentifier,
        to: ApiGroupIdentifier,
    }

    let mut merged_away: Vec<bool> = vec![false; artifacts.len()];
    let mut rewrites: Vec<Rewrite> = Vec::new();

    for i in 0..artifacts.len() {
        let gv = &artifacts[i];
        let export = config.export_for(gv).ok_or_else(|| {
            ExtractError::MissingExport(gv.group.name.clone(), gv.version.clone())
        })?;

        let Some(merge) = &export.merge else {
            continue;
        };

        // A merge without a version inherits the export's own.
        let version = merge
            .version
            .clone()
            .unwrap_or_else(|| export.version.clone());

        let target = merge_target(&artifacts, merge, &version).ok_or_else(|| {
            ExtractError::MissingMergeTarget(gv.group.name.clone(), gv.version.clone())
        })?;

        debug!(
            from = %gv.group.name,
            version = %gv.version,
            to = %artifacts[target].group.name,
            "merging definitions"
        );

        rewrites.push(Rewrite {
            from: artifacts[i].group.clone(),
            to: artifacts[target].group.clone(),
        });
        merged_away[i] = true;

        apply_merge(merge, &mut artifacts, i, target);
    }

    let mut merged: Vec<ApiGroupVersion> = artifacts
        .into_iter()
        .zip(merged_away)
        .filter_map(|(gv, away)| (!away).then_some(gv))
        .collect();

    for rewrite in &rewrites {
        update_references(&mut merged, &rewrite.from, &rewrite.to);
    }

    Ok(merged)
}

fn merge_target(
    artifacts: &[ApiGroupVersion],
    merge: &Merge,
    version: &str,
) -> Option<usize> {
    artifacts
        .iter()
        .position(|gv| gv.group.module == merge.module && gv.version == version)
}

fn apply_merge(merge: &Merge, artifacts: &mut [ApiGroupVersion], from: usize, to: usize) {
    let definitions: Vec<_> = artifacts[from]
        .definitions
        .iter()
        .filter(|def| merge.include.is_empty() || merge.include.iter().any(|n| n == def.name()))
        .cloned()
        .collect();

    let dependencies = artifacts[from].dependencies.clone();

    let target = &mut artifacts[to];
    target.definitions.extend(definitions);

    // Carry the merged artifact's dependencies along so its references stay
    // declared in the bundle header.
    for dep in dependencies {
        if !target.dependencies.iter().any(|d| d.package == dep.package) {
            target.dependencies.push(dep);
        }
    }
}

fn update_references(
    artifacts: &mut [ApiGroupVersion],
    from: &ApiGroupIdentifier,
    to: &ApiGroupIdentifier,
) {
    for gv in artifacts.iter_mut() {
        let location = gv.group.clone();
        for def in &mut gv.definitions {
            update_reference(&mut def.value, &location, from, to);
        }
    }
}

fn update_reference(
    t: &mut Type,
    location: &ApiGroupIdentifier,
    from: &ApiGroupIdentifier,
    to: &ApiGroupIdentifier,
) {
    match t {
        Type::Reference { target } => {
            let Some(scope) = &mut target.scope else {
                return;
            };

            if scope.group.same(from) {
                if location.same(to) {
                    target.scope = None;
                } else {
                    scope.group = to.clone();
                }
            }
        }

        Type::Array { values } | Type::Map { values } => {
            update_reference(values, location, from, to);
        }
        Type::Optional { value } => update_reference(value, location, from, to),
        Type::Object {
            inherit,
            properties,
        } => {
            for parent in inherit {
                update_reference(parent, location, from, to);
            }
            for prop in properties {
                update_reference(&mut prop.value, location, from, to);
            }
        }
        Type::Resource { properties, .. } => {
            for prop in properties {
                update_reference(&mut prop.value, location, from, to);
            }
        }
        Type::Union { values } => {
            for value in values {
                update_reference(value, location, from, to);
            }
        }

        Type::String { .. }
        | Type::Integer { .. }
        | Type::Float { .. }
        | Type::Boolean
        | Type::Unknown => {}
    }
}
