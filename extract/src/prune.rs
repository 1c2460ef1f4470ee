//! Reachability pruning: drop definitions no resource can reach.
//!
//! Every `resource` definition across all artifacts seeds the traversal.
//! References are counted per definition key; a key already seen is counted
//! again but not descended into, which bounds the walk on cyclic schemas.
//! Only artifacts whose export sets `prune = true` actually drop anything.

use std::collections::HashMap;

use tracing::debug;

use kure_ingest_config::Config;
use kure_schema_core::{ApiGroupVersion, Type};

/// (group name, version, definition name): the unit of reachability.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Key {
    group: String,
    version: String,
    name: String,
}

/// Where a definition key lives: (artifact index, definition index).
type Index = HashMap<Key, (usize, usize)>;

fn index_definitions(artifacts: &[ApiGroupVersion]) -> Index {
    let mut index = Index::new();

    for (gi, gv) in artifacts.iter().enumerate() {
        for (di, def) in gv.definitions.iter().enumerate() {
            index.insert(
                Key {
                    group: gv.group.name.clone(),
                    version: gv.version.clone(),
                    name: def.name().to_string(),
                },
                (gi, di),
            );
        }
    }

    index
}

/// Prunes unreachable definitions from every artifact whose export opts in.
pub fn prune_definitions(config: &Config, artifacts: &mut [ApiGroupVersion]) {
    let mut refs: HashMap<Key, u32> = HashMap::new();
    let index = index_definitions(artifacts);

    // Visit every type visible from a resource (the de facto public API).
    for gv in artifacts.iter() {
        for def in &gv.definitions {
            if def.value.is_resource() {
                let root = Type::reference(def.name());
                visit(artifacts, &index, &mut refs, gv, &root);
            }
        }
    }

    for gv in artifacts.iter_mut() {
        let prune = config.export_for(gv).is_some_and(|export| export.prune);
        if !prune {
            continue;
        }

        let group = gv.group.name.clone();
        let version = gv.version.clone();

        gv.definitions.retain(|def| {
            let key = Key {
                group: group.clone(),
                version: version.clone(),
                name: def.name().to_string(),
            };
            let used = refs.get(&key).copied().unwrap_or(0) > 0;
            if !used {
                debug!(group = %group, version = %version, name = %def.name(), "prune");
            }
            used
        });
    }
}

fn visit(
    artifacts: &[ApiGroupVersion],
    index: &Index,
    refs: &mut HashMap<Key, u32>,
    gv: &ApiGroupVersion,
    t: &Type,
) {
    match t {
        Type::Reference { target } => {
            let key = match &target.scope {
                Some(scope) => Key {
                    group: scope.group.name.clone(),
                    version: scope.version.clone(),
                    name: target.name.clone(),
                },
                None => Key {
                    group: gv.group.name.clone(),
                    version: gv.version.clone(),
                    name: target.name.clone(),
                },
            };

            let seen = refs.contains_key(&key);
            *refs.entry(key.clone()).or_insert(0) += 1;

            if !seen {
                if let Some(&(gi, di)) = index.get(&key) {
                    let owner = &artifacts[gi];
                    let value = &owner.definitions[di].value;
                    visit(artifacts, index, refs, owner, value);
                }
            }
        }

        Type::Array { values } | Type::Map { values } => {
            visit(artifacts, index, refs, gv, values);
        }
        Type::Optional { value } => visit(artifacts, index, refs, gv, value),
        Type::Object {
            inherit,
            properties,
        } => {
            for parent in inherit {
                visit(artifacts, index, refs, gv, parent);
            }
            for prop in properties {
                visit(artifacts, index, refs, gv, &prop.value);
            }
        }
        Type::Resource { properties, .. } => {
            for prop in properties {
                visit(artifacts, index, refs, gv, &prop.value);
            }
        }
        Type::Union { values } => {
            for value in values {
                visit(artifacts, index, refs, gv, value);
            }
        }

        Type::String { .. }
        | Type::Integer { .. }
        | Type::Float { .. }
        | Type::Boolean
        | Type::Unknown => {}
    }
}
