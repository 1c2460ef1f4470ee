//! Writing a bundle to its on-disk file tree.
//!
//! `index.json` at the root, then per group a `group.json` under the group's
//! module directory (or the root when it has none) and one `<version>.json`
//! per version of that group. The whole fileset is rendered before anything
//! touches the disk.

use std::path::{Path, PathBuf};

use serde::Serialize;

use kure_schema_core::Bundle;

use crate::error::Result;

/// Serializes a bundle into `<out>/index.json`, `group.json`, and
/// `<version>.json` files.
pub fn write_bundle(bundle: &Bundle, out: &Path) -> Result<()> {
    let mut files = FileSet::default();

    files.add(out.join("index.json"), &bundle.api)?;

    for group in &bundle.groups {
        let base = match &group.identifier.module {
            Some(module) => out.join(module),
            None => out.to_path_buf(),
        };

        files.add(base.join("group.json"), group)?;

        for version in &bundle.versions {
            if !version.group.same(&group.identifier) {
                continue;
            }

            files.add(base.join(format!("{}.json", version.version)), version)?;
        }
    }

    files.write()
}

#[derive(Default)]
struct FileSet {
    files: Vec<(PathBuf, Vec<u8>)>,
}

impl FileSet {
    fn add<T: Serialize>(&mut self, path: PathBuf, contents: &T) -> Result<()> {
        let data = serde_json::to_vec_pretty(contents)?;
        self.files.push((path, data));
        Ok(())
    }

    fn write(self) -> Result<()> {
        for (path, data) in self.files {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, data)?;
        }

        Ok(())
    }
}
