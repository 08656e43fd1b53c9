//! Discovery and parsing of the proto tree.
//!
//! Discovery is deterministic: files are keyed by their root-relative path
//! with forward slashes and sorted before parsing, so the corpus (and every
//! report derived from it) is identical across platforms and filesystems.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use schemalock_core::model::Corpus;
use schemalock_core::parse::ast::FileNode;
use schemalock_core::{normalize, parse, SchemalockError};

/// All `.proto` files under `root`, as sorted root-relative paths.
pub fn discover(root: &Path, ignores: &[String]) -> Result<Vec<PathBuf>> {
    let ignore_set = build_ignore_set(ignores)?;

    let mut found = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("walking {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("proto") {
            continue;
        }
        let rel = path.strip_prefix(root).unwrap_or(path);
        if ignore_set.is_match(rel) {
            continue;
        }
        found.push(rel.to_path_buf());
    }
    found.sort();
    Ok(found)
}

fn build_ignore_set(ignores: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in ignores {
        let glob =
            Glob::new(pattern).with_context(|| format!("invalid ignore pattern `{pattern}`"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Parse and normalize the whole tree into one corpus.
pub fn parse_tree(root: &Path, ignores: &[String]) -> Result<Corpus> {
    let mut files: Vec<(String, FileNode)> = Vec::new();
    for rel in discover(root, ignores)? {
        let full = root.join(&rel);
        let source = fs::read_to_string(&full)
            .with_context(|| format!("reading {}", full.display()))?;
        let filepath = rel_key(&rel);
        let ast = parse::parse(&source)
            .map_err(|e| SchemalockError::from_parse(filepath.clone(), e))?;
        files.push((filepath, ast));
    }
    Ok(normalize::normalize_corpus(&files)?)
}

/// Portable lock key: forward slashes regardless of host separator.
fn rel_key(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rel_key_uses_forward_slashes() {
        let p: PathBuf = ["nested", "dir", "file.proto"].iter().collect();
        assert_eq!(rel_key(&p), "nested/dir/file.proto");
    }
}
