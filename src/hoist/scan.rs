use crate::hoist::config::ScanConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn walk<P>(
    dir: &Path,
    scan: &ScanConfig,
    depth: u64,
    predicate: &P,
) -> Result<Option<PathBuf>>
where
    P: Fn(&Path) -> bool,
{
    if depth > scan.max_depth {
        return Ok(None);
    }

    let read_dir =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        entries.push(entry.path());
    }
    // Lexicographic order keeps the first match stable across re-runs.
    entries.sort();

    for path in entries {
        if !scan.include_hidden && is_hidden(&path) {
            continue;
        }
        if path.is_dir() {
            if let Some(found) = walk(&path, scan, depth + 1, predicate)? {
                return Ok(Some(found));
            }
        } else if predicate(&path) {
            return Ok(Some(path));
        }
    }

    Ok(None)
}

/// Depth-first search under `root`, returning the first regular file the
/// predicate accepts. Traversal stops at the first hit.
pub fn find_first<P>(root: &Path, scan: &ScanConfig, predicate: P) -> Result<Option<PathBuf>>
where
    P: Fn(&Path) -> bool,
{
    if !root.is_dir() {
        return Ok(None);
    }
    walk(root, scan, 1, &predicate)
}

/// Locate the first `composer.json` nested somewhere under `install_root`,
/// skipping the manifest at the install root itself (that one is the hoist
/// target, not a source).
pub fn find_nested_manifest(install_root: &Path, scan: &ScanConfig) -> Result<Option<PathBuf>> {
    let root_manifest = install_root.join("composer.json");
    find_first(install_root, scan, |path| {
        path.file_name().and_then(|name| name.to_str()) == Some("composer.json")
            && path != root_manifest.as_path()
    })
}
