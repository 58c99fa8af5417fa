use crate::hoist::warn::{self, WarnEvent};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeOutcome {
    pub deleted: usize,
    pub failed: usize,
}

fn cache_marker(package_name: &str) -> String {
    format!("{}.git", package_name.replace('/', "-"))
}

fn warn_walk_failure(package_name: &str, path: &Path, err: &std::io::Error) {
    warn::emit(WarnEvent {
        code: "VCS_CACHE_PURGE_FAILED",
        stage: "pre-command",
        action: "walk-cache-dir",
        package: package_name,
        path: &path.display().to_string(),
        reason: "unreadable-skipped",
        err: &err.to_string(),
    });
}

fn collect_matches(
    dir: &Path,
    package_name: &str,
    marker: &str,
    out: &mut Vec<PathBuf>,
    outcome: &mut PurgeOutcome,
) {
    // An unreadable directory is skipped, not fatal; the rest of the cache
    // still gets purged.
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(err) => {
            outcome.failed += 1;
            warn_walk_failure(package_name, dir, &err);
            return;
        }
    };
    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                outcome.failed += 1;
                warn_walk_failure(package_name, dir, &err);
                continue;
            }
        };
        let path = entry.path();
        if path.is_dir() {
            collect_matches(&path, package_name, marker, out, outcome);
        }
        if path.to_string_lossy().contains(marker) {
            out.push(path);
        }
    }
}

/// Delete every VCS cache entry belonging to `package_name`, children before
/// their directories so removal never hits a non-empty directory. Per-entry
/// failures are counted and warned; the purge itself never aborts.
pub fn purge_package_cache(cache_dir: &Path, package_name: &str) -> PurgeOutcome {
    let mut outcome = PurgeOutcome::default();
    if !cache_dir.is_dir() {
        return outcome;
    }

    let marker = cache_marker(package_name);
    let mut matches = Vec::new();
    collect_matches(cache_dir, package_name, &marker, &mut matches, &mut outcome);

    // Deepest paths first.
    matches.sort_by_key(|path| std::cmp::Reverse(path.components().count()));

    for path in matches {
        let removed = if path.is_dir() {
            fs::remove_dir(&path)
        } else {
            fs::remove_file(&path)
        };
        match removed {
            Ok(()) => outcome.deleted += 1,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                outcome.failed += 1;
                warn::emit(WarnEvent {
                    code: "VCS_CACHE_PURGE_FAILED",
                    stage: "pre-command",
                    action: "purge-cache-entry",
                    package: package_name,
                    path: &path.display().to_string(),
                    reason: "delete-failed",
                    err: &err.to_string(),
                });
            }
        }
    }

    outcome
}
