use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct HoistPaths {
    pub project_root: PathBuf,
    pub ledger_file: PathBuf,
    pub lock_file: PathBuf,
    pub logs_dir: PathBuf,
    pub vcs_cache_dir: Option<PathBuf>,
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

fn optional_env_path(var: &str) -> Option<PathBuf> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(PathBuf::from(v.trim())),
        _ => None,
    }
}

pub fn resolve_paths() -> Result<HoistPaths> {
    let cwd = env::current_dir().context("current working directory could not be resolved")?;
    let project_root = env_or_default_path("HOIST_PROJECT_ROOT", cwd);

    let ledger_file = env_or_default_path(
        "HOIST_LEDGER_FILE",
        project_root.join("composer.packages.lock"),
    );
    let lock_file = env_or_default_path("HOIST_LOCK_FILE", project_root.join(".hoist/pass.lock"));
    let logs_dir = env_or_default_path("HOIST_LOGS_DIR", project_root.join(".hoist/logs"));
    let vcs_cache_dir = optional_env_path("HOIST_VCS_CACHE_DIR");

    Ok(HoistPaths {
        project_root,
        ledger_file,
        lock_file,
        logs_dir,
        vcs_cache_dir,
    })
}
