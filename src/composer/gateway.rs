use crate::error::HoistError;
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::thread;
use std::time::Duration;

/// Environment variable exported around a host sub-install so hooks
/// re-fired by the nested run exit early instead of recursing.
pub const HOOK_ACTIVE_ENV: &str = "HOIST_HOOK_ACTIVE";

fn ensure_executable_path(path: &Path) -> Result<(), HoistError> {
    let meta = fs::metadata(path).map_err(|_| {
        HoistError::MissingComposerBinary(format!(
            "composer binary path does not exist: {}",
            path.display()
        ))
    })?;
    if !meta.is_file() {
        return Err(HoistError::MissingComposerBinary(format!(
            "composer binary path is not a file: {}",
            path.display()
        )));
    }
    Ok(())
}

pub fn resolve_composer_bin() -> Result<PathBuf, HoistError> {
    if let Ok(custom) = env::var("COMPOSER_BIN") {
        let trimmed = custom.trim();
        if trimmed.is_empty() {
            return Err(HoistError::MissingComposerBinary(
                "COMPOSER_BIN is set but empty".to_string(),
            ));
        }
        let path = Path::new(trimmed);
        ensure_executable_path(path)?;
        return Ok(path.to_path_buf());
    }

    which::which("composer").map_err(|_| {
        HoistError::MissingComposerBinary(
            "set COMPOSER_BIN or ensure composer is on PATH".to_string(),
        )
    })
}

fn run_composer(project_root: &Path, args: &[&str], hook_active: bool) -> Result<Output> {
    let bin = resolve_composer_bin()?;
    let mut cmd = Command::new(&bin);
    cmd.args(args).current_dir(project_root);
    if hook_active {
        cmd.env(HOOK_ACTIVE_ENV, "1");
    }
    let out = cmd
        .output()
        .with_context(|| format!("failed to run `{} {}`", bin.display(), args.join(" ")))?;
    Ok(out)
}

pub fn run_composer_retry(project_root: &Path, args: &[&str], retries: usize) -> Result<Output> {
    let mut last_out: Option<Output> = None;

    for attempt in 0..=retries {
        let out = run_composer(project_root, args, false)?;
        if out.status.success() {
            return Ok(out);
        }
        last_out = Some(out);
        if attempt < retries {
            let delay_ms = 250 * (attempt + 1) as u64;
            thread::sleep(Duration::from_millis(delay_ms));
        }
    }

    let Some(out) = last_out else {
        anyhow::bail!(
            "command failed after retries without output: composer {}",
            args.join(" ")
        );
    };
    anyhow::bail!(
        "command failed after retries: composer {}\nstdout: {}\nstderr: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    )
}

/// Ask the host where it keeps its VCS cache.
pub fn config_cache_vcs_dir(project_root: &Path) -> Result<PathBuf> {
    let out = run_composer_retry(project_root, &["config", "cache-vcs-dir"], 1)?;
    let raw = String::from_utf8_lossy(&out.stdout);
    let dir = raw.trim();
    if dir.is_empty() {
        anyhow::bail!("composer reported an empty cache-vcs-dir");
    }
    Ok(PathBuf::from(dir))
}

/// Re-require the inline packages so the host refreshes their metadata on
/// an `update` run.
pub fn run_require(project_root: &Path, packages: &[String]) -> Result<()> {
    if packages.is_empty() {
        return Ok(());
    }
    let mut args = vec!["require", "--no-interaction"];
    for package in packages {
        args.push(package.as_str());
    }
    run_composer_retry(project_root, &args, 1)?;
    Ok(())
}

/// Host sub-install after a hoist, with the re-entrancy marker exported so
/// hooks fired by the nested run are no-ops.
pub fn run_update(project_root: &Path) -> Result<()> {
    let out = run_composer(project_root, &["update", "--no-interaction"], true)?;
    if out.status.success() {
        return Ok(());
    }
    anyhow::bail!(
        "composer update failed\nstdout: {}\nstderr: {}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    )
}

pub fn composer_available() -> bool {
    resolve_composer_bin().is_ok()
}

pub fn hook_already_active() -> bool {
    env::var(HOOK_ACTIVE_ENV).is_ok_and(|v| !v.trim().is_empty())
}
