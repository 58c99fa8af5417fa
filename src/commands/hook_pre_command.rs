use anyhow::Result;

use crate::commands::{CommandReport, ensure_composer_available};
use crate::composer::{gateway, project};
use crate::hoist::audit;
use crate::hoist::config::load_config;
use crate::hoist::paths::resolve_paths;
use crate::hoist::vcs_cache;

#[derive(Debug, Clone)]
pub struct PreCommandOptions {
    pub command: String,
}

pub fn run(opts: &PreCommandOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let cfg = load_config(&paths.project_root)?;
    let mut report = CommandReport::new("hook-pre-command");

    report.detail(format!("project_root={}", paths.project_root.display()));
    report.detail(format!("command={}", opts.command));

    if gateway::hook_already_active() {
        report.detail("nested host run detected; skipping");
        return Ok(report);
    }

    let packages = project::load_inline_packages(&paths.project_root)?;
    report.detail(format!("inline_packages={}", packages.len()));
    if packages.is_empty() {
        return Ok(report);
    }

    if cfg.vcs_cache.enabled {
        let cache_dir = match &paths.vcs_cache_dir {
            Some(dir) => Some(dir.clone()),
            None => {
                if ensure_composer_available(&mut report) {
                    match gateway::config_cache_vcs_dir(&paths.project_root) {
                        Ok(dir) => Some(dir),
                        Err(err) => {
                            report.issue(format!("cache-vcs-dir lookup failed: {err:#}"));
                            None
                        }
                    }
                } else {
                    None
                }
            }
        };

        if let Some(cache_dir) = cache_dir {
            report.detail(format!("vcs_cache_dir={}", cache_dir.display()));
            for package in &packages {
                let outcome = vcs_cache::purge_package_cache(&cache_dir, &package.name);
                report.detail(format!(
                    "purged package={} deleted={} failed={}",
                    package.name, outcome.deleted, outcome.failed
                ));
            }
        }
    } else {
        report.detail("vcs cache purge disabled");
    }

    if opts.command == "update" && cfg.hooks.require_on_update {
        if ensure_composer_available(&mut report) {
            let names = packages
                .iter()
                .map(|p| p.name.clone())
                .collect::<Vec<_>>();
            if let Err(err) = gateway::run_require(&paths.project_root, &names) {
                report.issue(format!("re-require of inline packages failed: {err:#}"));
            } else {
                report.detail(format!("re-required {} inline package(s)", names.len()));
            }
        }
    }

    let status = if report.ok { "ok" } else { "error" };
    audit::append_event(
        &paths,
        "pre-command",
        status,
        &format!("command={} inline_packages={}", opts.command, packages.len()),
    )?;

    Ok(report)
}
