use anyhow::Result;
use std::path::PathBuf;

use crate::commands::{CommandReport, ensure_composer_available};
use crate::composer::{gateway, project};
use crate::hoist::audit;
use crate::hoist::config::load_config;
use crate::hoist::lockfile::PassLock;
use crate::hoist::paths::resolve_paths;
use crate::hoist::scan;
use crate::hoist::tracker::ShadowFileTracker;

#[derive(Debug, Clone)]
pub struct PostPackageOptions {
    pub package: String,
    pub package_type: String,
    pub install_root: PathBuf,
    pub operation: String,
    pub initial_version: Option<String>,
    pub target_version: Option<String>,
}

pub fn run(opts: &PostPackageOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let cfg = load_config(&paths.project_root)?;
    let mut report = CommandReport::new("hook-post-package");

    report.detail(format!("package={}", opts.package));
    report.detail(format!("operation={}", opts.operation));
    report.detail(format!("install_root={}", opts.install_root.display()));

    if gateway::hook_already_active() {
        report.detail("nested host run detected; skipping");
        return Ok(report);
    }

    let declarations = project::load_inline_packages(&paths.project_root)?;
    let Some(declared) = project::find_declaration(&declarations, &opts.package) else {
        report.detail("package is not declared by an inline repository; skipping");
        return Ok(report);
    };
    if declared.package_type != opts.package_type {
        report.detail(format!(
            "declared type {} does not match reported type {}; skipping",
            declared.package_type, opts.package_type
        ));
        return Ok(report);
    }

    if opts.operation == "update" {
        let initial = opts.initial_version.as_deref().unwrap_or("unknown");
        let target = opts.target_version.as_deref().unwrap_or("unknown");
        audit::append_event(
            &paths,
            "post-package",
            "ok",
            &format!(
                "package={} update version {} -> {}",
                opts.package, initial, target
            ),
        )?;
    }

    let Some(nested) = scan::find_nested_manifest(&opts.install_root, &cfg.scan)? else {
        report.detail("no nested composer.json found; nothing to hoist");
        return Ok(report);
    };
    let hoist_target = opts.install_root.join("composer.json");
    report.detail(format!("nested_manifest={}", nested.display()));

    let guard = PassLock::acquire(&paths.lock_file)?;
    let mut tracker = ShadowFileTracker::open(&paths.ledger_file);
    let mut hoisted = false;
    match tracker.register(&nested, &hoist_target) {
        Ok(()) => {
            hoisted = true;
            report.detail(format!("hoisted to {}", hoist_target.display()));
        }
        Err(err) => {
            report.issue(format!("hoist failed: {err}"));
        }
    }
    drop(guard);

    let status = if report.ok { "ok" } else { "error" };
    audit::append_event(
        &paths,
        "post-package",
        status,
        &format!(
            "package={} hoisted={} source={}",
            opts.package,
            hoisted,
            nested.display()
        ),
    )?;

    if hoisted && cfg.hooks.sub_install {
        if ensure_composer_available(&mut report) {
            if let Err(err) = gateway::run_update(&paths.project_root) {
                report.issue(format!("sub-install failed: {err:#}"));
            } else {
                report.detail("sub-install completed");
            }
        }
    }

    Ok(report)
}
