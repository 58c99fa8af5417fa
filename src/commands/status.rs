use anyhow::Result;
use std::env;

use crate::commands::CommandReport;
use crate::composer::{gateway, project};
use crate::hoist::paths::resolve_paths;
use crate::hoist::tracker::{EntryState, ShadowFileTracker};

mod generated {
    include!(concat!(env!("OUT_DIR"), "/hoist_env_allowlist.rs"));
}

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("status");

    report.detail(format!("build_uuid={}", env!("BUILD_UUID")));
    report.detail(format!("project_root={}", paths.project_root.display()));
    report.detail(format!("ledger_file={}", paths.ledger_file.display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));
    report.detail(format!(
        "composer_available={}",
        gateway::composer_available()
    ));

    let declarations = project::load_inline_packages(&paths.project_root)?;
    report.detail(format!("inline_packages={}", declarations.len()));
    for declared in &declarations {
        report.detail(format!(
            "inline package={} type={} version={}",
            declared.name,
            declared.package_type,
            declared.version.as_deref().unwrap_or("unversioned")
        ));
    }

    if paths.ledger_file.exists() {
        let tracker = ShadowFileTracker::open(&paths.ledger_file);
        let fresh = tracker
            .entries()
            .values()
            .filter(|e| e.state == EntryState::FreshlyCreated)
            .count();
        let confirmed = tracker.entries().len() - fresh;
        report.detail(format!(
            "ledger entries={} freshly_created={} confirmed={}",
            tracker.entries().len(),
            fresh,
            confirmed
        ));
    } else {
        report.detail("ledger entries=0 (no ledger file)");
    }

    for (key, _) in env::vars() {
        if key.starts_with("HOIST_")
            && !generated::GENERATED_HOIST_ENV_ALLOWLIST.contains(&key.as_str())
        {
            report.detail(format!("unrecognized env var {key}"));
        }
    }

    Ok(report)
}
