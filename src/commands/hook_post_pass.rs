use anyhow::Result;

use crate::commands::CommandReport;
use crate::composer::gateway;
use crate::hoist::audit;
use crate::hoist::lockfile::PassLock;
use crate::hoist::paths::resolve_paths;
use crate::hoist::tracker::ShadowFileTracker;

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("hook-post-pass");

    report.detail(format!("ledger_file={}", paths.ledger_file.display()));

    if gateway::hook_already_active() {
        report.detail("nested host run detected; skipping");
        return Ok(report);
    }

    let guard = PassLock::acquire(&paths.lock_file)?;
    let mut tracker = ShadowFileTracker::open(&paths.ledger_file);
    let outcome = tracker.reconcile()?;
    drop(guard);

    report.detail(format!(
        "reconciled confirmed={} retained={} purged={} failed={}",
        outcome.confirmed, outcome.retained, outcome.purged, outcome.failed
    ));
    if outcome.failed > 0 {
        report.issue(format!(
            "{} tracked target(s) could not be deleted; retrying next pass",
            outcome.failed
        ));
    }

    let status = if report.ok { "ok" } else { "error" };
    audit::append_event(
        &paths,
        "post-pass",
        status,
        &format!(
            "confirmed={} retained={} purged={} failed={}",
            outcome.confirmed, outcome.retained, outcome.purged, outcome.failed
        ),
    )?;

    Ok(report)
}
