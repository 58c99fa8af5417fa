use crate::error::HoistError;
use crate::hoist::util::{bytes_hash, file_hash, now_epoch_secs};
use crate::hoist::warn::{self, WarnEvent};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    /// Registered during the current process lifetime; has not yet survived
    /// a reconciliation pass. Never purged, whatever the source does.
    FreshlyCreated,
    /// Survived at least one pass; purged on a later pass once the source
    /// file disappears.
    Confirmed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedFileEntry {
    pub target_path: String,
    pub state: EntryState,
    pub content_hash: String,
    pub registered_at_epoch_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct Ledger {
    schema_version: u32,
    entries: BTreeMap<String, DerivedFileEntry>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            schema_version: 1,
            entries: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub confirmed: usize,
    pub retained: usize,
    pub purged: usize,
    pub failed: usize,
}

fn read_ledger(path: &Path) -> Result<Ledger, HoistError> {
    if !path.exists() {
        return Ok(Ledger::default());
    }
    let raw = fs::read_to_string(path)
        .map_err(|err| HoistError::LedgerCorrupt(format!("{}: {err}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|err| HoistError::LedgerCorrupt(format!("{}: {err}", path.display())))
}

fn recover_ledger(path: &Path) -> Ledger {
    match read_ledger(path) {
        Ok(ledger) => ledger,
        Err(err) => {
            // Availability of the host's pass wins over bookkeeping
            // continuity: start over from an empty ledger.
            warn::emit(WarnEvent {
                code: "LEDGER_CORRUPT",
                stage: "ledger",
                action: "load",
                package: "",
                path: &path.display().to_string(),
                reason: "treating-as-empty",
                err: &err.to_string(),
            });
            Ledger::default()
        }
    }
}

/// Tracks files copied from a nested location into a canonical one across
/// repeated host lifecycle passes, backed by a persisted ledger.
///
/// An entry must survive one full pass after registration before it becomes
/// eligible for purge; deleting on first sight could destroy output in the
/// very pass that produced it when the source is a transient directory.
pub struct ShadowFileTracker {
    ledger_file: PathBuf,
    ledger: Ledger,
}

impl ShadowFileTracker {
    pub fn open(ledger_file: &Path) -> Self {
        let ledger = recover_ledger(ledger_file);
        Self {
            ledger_file: ledger_file.to_path_buf(),
            ledger,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, DerivedFileEntry> {
        &self.ledger.entries
    }

    /// Copy `source_path` over `target_path` and record the pair. The copy
    /// happens before the ledger is touched, so a failed copy leaves the
    /// ledger exactly as it was.
    pub fn register(&mut self, source_path: &Path, target_path: &Path) -> Result<(), HoistError> {
        let copy_failure = |reason: String| HoistError::CopyFailure {
            source_path: source_path.display().to_string(),
            target_path: target_path.display().to_string(),
            reason,
        };

        let bytes = fs::read(source_path).map_err(|err| copy_failure(err.to_string()))?;

        let key = source_path.display().to_string();
        if let Some(previous) = self.ledger.entries.get(&key) {
            let recorded_target = Path::new(&previous.target_path);
            if recorded_target.exists() {
                match file_hash(recorded_target) {
                    Ok(on_disk) if on_disk != previous.content_hash => {
                        warn::emit(WarnEvent {
                            code: "HOIST_DRIFT",
                            stage: "register",
                            action: "overwrite-target",
                            package: "",
                            path: &previous.target_path,
                            reason: "target-modified-since-last-copy",
                            err: "",
                        });
                    }
                    _ => {}
                }
            }
        }

        fs::write(target_path, &bytes).map_err(|err| copy_failure(err.to_string()))?;

        let entry = DerivedFileEntry {
            target_path: target_path.display().to_string(),
            state: EntryState::FreshlyCreated,
            content_hash: bytes_hash(&bytes),
            registered_at_epoch_secs: now_epoch_secs().unwrap_or(0),
        };
        self.ledger.entries.insert(key, entry);
        self.persist()
    }

    /// One reconciliation pass over the last persisted ledger state.
    ///
    /// Fresh entries are confirmed, confirmed entries whose source vanished
    /// are purged, and everything else is left alone. The ledger is written
    /// once at the end of the pass (or deleted when it would be empty), so a
    /// crash mid-pass re-runs from the previous persisted state without harm.
    pub fn reconcile(&mut self) -> Result<ReconcileOutcome> {
        let mut outcome = ReconcileOutcome::default();
        if !self.ledger_file.exists() {
            self.ledger = Ledger::default();
            return Ok(outcome);
        }

        self.ledger = recover_ledger(&self.ledger_file);

        let mut purged_keys = Vec::new();
        for (source, entry) in self.ledger.entries.iter_mut() {
            match entry.state {
                EntryState::FreshlyCreated => {
                    entry.state = EntryState::Confirmed;
                    outcome.confirmed += 1;
                }
                EntryState::Confirmed => {
                    if Path::new(source).exists() {
                        outcome.retained += 1;
                        continue;
                    }
                    match fs::remove_file(&entry.target_path) {
                        Ok(()) => {
                            purged_keys.push(source.clone());
                            outcome.purged += 1;
                        }
                        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                            // Target already gone is still a purge.
                            purged_keys.push(source.clone());
                            outcome.purged += 1;
                        }
                        Err(err) => {
                            // Keep the entry so the next pass retries; one
                            // stuck file must not block the rest.
                            outcome.failed += 1;
                            warn::emit(WarnEvent {
                                code: "PURGE_FAILED",
                                stage: "reconcile",
                                action: "delete-target",
                                package: "",
                                path: &entry.target_path,
                                reason: "retry-next-pass",
                                err: &err.to_string(),
                            });
                        }
                    }
                }
            }
        }
        for key in purged_keys {
            self.ledger.entries.remove(&key);
        }

        if self.ledger.entries.is_empty() {
            match fs::remove_file(&self.ledger_file) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(HoistError::LedgerWrite(format!(
                        "{}: {err}",
                        self.ledger_file.display()
                    ))
                    .into());
                }
            }
        } else {
            self.persist()?;
        }

        Ok(outcome)
    }

    fn persist(&self) -> Result<(), HoistError> {
        let write_failure =
            |err: String| HoistError::LedgerWrite(format!("{}: {err}", self.ledger_file.display()));

        let parent = self
            .ledger_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&parent).map_err(|err| write_failure(err.to_string()))?;

        let data = serde_json::to_string_pretty(&self.ledger)
            .map_err(|err| write_failure(err.to_string()))?;

        // Write-rename so the file on disk is always a complete ledger.
        let mut tmp =
            NamedTempFile::new_in(&parent).map_err(|err| write_failure(err.to_string()))?;
        tmp.write_all(format!("{data}\n").as_bytes())
            .map_err(|err| write_failure(err.to_string()))?;
        tmp.as_file()
            .sync_all()
            .map_err(|err| write_failure(err.to_string()))?;
        tmp.persist(&self.ledger_file)
            .map_err(|err| write_failure(err.to_string()))?;
        Ok(())
    }
}
