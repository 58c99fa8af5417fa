use thiserror::Error;

#[derive(Debug, Error)]
pub enum HoistError {
    #[error("copy failed from {source_path} to {target_path}: {reason}")]
    CopyFailure {
        source_path: String,
        target_path: String,
        reason: String,
    },
    #[error("ledger unreadable or corrupt: {0}")]
    LedgerCorrupt(String),
    #[error("ledger write failed: {0}")]
    LedgerWrite(String),
    #[error("composer binary unavailable: {0}")]
    MissingComposerBinary(String),
    #[error("config file invalid or unreadable: {0}")]
    InvalidConfig(String),
}
