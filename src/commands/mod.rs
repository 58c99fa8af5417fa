pub mod hook_post_package;
pub mod hook_post_pass;
pub mod hook_pre_command;
pub mod status;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }
}

pub fn ensure_composer_available(report: &mut CommandReport) -> bool {
    if crate::composer::gateway::composer_available() {
        return true;
    }

    report.issue("composer binary unavailable; set COMPOSER_BIN or ensure composer is on PATH");
    false
}
