use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{CommandReport, hook_post_package, hook_post_pass, hook_pre_command, status};

#[derive(Debug, Parser)]
#[command(
    name = "hoist",
    version,
    about = "Composer lifecycle hooks: hoist nested composer.json manifests and reconcile the copy ledger"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Lifecycle callback endpoints invoked by the package-management host.
    #[command(subcommand)]
    Hook(HookCommands),
    /// Operator-facing overview of paths, declarations, and the ledger.
    Status,
}

#[derive(Debug, Subcommand)]
enum HookCommands {
    /// Runs before a host command; purges inline-package VCS caches.
    PreCommand {
        /// Host command about to run (e.g. install, update).
        #[arg(long)]
        command: String,
    },
    /// Runs after a package's files were installed or updated.
    PostPackage {
        /// Package name as reported by the host.
        #[arg(long)]
        package: String,
        /// Package type as reported by the host.
        #[arg(long = "package-type")]
        package_type: String,
        /// Resolved installation root of the package.
        #[arg(long = "install-root")]
        install_root: PathBuf,
        /// Host operation: install or update.
        #[arg(long, default_value = "install")]
        operation: String,
        #[arg(long = "initial-version")]
        initial_version: Option<String>,
        #[arg(long = "target-version")]
        target_version: Option<String>,
    },
    /// Runs after a full dependency-resolution pass; reconciles the ledger.
    PostPass,
}

fn render(report: &CommandReport) -> Result<()> {
    for detail in &report.details {
        println!("{detail}");
    }
    for issue in &report.issues {
        eprintln!("issue: {issue}");
    }
    if report.ok {
        Ok(())
    } else {
        anyhow::bail!(
            "{} completed with {} issue(s)",
            report.command,
            report.issues.len()
        )
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let report = match &cli.command {
        Commands::Hook(HookCommands::PreCommand { command }) => {
            hook_pre_command::run(&hook_pre_command::PreCommandOptions {
                command: command.clone(),
            })?
        }
        Commands::Hook(HookCommands::PostPackage {
            package,
            package_type,
            install_root,
            operation,
            initial_version,
            target_version,
        }) => hook_post_package::run(&hook_post_package::PostPackageOptions {
            package: package.clone(),
            package_type: package_type.clone(),
            install_root: install_root.clone(),
            operation: operation.clone(),
            initial_version: initial_version.clone(),
            target_version: target_version.clone(),
        })?,
        Commands::Hook(HookCommands::PostPass) => hook_post_pass::run()?,
        Commands::Status => status::run()?,
    };

    render(&report)
}
