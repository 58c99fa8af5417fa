use crate::error::HoistError;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HooksConfig {
    pub sub_install: bool,
    pub require_on_update: bool,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            sub_install: true,
            require_on_update: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcsCacheConfig {
    pub enabled: bool,
}

impl Default for VcsCacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub include_hidden: bool,
    pub max_depth: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_hidden: false,
            max_depth: 16,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HoistConfig {
    pub hooks: HooksConfig,
    pub vcs_cache: VcsCacheConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialHoistConfig {
    hooks: Option<HooksConfig>,
    vcs_cache: Option<VcsCacheConfig>,
    scan: Option<ScanConfig>,
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => {
            let trimmed = v.trim();
            match trimmed {
                "1" | "true" | "TRUE" | "yes" | "on" => true,
                "0" | "false" | "FALSE" | "no" | "off" => false,
                _ => fallback,
            }
        }
        Err(_) => fallback,
    }
}

fn validate(cfg: &HoistConfig) -> Result<()> {
    if cfg.scan.max_depth == 0 {
        return Err(HoistError::InvalidConfig(
            "scan max depth must be >= 1".to_string(),
        )
        .into());
    }
    Ok(())
}

fn resolve_config_path(project_root: &Path) -> Option<PathBuf> {
    if let Ok(custom) = env::var("HOIST_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    Some(project_root.join(".hoist.toml"))
}

fn merge_file_config(project_root: &Path, base: &mut HoistConfig) -> Result<()> {
    let Some(path) = resolve_config_path(project_root) else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)?;
    let parsed: PartialHoistConfig = toml::from_str(&raw)
        .map_err(|err| anyhow!("failed to parse hoist config {}: {err}", path.display()))?;
    if let Some(hooks) = parsed.hooks {
        base.hooks = hooks;
    }
    if let Some(vcs_cache) = parsed.vcs_cache {
        base.vcs_cache = vcs_cache;
    }
    if let Some(scan) = parsed.scan {
        base.scan = scan;
    }
    Ok(())
}

pub fn load_config(project_root: &Path) -> Result<HoistConfig> {
    let mut cfg = HoistConfig::default();
    merge_file_config(project_root, &mut cfg)?;

    cfg.hooks.sub_install = env_or_bool("HOIST_SUB_INSTALL", cfg.hooks.sub_install);
    cfg.hooks.require_on_update =
        env_or_bool("HOIST_REQUIRE_ON_UPDATE", cfg.hooks.require_on_update);
    cfg.vcs_cache.enabled = env_or_bool("HOIST_VCS_CACHE_ENABLED", cfg.vcs_cache.enabled);
    cfg.scan.include_hidden = env_or_bool("HOIST_SCAN_INCLUDE_HIDDEN", cfg.scan.include_hidden);
    cfg.scan.max_depth = env_or_u64("HOIST_SCAN_MAX_DEPTH", cfg.scan.max_depth);

    validate(&cfg)?;
    Ok(cfg)
}
