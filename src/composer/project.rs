use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// A package declared via an inline `package`-type repository in the
/// project's `composer.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePackage {
    pub name: String,
    pub package_type: String,
    pub version: Option<String>,
}

fn inline_package_from_repository(repository: &Value) -> Option<InlinePackage> {
    if repository.get("type").and_then(Value::as_str) != Some("package") {
        return None;
    }
    let declared = repository.get("package")?;
    let name = declared.get("name").and_then(Value::as_str)?;
    if name.trim().is_empty() {
        return None;
    }
    Some(InlinePackage {
        name: name.to_string(),
        package_type: declared
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("library")
            .to_string(),
        version: declared
            .get("version")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
    })
}

pub fn parse_inline_packages(manifest: &Value) -> Vec<InlinePackage> {
    let Some(repositories) = manifest.get("repositories").and_then(Value::as_array) else {
        return Vec::new();
    };
    repositories
        .iter()
        .filter_map(inline_package_from_repository)
        .collect()
}

/// Read the project manifest and return its inline `package`-type
/// repository declarations. A missing manifest yields no declarations; a
/// project without one simply has nothing for the hooks to act on.
pub fn load_inline_packages(project_root: &Path) -> Result<Vec<InlinePackage>> {
    let manifest_path = project_root.join("composer.json");
    if !manifest_path.exists() {
        return Ok(Vec::new());
    }

    let raw = fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    let manifest: Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", manifest_path.display()))?;
    Ok(parse_inline_packages(&manifest))
}

pub fn find_declaration<'a>(
    declarations: &'a [InlinePackage],
    package_name: &str,
) -> Option<&'a InlinePackage> {
    declarations.iter().find(|decl| decl.name == package_name)
}
