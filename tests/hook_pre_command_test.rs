use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_project_manifest(project_root: &Path) {
    let manifest = r#"{
    "repositories": [
        {
            "type": "package",
            "package": {"name": "vendor/widget", "type": "widget-bundle", "version": "1.0.0"}
        }
    ]
}
"#;
    fs::write(project_root.join("composer.json"), manifest).expect("write project manifest");
}

fn write_fake_composer(bin_path: &Path, cache_dir: &Path) {
    let script = format!(
        r#"#!/usr/bin/env bash
set -euo pipefail

if [[ -n "${{HOIST_TEST_COMPOSER_LOG:-}}" ]]; then
  printf "%s\n" "$*" >> "${{HOIST_TEST_COMPOSER_LOG}}"
fi

if [[ "${{1:-}}" == "config" && "${{2:-}}" == "cache-vcs-dir" ]]; then
  echo '{}'
  exit 0
fi

exit 0
"#,
        cache_dir.display()
    );
    fs::write(bin_path, script).expect("write fake composer");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(bin_path).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(bin_path, perms).expect("chmod");
    }
}

#[test]
fn pre_command_purges_inline_package_vcs_cache() {
    let tmp = tempdir().expect("tempdir");
    let project_root = tmp.path().join("project");
    fs::create_dir_all(&project_root).expect("mkdir project");
    write_project_manifest(&project_root);

    let cache_dir = tmp.path().join("cache/vcs");
    let repo = cache_dir.join("vendor-widget.git");
    fs::create_dir_all(repo.join("refs")).expect("mkdir repo");
    fs::write(repo.join("refs/main"), "abc").expect("write ref");
    let unrelated = cache_dir.join("vendor-other.git");
    fs::create_dir_all(&unrelated).expect("mkdir unrelated");

    assert_cmd::cargo::cargo_bin_cmd!("hoist")
        .current_dir(&project_root)
        .env("HOIST_PROJECT_ROOT", &project_root)
        .env("HOIST_VCS_CACHE_DIR", &cache_dir)
        .env("HOIST_REQUIRE_ON_UPDATE", "0")
        .args(["hook", "pre-command", "--command", "install"])
        .assert()
        .success();

    assert!(!repo.exists());
    assert!(unrelated.exists());
}

#[test]
fn pre_command_asks_the_host_for_the_cache_dir_when_unset() {
    let tmp = tempdir().expect("tempdir");
    let project_root = tmp.path().join("project");
    fs::create_dir_all(&project_root).expect("mkdir project");
    write_project_manifest(&project_root);

    let cache_dir = tmp.path().join("cache/vcs");
    let repo = cache_dir.join("vendor-widget.git");
    fs::create_dir_all(&repo).expect("mkdir repo");

    let composer = tmp.path().join("composer");
    write_fake_composer(&composer, &cache_dir);

    assert_cmd::cargo::cargo_bin_cmd!("hoist")
        .current_dir(&project_root)
        .env("HOIST_PROJECT_ROOT", &project_root)
        .env("COMPOSER_BIN", &composer)
        .env("HOIST_REQUIRE_ON_UPDATE", "0")
        .args(["hook", "pre-command", "--command", "install"])
        .assert()
        .success();

    assert!(!repo.exists());
}

#[test]
fn pre_command_re_requires_inline_packages_on_update() {
    let tmp = tempdir().expect("tempdir");
    let project_root = tmp.path().join("project");
    fs::create_dir_all(&project_root).expect("mkdir project");
    write_project_manifest(&project_root);

    let cache_dir = tmp.path().join("cache/vcs");
    fs::create_dir_all(&cache_dir).expect("mkdir cache");
    let composer = tmp.path().join("composer");
    write_fake_composer(&composer, &cache_dir);
    let call_log = tmp.path().join("composer-calls.log");

    assert_cmd::cargo::cargo_bin_cmd!("hoist")
        .current_dir(&project_root)
        .env("HOIST_PROJECT_ROOT", &project_root)
        .env("HOIST_VCS_CACHE_DIR", &cache_dir)
        .env("COMPOSER_BIN", &composer)
        .env("HOIST_TEST_COMPOSER_LOG", &call_log)
        .args(["hook", "pre-command", "--command", "update"])
        .assert()
        .success();

    let calls = fs::read_to_string(&call_log).expect("read call log");
    assert!(calls.contains("require --no-interaction vendor/widget"));
}

#[test]
fn pre_command_without_inline_packages_does_nothing() {
    let tmp = tempdir().expect("tempdir");
    let project_root = tmp.path().join("project");
    fs::create_dir_all(&project_root).expect("mkdir project");
    fs::write(project_root.join("composer.json"), "{\"repositories\":[]}\n")
        .expect("write project manifest");

    assert_cmd::cargo::cargo_bin_cmd!("hoist")
        .current_dir(&project_root)
        .env("HOIST_PROJECT_ROOT", &project_root)
        .args(["hook", "pre-command", "--command", "update"])
        .assert()
        .success();
}
