use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn seed_project(project_root: &Path) -> (PathBuf, PathBuf) {
    fs::create_dir_all(project_root).expect("mkdir project");
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

    let install_root = project_root.join("vendor/vendor/widget");
    let nested = install_root.join("lib/composer.json");
    fs::create_dir_all(nested.parent().expect("parent")).expect("mkdir install tree");
    fs::write(&nested, "{\"name\":\"vendor/widget-lib\"}\n").expect("write nested manifest");
    (install_root, nested)
}

fn run_post_package(project_root: &Path, install_root: &Path) {
    assert_cmd::cargo::cargo_bin_cmd!("hoist")
        .current_dir(project_root)
        .env("HOIST_PROJECT_ROOT", project_root)
        .env("HOIST_SUB_INSTALL", "0")
        .args(["hook", "post-package"])
        .args(["--package", "vendor/widget"])
        .args(["--package-type", "widget-bundle"])
        .arg("--install-root")
        .arg(install_root)
        .assert()
        .success();
}

fn run_post_pass(project_root: &Path) {
    assert_cmd::cargo::cargo_bin_cmd!("hoist")
        .current_dir(project_root)
        .env("HOIST_PROJECT_ROOT", project_root)
        .args(["hook", "post-pass"])
        .assert()
        .success();
}

#[test]
fn post_pass_without_a_ledger_succeeds_quietly() {
    let tmp = tempdir().expect("tempdir");
    let project_root = tmp.path().join("project");
    fs::create_dir_all(&project_root).expect("mkdir project");

    run_post_pass(&project_root);
    assert!(!project_root.join("composer.packages.lock").exists());
}

#[test]
fn hoisted_manifest_survives_the_pass_that_created_it() {
    let tmp = tempdir().expect("tempdir");
    let project_root = tmp.path().join("project");
    let (install_root, nested) = seed_project(&project_root);

    run_post_package(&project_root, &install_root);
    // Source vanishes before the pass that registered it completes.
    fs::remove_file(&nested).expect("remove nested source");
    run_post_pass(&project_root);

    assert!(install_root.join("composer.json").is_file());
    let raw = fs::read_to_string(project_root.join("composer.packages.lock")).expect("read ledger");
    assert!(raw.contains("confirmed"));
}

#[test]
fn confirmed_entry_is_purged_on_the_pass_after_its_source_disappears() {
    let tmp = tempdir().expect("tempdir");
    let project_root = tmp.path().join("project");
    let (install_root, nested) = seed_project(&project_root);

    run_post_package(&project_root, &install_root);
    run_post_pass(&project_root);
    assert!(install_root.join("composer.json").is_file());

    fs::remove_file(&nested).expect("remove nested source");
    run_post_pass(&project_root);

    assert!(!install_root.join("composer.json").exists());
    assert!(
        !project_root.join("composer.packages.lock").exists(),
        "ledger file must disappear with its last entry"
    );
}

#[test]
fn post_pass_is_a_no_op_inside_a_nested_host_run() {
    let tmp = tempdir().expect("tempdir");
    let project_root = tmp.path().join("project");
    let (install_root, _nested) = seed_project(&project_root);

    run_post_package(&project_root, &install_root);

    // The sub-install exports HOIST_HOOK_ACTIVE; a post-pass re-fired by
    // that nested run must not reconcile mid-outer-pass, or a fresh entry
    // would be confirmed in the same pass that registered it.
    assert_cmd::cargo::cargo_bin_cmd!("hoist")
        .current_dir(&project_root)
        .env("HOIST_PROJECT_ROOT", &project_root)
        .env("HOIST_HOOK_ACTIVE", "1")
        .args(["hook", "post-pass"])
        .assert()
        .success();

    let raw = fs::read_to_string(project_root.join("composer.packages.lock")).expect("read ledger");
    assert!(raw.contains("freshly_created"));
    assert!(!raw.contains("\"confirmed\""));
}

#[test]
fn confirmed_entry_with_live_source_is_left_alone_across_passes() {
    let tmp = tempdir().expect("tempdir");
    let project_root = tmp.path().join("project");
    let (install_root, _nested) = seed_project(&project_root);

    run_post_package(&project_root, &install_root);
    run_post_pass(&project_root);
    let ledger = project_root.join("composer.packages.lock");
    let after_first = fs::read_to_string(&ledger).expect("read ledger");

    run_post_pass(&project_root);
    let after_second = fs::read_to_string(&ledger).expect("read ledger");

    assert_eq!(after_first, after_second);
    assert!(install_root.join("composer.json").is_file());
}
