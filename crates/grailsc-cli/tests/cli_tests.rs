//! CLI integration tests
//!
//! Runs the `grailsc` binary against temporary projects. HOME points into the
//! temp dir so no user configuration leaks in.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn grailsc_cmd(project: &Path) -> Command {
    let mut cmd = Command::cargo_bin("grailsc").unwrap();
    cmd.env("HOME", project)
        .env_remove("GRAILSC_DESTDIR")
        .env_remove("GRAILSC_COMPILER")
        .env_remove("GRAILSC_JSON")
        .env_remove("RUST_LOG");
    cmd
}

fn create_project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (file_path, content) in files {
        let full_path = dir.path().join(file_path);
        fs::create_dir_all(full_path.parent().unwrap()).unwrap();
        fs::write(full_path, content).unwrap();
    }
    dir
}

fn library_project() -> TempDir {
    create_project(&[
        (
            "src/groovy/org/library/Book.groovy",
            "package org.library\n\nclass Book {}\n",
        ),
        (
            "src/java/org/library/Isbn.java",
            "package org.library;\n\npublic class Isbn {}\n",
        ),
    ])
}

// ══════════════════════════════════════════════════════════════════════════════
// HELP MESSAGE TESTS
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_help_shows_commands_and_examples() {
    let temp = TempDir::new().unwrap();
    grailsc_cmd(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("stale"))
        .stdout(predicate::str::contains("EXAMPLES"))
        .stdout(predicate::str::contains("GRAILSC_DESTDIR"));
}

#[test]
fn test_build_help_lists_flags() {
    let temp = TempDir::new().unwrap();
    grailsc_cmd(temp.path())
        .args(["build", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--destdir"))
        .stdout(predicate::str::contains("--src"))
        .stdout(predicate::str::contains("--json"))
        .stdout(predicate::str::contains("--quiet"));
}

#[test]
fn test_quiet_conflicts_with_verbose() {
    let temp = TempDir::new().unwrap();
    grailsc_cmd(temp.path())
        .args(["build", "-q", "-v"])
        .assert()
        .failure();
}

// ══════════════════════════════════════════════════════════════════════════════
// STALE COMMAND TESTS
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_stale_lists_missing_classes() {
    let project = library_project();
    grailsc_cmd(project.path())
        .arg("stale")
        .arg("-C")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "src/groovy/org/library/Book.groovy -> target/classes/org/library/Book.class",
        ))
        .stdout(predicate::str::contains(
            "src/java/org/library/Isbn.java -> target/classes/org/library/Isbn.class",
        ))
        .stdout(predicate::str::contains("2 of 2 source files stale"));
}

#[test]
fn test_stale_json_output() {
    let project = library_project();
    let output = grailsc_cmd(project.path())
        .args(["stale", "--json", "-C"])
        .arg(project.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["scanned_files"], 2);
    assert_eq!(report["stale"].as_array().unwrap().len(), 2);
}

#[test]
fn test_stale_respects_project_config() {
    let project = create_project(&[
        (
            "grailsc.toml",
            "[build]\nsources = [\"grails-app/domain\"]\ndestination = \"classes\"\n",
        ),
        (
            "grails-app/domain/shop/Order.groovy",
            "package shop\n\nclass Order {}\n",
        ),
    ]);

    grailsc_cmd(project.path())
        .args(["stale", "-C"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "grails-app/domain/shop/Order.groovy -> classes/shop/Order.class",
        ));
}

#[test]
fn test_stale_missing_source_dir_fails() {
    let project = create_project(&[("src/groovy/Book.groovy", "class Book {}\n")]);
    grailsc_cmd(project.path())
        .args(["stale", "-C"])
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source directory not found"));
}

#[test]
fn test_invalid_config_reported() {
    let project = create_project(&[("grailsc.toml", "[deploy]\nhost = \"prod\"\n")]);
    grailsc_cmd(project.path())
        .args(["stale", "-C"])
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

// ══════════════════════════════════════════════════════════════════════════════
// BUILD COMMAND TESTS
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_build_compiler_fault_reports_prefix() {
    let project = library_project();
    grailsc_cmd(project.path())
        .env("GRAILSC_COMPILER", project.path().join("no-such-groovyc"))
        .args(["build", "-C"])
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Groovy Compiler error: failed to start"));
}

#[cfg(unix)]
mod with_shell_compiler {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::os::unix::fs::PermissionsExt;

    /// Install a compiler script that writes `<dest>/<Name>.class` per source
    fn install_compiler(project: &Path) -> std::path::PathBuf {
        let script = project.join("bin/fake-groovyc");
        fs::create_dir_all(script.parent().unwrap()).unwrap();
        fs::write(
            &script,
            "#!/bin/sh\ndest=\"$2\"\nshift 2\nfor f in \"$@\"; do\n  n=$(basename \"$f\")\n  touch \"$dest/${n%.*}.class\"\ndone\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[test]
    fn test_build_then_nothing_stale() {
        let project = create_project(&[(
            "src/groovy/org/library/Book.groovy",
            "package org.library\n\nclass Book {}\n",
        )]);
        let compiler = install_compiler(project.path());

        grailsc_cmd(project.path())
            .env("GRAILSC_COMPILER", &compiler)
            .args(["build", "--src", "src/groovy", "-C"])
            .arg(project.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Build succeeded"));

        assert!(project.path().join("target/classes/Book.class").exists());

        grailsc_cmd(project.path())
            .args(["stale", "--src", "src/groovy", "-C"])
            .arg(project.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("up to date"));
    }

    #[test]
    fn test_build_json_summary() {
        let project = create_project(&[("src/groovy/Shelf.groovy", "class Shelf {}\n")]);
        let compiler = install_compiler(project.path());

        let output = grailsc_cmd(project.path())
            .env("GRAILSC_COMPILER", &compiler)
            .args(["build", "--json", "--src", "src/groovy", "--destdir", "out", "-C"])
            .arg(project.path())
            .output()
            .unwrap();
        assert!(output.status.success());

        let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(summary["state"]["state"], "succeeded");
        assert_eq!(summary["scanned_files"], 1);
        assert_eq!(summary["reconciled"], 1);
        assert!(project.path().join("out/Shelf.class").exists());
    }

    #[test]
    fn test_build_lists_injected_domain_classes() {
        let project = create_project(&[
            (
                "grailsc.toml",
                "[build]\nsources = [\"grails-app/domain\"]\n\n[plugins]\nartefacts = [\"grails-app\"]\n",
            ),
            (
                "grails-app/domain/org/library/Author.groovy",
                "package org.library\n\nclass Author {}\n",
            ),
        ]);
        let compiler = install_compiler(project.path());

        grailsc_cmd(project.path())
            .env("GRAILSC_COMPILER", &compiler)
            .args(["build", "-C"])
            .arg(project.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Injected: 1 artefact classes"))
            .stdout(predicate::str::contains("org.library.Author (id, version)"));
    }

    #[test]
    fn test_build_compiler_errors_fail_the_command() {
        let project = create_project(&[("src/groovy/Shelf.groovy", "class Shelf {}\n")]);
        let script = project.path().join("bin/broken-groovyc");
        fs::create_dir_all(script.parent().unwrap()).unwrap();
        fs::write(
            &script,
            "#!/bin/sh\necho 'Shelf.groovy: 1: unexpected token @ line 1' >&2\necho '1 error' >&2\nexit 1\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        grailsc_cmd(project.path())
            .env("GRAILSC_COMPILER", &script)
            .args(["build", "--src", "src/groovy", "-C"])
            .arg(project.path())
            .assert()
            .failure()
            .stdout(predicate::str::contains("unexpected token"))
            .stderr(predicate::str::contains("Compilation failed"));
    }
}
