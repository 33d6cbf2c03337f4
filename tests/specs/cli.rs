//! CLI surface: `symposium project create`, `--help`, and argument errors.

use crate::prelude::cli;

#[test]
fn help_lists_the_four_subcommands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("daemon")
        .stdout_has("tool-server")
        .stdout_has("orchestrator")
        .stdout_has("project");
}

#[test]
fn project_create_materializes_a_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let project_dir = dir.path().join("demo");

    cli()
        .args(&[
            "project",
            "create",
            project_dir.to_str().unwrap(),
            "--name",
            "Demo",
            "--source-repository",
            "git@example.com:demo.git",
        ])
        .passes()
        .stdout_has("created project");

    let manifest = project_dir.join("project.json");
    assert!(manifest.exists(), "expected {} to exist", manifest.display());
    let contents = std::fs::read_to_string(&manifest).unwrap();
    assert!(contents.contains("Demo"));
}

#[test]
fn project_create_without_required_flags_fails() {
    let dir = tempfile::tempdir().unwrap();
    let project_dir = dir.path().join("demo");

    cli()
        .args(&["project", "create", project_dir.to_str().unwrap()])
        .fails()
        .stderr_has("required");
}

#[test]
fn unknown_subcommand_fails_with_a_usage_error() {
    cli().args(&["not-a-real-subcommand"]).fails();
}
