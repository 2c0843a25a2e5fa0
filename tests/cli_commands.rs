//! End-to-end tests for the `gitrun` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `gitrun` command isolated from the developer's configuration.
fn gitrun(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gitrun").unwrap();
    cmd.current_dir(home.path())
        .env("GITRUN_HOME", home.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    gitrun(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("translate"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_global_flags_are_defined() {
    let cli = gitrun::cli::build_cli();
    let names: Vec<_> = cli.get_arguments().filter_map(|arg| arg.get_long()).collect();
    for flag in ["config", "git-command", "wsl-launcher", "wsl-tool", "verbose"] {
        assert!(names.contains(&flag), "missing global flag --{flag}");
    }
}

#[test]
fn test_translate_wsl_status() {
    let home = TempDir::new().unwrap();
    gitrun(&home)
        .args(["translate", "-C", r"\\wsl$\Ubuntu\home\user\repo", "--", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mode:      wsl"))
        .stdout(predicate::str::contains(
            "arguments: -d Ubuntu -- git -C '/home/user/repo' status",
        ));
}

#[test]
fn test_translate_requotes_long_option_values() {
    let home = TempDir::new().unwrap();
    gitrun(&home)
        .args([
            "translate",
            "-C",
            r"\\wsl$\Debian\srv\repo",
            "--",
            "log",
            "--format=%H",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "-d Debian -- git -C '/srv/repo' log --format='%H'",
        ));
}

#[test]
fn test_translate_forced_wsl_outside_distro_is_translation_error() {
    let home = TempDir::new().unwrap();
    gitrun(&home)
        .args(["translate", "--mode", "wsl", "-C"])
        .arg(home.path())
        .args(["--", "status"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not a WSL path"));
}

#[test]
fn test_unknown_runner_mode_is_cli_error() {
    let home = TempDir::new().unwrap();
    gitrun(&home)
        .args(["run", "--mode", "docker", "--dry-run", "--", "status"])
        .assert()
        .code(2);
}

#[test]
fn test_invalid_config_file_is_cli_error() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("config.toml"), "[runner\nmode = ").unwrap();
    gitrun(&home).arg("config").assert().code(2);
}

#[test]
fn test_config_json_reports_sources() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("config.toml"),
        "[runner]\nmode = \"native\"\n\n[output]\nencoding = \"windows-1252\"\n",
    )
    .unwrap();

    let output = gitrun(&home)
        .args(["config", "--json", "--wsl-tool", "git-lfs"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["runner_mode"]["value"], "native");
    assert_eq!(json["runner_mode"]["source"], "config");
    assert_eq!(json["output_encoding"]["value"], "windows-1252");
    assert_eq!(json["wsl_tool"]["value"], "git-lfs");
    assert_eq!(json["wsl_tool"]["source"], "cli");
    assert_eq!(json["git_command"]["source"], "default");
}

#[test]
fn test_dry_run_prints_command_without_running() {
    let home = TempDir::new().unwrap();
    gitrun(&home)
        .args(["--git-command", "gitrun-no-such-git", "run", "--dry-run", "--", "status", "--short"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("gitrun-no-such-git status --short\n"));
}

#[test]
fn test_missing_git_is_spawn_failure() {
    let home = TempDir::new().unwrap();
    gitrun(&home)
        .args(["--git-command", "gitrun-no-such-git", "run", "--", "status"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("failed to start 'gitrun-no-such-git'"));
}

#[cfg(unix)]
#[test]
fn test_run_streams_lines_to_stdout() {
    let home = TempDir::new().unwrap();
    gitrun(&home)
        .args(["--git-command", "sh", "run", "--", "-c", "echo one; echo two"])
        .assert()
        .success()
        .stdout("one\ntwo\n");
}

#[cfg(unix)]
#[test]
fn test_run_propagates_git_exit_code() {
    let home = TempDir::new().unwrap();
    gitrun(&home)
        .args(["--git-command", "sh", "run", "--", "-c", "echo fatal >&2; exit 3"])
        .assert()
        .code(3)
        .stdout("fatal\n")
        .stderr(predicate::str::contains("git exited with code 3"));
}

#[cfg(unix)]
#[test]
fn test_run_json_summary() {
    let home = TempDir::new().unwrap();
    let output = gitrun(&home)
        .args([
            "--git-command",
            "sh",
            "run",
            "--json",
            "--",
            "-c",
            "echo 'Receiving objects: 50%' >&2; echo done",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["verdict"], "success");
    assert_eq!(json["aborted"], false);
    assert_eq!(json["exit_code"], 0);
    assert_eq!(json["runner_mode"], "native");
    assert_eq!(json["transcript"], serde_json::json!(["done"]));
    assert!(json["started_at"].as_str().unwrap().contains('T'));
}

#[test]
fn test_missing_wsl_launcher_is_spawn_failure() {
    let home = TempDir::new().unwrap();
    gitrun(&home)
        .args(["--wsl-launcher", "/nonexistent/gitrun/wsl.exe", "run", "-C"])
        .arg(r"\\wsl$\Ubuntu\home\user\repo")
        .args(["--", "status"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("WSL not available"))
        .stderr(predicate::str::contains("wsl_launcher"));
}

#[cfg(unix)]
#[test]
fn test_run_passes_arguments_through_unchanged() {
    let home = TempDir::new().unwrap();
    gitrun(&home)
        .args(["--git-command", "sh", "run", "--", "-c", r#"printf '%s\n' "$1""#, "_"])
        .arg(r#"--grep=\bfix O'Brien "q""#)
        .assert()
        .success()
        .stdout("--grep=\\bfix O'Brien \"q\"\n");
}
