use assert_cmd::Command;
use predicates::prelude::*;

fn command() -> Command {
    Command::cargo_bin("compose-dump").expect("binary exists")
}

#[test]
fn version_flag_works() {
    let mut cmd = command();
    cmd.arg("--version");

    cmd.assert().success();
}

#[test]
fn restore_is_not_implemented() {
    let mut cmd = command();
    cmd.arg("restore");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Restoring is not implemented yet"));
}

#[test]
fn unknown_compression_is_rejected() {
    let mut cmd = command();
    cmd.arg("backup").arg("--compression").arg("zip");

    cmd.assert().failure().stderr(predicate::str::contains("Unknown compression 'zip'"));
}

#[test]
fn backup_help_lists_the_scope_flags() {
    let mut cmd = command();
    cmd.arg("backup").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--mounted"))
        .stdout(predicate::str::contains("--volumes"))
        .stdout(predicate::str::contains("--no-pause"));
}
