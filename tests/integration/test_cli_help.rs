use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_every_stream_command() {
    let mut cmd = Command::cargo_bin("skein").expect("skein binary");
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("decode"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn version_flag_prints_the_crate_version() {
    let mut cmd = Command::cargo_bin("skein").expect("skein binary");
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn decode_accepts_a_file_and_prints_the_document() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("capture.ndjson");
    std::fs::write(
        &input,
        concat!(
            "{\"op\":\"setName\",\"name\":\"Demo\"}\n",
            "{\"op\":\"addNode\",\"node\":{\"id\":\"t1\",\"kind\":\"trigger\"}}\n",
        ),
    )
    .expect("write capture");

    let mut cmd = Command::cargo_bin("skein").expect("skein binary");
    cmd.arg("decode").arg(&input);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"name\":\"Demo\""))
        .stdout(predicate::str::contains("\"id\":\"t1\""));
}
