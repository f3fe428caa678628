use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn opp() -> Command {
    Command::cargo_bin("opp").unwrap()
}

#[test]
fn reads_stdin_and_writes_stdout() {
    opp()
        .write_stdin("##:NAME world\nhello NAME\n")
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn dash_means_stdin() {
    opp()
        .arg("-")
        .write_stdin("plain text\n")
        .assert()
        .success()
        .stdout("plain text\n");
}

#[test]
fn define_flag_defaults_to_one() {
    opp()
        .args(["-D", "FLAG", "--define", "LEVEL=3"])
        .write_stdin("##~FLAG|~FLAG\noff\n##@\non FLAG LEVEL\n##.\n")
        .assert()
        .success()
        .stdout("on 1 3\n");
}

#[test]
fn seed_option_changes_random_sequence() {
    opp()
        .args(["--seed", "1"])
        .write_stdin("##$\n")
        .assert()
        .success()
        .stdout("1103527590\n");
}

#[test]
fn output_file_and_relative_include() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("defs.h"), "##:ANSWER 42\n").unwrap();
    fs::write(root.join("main.txt"), "##<defs\\.h.\nanswer = ANSWER\n").unwrap();
    let output = root.join("out.txt");

    opp()
        .arg(root.join("main.txt"))
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(fs::read_to_string(output).unwrap(), "answer = 42\n");
}

#[test]
fn failure_exits_with_status_one() {
    opp()
        .write_stdin("text\n##.\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "error: line 2: no matching conditional to close",
        ));
}

#[test]
fn unclosed_block_is_reported() {
    opp()
        .write_stdin("##~A|~A\nbody\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unclosed conditional block"));
}

#[test]
fn include_depth_option_is_honored() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("leaf.h"), "leaf\n").unwrap();
    fs::write(root.join("main.txt"), "##<leaf\\.h.\n").unwrap();

    opp()
        .arg(root.join("main.txt"))
        .args(["--max-include-depth", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("includes nested deeper than 0 levels"));
}

#[test]
fn missing_input_file_fails() {
    opp()
        .arg("no/such/input.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read no/such/input.txt"));
}
