use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)]
fn bearsays() -> Command {
    Command::cargo_bin("bearsays").unwrap()
}

#[test]
fn test_default_message() {
    bearsays()
        .assert()
        .success()
        .stdout(predicate::str::contains("║ Hello, I'm a bear!   ║"))
        .stdout(predicate::str::contains("ʕ•ᴥ•ʔ*"));
}

#[test]
fn test_arguments_are_joined() {
    bearsays()
        .args(["honey", "is", "great"])
        .assert()
        .success()
        .stdout(predicate::str::contains("║ honey is great"));
}

#[test]
fn test_version_matches_formula_test() {
    bearsays()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "bearsays {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_hyphenated_words_are_part_of_the_message() {
    bearsays()
        .args(["-x", "marks", "the", "spot"])
        .assert()
        .success()
        .stdout(predicate::str::contains("║ -x marks the spot"));
}
