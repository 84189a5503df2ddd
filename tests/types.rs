// ABOUTME: Integration tests for validated domain types.
// ABOUTME: Pins the exact deploy argument vector and input validation rules.

use stelo::shellwords;
use stelo::types::{DeployCommand, Environment, Revision, Verbosity};

/// Test: full command with verbosity and parsed extra options.
/// Expected: exactly deploy, env, revision, verbosity flag, options — in order.
#[test]
fn deploy_command_exact_vector() {
    let environment = Environment::new("production").unwrap();
    let revision = Revision::new("abc123").unwrap();
    let options = shellwords::split("--parallel --limit=5");

    let command = DeployCommand::new(&environment, &revision, Some(Verbosity::Vv), options);

    assert_eq!(
        command.args(),
        [
            "deploy",
            "production",
            "--revision=abc123",
            "-vv",
            "--parallel",
            "--limit=5"
        ]
    );
}

/// Test: minimal command.
/// Expected: three fixed elements, nothing else.
#[test]
fn deploy_command_minimal_vector() {
    let environment = Environment::new("staging").unwrap();
    let revision = Revision::new("deadbeef").unwrap();

    let command = DeployCommand::new(&environment, &revision, None, Vec::new());

    assert_eq!(command.args(), ["deploy", "staging", "--revision=deadbeef"]);
}

/// Test: empty environment and revision.
/// Expected: rejected at construction, never reaching the argv.
#[test]
fn empty_inputs_are_rejected() {
    assert!(Environment::new("").is_err());
    assert!(Environment::new("  ").is_err());
    assert!(Revision::new("").is_err());
}

/// Test: verbosity parsing.
/// Expected: only v, vv, vvv are accepted; flags map one-to-one.
#[test]
fn verbosity_forms() {
    assert_eq!("v".parse::<Verbosity>().unwrap().flag(), "-v");
    assert_eq!("vv".parse::<Verbosity>().unwrap().flag(), "-vv");
    assert_eq!("vvv".parse::<Verbosity>().unwrap().flag(), "-vvv");
    assert!("".parse::<Verbosity>().is_err());
    assert!("vvvv".parse::<Verbosity>().is_err());
}
