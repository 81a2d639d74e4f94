//! Integration tests for the rtping command line
//!
//! None of these reach the raw socket: every case fails (or exits) before
//! the probe loop starts, so they run unprivileged and offline.

use assert_cmd::Command;
use predicates::prelude::*;

fn rtping() -> Command {
    Command::cargo_bin("rtping").expect("Failed to find rtping binary")
}

#[test]
fn test_help_exits_with_usage_status() {
    rtping()
        .arg("--help")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("--count"))
        .stdout(predicate::str::contains("--interface"))
        .stdout(predicate::str::contains("--strict"));
}

#[test]
fn test_missing_target() {
    rtping()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Aborted: No target host specified"))
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_zero_count_rejected() {
    rtping()
        .args(["-c", "0", "127.0.0.1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Bad count: 0"));
}

#[test]
fn test_unresolvable_host() {
    rtping()
        .args(["-c", "1", "-d", "babihutan.invalid"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown host: babihutan.invalid"));
}

#[test]
fn test_ipv6_target_rejected() {
    rtping()
        .args(["-c", "1", "2001:db8::1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("IPv6 targets are not supported"));
}

#[test]
fn test_unknown_interface() {
    rtping()
        .args(["-I", "no-such-if0", "127.0.0.1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown interface: no-such-if0"));
}

#[test]
fn test_host_and_destination_conflict() {
    rtping().args(["-d", "127.0.0.1", "127.0.0.1"]).assert().code(2);
}
