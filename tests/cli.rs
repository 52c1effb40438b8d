//! Exit codes and output of the `lagrange-keygen` binary

#![cfg(unix)]

mod common;

use common::{Workspace, STUB_KEY};
use std::process::{Command, Output};

fn keygen(ws: &Workspace, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lagrange-keygen"))
        .args(args)
        .arg("--env-file")
        .arg(ws.env_path())
        .arg("--keystore-dir")
        .arg(ws.keystore_dir())
        .current_dir(ws.root())
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn cast_args(ws: &Workspace) -> Vec<String> {
    vec![
        "--backend".to_string(),
        "cast".to_string(),
        "--cast-bin".to_string(),
        ws.working_cast().to_string_lossy().into_owned(),
    ]
}

fn run_with_cast(ws: &Workspace, extra: &[&str]) -> Output {
    let args = cast_args(ws);
    let mut all: Vec<&str> = extra.to_vec();
    all.extend(args.iter().map(String::as_str));
    keygen(ws, &all)
}

#[test]
fn test_marker_present_exits_one_without_commands() {
    let original = "LAGRANGE_OPERATOR_KEYSTORE_PW=secret123\nECDSA_X=1\n";
    let ws = Workspace::new(original);

    let output = run_with_cast(&ws, &["generate"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("already contains x coordinate"));
    assert!(ws.invocations().is_empty());
    assert_eq!(ws.env_contents(), original);
}

#[test]
fn test_missing_password_exits_one_without_commands() {
    let ws = Workspace::new("OTHER=1\n");

    let output = run_with_cast(&ws, &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("LAGRANGE_OPERATOR_KEYSTORE_PW not found"));
    assert!(ws.invocations().is_empty());
}

#[test]
fn test_generate_prints_backup_notice() {
    let ws = Workspace::new("LAGRANGE_OPERATOR_KEYSTORE_PW=secret123\n");

    let output = run_with_cast(&ws, &["generate"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Please back up this ECDSA SK:"));
    assert!(stdout.contains(&format!("LAGRANGE_ECDSA_SK {}", STUB_KEY)));
    assert!(ws.env_contents().contains("ECDSA_Y="));
    assert_eq!(ws.invocations().len(), 2);
}

#[test]
fn test_generation_failure_exit_code_propagates() {
    let ws = Workspace::new("LAGRANGE_OPERATOR_KEYSTORE_PW=secret123\n");
    let failing = ws.stub_cast("", 7);

    let output = keygen(
        &ws,
        &["--backend", "cast", "--cast-bin", failing.to_str().unwrap()],
    );

    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn test_native_generate_then_verify() {
    let ws = Workspace::new("LAGRANGE_OPERATOR_KEYSTORE_PW=secret123\n");

    let generated = keygen(&ws, &["generate", "--backend", "native"]);
    assert_eq!(generated.status.code(), Some(0), "{}", String::from_utf8_lossy(&generated.stderr));
    assert!(ws.keystore_dir().join("avs").exists());

    let verified = keygen(&ws, &["verify"]);
    assert_eq!(verified.status.code(), Some(0), "{}", String::from_utf8_lossy(&verified.stderr));
    assert!(String::from_utf8_lossy(&verified.stdout).contains("OK"));

    // A second run refuses to overwrite the key material
    let again = keygen(&ws, &["generate", "--backend", "native"]);
    assert_eq!(again.status.code(), Some(1));
}

#[test]
fn test_derive_known_key() {
    let ws = Workspace::new("");

    let output = keygen(&ws, &["derive", "--private-key", &format!("0x{:064x}", 1)]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ECDSA_X=55066263022277343669578718895168534326250603453777594175500187360389116729240"));
    assert!(stdout.contains("ECDSA_Y=32670510020758816978083085130507043184471273380659243275938904335757337482424"));
}

#[test]
fn test_derive_json_from_env_file() {
    let ws = Workspace::new(&format!("LAGRANGE_ECDSA_SK={}\n", STUB_KEY));

    let output = keygen(&ws, &["derive", "--json"]);

    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["ECDSA_X"].is_string());
    assert!(json["ECDSA_Y"].is_string());
    assert!(json["address"].as_str().unwrap().starts_with("0x"));
}

#[test]
fn test_invalid_derive_key_exits_one() {
    let ws = Workspace::new("");

    let output = keygen(&ws, &["derive", "--private-key", "0x1234"]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_keystore_name_flag_overrides_invalid_env_value() {
    let ws = Workspace::new("");

    let output = Command::new(env!("CARGO_BIN_EXE_lagrange-keygen"))
        .args(["derive", "--private-key", STUB_KEY, "--keystore-name", "avs"])
        .current_dir(ws.root())
        .env("LAGRANGE_KEYGEN_KEYSTORE_NAME", "a/b")
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let rejected = Command::new(env!("CARGO_BIN_EXE_lagrange-keygen"))
        .args(["derive", "--private-key", STUB_KEY])
        .current_dir(ws.root())
        .env("LAGRANGE_KEYGEN_KEYSTORE_NAME", "a/b")
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert_eq!(rejected.status.code(), Some(1));
}
