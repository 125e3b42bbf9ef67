//! Integration tests for CLI commands.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

const MESSAGE: &str = "8=FIX.4.4|9=61|35=d|49=ISSUER|56=REG|34=7|\
15=USD|223=4.250|453=1|448=US_TREASURY|452=1|10=042|";

const ROOT: &str = "0x30f9cfb27063009fe297c427f227114d68079135d72ac97f01aeca59e4ce6305";

fn write_message(dir: &TempDir) -> String {
    let path = dir.path().join("message.fix");
    fs::write(&path, MESSAGE).unwrap();
    path.to_string_lossy().to_string()
}

fn run_cli(args: &[&str]) -> (bool, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_fixcommit"))
        .args(args)
        .output()
        .expect("Failed to execute CLI");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    let success = output.status.success();

    (success, stdout, stderr)
}

#[test]
fn test_encode_command() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_message(&temp_dir);
    let (success, stdout, _) = run_cli(&["encode", &input]);
    assert!(success);
    assert_eq!(
        stdout.trim(),
        "a30f6355534418df65342e3235301901c581a21901c06b55535f54524541535552591901c46131"
    );
}

#[test]
fn test_encode_report_goes_to_stderr() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("lossy.fix");
    fs::write(&path, "15=USD|garbage|223=4.250").unwrap();
    let (success, stdout, stderr) = run_cli(&["encode", "--report", path.to_str().unwrap()]);
    assert!(success);
    assert!(!stdout.trim().is_empty());
    assert!(stderr.contains("Lossy"));
    assert!(stderr.contains("garbage"));
}

#[test]
fn test_tree_command() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_message(&temp_dir);
    let (success, stdout, _) = run_cli(&["tree", &input]);
    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["223"], "4.250");
    assert_eq!(parsed["453"][0]["448"], "US_TREASURY");
    assert!(parsed.get("35").is_none());
}

#[test]
fn test_leaves_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_message(&temp_dir);
    let (success, stdout, _) = run_cli(&["leaves", "--json", &input]);
    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let rows = parsed.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["path"], "15");
    assert_eq!(rows[0]["path_encoding"], "810f");
    assert_eq!(rows[3]["path"], "453.0.452");
}

#[test]
fn test_leaves_table_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_message(&temp_dir);
    let (success, stdout, _) = run_cli(&["leaves", &input]);
    assert!(success);
    assert!(stdout.contains("PATH"));
    assert!(stdout.contains("453.0.448"));
    assert!(stdout.contains(ROOT));
}

#[test]
fn test_commit_command() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_message(&temp_dir);
    let (success, stdout, _) = run_cli(&["commit", &input]);
    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["root"], ROOT);
    assert_eq!(parsed["leaf_count"], 4);
    assert_eq!(parsed["descriptor"]["fix_major"], 4);
    assert_eq!(parsed["descriptor"]["fix_minor"], 4);
    assert_eq!(parsed["descriptor"]["blob_len"], 39);
    assert!(parsed.get("blob").is_none());
}

#[test]
fn test_commit_store_and_blob_get() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_message(&temp_dir);
    let store = temp_dir.path().join("blobs.fxb");
    let store = store.to_str().unwrap();

    let (success, stdout, _) = run_cli(&["commit", "--store", store, &input]);
    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let b64 = parsed["descriptor"]["blob_ref"]["b64"].as_str().unwrap().to_string();
    assert_eq!(parsed["blob"]["offset"], 8);

    // committing again reuses the stored blob
    let (success, again, _) = run_cli(&["commit", "--store", store, &input]);
    assert!(success);
    let again: serde_json::Value = serde_json::from_str(&again).unwrap();
    assert_eq!(again["blob"], parsed["blob"]);

    let descriptor = temp_dir.path().join("commit.json");
    fs::write(&descriptor, &stdout).unwrap();

    let (success, hex_out, stderr) = run_cli(&[
        "blob-get",
        store,
        "--digest",
        &b64,
        "--descriptor",
        descriptor.to_str().unwrap(),
    ]);
    assert!(success, "stderr: {stderr}");
    assert!(hex_out.trim().starts_with("a30f63555344"));
    assert!(stderr.contains(ROOT));

    let (success, tree_out, _) = run_cli(&["blob-get", store, "--digest", &b64, "--tree"]);
    assert!(success);
    let tree: serde_json::Value = serde_json::from_str(&tree_out).unwrap();
    assert_eq!(tree["15"], "USD");
}

#[test]
fn test_blob_get_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_message(&temp_dir);
    let store = temp_dir.path().join("blobs.fxb");
    let store = store.to_str().unwrap();
    assert!(run_cli(&["commit", "--store", store, &input]).0);

    let missing = "47DEQpj8HBSa-_TImW-5JCeuQeRkm5NMpJWZG3hSuFU";
    let (success, _, stderr) = run_cli(&["blob-get", store, "--digest", missing]);
    assert!(!success);
    assert!(stderr.contains("Error"));
    assert!(stderr.contains("not found"));
}

#[test]
fn test_prove_and_verify() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_message(&temp_dir);
    let (success, stdout, _) = run_cli(&["prove", "--path", "453.0.448", &input]);
    assert!(success);
    let proof: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(proof["root"], ROOT);
    assert_eq!(proof["path"], serde_json::json!([453, 0, 448]));
    assert_eq!(proof["directions"], serde_json::json!([false, true]));

    let proof_path = temp_dir.path().join("proof.json");
    fs::write(&proof_path, &stdout).unwrap();
    let (success, out, _) = run_cli(&["verify", proof_path.to_str().unwrap()]);
    assert!(success);
    assert!(out.contains("VALID 453.0.448"));
}

#[test]
fn test_verify_rejects_tampered_value() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_message(&temp_dir);
    let (success, stdout, _) = run_cli(&["prove", "--path", "223", &input]);
    assert!(success);

    let mut proof: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    proof["value"] = serde_json::Value::String(hex_of("4.251"));
    let proof_path = temp_dir.path().join("proof.json");
    fs::write(&proof_path, proof.to_string()).unwrap();

    let (success, _, stderr) = run_cli(&["verify", proof_path.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("does not verify"));
}

#[test]
fn test_verify_against_other_root() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_message(&temp_dir);
    let (_, stdout, _) = run_cli(&["prove", "--path", "15", &input]);
    let proof_path = temp_dir.path().join("proof.json");
    fs::write(&proof_path, &stdout).unwrap();

    let other = format!("0x{}", "00".repeat(32));
    let (success, _, _) = run_cli(&["verify", proof_path.to_str().unwrap(), "--root", &other]);
    assert!(!success);
}

#[test]
fn test_prove_missing_path() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_message(&temp_dir);
    let (success, _, stderr) = run_cli(&["prove", "--path", "999", &input]);
    assert!(!success);
    assert!(stderr.contains("no field at path 999"));
}

#[test]
fn test_custom_schema_and_delimiter() {
    let temp_dir = TempDir::new().unwrap();
    let schema = temp_dir.path().join("schema.json");
    fs::write(
        &schema,
        r#"{"groups":[{"count_tag":9000,"delimiter_tag":9001,"members":[9002],"parent":null}]}"#,
    )
    .unwrap();
    let input = temp_dir.path().join("msg.txt");
    fs::write(&input, "15=USD\n9000=2\n9001=A\n9002=x\n9001=B\n").unwrap();

    let (success, stdout, stderr) = run_cli(&[
        "tree",
        "--delimiter",
        "newline",
        "--schema",
        schema.to_str().unwrap(),
        input.to_str().unwrap(),
    ]);
    assert!(success, "stderr: {stderr}");
    let tree: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(tree["9000"][0]["9002"], "x");
    assert_eq!(tree["9000"][1]["9001"], "B");
}

#[test]
fn test_malformed_group_count_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("bad.fix");
    fs::write(&input, "453=two|448=A").unwrap();
    let (success, _, stderr) = run_cli(&["commit", input.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.starts_with("Error:"));
}

fn hex_of(s: &str) -> String {
    s.bytes().map(|b| format!("{b:02x}")).collect()
}
