//! Command-line behaviour of the two binaries: argument errors, exit codes,
//! output files.

use std::path::Path;
use std::process::{Command, Output};

fn run(bin: &str, args: &[&Path]) -> Output {
    Command::new(bin)
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("MD2TG_PARSE_MODE")
        .output()
        .expect("failed to spawn binary")
}

const MARKDOWNIFY: &str = env!("CARGO_BIN_EXE_tg-markdownify");
const TELEGRAMIFY: &str = env!("CARGO_BIN_EXE_tg-telegramify");

#[test]
fn missing_arguments_exit_with_usage_error() {
    for bin in [MARKDOWNIFY, TELEGRAMIFY] {
        let out = run(bin, &[]);
        assert_eq!(out.status.code(), Some(2), "{bin}");
        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(stderr.to_lowercase().contains("usage"), "stderr: {stderr}");
    }

    let dir = tempfile::tempdir().unwrap();
    let only_input = dir.path().join("in.md");
    let out = run(MARKDOWNIFY, &[&only_input]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn markdownify_converts_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.md");
    std::fs::write(&input, "**Hello**, world!").unwrap();
    let output = dir.path().join("nested/dir/out.txt");

    let out = run(MARKDOWNIFY, &[&input, &output]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "*Hello*, world\\!");
}

#[test]
fn markdownify_rejects_unknown_parse_mode() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.md");
    std::fs::write(&input, "text").unwrap();
    let output = dir.path().join("out.txt");

    let out = Command::new(MARKDOWNIFY)
        .arg("--parse-mode")
        .arg("HTML")
        .arg(&input)
        .arg(&output)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(!output.exists());
}

#[test]
fn missing_input_exits_with_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.txt");
    for bin in [MARKDOWNIFY, TELEGRAMIFY] {
        let out = run(bin, &[&dir.path().join("missing.md"), &output]);
        assert_eq!(out.status.code(), Some(1), "{bin}");
        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(stderr.contains("not found"), "stderr: {stderr}");
    }
    assert!(!output.exists());
}

#[test]
fn telegramify_writes_text_blocks_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.md");
    std::fs::write(&input, "# Report\r\n\r\n\r\n\r\nAll *good*.\u{200B}").unwrap();
    let output = dir.path().join("out/tg.txt");

    let out = Command::new(TELEGRAMIFY)
        .arg("--json")
        .arg("--quiet")
        .arg(&input)
        .arg(&output)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "*🌟 Report*\n\nAll _good_\\."
    );
    let blocks: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(blocks[0]["content_type"], "text");
}

#[test]
fn repeated_runs_produce_identical_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.md");
    std::fs::write(&input, "- one\n- two (2)\n").unwrap();
    let output = dir.path().join("out.txt");

    assert!(run(TELEGRAMIFY, &[&input, &output]).status.success());
    let first = std::fs::read(&output).unwrap();
    assert!(run(TELEGRAMIFY, &[&input, &output]).status.success());
    assert_eq!(std::fs::read(&output).unwrap(), first);
    assert_eq!(first, "⦁ one\n⦁ two \\(2\\)".as_bytes());
}
