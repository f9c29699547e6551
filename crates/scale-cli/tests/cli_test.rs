//! Runs the `scale` binary end to end: exit statuses, error output and a
//! save/restore round trip through real files.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn scale(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_scale"))
        .args(args)
        .stdin(Stdio::null())
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn scale_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_scale"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .env("RUST_LOG", "off")
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_neither_save_nor_restore_is_usage_error() {
    let out = scale(&[]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Usage"), "{stderr}");
    assert!(out.stdout.is_empty());
}

#[test]
fn test_save_and_restore_together_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("settings");
    let restore = dir.path().join("restore");
    let out = scale(&["-s", path_str(&settings), "-r", path_str(&restore)]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage"));
    // Rejected before any file is touched.
    assert!(!settings.exists());
}

#[test]
fn test_bad_token_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let settings = dir.path().join("settings");
    let output = dir.path().join("out.csv");
    fs::write(&input, "1,2\n3,x\n").unwrap();

    let out = scale(&[
        "-s",
        path_str(&settings),
        path_str(&input),
        path_str(&output),
    ]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.starts_with("scale: column 1: invalid token \"x\""), "{stderr}");
    assert_eq!(stderr.matches("invalid token").count(), 1, "{stderr}");
}

#[test]
fn test_missing_settings_file_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("absent");
    let out = scale(&["-r", path_str(&settings)]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("opening settings file"));
}

#[test]
fn test_save_then_restore_with_clamp() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("train.csv");
    let settings = dir.path().join("train.scale");
    let scaled = dir.path().join("train.out");
    fs::write(&input, "1,10\n2,20\n3,30\n").unwrap();

    let out = scale(&[
        "-s",
        path_str(&settings),
        path_str(&input),
        path_str(&scaled),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        fs::read_to_string(&settings).unwrap(),
        "0:0.5 -0.5 0 1\n1:0.05 -0.5 0 1\n"
    );
    assert_eq!(fs::read_to_string(&scaled).unwrap(), "0,0\n0.5,0.5\n1,1\n");

    let unseen = dir.path().join("test.csv");
    let restored = dir.path().join("test.out");
    fs::write(&unseen, "5,0\n2,20\n").unwrap();
    let out = scale(&[
        "-r",
        path_str(&settings),
        "-c",
        path_str(&unseen),
        path_str(&restored),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read_to_string(&restored).unwrap(), "1,0\n0.5,0.5\n");
}

#[test]
fn test_save_from_stdin_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("settings");
    let out = scale_with_stdin(&["-s", path_str(&settings)], "inf,1\n1,2\n");
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "0.5,0\n0.5,1\n");
    assert_eq!(
        fs::read_to_string(&settings).unwrap(),
        "0:0 0.5 0 1\n1:1 -1 0 1\n"
    );
}
