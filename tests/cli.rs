use std::process::Command;

const BAD_SOURCE: &str = "package main\n\nfunc main() {\n\tx := make([]int64, 4, 16)\n\t_ = x[30]\n}\n";
const GOOD_SOURCE: &str =
    "package main\n\nfunc main() {\n\tx := make([]int64, 4, 16)\n\tif len(x) > 30 {\n\t\t_ = x[30]\n\t}\n}\n";

fn write_fixture(dir: &tempfile::TempDir, name: &str, source: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, source).expect("fixture should be writable");
    path
}

#[test]
fn json_output_reports_the_access_position() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_fixture(&dir, "main.go", BAD_SOURCE);

    let output = Command::new(env!("CARGO_BIN_EXE_goboundcheck"))
        .arg(&file)
        .args(["--format", "json"])
        .output()
        .expect("binary should run");

    // warnings alone do not fail the run
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let diags: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let diags = diags.as_array().expect("array of diagnostics");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0]["row"], 5);
    assert_eq!(diags[0]["lint"], "unchecked_bounds_access");
    assert_eq!(
        diags[0]["message"],
        "Slice or array access is not enclosed in an if-statement that validates capacity!"
    );
}

#[test]
fn deny_warnings_fails_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_fixture(&dir, "main.go", BAD_SOURCE);

    let output = Command::new(env!("CARGO_BIN_EXE_goboundcheck"))
        .arg(&file)
        .arg("--deny-warnings")
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn guarded_file_exits_clean() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_fixture(&dir, "main.go", GOOD_SOURCE);

    let output = Command::new(env!("CARGO_BIN_EXE_goboundcheck"))
        .arg(&file)
        .arg("--deny-warnings")
        .output()
        .expect("binary should run");

    assert!(output.status.success());
}

#[test]
fn directories_are_scanned_recursively() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("pkg");
    std::fs::create_dir_all(&nested).expect("mkdir");
    std::fs::write(nested.join("a.go"), BAD_SOURCE).expect("write");
    std::fs::write(nested.join("b.go"), GOOD_SOURCE).expect("write");
    // non-Go files are ignored
    std::fs::write(nested.join("notes.txt"), "x[30]").expect("write");

    let output = Command::new(env!("CARGO_BIN_EXE_goboundcheck"))
        .arg(dir.path())
        .args(["--format", "json"])
        .output()
        .expect("binary should run");

    let diags: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let diags = diags.as_array().expect("array of diagnostics");
    assert_eq!(diags.len(), 1);
    assert!(
        diags[0]["file"]
            .as_str()
            .expect("file path")
            .ends_with("a.go")
    );
}

#[test]
fn list_rules_names_the_bounds_lint() {
    let output = Command::new(env!("CARGO_BIN_EXE_goboundcheck"))
        .arg("list-rules")
        .output()
        .expect("binary should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("unchecked_bounds_access"));
}
