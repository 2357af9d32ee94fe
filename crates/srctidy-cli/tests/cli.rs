//! End-to-end tests for the `srctidy` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn srctidy(dir: &Path, args: &[&str]) -> Output {
    let global = TempDir::new().expect("tempdir");
    Command::new(env!("CARGO_BIN_EXE_srctidy"))
        .current_dir(dir)
        .env("SRCTIDY_CONFIG_DIR", global.path())
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("run srctidy")
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().expect("tempdir");
    for (path, content) in files {
        let full = tmp.path().join(path);
        fs::create_dir_all(full.parent().expect("parent")).expect("mkdir");
        fs::write(full, content).expect("write");
    }
    tmp
}

#[test]
fn check_on_clean_tree_exits_zero() {
    let tmp = project(&[("src/a.cpp", "int a;\n")]);
    let output = srctidy(tmp.path(), &["check", "src"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn check_reports_violations_in_compact_format() {
    let tmp = project(&[("src/a.cpp", "int a;  \n"), ("src/b.h", "\tint b;\n")]);
    let output = srctidy(tmp.path(), &["check", "src", "--format", "compact"]);
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(
        stdout,
        "a.cpp:1: [NoTrailingSpaces] trailing whitespace\nb.h:1: [NoTabs] tab in indentation\n"
    );
    assert_eq!(
        fs::read_to_string(tmp.path().join("src/a.cpp")).expect("read"),
        "int a;  \n"
    );
}

#[test]
fn fix_rewrites_files_and_leaves_a_clean_tree() {
    let tmp = project(&[(
        "src/a.cpp",
        "#include <b.h>\r\n#include <a.h>\r\n\tint a; \r\n\r\n",
    )]);

    let output = srctidy(tmp.path(), &["fix", "src"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        fs::read_to_string(tmp.path().join("src/a.cpp")).expect("read"),
        "#include <a.h>\n#include <b.h>\n    int a;\n"
    );

    let output = srctidy(tmp.path(), &["check", "src"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn json_output_carries_summary() {
    let tmp = project(&[("a.c", "x\r\n")]);
    let output = srctidy(tmp.path(), &["check", ".", "--format", "json"]);
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["summary"]["files_scanned"], 1);
    assert_eq!(report["summary"]["violations_found"], 1);
    assert_eq!(report["files"][0]["findings"][0]["check"], "UnixEOL");
}

#[test]
fn checks_flag_limits_the_run() {
    let tmp = project(&[("a.c", "\tx  \n")]);
    let output = srctidy(
        tmp.path(),
        &["check", ".", "--checks", "no-trailing-spaces", "--format", "compact"],
    );
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(stdout, "a.c:1: [NoTrailingSpaces] trailing whitespace\n");
}

#[test]
fn project_config_sets_source_root() {
    let tmp = project(&[
        (
            "srctidy.toml",
            "product = \"mathpresso\"\nsource = \"lib\"\n\n[tools]\nNoTabs = true\n",
        ),
        ("lib/a.cpp", "\tx;\n"),
        ("other/b.cpp", "\ty;\n"),
    ]);
    let output = srctidy(tmp.path(), &["check", "--format", "compact"]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(stdout, "a.cpp:1: [NoTabs] tab in indentation\n");
}

#[test]
fn project_path_uses_its_config_source() {
    let tmp = project(&[
        ("proj/srctidy.toml", "source = \"lib\"\n"),
        ("proj/lib/a.cpp", "x; \n"),
        ("proj/tools/gen.cpp", "\ty;\n"),
    ]);
    let output = srctidy(tmp.path(), &["check", "proj", "--format", "compact"]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(stdout, "a.cpp:1: [NoTrailingSpaces] trailing whitespace\n");
}

#[test]
fn invalid_config_is_fatal() {
    let tmp = project(&[
        ("srctidy.toml", "[checks.NoTabs]\ntab_width = 99\n"),
        ("a.c", "x\n"),
    ]);
    let output = srctidy(tmp.path(), &["check"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).expect("utf8");
    assert!(stderr.contains("tab_width"), "{stderr}");
}

#[test]
fn unknown_check_is_fatal() {
    let tmp = project(&[("a.c", "x\n")]);
    let output = srctidy(tmp.path(), &["check", ".", "--checks", "NoSemicolons"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn list_checks_prints_every_code() {
    let tmp = TempDir::new().expect("tempdir");
    let output = srctidy(tmp.path(), &["list-checks"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    for code in ["ST001", "ST002", "ST003", "ST004", "ST005", "ST006"] {
        assert!(stdout.contains(code), "missing {code}");
    }
}

#[test]
fn init_writes_a_loadable_config() {
    let tmp = TempDir::new().expect("tempdir");
    let output = srctidy(tmp.path(), &["init"]);
    assert!(output.status.success());
    assert!(tmp.path().join("srctidy.toml").is_file());

    let output = srctidy(tmp.path(), &["init"]);
    assert_eq!(output.status.code(), Some(2));

    let output = srctidy(tmp.path(), &["check"]);
    assert_eq!(output.status.code(), Some(0));
}
