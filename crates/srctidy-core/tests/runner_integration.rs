//! Integration test: the parallel runner end-to-end over temporary trees.
//!
//! Uses a small check that upper-cases `todo` markers so the tests do not
//! depend on the built-in checks.

use proptest::prelude::*;
use srctidy_core::{
    Check, CheckKind, FileError, Finding, Location, Mode, RunReport, Runner, Scan, SourceFile,
    TextEdit, WalkerConfig,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

struct ShoutTodo;

impl Check for ShoutTodo {
    fn kind(&self) -> CheckKind {
        CheckKind::NoTrailingSpaces
    }

    fn scan(&self, file: &SourceFile) -> Scan {
        let findings = file
            .lines
            .iter()
            .flat_map(|line| {
                line.content.match_indices("todo").map(move |(col, _)| {
                    let start = line.start + col;
                    Finding::new(
                        self.kind(),
                        Location::new(file.relative_path.clone(), line.index, col + 1),
                        "lowercase todo",
                    )
                    .with_fix(TextEdit::new(start..start + 4, "TODO"))
                })
            })
            .collect();
        Scan::findings(findings)
    }
}

fn write_tree(root: &Path, files: &[(String, String)]) {
    for (name, contents) in files {
        let path = root.join(name);
        fs::create_dir_all(path.parent().expect("fixture path has a parent"))
            .expect("create fixture dir");
        fs::write(path, contents).expect("write fixture");
    }
}

fn run(root: &Path, mode: Mode, jobs: usize) -> RunReport {
    Runner::builder()
        .root(root)
        .check(ShoutTodo)
        .mode(mode)
        .jobs(Some(jobs))
        .build()
        .expect("runner should build")
        .run()
        .expect("run should succeed")
}

// ── Happy path ──

#[test]
fn fix_then_report_is_clean() {
    let tmp = TempDir::new().expect("tempdir");
    write_tree(
        tmp.path(),
        &[
            ("src/a.cpp".into(), "// todo one\nint x;\n// todo two\n".into()),
            ("src/b.h".into(), "clean\n".into()),
        ],
    );

    let fixed = run(tmp.path(), Mode::Fix, 4);
    assert_eq!(fixed.summary.files_scanned, 2);
    assert_eq!(fixed.summary.files_modified, 1);
    assert_eq!(fixed.summary.violations_fixed, 2);
    assert!(fixed.fixed_cleanly());

    let after = run(tmp.path(), Mode::Report, 4);
    assert!(after.is_clean(), "{}", after.format_compact());
    assert_eq!(
        fs::read_to_string(tmp.path().join("src/a.cpp")).expect("read"),
        "// TODO one\nint x;\n// TODO two\n"
    );
}

#[test]
fn compact_report_lists_findings_in_path_then_line_order() {
    let tmp = TempDir::new().expect("tempdir");
    write_tree(
        tmp.path(),
        &[
            ("z.c".into(), "todo\n".into()),
            ("a.c".into(), "ok\ntodo\n".into()),
        ],
    );
    let report = run(tmp.path(), Mode::Report, 3);
    insta::assert_snapshot!(report.format_compact(), @r"
    a.c:2: [NoTrailingSpaces] lowercase todo
    z.c:1: [NoTrailingSpaces] lowercase todo
    ");
}

// ── Configuration ──

#[test]
fn ignored_and_excluded_paths_are_skipped() {
    let tmp = TempDir::new().expect("tempdir");
    write_tree(
        tmp.path(),
        &[
            ("build/gen.c".into(), "todo\n".into()),
            ("vendor/lib.c".into(), "todo\n".into()),
            ("src/main.c".into(), "todo\n".into()),
            ("README.md".into(), "todo\n".into()),
        ],
    );
    let runner = Runner::builder()
        .root(tmp.path())
        .walker(WalkerConfig::default())
        .exclude("vendor/**")
        .check(ShoutTodo)
        .build()
        .expect("runner should build");
    let report = runner.run().expect("run should succeed");
    assert_eq!(report.summary.files_scanned, 1);
    assert_eq!(report.files[0].path, Path::new("src/main.c"));
}

#[test]
fn non_utf8_file_does_not_stop_the_run() {
    let tmp = TempDir::new().expect("tempdir");
    fs::write(tmp.path().join("a.c"), [0xc3, 0x28]).expect("write");
    fs::write(tmp.path().join("b.c"), "todo\n").expect("write");
    let report = run(tmp.path(), Mode::Fix, 2);
    assert_eq!(report.summary.files_scanned, 1);
    assert_eq!(report.summary.files_modified, 1);
    assert!(report
        .errors()
        .any(|e| matches!(e, FileError::Decode { .. })));
}

// ── Determinism ──

fn file_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    let name = "[a-d]{1,3}(/[a-d]{1,3})?\\.c";
    let piece = prop_oneof![Just("todo"), Just("x"), Just(" "), Just("\n")];
    let body = prop::collection::vec(piece, 0..20).prop_map(|parts| parts.concat());
    prop::collection::btree_map(name, body, 1..12)
        .prop_map(|files| files.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn report_is_independent_of_worker_count(files in file_strategy()) {
        let tmp = TempDir::new().expect("tempdir");
        write_tree(tmp.path(), &files);
        let sequential = run(tmp.path(), Mode::Report, 1);
        let parallel = run(tmp.path(), Mode::Report, 8);
        prop_assert_eq!(sequential.format_compact(), parallel.format_compact());
        prop_assert_eq!(sequential.summary, parallel.summary);
    }

    #[test]
    fn fixing_twice_changes_nothing_the_second_time(files in file_strategy()) {
        let tmp = TempDir::new().expect("tempdir");
        write_tree(tmp.path(), &files);
        run(tmp.path(), Mode::Fix, 4);
        let second = run(tmp.path(), Mode::Fix, 4);
        prop_assert_eq!(second.summary.files_modified, 0);
        prop_assert!(second.is_clean());
    }
}
