use opp::{escape_path, ErrorKind, Preprocessor, PreprocessorConfig};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn include(path: &str) -> String {
    format!("##<{}.", escape_path(path))
}

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn include_splices_header_output() {
    let dir = tempdir().unwrap();
    write(dir.path(), "header.h", "##:GREETING hello\nint a;\n");
    write(
        dir.path(),
        "main.c",
        &format!("{}\nGREETING world\n", include("header.h")),
    );

    let output = Preprocessor::default()
        .process_file(dir.path().join("main.c"))
        .unwrap();
    assert_eq!(output, "int a;\nhello world\n");
}

#[test]
fn include_by_absolute_path_without_current_file() {
    let dir = tempdir().unwrap();
    write(dir.path(), "abs.h", "from abs\n");
    let header = dir.path().join("abs.h");

    let input = format!("{}\nafter", include(&header.to_string_lossy()));
    let output = Preprocessor::default().process(&input).unwrap();
    assert_eq!(output, "from abs\nafter");
}

#[test]
fn nested_includes_resolve_against_the_including_file() {
    // main.c -> inc/outer.h -> inc/inner.h
    let dir = tempdir().unwrap();
    write(dir.path(), "inc/inner.h", "inner\n");
    write(
        dir.path(),
        "inc/outer.h",
        &format!("outer begin\n{}\nouter end\n", include("inner.h")),
    );
    write(dir.path(), "main.c", &format!("{}\nmain\n", include("inc/outer.h")));

    let output = Preprocessor::default()
        .process_file(dir.path().join("main.c"))
        .unwrap();
    assert_eq!(output, "outer begin\ninner\nouter end\nmain\n");
}

#[test]
fn definitions_are_shared_both_ways() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "config.h",
        "##:VERSION PARENT_NAME-2\n##-REMOVED\n",
    );
    write(
        dir.path(),
        "main.c",
        &format!(
            "##:PARENT_NAME opp\n##:REMOVED gone\n{}\nVERSION\nREMOVED\n##~(~VERSION|~VERSION)|~(~VERSION|~VERSION)\nhas version\n##.\n",
            include("config.h")
        ),
    );

    let output = Preprocessor::default()
        .process_file(dir.path().join("main.c"))
        .unwrap();
    assert_eq!(output, "opp-2\nREMOVED\nhas version\n");
}

#[test]
fn brace_counters_flow_back_but_random_state_does_not() {
    let dir = tempdir().unwrap();
    write(dir.path(), "braces.h", "{ {\n##$\n");
    write(
        dir.path(),
        "main.c",
        &format!("{}\n##{{\n##$\n", include("braces.h")),
    );

    let output = Preprocessor::default()
        .process_file(dir.path().join("main.c"))
        .unwrap();
    assert_eq!(output, "{ {\n1250496027\n2\n1250496027\n");
}

#[test]
fn included_lines_are_numbered_from_one() {
    let dir = tempdir().unwrap();
    write(dir.path(), "lines.h", "x\n##_\n");
    write(
        dir.path(),
        "main.c",
        &format!("a\nb\nc\n{}\n##_\n", include("lines.h")),
    );

    let output = Preprocessor::default()
        .process_file(dir.path().join("main.c"))
        .unwrap();
    assert_eq!(output, "a\nb\nc\nx\n-3\n0\n");
}

#[test]
fn empty_include_emits_nothing() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty.h", "##:ONLY definitions\n");
    write(
        dir.path(),
        "main.c",
        &format!("a\n{}\nb", include("empty.h")),
    );

    let output = Preprocessor::default()
        .process_file(dir.path().join("main.c"))
        .unwrap();
    assert_eq!(output, "a\nb");
}

#[test]
fn missing_include_reports_file_not_found() {
    let dir = tempdir().unwrap();
    write(dir.path(), "main.c", &format!("ok\n{}\n", include("missing.h")));

    let err = Preprocessor::default()
        .process_file(dir.path().join("main.c"))
        .unwrap_err();
    assert_eq!(err.line(), Some(2));
    match err.kind() {
        Some(ErrorKind::FileNotFound { path, .. }) => assert_eq!(path, Path::new("missing.h")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn include_without_terminator_is_invalid() {
    let err = Preprocessor::default()
        .process("##<header\\.h")
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        Some(ErrorKind::InvalidIncludeSyntax { .. })
    ));
}

#[test]
fn errors_inside_includes_are_wrapped() {
    let dir = tempdir().unwrap();
    write(dir.path(), "bad.h", "fine\n##.\n");
    write(dir.path(), "main.c", &format!("first\n{}\n", include("bad.h")));

    let err = Preprocessor::default()
        .process_file(dir.path().join("main.c"))
        .unwrap_err();
    assert_eq!(err.line(), Some(2));
    match err.kind() {
        Some(ErrorKind::Included { file, .. }) => assert!(file.ends_with("bad.h")),
        other => panic!("unexpected error: {:?}", other),
    }

    let cause = err.root_cause();
    assert_eq!(cause.line(), Some(2));
    assert!(matches!(cause.kind(), Some(ErrorKind::UnmatchedClose)));
    assert!(err.to_string().contains("error processing included file"));
}

#[test]
fn self_include_stops_at_depth_limit() {
    let dir = tempdir().unwrap();
    write(dir.path(), "loop.h", &format!("{}\n", include("loop.h")));

    let config = PreprocessorConfig {
        max_include_depth: 8,
        ..PreprocessorConfig::default()
    };
    let mut preprocessor = Preprocessor::new(config);
    let err = preprocessor
        .process_file(dir.path().join("loop.h"))
        .unwrap_err();

    assert!(matches!(
        err.root_cause().kind(),
        Some(ErrorKind::IncludeDepthExceeded { limit: 8 })
    ));
}
