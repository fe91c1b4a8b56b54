//! Golden fixture harness: every line of a Go fixture carrying a `// want`
//! marker must produce exactly one diagnostic on that line, and no
//! unmarked line may produce any.

use goboundcheck::create_default_engine;
use regex::Regex;
use std::path::Path;
use walkdir::WalkDir;

fn marked_rows(source: &str) -> Vec<usize> {
    let marker = Regex::new(r"//\s*want\b").expect("marker regex");
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| marker.is_match(line))
        .map(|(i, _)| i + 1)
        .collect()
}

#[test]
fn fixtures_match_their_want_markers() {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/go");
    let engine = create_default_engine();

    let mut checked = 0usize;
    for entry in WalkDir::new(&fixtures) {
        let entry = entry.expect("fixture dir should be walkable");
        if entry.path().extension().and_then(|e| e.to_str()) != Some("go") {
            continue;
        }

        let source = std::fs::read_to_string(entry.path()).expect("fixture should be readable");
        let diags = engine.lint_source(&source).expect("linting should succeed");

        let mut actual: Vec<usize> = diags.iter().map(|d| d.span.start.row).collect();
        actual.sort_unstable();

        assert_eq!(
            actual,
            marked_rows(&source),
            "diagnostic rows diverge from `// want` markers in {}",
            entry.path().display()
        );
        checked += 1;
    }

    assert!(checked >= 5, "expected to check the Go fixtures, found {checked}");
}
