use std::fs;
use std::path::Path;

use seqwatch::registry::RunRegistry;
use tempfile::TempDir;

fn lines(entries: &[&str]) -> String {
    entries.iter().map(|e| format!("{e}\n")).collect()
}

fn read_list(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

/// Create a registry backed by two freshly written list files.
fn setup(run: &[&str], downloaded: &[&str]) -> (TempDir, RunRegistry) {
    let dir = tempfile::tempdir().unwrap();
    let run_list = dir.path().join("run_list.txt");
    let downloaded_list = dir.path().join("downloaded.txt");
    fs::write(&run_list, lines(run)).unwrap();
    fs::write(&downloaded_list, lines(downloaded)).unwrap();
    (dir, RunRegistry::new(run_list, downloaded_list))
}

#[test]
fn load_preserves_order_and_skips_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let run_list = dir.path().join("run_list.txt");
    let downloaded_list = dir.path().join("downloaded.txt");
    fs::write(&run_list, "20230401-KS01\n\n  20230402-KS02  \n").unwrap();
    fs::write(&downloaded_list, "").unwrap();

    let registry = RunRegistry::new(run_list, downloaded_list);
    assert_eq!(
        registry.load_run_list().unwrap(),
        vec!["20230401-KS01", "20230402-KS02"]
    );
    assert!(registry.load_downloaded().unwrap().is_empty());
}

#[test]
fn missing_list_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let registry = RunRegistry::new(
        dir.path().join("absent.txt"),
        dir.path().join("also_absent.txt"),
    );

    let err = registry.load_run_list().unwrap_err();
    assert!(err.to_string().contains("run_list"), "got: {err}");
    let err = registry.load_downloaded().unwrap_err();
    assert!(err.to_string().contains("downloaded_list"), "got: {err}");
}

#[test]
fn append_downloaded_adds_one_line() {
    let (dir, registry) = setup(&[], &["20230401-KS01"]);
    registry.append_downloaded("20230402-KS02").unwrap();
    assert_eq!(
        read_list(&dir.path().join("downloaded.txt")),
        vec!["20230401-KS01", "20230402-KS02"]
    );
}

#[test]
fn reconcile_moves_completed_run() {
    let (dir, registry) = setup(&["20230401-KS01", "20230402-KS02"], &[]);

    registry.reconcile("20230401-KS01").unwrap();

    assert_eq!(
        read_list(&dir.path().join("run_list.txt")),
        vec!["20230402-KS02"]
    );
    assert_eq!(
        read_list(&dir.path().join("downloaded.txt")),
        vec!["20230401-KS01"]
    );
}

#[test]
fn reconcile_preserves_order_of_remaining_entries() {
    let (dir, registry) = setup(&["a", "b", "c"], &[]);
    registry.reconcile("b").unwrap();
    assert_eq!(read_list(&dir.path().join("run_list.txt")), vec!["a", "c"]);
}

#[test]
fn reconcile_is_idempotent() {
    let (dir, registry) = setup(&["20230401-KS01"], &[]);

    registry.reconcile("20230401-KS01").unwrap();
    registry.reconcile("20230401-KS01").unwrap();

    assert!(read_list(&dir.path().join("run_list.txt")).is_empty());
    // The downloaded list holds the identifier exactly once.
    assert_eq!(
        read_list(&dir.path().join("downloaded.txt")),
        vec!["20230401-KS01"]
    );
}

#[test]
fn reconcile_raced_entry_removes_without_appending() {
    // The run was already marked downloaded through another path; reconcile
    // only drops it from the run list.
    let (dir, registry) = setup(&["20230401-KS01", "20230402-KS02"], &["20230401-KS01"]);

    registry.reconcile("20230401-KS01").unwrap();

    assert_eq!(
        read_list(&dir.path().join("run_list.txt")),
        vec!["20230402-KS02"]
    );
    assert_eq!(
        read_list(&dir.path().join("downloaded.txt")),
        vec!["20230401-KS01"]
    );
}

#[test]
fn exclusivity_restored_after_reconciling_raced_entries() {
    let (dir, registry) = setup(&["a", "b", "c"], &["a", "c"]);

    // One reconciling sweep over every raced identifier.
    for id in ["a", "c"] {
        registry.reconcile(id).unwrap();
    }

    let run_list = read_list(&dir.path().join("run_list.txt"));
    let downloaded = read_list(&dir.path().join("downloaded.txt"));
    assert_eq!(run_list, vec!["b"]);
    assert_eq!(downloaded, vec!["a", "c"]);
    for id in &downloaded {
        assert!(!run_list.contains(id));
    }
}
