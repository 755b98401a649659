use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, UNIX_EPOCH};
use tempfile::tempdir;

use content_ledger::hasher::{ContentHasher, Sha1Hasher};
use content_ledger::{
    AppConfig, ContinuousMonitor, Error, Fingerprint, Group, ProgressReporter, ScanEngine,
    SilentReporter,
};

/// Counts calls before delegating to SHA-1.
#[derive(Default)]
struct CountingHasher {
    calls: AtomicUsize,
}

impl CountingHasher {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ContentHasher for CountingHasher {
    fn hash_file(&self, path: &Path, chunk_size: usize) -> io::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Sha1Hasher.hash_file(path, chunk_size)
    }
}

/// Records the store-write callbacks it receives.
#[derive(Default)]
struct WriteEvents {
    events: Mutex<Vec<String>>,
}

impl WriteEvents {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressReporter for WriteEvents {
    fn on_store_write_start(&self) {
        self.events.lock().unwrap().push("start".into());
    }

    fn on_store_write_complete(&self, _rows: usize, _duration_secs: f64) {
        self.events.lock().unwrap().push("complete".into());
    }

    fn on_store_write_failed(&self, _error: &str) {
        self.events.lock().unwrap().push("failed".into());
    }
}

/// Layout:
///   root/
///     setup.exe          ("installer")
///     notes.txt          ("notes")
///     Documents/
///       report.pdf       ("report")
///       deep/ignored.txt (not reported, two levels down)
///     Music/
///       song.mp3         ("song")
///     desktop.ini        (excluded)
///     random_dir/x.txt   (not a group folder)
fn create_test_tree(root: &Path) {
    fs::create_dir_all(root.join("Documents").join("deep")).unwrap();
    fs::create_dir_all(root.join("Music")).unwrap();
    fs::create_dir_all(root.join("random_dir")).unwrap();

    fs::write(root.join("setup.exe"), "installer").unwrap();
    fs::write(root.join("notes.txt"), "notes").unwrap();
    fs::write(root.join("desktop.ini"), "[shell]").unwrap();
    fs::write(root.join("Documents").join("report.pdf"), "report").unwrap();
    fs::write(root.join("Documents").join("deep").join("ignored.txt"), "deep").unwrap();
    fs::write(root.join("Music").join("song.mp3"), "song").unwrap();
    fs::write(root.join("random_dir").join("x.txt"), "x").unwrap();
}

fn set_mtime(path: &Path, secs: u64) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(secs)).unwrap();
}

#[test]
fn test_first_run_builds_inventory() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    create_test_tree(root);

    let engine = ScanEngine::new(AppConfig::for_root(root));
    let result = engine.run_cycle(&SilentReporter).unwrap();

    assert_eq!(result.previous_count, 0);
    assert_eq!(result.stats.scanned, 4);
    assert_eq!(result.stats.hashed, 4);
    assert_eq!(result.stats.reused, 0);
    assert_eq!(result.records.len(), 4);
    assert!(root.join("results.csv").exists());

    let names: Vec<String> = result.records.iter().map(|r| r.display_path()).collect();
    assert!(names.contains(&"Documents/report.pdf".to_string()));
    assert!(names.contains(&"Music/song.mp3".to_string()));
    assert!(!names.iter().any(|n| n.contains("ignored.txt")));
    assert!(!names.iter().any(|n| n.contains("desktop.ini")));
    assert!(!names.iter().any(|n| n.contains("results.csv")));

    let stored = engine.load_inventory().unwrap();
    assert_eq!(stored.len(), 4);
}

#[test]
fn test_unchanged_files_are_not_rehashed() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    create_test_tree(root);

    let first = ScanEngine::new(AppConfig::for_root(root))
        .run_cycle(&SilentReporter)
        .unwrap();

    let engine = ScanEngine::with_hasher(AppConfig::for_root(root), CountingHasher::default());
    let second = engine.run_cycle(&SilentReporter).unwrap();

    assert_eq!(engine.hasher().calls(), 0);
    assert_eq!(second.stats.reused, 4);
    assert_eq!(second.stats.hashed, 0);

    for record in &second.records {
        let before = first
            .records
            .iter()
            .find(|r| r.group == record.group && r.filename == record.filename)
            .unwrap();
        assert_eq!(before.fingerprint, record.fingerprint);
    }
}

#[test]
fn test_changed_timestamp_forces_rehash() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    create_test_tree(root);
    let notes = root.join("notes.txt");
    set_mtime(&notes, 1_700_000_000);

    ScanEngine::new(AppConfig::for_root(root))
        .run_cycle(&SilentReporter)
        .unwrap();

    fs::write(&notes, "edited notes").unwrap();
    set_mtime(&notes, 1_700_003_600);

    let engine = ScanEngine::with_hasher(AppConfig::for_root(root), CountingHasher::default());
    let result = engine.run_cycle(&SilentReporter).unwrap();

    assert_eq!(engine.hasher().calls(), 1);
    assert_eq!(result.stats.hashed, 1);
    assert_eq!(result.stats.reused, 3);

    let expected = Sha1Hasher.hash_file(&notes, 8192).unwrap();
    let record = result
        .records
        .iter()
        .find(|r| r.filename == "notes.txt")
        .unwrap();
    assert_eq!(record.fingerprint, Fingerprint::Digest(expected));
}

#[test]
fn test_moved_file_keeps_one_record() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir(root.join("Compressed")).unwrap();
    fs::write(root.join("archive.zip"), "zip bytes").unwrap();

    let engine = ScanEngine::new(AppConfig::for_root(root));
    engine.run_cycle(&SilentReporter).unwrap();

    fs::rename(
        root.join("archive.zip"),
        root.join("Compressed").join("archive.zip"),
    )
    .unwrap();
    let result = engine.run_cycle(&SilentReporter).unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].group, Group::Folder("Compressed".into()));
    assert_eq!(engine.load_inventory().unwrap().len(), 1);
}

#[test]
fn test_deleted_file_is_dropped() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    create_test_tree(root);

    let engine = ScanEngine::new(AppConfig::for_root(root));
    engine.run_cycle(&SilentReporter).unwrap();
    fs::remove_file(root.join("notes.txt")).unwrap();

    let result = engine.run_cycle(&SilentReporter).unwrap();
    assert_eq!(result.previous_count, 4);
    assert_eq!(result.records.len(), 3);
    assert!(!result.records.iter().any(|r| r.filename == "notes.txt"));
}

#[test]
fn test_missing_root_aborts_cycle() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("does_not_exist");

    let engine = ScanEngine::new(AppConfig::for_root(&root));
    let result = engine.run_cycle(&SilentReporter);

    assert!(matches!(result, Err(Error::RootNotFound(_))));
    assert!(!root.exists());
}

#[test]
fn test_too_large_files_skip_hashing_and_grouping() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    let big = vec![0x5Au8; 2 * 1024 * 1024];
    fs::write(root.join("big_a.iso"), &big).unwrap();
    fs::write(root.join("big_b.iso"), &big).unwrap();
    fs::write(root.join("small.txt"), "small").unwrap();

    let config = AppConfig {
        max_file_size_mb: Some(1),
        ..AppConfig::for_root(root)
    };
    let engine = ScanEngine::with_hasher(config, CountingHasher::default());
    let result = engine.run_cycle(&SilentReporter).unwrap();

    assert_eq!(engine.hasher().calls(), 1);
    assert_eq!(result.stats.too_large, 2);
    assert_eq!(result.records.len(), 3);
    assert!(result.duplicates.is_empty());

    let sentinels = result
        .records
        .iter()
        .filter(|r| r.fingerprint == Fingerprint::TooLarge)
        .count();
    assert_eq!(sentinels, 2);
}

#[test]
fn test_cycle_reports_duplicates_on_disk() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir(root.join("Documents")).unwrap();
    fs::write(root.join("report.pdf"), "same report").unwrap();
    fs::write(root.join("Documents").join("report.pdf"), "same report").unwrap();

    let result = ScanEngine::new(AppConfig::for_root(root))
        .run_cycle(&SilentReporter)
        .unwrap();

    assert_eq!(result.duplicates.group_count(), 1);
    assert_eq!(result.duplicates.total_duplicates, 1);
    assert_eq!(result.duplicates.wasted_space, "same report".len() as u64);
    // the inventory itself holds the content once
    assert_eq!(result.records.len(), 1);
}

#[test]
fn test_extensions_can_be_disabled() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    create_test_tree(root);

    let config = AppConfig {
        enable_extensions: false,
        ..AppConfig::for_root(root)
    };
    let result = ScanEngine::new(config).run_cycle(&SilentReporter).unwrap();
    assert!(result.extensions.is_none());

    let result = ScanEngine::new(AppConfig::for_root(root))
        .run_cycle(&SilentReporter)
        .unwrap();
    let extensions = result.extensions.unwrap();
    assert_eq!(extensions.analyses.len(), 2);
    assert_eq!(extensions.changes.len(), 1);
    assert!(extensions.changes[0].1.is_empty());
}

#[test]
fn test_monitor_runs_fixed_number_of_cycles() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    create_test_tree(root);

    let engine = ScanEngine::new(AppConfig::for_root(root));
    let monitor = ContinuousMonitor::with_engine(engine, Duration::ZERO);

    let mut reused = Vec::new();
    let summary = monitor.run_with(&SilentReporter, Some(3), |_, result| {
        reused.push(result.as_ref().map(|r| r.stats.reused).unwrap_or(usize::MAX));
    });

    assert_eq!(summary.cycles, 3);
    assert_eq!(summary.failures, 0);
    assert_eq!(reused, vec![0, 4, 4]);
}

#[test]
fn test_monitor_survives_failed_cycles() {
    let tmp = tempdir().unwrap();
    let config = AppConfig::for_root(tmp.path().join("missing"));
    let monitor = ContinuousMonitor::with_engine(ScanEngine::new(config), Duration::ZERO);

    let summary = monitor.run(&SilentReporter, Some(2));
    assert_eq!(summary.cycles, 2);
    assert_eq!(summary.failures, 2);
}

#[test]
fn test_scan_files_leaves_store_untouched() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    create_test_tree(root);

    let engine = ScanEngine::new(AppConfig::for_root(root));
    let records = engine.scan_files(&SilentReporter).unwrap();
    assert_eq!(records.len(), 4);
    assert!(!root.join("results.csv").exists());
}

#[test]
fn test_monitor_with_zero_cycles_does_nothing() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    create_test_tree(root);

    let monitor = ContinuousMonitor::with_engine(
        ScanEngine::new(AppConfig::for_root(root)),
        Duration::ZERO,
    );
    let mut seen = 0;
    let summary = monitor.run_with(&SilentReporter, Some(0), |_, _| seen += 1);

    assert_eq!(summary.cycles, 0);
    assert_eq!(seen, 0);
    assert!(!root.join("results.csv").exists());
}

#[test]
fn test_unreadable_store_is_rebuilt() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    create_test_tree(root);
    fs::write(root.join("results.csv"), b"path,sha1sum,timestamp\xff\n~\\a.txt,abc,24/01/01\n")
        .unwrap();

    let engine = ScanEngine::new(AppConfig::for_root(root));
    assert!(engine.load_inventory().is_err());

    let result = engine.run_cycle(&SilentReporter).unwrap();
    assert_eq!(result.previous_count, 0);
    assert_eq!(result.stats.hashed, 4);
    assert_eq!(result.records.len(), 4);

    let stored = engine.load_inventory().unwrap();
    assert_eq!(stored.len(), 4);
}

#[test]
fn test_unreadable_store_is_not_cleaned() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    let bytes = b"path,sha1sum,timestamp\xff\n~\\a.txt,abc,24/01/01\n";
    fs::write(root.join("results.csv"), bytes).unwrap();

    let engine = ScanEngine::new(AppConfig::for_root(root));
    assert!(engine.clean_store().is_err());
    assert_eq!(fs::read(root.join("results.csv")).unwrap(), bytes.to_vec());
}

#[test]
fn test_failed_store_write_is_reported() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    create_test_tree(root);
    fs::create_dir(root.join("results.csv.tmp")).unwrap();
    fs::write(root.join("results.csv.tmp").join("blocker"), "x").unwrap();

    let reporter = WriteEvents::default();
    let result = ScanEngine::new(AppConfig::for_root(root)).run_cycle(&reporter);

    assert!(matches!(result, Err(Error::StoreWrite { .. })));
    assert_eq!(reporter.events(), vec!["start", "failed"]);
    assert!(!root.join("results.csv").exists());
}

#[test]
fn test_successful_store_write_is_reported() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    create_test_tree(root);

    let reporter = WriteEvents::default();
    ScanEngine::new(AppConfig::for_root(root))
        .run_cycle(&reporter)
        .unwrap();
    assert_eq!(reporter.events(), vec!["start", "complete"]);
}
