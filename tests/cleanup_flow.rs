use std::fs::{self, File};
use std::io::{self, BufReader, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;
use tempfile::{tempdir, TempDir};

use large_file_cleanup::config::Config;
use large_file_cleanup::models::StatsSnapshot;
use large_file_cleanup::report::{rank_by_size, render_top_files};
use large_file_cleanup::runtime::CancellableInput;
use large_file_cleanup::scanner::FileScanner;
use large_file_cleanup::{
    App, CancellationSignal, CompletionStatus, DeletionMode, RunOptions, ScanStats, ValidationError,
};

const GIB: u64 = 1 << 30;
const MIB: u64 = 1 << 20;

/// 约 1 KB 的阈值，让测试文件保持很小
const TINY_GB: f64 = 1024.0 / GIB as f64;

/// 创建稀疏文件，大小按 metadata 计算但不占用磁盘
fn sparse_file(path: &Path, len: u64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().set_len(len).unwrap();
}

fn small_file(path: &Path, len: usize) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, vec![3u8; len]).unwrap();
}

fn read_summary(path: &Path) -> StatsSnapshot {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// 一直没有输入的终端，发送端存活期间读取会阻塞
struct IdleTerminal(Receiver<Vec<u8>>);

impl Read for IdleTerminal {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0.recv() {
            Ok(bytes) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Err(_) => Ok(0),
        }
    }
}

/// 任何写入都失败的输出
struct ClosedOutput;

impl Write for ClosedOutput {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "output closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Workspace {
    root: TempDir,
    logs: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            root: tempdir().unwrap(),
            logs: tempdir().unwrap(),
        }
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    fn saved_summaries(&self) -> Vec<PathBuf> {
        fs::read_dir(self.logs.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.file_name().unwrap().to_string_lossy().starts_with("summary_"))
            .collect()
    }

    fn app(&self, mode: DeletionMode, dry_run: bool, signal: CancellationSignal) -> App {
        let mut config = Config::default();
        config.report.log_dir = self.logs.path().to_path_buf();

        let options = RunOptions {
            target: self.root.path().to_path_buf(),
            min_size_gb: TINY_GB,
            mode,
            dry_run,
        };
        App::new(config, options, signal).unwrap()
    }
}

#[test]
fn test_scenario_two_gib_and_500_mib() {
    let workspace = Workspace::new();
    sparse_file(&workspace.path("video/movie.mkv"), 2 * GIB);
    sparse_file(&workspace.path("backup.tar"), 500 * MIB);

    let scanner = FileScanner::new(GIB);
    let mut stats = ScanStats::new();
    let records = scanner.scan(workspace.root.path(), &mut stats, &CancellationSignal::new());

    assert_eq!(stats.large_files_found, 1);
    assert_eq!(stats.files_scanned, 2);
    assert!(records.iter().all(|r| r.size() >= GIB));

    let ranked = rank_by_size(&records);
    assert_eq!(ranked.len(), 1);
    assert!(ranked[0].path().ends_with("video/movie.mkv"));

    let table = render_top_files(&records, 10);
    assert!(table.contains("movie.mkv"));
    assert!(table.contains("2.00 GB"));
    assert!(!table.contains("backup.tar"));
}

#[test]
fn test_batch_skips_protected_location() {
    let workspace = Workspace::new();
    let protected = workspace.path("Library/Preferences/huge.bin");
    let ordinary = workspace.path("Downloads/huge.bin");
    small_file(&protected, 4096);
    small_file(&ordinary, 4096);

    let app = workspace.app(DeletionMode::Batch, false, CancellationSignal::new());
    let report = app.run(Cursor::new(""), Vec::new()).unwrap();

    assert!(protected.exists());
    assert!(!ordinary.exists());
    assert_eq!(report.stats.large_files_found, 2);
    assert_eq!(report.stats.files_deleted, 1);
    assert_eq!(report.stats.bytes_freed, 4096);
    assert_eq!(report.stats.completion_status, CompletionStatus::Completed);
}

#[test]
fn test_dry_run_leaves_disk_unchanged() {
    let workspace = Workspace::new();
    let files = [
        workspace.path("a.iso"),
        workspace.path("nested/b.iso"),
        workspace.path("nested/deeper/c.iso"),
    ];
    for file in &files {
        small_file(file, 2048);
    }
    small_file(&workspace.path("notes.txt"), 10);

    let app = workspace.app(DeletionMode::Batch, true, CancellationSignal::new());
    let report = app.run(Cursor::new(""), Vec::new()).unwrap();

    assert!(files.iter().all(|f| f.exists()));
    assert_eq!(report.stats.files_deleted, 3);
    assert_eq!(report.stats.bytes_freed, 3 * 2048);
    assert_eq!(report.stats.files_scanned, 4);
}

#[test]
fn test_interactive_no_yes_quit() {
    let workspace = Workspace::new();
    let files = [workspace.path("a.bin"), workspace.path("b.bin"), workspace.path("c.bin")];
    for file in &files {
        small_file(file, 2048);
    }

    let app = workspace.app(DeletionMode::Interactive, false, CancellationSignal::new());
    let mut output = Vec::new();
    let report = app.run(Cursor::new("n\ny\nq\n"), &mut output).unwrap();

    assert!(files[0].exists());
    assert!(!files[1].exists());
    assert!(files[2].exists());
    assert_eq!(report.stats.files_deleted, 1);
    assert_eq!(report.stats.completion_status, CompletionStatus::Completed);

    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("[3/3]"));
}

#[test]
fn test_cancelled_run_still_reports() {
    let workspace = Workspace::new();
    small_file(&workspace.path("a.bin"), 2048);
    small_file(&workspace.path("b.bin"), 2048);

    let signal = CancellationSignal::new();
    signal.cancel();

    let app = workspace.app(DeletionMode::Batch, false, signal);
    let report = app.run(Cursor::new(""), Vec::new()).unwrap();

    assert!(report.stats.interrupted);
    assert_eq!(report.stats.completion_status, CompletionStatus::Interrupted);
    assert!(report.stats.files_scanned <= 2);
    assert!(workspace.path("a.bin").exists());
    assert!(workspace.path("b.bin").exists());

    let summary_path = report.summary_path.expect("summary should be written");
    let saved = read_summary(&summary_path);
    assert_eq!(saved.completion_status, CompletionStatus::Interrupted);
    assert!(saved.interrupted);
}

#[test]
fn test_interrupt_while_waiting_for_answer_still_reports() {
    let workspace = Workspace::new();
    small_file(&workspace.path("a.bin"), 2048);
    small_file(&workspace.path("b.bin"), 2048);

    let signal = CancellationSignal::new();
    let (_keyboard, pending) = mpsc::channel::<Vec<u8>>();
    let input = CancellableInput::spawn(BufReader::new(IdleTerminal(pending)), signal.clone());

    let interrupter = signal.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        interrupter.cancel();
    });

    let app = workspace.app(DeletionMode::Interactive, false, signal);
    let mut output = Vec::new();
    let report = app.run(input, &mut output).unwrap();
    handle.join().unwrap();

    assert!(workspace.path("a.bin").exists());
    assert!(workspace.path("b.bin").exists());
    assert_eq!(report.stats.files_deleted, 0);
    assert_eq!(report.stats.completion_status, CompletionStatus::Interrupted);

    let saved = read_summary(&report.summary_path.expect("summary should be written"));
    assert_eq!(saved.completion_status, CompletionStatus::Interrupted);
    assert!(saved.interrupted);

    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("清理汇总报告"));
    assert!(output.contains("状态: INTERRUPTED"));
}

#[test]
fn test_fault_still_writes_error_summary() {
    let workspace = Workspace::new();
    small_file(&workspace.path("a.bin"), 2048);

    let app = workspace.app(DeletionMode::Batch, false, CancellationSignal::new());
    let result = app.run(Cursor::new(""), ClosedOutput);

    assert!(result.is_err());
    assert!(workspace.path("a.bin").exists());

    let summaries = workspace.saved_summaries();
    assert_eq!(summaries.len(), 1);
    let saved = read_summary(&summaries[0]);
    assert_eq!(saved.completion_status, CompletionStatus::Error);
    assert_eq!(saved.files_scanned, 1);
    assert_eq!(saved.files_deleted, 0);
}

#[test]
fn test_cancel_mid_scan_keeps_earlier_records() {
    let workspace = Workspace::new();
    for name in ["a.bin", "b.bin", "c.bin", "d.bin"] {
        small_file(&workspace.path(&format!("media/{}", name)), 2048);
    }

    let signal = CancellationSignal::new();
    let scanner = FileScanner::new(1024);
    let mut stats = ScanStats::new();
    let records = scanner.scan_with(workspace.root.path(), &mut stats, &signal, |stats| {
        if stats.files_scanned == 2 {
            signal.cancel();
        }
    });

    assert!(stats.interrupted);
    assert_eq!(stats.files_scanned, 2);
    assert_eq!(records.len(), 2);
    assert!(records[0].path().ends_with("media/a.bin"));
    assert!(records[1].path().ends_with("media/b.bin"));
}

#[test]
fn test_summary_json_schema() {
    let workspace = Workspace::new();
    small_file(&workspace.path("a.bin"), 2048);

    let app = workspace.app(DeletionMode::Batch, true, CancellationSignal::new());
    let report = app.run(Cursor::new(""), Vec::new()).unwrap();

    let content = fs::read_to_string(report.summary_path.unwrap()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();

    for key in [
        "start_time",
        "runtime_seconds",
        "completion_status",
        "files_scanned",
        "files_deleted",
        "bytes_freed",
        "large_files_found",
        "directories_scanned",
        "errors",
        "interrupted",
    ] {
        assert!(value.get(key).is_some(), "missing key {}", key);
    }
    for key in ["total", "permission_errors", "io_errors", "other_errors"] {
        assert!(value["errors"].get(key).is_some(), "missing errors.{}", key);
    }
    assert_eq!(value["completion_status"], "Completed");
}

#[test]
fn test_validation_errors() {
    let temp_dir = tempdir().unwrap();
    let options = |target: PathBuf, min_size_gb: f64| RunOptions {
        target,
        min_size_gb,
        mode: DeletionMode::Batch,
        dry_run: true,
    };

    let missing = App::new(
        Config::default(),
        options(temp_dir.path().join("missing"), 1.0),
        CancellationSignal::new(),
    );
    assert!(matches!(missing, Err(ValidationError::NotFound(_))));

    let zero = App::new(
        Config::default(),
        options(temp_dir.path().to_path_buf(), 0.0),
        CancellationSignal::new(),
    );
    assert!(matches!(zero, Err(ValidationError::InvalidThreshold(_))));
}
