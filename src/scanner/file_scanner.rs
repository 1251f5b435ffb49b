use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use crate::config::ScanConfig;
use crate::models::{ErrorKind, FileRecord, ScanStats};
use crate::runtime::CancellationSignal;
use crate::utils::format_size;

/// 文件扫描器 - 递归遍历目录，找出达到大小阈值的文件
pub struct FileScanner {
    /// 最小文件大小（字节）
    min_size_bytes: u64,

    /// 不进入的目录名
    skip_directories: HashSet<String>,

    /// 是否跟随符号链接
    follow_symlinks: bool,

    /// 进度日志间隔（文件数）
    progress_interval: u64,
}

impl FileScanner {
    /// 使用默认扫描配置创建扫描器
    pub fn new(min_size_bytes: u64) -> Self {
        Self::with_config(min_size_bytes, &ScanConfig::default())
    }

    pub fn with_config(min_size_bytes: u64, config: &ScanConfig) -> Self {
        Self {
            min_size_bytes,
            skip_directories: config.skip_directories.clone(),
            follow_symlinks: config.follow_symlinks,
            progress_interval: config.progress_interval,
        }
    }

    /// 扫描根目录，返回大文件和无法访问的文件记录
    ///
    /// 单个文件的错误只计数不中断；无法读取的目录只跳过其子树。
    /// 每处理一个条目检查一次取消信号，取消时返回已收集的记录。
    /// 同一目录内按文件名遍历，返回顺序即遍历顺序；需要按大小排序的调用方自行排序。
    pub fn scan(
        &self,
        root: &Path,
        stats: &mut ScanStats,
        cancellation: &CancellationSignal,
    ) -> Vec<FileRecord> {
        self.scan_with(root, stats, cancellation, |_| {})
    }

    /// 与 [`FileScanner::scan`] 相同，每检查完一个文件后调用 `on_file`
    pub fn scan_with<F>(
        &self,
        root: &Path,
        stats: &mut ScanStats,
        cancellation: &CancellationSignal,
        mut on_file: F,
    ) -> Vec<FileRecord>
    where
        F: FnMut(&ScanStats),
    {
        let mut records = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.should_skip_entry(entry));

        for entry in walker {
            if cancellation.is_cancelled() {
                stats.mark_interrupted();
                tracing::warn!(
                    "扫描已中断，已扫描 {} 个文件，保留 {} 条记录",
                    stats.files_scanned,
                    records.len()
                );
                break;
            }

            match entry {
                Ok(entry) if entry.file_type().is_dir() => {
                    stats.directories_scanned += 1;
                }
                Ok(entry) => {
                    self.inspect_file(&entry, stats, &mut records);
                    on_file(&*stats);
                }
                Err(err) => {
                    Self::record_walk_error(&err, stats);
                }
            }
        }

        records
    }

    /// 检查单个文件
    fn inspect_file(&self, entry: &DirEntry, stats: &mut ScanStats, records: &mut Vec<FileRecord>) {
        let path = entry.path();
        stats.files_scanned += 1;

        match entry.metadata() {
            Ok(metadata) => {
                let size = metadata.len();
                if size >= self.min_size_bytes {
                    tracing::info!("发现大文件: {} ({})", path.display(), format_size(size));
                    records.push(FileRecord::accessible(
                        path.to_path_buf(),
                        size,
                        metadata.modified().ok(),
                    ));
                    stats.large_files_found += 1;
                }
            }
            Err(err) => {
                let kind = ErrorKind::classify_walk(&err);
                stats.record_error(kind);
                tracing::warn!("无法访问文件 {}: {}", path.display(), err);
                records.push(FileRecord::inaccessible(
                    path.to_path_buf(),
                    format!("{}: {}", kind.display_name(), err),
                ));
            }
        }

        if self.progress_interval > 0 && stats.files_scanned % self.progress_interval == 0 {
            tracing::info!(
                "进度: 已扫描 {} 个文件，发现 {} 个大文件",
                stats.files_scanned,
                stats.large_files_found
            );
        }
    }

    fn record_walk_error(err: &walkdir::Error, stats: &mut ScanStats) {
        let kind = ErrorKind::classify_walk(err);
        stats.record_error(kind);

        match err.path() {
            Some(path) => tracing::warn!("无法访问 {}，已跳过: {}", path.display(), err),
            None => tracing::warn!("遍历目录时出错: {}", err),
        }
    }

    /// 根目录本身从不跳过，只对其下的目录做过滤
    fn should_skip_entry(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0 && entry.file_type().is_dir() && self.should_skip_directory(entry.file_name())
    }

    /// 检查是否应该跳过指定目录（隐藏目录或系统保留目录）
    fn should_skip_directory(&self, name: &OsStr) -> bool {
        let name = name.to_string_lossy();
        name.starts_with('.') || self.skip_directories.contains(name.as_ref())
    }
}
