use std::fs;

use crate::models::{ErrorKind, FileRecord, ScanStats};
use crate::runtime::CancellationSignal;
use crate::safety::SafetyClassifier;
use crate::utils::format_size;

/// 单次删除尝试的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// 已删除（演练模式下为模拟删除）
    Deleted,

    /// 删除前的安全检查未通过
    Unsafe(String),

    /// 删除失败
    Failed(ErrorKind),
}

/// 删除阶段的汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionSummary {
    pub deleted: usize,
    pub unsafe_skipped: usize,
    pub failed: usize,
    pub declined: usize,
}

impl DeletionSummary {
    pub(crate) fn tally(&mut self, outcome: &DeleteOutcome) {
        match outcome {
            DeleteOutcome::Deleted => self.deleted += 1,
            DeleteOutcome::Unsafe(_) => self.unsafe_skipped += 1,
            DeleteOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// 删除控制器 - 按批量或交互方式处理扫描结果
///
/// 删除严格串行进行，`files_deleted` 和 `bytes_freed` 因此是精确的。
pub struct DeletionController<'a> {
    pub(crate) classifier: &'a SafetyClassifier,
    pub(crate) cancellation: &'a CancellationSignal,
    dry_run: bool,
}

impl<'a> DeletionController<'a> {
    pub fn new(
        classifier: &'a SafetyClassifier,
        cancellation: &'a CancellationSignal,
        dry_run: bool,
    ) -> Self {
        Self {
            classifier,
            cancellation,
            dry_run,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// 尝试删除一个文件
    ///
    /// 删除前重新做一次安全判定，以这次结果为准。释放空间按扫描时的大小计算，
    /// 演练模式下同样计入统计但不修改文件系统。
    pub fn attempt_delete(&self, record: &FileRecord, stats: &mut ScanStats) -> DeleteOutcome {
        let path = record.path();

        if !record.is_accessible() {
            let reason = record.error_reason().unwrap_or("无法访问").to_string();
            tracing::warn!("跳过无法访问的文件 {}: {}", path.display(), reason);
            return DeleteOutcome::Unsafe(reason);
        }

        let verdict = self.classifier.classify(path);
        if !verdict.safe {
            tracing::warn!("跳过不安全的文件 {}: {}", path.display(), verdict.reason);
            return DeleteOutcome::Unsafe(verdict.reason);
        }

        if self.dry_run {
            stats.record_deletion(record.size());
            tracing::info!("演练: 将删除 {} ({})", path.display(), format_size(record.size()));
            return DeleteOutcome::Deleted;
        }

        match fs::remove_file(path) {
            Ok(()) => {
                stats.record_deletion(record.size());
                tracing::info!("✅ 已删除: {} ({})", path.display(), format_size(record.size()));
                DeleteOutcome::Deleted
            }
            Err(err) => {
                let kind = ErrorKind::classify_io(&err);
                stats.record_error(kind);
                tracing::error!("❌ 删除失败 {} ({}): {}", path.display(), kind.display_name(), err);
                DeleteOutcome::Failed(kind)
            }
        }
    }

    /// 批量删除所有可访问的记录，按扫描顺序，不逐个确认
    pub fn run_batch(&self, records: &[FileRecord], stats: &mut ScanStats) -> DeletionSummary {
        let mut summary = DeletionSummary::default();
        let candidates: Vec<&FileRecord> = records.iter().filter(|r| r.is_accessible()).collect();

        tracing::info!(
            "🗑️  自动删除模式: 处理 {} 个文件{}",
            candidates.len(),
            if self.dry_run { "（演练）" } else { "" }
        );

        for record in candidates {
            if self.cancellation.is_cancelled() {
                stats.mark_interrupted();
                tracing::warn!("删除已中断");
                break;
            }

            let outcome = self.attempt_delete(record, stats);
            summary.tally(&outcome);
        }

        summary
    }
}
