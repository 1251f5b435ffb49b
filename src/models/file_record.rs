use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// 扫描阶段发现的文件记录
///
/// 记录在扫描时创建，之后只读。`accessible == false` 时 `error_reason` 一定存在，
/// 此时 `size` 没有意义（固定为 0）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    path: PathBuf,
    size: u64,
    modified: Option<SystemTime>,
    accessible: bool,
    error_reason: Option<String>,
}

impl FileRecord {
    /// 创建可访问的文件记录
    pub fn accessible(path: PathBuf, size: u64, modified: Option<SystemTime>) -> Self {
        Self {
            path,
            size,
            modified,
            accessible: true,
            error_reason: None,
        }
    }

    /// 创建无法访问的文件记录，附带失败原因
    pub fn inaccessible(path: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            path,
            size: 0,
            modified: None,
            accessible: false,
            error_reason: Some(reason.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 扫描时记录的文件大小（字节）
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    pub fn is_accessible(&self) -> bool {
        self.accessible
    }

    pub fn error_reason(&self) -> Option<&str> {
        self.error_reason.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inaccessible_record_has_reason() {
        let record = FileRecord::inaccessible(PathBuf::from("/tmp/locked.bin"), "Permission denied");

        assert!(!record.is_accessible());
        assert_eq!(record.error_reason(), Some("Permission denied"));
        assert_eq!(record.size(), 0);
        assert!(record.modified().is_none());
    }

    #[test]
    fn test_accessible_record() {
        let now = SystemTime::now();
        let record = FileRecord::accessible(PathBuf::from("/tmp/big.iso"), 42, Some(now));

        assert!(record.is_accessible());
        assert!(record.error_reason().is_none());
        assert_eq!(record.size(), 42);
        assert_eq!(record.modified(), Some(now));
        assert_eq!(record.path(), Path::new("/tmp/big.iso"));
    }
}
