use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;

use crate::config::SafetyConfig;

/// 安全判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyVerdict {
    /// 是否可以安全删除
    pub safe: bool,

    /// 判定原因
    pub reason: String,
}

impl SafetyVerdict {
    fn safe() -> Self {
        Self {
            safe: true,
            reason: "可以安全删除".to_string(),
        }
    }

    fn unsafe_because(reason: impl Into<String>) -> Self {
        Self {
            safe: false,
            reason: reason.into(),
        }
    }
}

/// 安全分类器 - 判断一个文件能否被删除
///
/// 规则是尽力而为的启发式默认值，可以通过配置覆盖，并不是经过审计的安全边界。
/// 分类器从不修改文件系统，唯一的探测是以只读方式打开文件。
#[derive(Debug, Clone)]
pub struct SafetyClassifier {
    /// 系统关键路径片段（已转为小写）
    critical_paths: Vec<String>,

    /// 系统文件扩展名（小写，不带点）
    system_extensions: HashSet<String>,

    /// 是否保护隐藏文件
    protect_hidden_files: bool,
}

impl Default for SafetyClassifier {
    fn default() -> Self {
        Self::from_config(&SafetyConfig::default())
    }
}

impl SafetyClassifier {
    /// 使用默认规则创建分类器
    pub fn new() -> Self {
        Self::default()
    }

    /// 根据配置创建分类器
    pub fn from_config(config: &SafetyConfig) -> Self {
        Self {
            critical_paths: config
                .critical_paths
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            system_extensions: config
                .system_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            protect_hidden_files: config.protect_hidden_files,
        }
    }

    /// 判断文件是否可以安全删除
    ///
    /// 每次调用都重新计算；删除前必须再次调用，以这次结果为准。
    pub fn classify(&self, path: &Path) -> SafetyVerdict {
        let path_str = path.to_string_lossy().to_lowercase();

        if let Some(critical) = self
            .critical_paths
            .iter()
            .find(|critical| path_str.contains(critical.as_str()))
        {
            return SafetyVerdict::unsafe_because(format!("位于系统关键目录: {}", critical));
        }

        if let Some(extension) = path.extension() {
            let ext = extension.to_string_lossy().to_lowercase();
            if self.system_extensions.contains(&ext) {
                return SafetyVerdict::unsafe_because(format!("系统文件类型: .{}", ext));
            }
        }

        if let Err(err) = Self::probe_readable(path) {
            return match err.kind() {
                io::ErrorKind::PermissionDenied => {
                    SafetyVerdict::unsafe_because("文件可能正在使用或受到保护")
                }
                _ => SafetyVerdict::unsafe_because(format!("检查文件安全性时出错: {}", err)),
            };
        }

        if self.protect_hidden_files && Self::is_hidden(path) {
            return SafetyVerdict::unsafe_because("隐藏的系统文件");
        }

        SafetyVerdict::safe()
    }

    /// 以只读方式打开文件，用来发现被锁定或无权限的文件
    fn probe_readable(path: &Path) -> io::Result<()> {
        File::open(path).map(|_| ())
    }

    fn is_hidden(path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().starts_with('.'))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_critical_paths_are_unsafe() {
        let classifier = SafetyClassifier::new();

        let verdict = classifier.classify(Path::new("/System/Library/Kernels/kernel"));
        assert!(!verdict.safe);
        assert!(verdict.reason.contains("/system/"));

        // 匹配不区分大小写
        let verdict = classifier.classify(Path::new("/Users/me/LIBRARY/Preferences/big.db"));
        assert!(!verdict.safe);

        assert!(!classifier.classify(Path::new("/usr/bin/python3")).safe);
        assert!(!classifier.classify(Path::new("/Applications/Xcode.app/huge.bin")).safe);
    }

    #[test]
    fn test_system_extensions_are_unsafe() {
        let classifier = SafetyClassifier::new();

        let verdict = classifier.classify(Path::new("/Users/me/work/libfoo.dylib"));
        assert!(!verdict.safe);
        assert!(verdict.reason.contains(".dylib"));

        assert!(!classifier.classify(Path::new("/Users/me/work/Settings.PLIST")).safe);
    }

    #[test]
    fn test_regular_file_is_safe() {
        let temp_dir = tempdir().unwrap();
        let movie = temp_dir.path().join("movie.mkv");
        fs::write(&movie, "frames").unwrap();

        let verdict = SafetyClassifier::new().classify(&movie);
        assert!(verdict.safe, "unexpected verdict: {}", verdict.reason);
    }

    #[test]
    fn test_hidden_file_is_unsafe() {
        let temp_dir = tempdir().unwrap();
        let hidden = temp_dir.path().join(".cache_blob");
        fs::write(&hidden, "data").unwrap();

        let classifier = SafetyClassifier::new();
        assert!(!classifier.classify(&hidden).safe);

        let mut config = SafetyConfig::default();
        config.protect_hidden_files = false;
        assert!(SafetyClassifier::from_config(&config).classify(&hidden).safe);
    }

    #[test]
    fn test_missing_file_is_unsafe() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("gone.iso");

        let verdict = SafetyClassifier::new().classify(&missing);
        assert!(!verdict.safe);
    }

    #[test]
    fn test_custom_rules() {
        let temp_dir = tempdir().unwrap();
        let vendor_dir = temp_dir.path().join("Vendor");
        fs::create_dir(&vendor_dir).unwrap();
        let blob = vendor_dir.join("blob.bin");
        fs::write(&blob, "data").unwrap();

        let config = SafetyConfig {
            critical_paths: vec!["/vendor/".to_string()],
            system_extensions: HashSet::new(),
            protect_hidden_files: true,
        };
        let classifier = SafetyClassifier::from_config(&config);

        assert!(!classifier.classify(&blob).safe);
    }

    #[test]
    fn test_classify_does_not_touch_file() {
        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("keep.bin");
        fs::write(&file, "payload").unwrap();

        let classifier = SafetyClassifier::new();
        classifier.classify(&file);
        classifier.classify(&file);

        assert_eq!(fs::read_to_string(&file).unwrap(), "payload");
    }
}
