use crate::models::FileRecord;
use crate::utils::format_size;

/// 表格中路径列的最大宽度
const MAX_PATH_WIDTH: usize = 55;

/// 按大小降序排列可访问的记录
pub fn rank_by_size(records: &[FileRecord]) -> Vec<&FileRecord> {
    let mut ranked: Vec<&FileRecord> = records.iter().filter(|r| r.is_accessible()).collect();
    ranked.sort_by(|a, b| b.size().cmp(&a.size()));
    ranked
}

/// 生成最大文件的表格
pub fn render_top_files(records: &[FileRecord], count: usize) -> String {
    let ranked = rank_by_size(records);
    if ranked.is_empty() {
        return "\n📁 没有发现大文件。\n".to_string();
    }

    let shown = count.min(ranked.len());
    let mut out = String::new();
    out.push_str(&format!("\n📊 最大的 {} 个文件:\n", shown));
    out.push_str(&"=".repeat(80));
    out.push('\n');
    out.push_str(&format!("{:<3} {:<12} {}\n", "#", "大小", "路径"));
    out.push_str(&"-".repeat(80));
    out.push('\n');

    for (i, record) in ranked.iter().take(shown).enumerate() {
        let path = shorten_path(&record.path().to_string_lossy());
        out.push_str(&format!("{:<3} {:<12} {}\n", i + 1, format_size(record.size()), path));
    }

    out.push_str(&"=".repeat(80));
    out.push('\n');
    out
}

/// 过长的路径只保留结尾部分
fn shorten_path(path: &str) -> String {
    let chars: Vec<char> = path.chars().collect();
    if chars.len() <= MAX_PATH_WIDTH {
        return path.to_string();
    }
    let tail: String = chars[chars.len() - (MAX_PATH_WIDTH - 3)..].iter().collect();
    format!("...{}", tail)
}
