pub mod file_record;
pub mod scan_stats;

pub use file_record::FileRecord;
pub use scan_stats::{CompletionStatus, ErrorBreakdown, ErrorKind, RunOutcome, ScanStats, StatsSnapshot};
