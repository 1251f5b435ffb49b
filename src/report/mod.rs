pub mod generator;
pub mod top_files;

pub use generator::ReportGenerator;
pub use top_files::{rank_by_size, render_top_files};
