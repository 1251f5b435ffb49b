pub mod classifier;

pub use classifier::{SafetyClassifier, SafetyVerdict};
