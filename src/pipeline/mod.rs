//! Training pipeline: dataset preparation, splitting, the training driver
//! and its printed report.

pub mod dataset;
pub mod report;
pub mod split;
pub mod train;

pub use report::generate_report;
pub use train::run_training;
