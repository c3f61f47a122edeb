pub mod baseline;
pub mod report;
pub mod runner;
