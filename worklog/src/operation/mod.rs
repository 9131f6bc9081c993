pub mod notify;
pub mod report;
