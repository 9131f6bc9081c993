pub mod core;
pub mod worklog;
