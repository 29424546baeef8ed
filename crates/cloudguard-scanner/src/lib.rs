pub mod config;
pub mod report;
pub mod scan_id;
