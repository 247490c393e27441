pub mod inspection_report;
pub mod search_report;
