//! CLI commands for qnote

pub mod dispatch;
pub mod export;
pub mod import;
pub mod new_json;
mod report;
pub mod search;
