//! Qnote Core Library
//!
//! The QNOT interchange format, its streaming encoder/decoder, and the
//! import/export pipeline that merges notes into a store.

pub mod config;
pub mod db;
pub mod encoding;
pub mod error;
pub mod export;
pub mod format;
pub mod import;
pub mod logging;
pub mod note;
pub mod store;
