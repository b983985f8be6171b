//! Core domain logic for formfill.
//!
//! CSV parsing and merging, the import pipeline, the field handler table,
//! page scanning and filling, and the entry-table editor all live here. The
//! binaries only wire these to a terminal.

pub mod editor;
pub mod fill;
pub mod handlers;
pub mod import;
pub mod merge;
pub mod page;
pub mod parser;
pub mod store;
