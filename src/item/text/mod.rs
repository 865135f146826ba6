//! Plain-list export: one item per line, nothing else.

/// A module providing facilities for writing newline-separated lists.
pub mod text_writer;
