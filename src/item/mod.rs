/// Redemption code domain types and the batch code generator.
pub mod codes;

#[cfg(feature = "logger")]
/// This module provides a logger item writer, useful for debugging purposes.
pub mod logger;

#[cfg(feature = "csv")]
/// This module provides a CSV item writer for tabular exports.
pub mod csv;

#[cfg(feature = "json")]
/// This module provides a JSON item writer for code-keyed batch files.
pub mod json;

#[cfg(feature = "text")]
/// This module provides a plain-text item writer for code lists.
pub mod text;
