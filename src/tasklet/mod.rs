/// This module provides a tasklet that imports batch files into the store.
pub mod import;
