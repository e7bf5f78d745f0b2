//! Command-line front end of the oneforall enrichment engine.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
