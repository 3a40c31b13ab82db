//! Report renderers for analysis results.
//!
//! - [`terminal`]: colored project table and failure list; respects `--quiet`.
//! - JSON output is the serialized result list, written directly by `main`.

pub mod terminal;
