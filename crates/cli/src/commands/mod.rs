//! CLI subcommand implementations.

pub mod backfill;
pub mod migrate;
