//! CLI subcommand modules.

pub(crate) mod describe;
pub(crate) mod run;
pub(crate) mod sessions;
