//! CLI command implementations

pub(crate) mod audit;
pub(crate) mod common;
pub(crate) mod init;
pub(crate) mod merge;
pub(crate) mod runs;
pub(crate) mod stage;
