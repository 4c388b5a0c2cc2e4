//! trackstamp CLI library.
//!
//! Command implementations and the shared startup context for the
//! `trackstamp` binary.

pub mod commands;
pub mod context;
pub mod logging;
