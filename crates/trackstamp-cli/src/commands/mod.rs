//! CLI command implementations

pub mod doctor;
pub mod masters;
pub mod root;
pub mod savepoint;
pub mod scaffold;
pub mod stems;

mod reporting;
