//! Command implementations

mod apply;
mod revert;
mod status;

pub use apply::run_apply;
pub use revert::run_revert;
pub use status::run_status;
