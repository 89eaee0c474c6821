//! Command implementations for the schooldir CLI

pub mod schools;
pub mod serve;

pub use schools::{run_add, run_delete, run_edit, run_list, run_upload};
pub use serve::run_serve;
