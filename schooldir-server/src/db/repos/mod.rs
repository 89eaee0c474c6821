//! Repository implementations for database access
//!
//! Repositories borrow a pool handed out by the connection provider and
//! only ever issue parameterised statements.

pub mod schools;

pub use schools::{DbError, SchoolRepo};
