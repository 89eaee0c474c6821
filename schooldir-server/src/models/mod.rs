//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod school;

pub use validation::ValidationError;
pub use school::{NewSchool, School, SchoolId, SchoolPayload, SchoolUpdate};
