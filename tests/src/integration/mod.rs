//! Integration flows between two dispatchers.

pub mod fixtures;

mod errors;
mod validation;
