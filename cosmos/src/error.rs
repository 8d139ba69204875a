//! Error type shared by the hierarchy, index and simulation modules
//!
//! Duplicate registrations and missing keys are not errors: they are
//! reported through `bool` / `Option` return values. `CosmosError` covers
//! programmer errors (bad construction, iterator misuse) and degenerate
//! physics that would otherwise surface as `NaN`/`Infinity`.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CosmosError {
    /// A constructor received a value it cannot accept
    InvalidArgument(String),
    /// A flattening iterator was advanced past its last body
    NoSuchElement,
    /// `remove` was called without a preceding advance
    IllegalState(&'static str),
    /// Two bodies sit at zero (softened) separation
    DegenerateSeparation { first: String, second: String },
}

impl fmt::Display for CosmosError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CosmosError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            CosmosError::NoSuchElement => write!(f, "No more bodies in this traversal"),
            CosmosError::IllegalState(msg) => write!(f, "Illegal iterator state: {msg}"),
            CosmosError::DegenerateSeparation { first, second } => {
                write!(f, "Bodies {first} and {second} have zero separation")
            }
        }
    }
}

impl std::error::Error for CosmosError {}

pub type Result<T> = std::result::Result<T, CosmosError>;
