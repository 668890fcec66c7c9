//! Structural audit of a drainage topology.
//!
//! The `TopologyValidator` runs the downstream-bifurcation and loop checks
//! before any propagation, collecting every violation instead of stopping at
//! the first one.

pub use self::error::{ValidationError, ValidationErrorType};
pub use self::validator::{CheckSelection, TopologyValidator, ValidationReport};

// --- MODULE DECLARATIONS ---
mod error;
mod validator;
mod rules {
    pub mod bifurcation;
    pub mod loops;
}
