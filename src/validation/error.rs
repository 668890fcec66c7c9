//! Defines the error types for the validation module.
use crate::store::LinkId;
use serde::{Serialize, Deserialize};

/// The specific category of a validation error.
///
// Kept as an enum so callers can inspect failures without matching on messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationErrorType {
    /// The link is listed as a contributor by `count` distinct downstream links.
    DownstreamBifurcation { count: usize },
    /// Walking upstream from `contributor` leads back to the reported link.
    Loop { contributor: LinkId },
    /// The reported id was reached while checking the edge `downstream -> contributor`
    /// but has no record of its own.
    UndeclaredLink { downstream: LinkId, contributor: LinkId },
}

/// A structured finding from the topology validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The link the finding is about.
    pub link_id: LinkId,
    pub error_type: ValidationErrorType,
    /// A human-readable message explaining the error.
    pub message: String,
}

impl ValidationError {
    pub fn bifurcation(link_id: LinkId, count: usize) -> Self {
        Self {
            link_id,
            error_type: ValidationErrorType::DownstreamBifurcation { count },
            message: format!("Link {} is the upstream of {} links.", link_id, count),
        }
    }

    pub fn loop_at(link_id: LinkId, contributor: LinkId) -> Self {
        Self {
            link_id,
            error_type: ValidationErrorType::Loop { contributor },
            message: format!("Link {} has a loop: it is reachable upstream of its contributor {}.", link_id, contributor),
        }
    }

    pub fn undeclared(link_id: LinkId, downstream: LinkId, contributor: LinkId) -> Self {
        Self {
            link_id,
            error_type: ValidationErrorType::UndeclaredLink { downstream, contributor },
            message: format!(
                "Link {} is not described in the topology (reached from edge {} <- {}).",
                link_id, downstream, contributor
            ),
        }
    }
}
