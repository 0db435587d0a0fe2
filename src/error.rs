use thiserror::Error;

use crate::attributes::{Attribute, AttributeKind};

/// Errors raised by the node-level plug contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FresnelError {
    /// The requested plug is not produced by this node. Callers treat this
    /// as "nothing to do" rather than a failure.
    #[error("{} is not computed by this node", .0.long_name())]
    IrrelevantRequest(Attribute),

    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("{} is an output and cannot be written", .0.long_name())]
    ReadOnly(Attribute),

    #[error("{} expects a {:?} value, got {:?}", .attribute.long_name(), .expected, .actual)]
    KindMismatch {
        attribute: Attribute,
        expected: AttributeKind,
        actual: AttributeKind,
    },
}

pub type Result<T> = std::result::Result<T, FresnelError>;
