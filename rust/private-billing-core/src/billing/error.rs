//! Errors of the billing entities.
//!
//! See the [billing module] documentation since this is a private module anyways.
//!
//! [billing module]: crate::billing

use thiserror::Error;

use crate::{hiding::HidingError, mask::MaskingError};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {field}: {reason}")]
/// A billing entity doesn't fit the context it is checked against.
pub struct ValidationError {
    /// The name of the offending field.
    pub field: &'static str,
    /// What is wrong with the field.
    pub reason: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    /// Fails if `len` differs from the `expected` length.
    pub(crate) fn check_length(
        field: &'static str,
        len: usize,
        expected: usize,
    ) -> Result<(), Self> {
        if len == expected {
            Ok(())
        } else {
            Err(Self::new(
                field,
                format!("expected {} values, got {}", expected, len),
            ))
        }
    }
}

#[derive(Debug, Error)]
/// Errors of the bill computation.
pub enum BillingError {
    #[error("can't unmask the data of an empty set of clients")]
    EmptyCycleData,
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("hiding failed: {0}")]
    Hiding(#[from] HidingError),
    #[error("unmasking failed: {0}")]
    Masking(#[from] MaskingError),
}
