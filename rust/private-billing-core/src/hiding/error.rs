//! Errors of the hiding contexts.
//!
//! See the [hiding module] documentation since this is a private module anyways.
//!
//! [hiding module]: crate::hiding

use thiserror::Error;

use crate::mask::MaskingError;

#[derive(Debug, Error)]
/// Errors related to encryption, homomorphic evaluation, decryption and masking.
pub enum HidingError {
    #[error("evaluation keys are not active: call `activate_keys()` before multiplying")]
    KeysNotActive,
    #[error("length mismatch: expected at most {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("cycle length {cycle_length} exceeds the {slots} plaintext slots")]
    CycleTooLong { cycle_length: usize, slots: usize },
    #[error("value {0} can't be encoded at the current fixed point scale")]
    ValueOutOfRange(f64),
    #[error("fixed point scale {0} overflows the plaintext space")]
    ScaleOverflow(u8),
    #[error("masking failed: {0}")]
    Masking(#[from] MaskingError),
    #[error("homomorphic scheme failed: {0}")]
    Fhe(#[from] fhe::Error),
}
