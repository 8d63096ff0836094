//! Parameters of the homomorphic scheme.
//!
//! See the [hiding module] documentation since this is a private module anyways.
//!
//! [hiding module]: crate::hiding

use std::sync::Arc;

use fhe::bfv::{BfvParameters, BfvParametersBuilder};
use serde::{Deserialize, Serialize};

use crate::hiding::HidingError;

/// A 51 bit prime congruent to 1 modulo 32768, which enables slot packing for all polynomial
/// degrees up to 16384.
pub const PLAINTEXT_MODULUS: u64 = 1_125_899_908_022_273;

/// The default number of decimal places of encrypted values.
pub const DEFAULT_PRECISION: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Parameters of a BFV crypto context plus the fixed point precision of encrypted values.
pub struct HidingParams {
    /// The polynomial degree, which is also the number of plaintext slots.
    pub degree: usize,
    /// The bit sizes of the ciphertext moduli.
    pub moduli_sizes: Vec<usize>,
    /// The plaintext modulus.
    pub plaintext_modulus: u64,
    /// The number of decimal places of encrypted values.
    pub precision: u8,
}

impl Default for HidingParams {
    fn default() -> Self {
        Self {
            degree: 16384,
            moduli_sizes: vec![62; 6],
            plaintext_modulus: PLAINTEXT_MODULUS,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl HidingParams {
    /// Small parameters for tests and local experiments.
    ///
    /// They still support the depth of the bill computation but offer a lower security level
    /// than the default.
    pub fn testing() -> Self {
        Self {
            degree: 4096,
            moduli_sizes: vec![62; 4],
            ..Self::default()
        }
    }

    /// Builds the BFV parameters.
    ///
    /// # Errors
    /// Fails if the scheme rejects the parameters.
    pub fn build(&self) -> Result<Arc<BfvParameters>, HidingError> {
        Ok(BfvParametersBuilder::new()
            .set_degree(self.degree)
            .set_plaintext_modulus(self.plaintext_modulus)
            .set_moduli_sizes(&self.moduli_sizes)
            .build_arc()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plaintext_modulus_supports_packing() {
        assert_eq!((PLAINTEXT_MODULUS - 1) % (2 * 16384), 0);
        assert_eq!(64 - PLAINTEXT_MODULUS.leading_zeros(), 51);
    }

    #[test]
    fn test_build_testing_parameters() {
        let par = HidingParams::testing().build().unwrap();
        assert_eq!(par.degree(), 4096);
        assert_eq!(par.plaintext(), PLAINTEXT_MODULUS);
    }

    #[test]
    fn test_build_rejects_invalid_degree() {
        let params = HidingParams {
            degree: 1000,
            ..HidingParams::testing()
        };
        assert!(params.build().is_err());
    }
}
