//! Capability interfaces of the hiding contexts.
//!
//! See the [hiding module] documentation since this is a private module anyways.
//!
//! [hiding module]: crate::hiding

use crate::{
    hiding::{Ciphertext, HidingError},
    mask::{MaskVect, MaskingIv},
};

/// Operations which only need public key material.
///
/// All operations act elementwise on the slots of the cycle.
pub trait HomomorphicOps {
    /// Encrypts `values`, padded with zeros to the cycle length.
    fn encrypt(&self, values: &[f64]) -> Result<Ciphertext, HidingError>;

    /// Encrypts 0/1 flags, padded with zeros to the cycle length.
    fn encrypt_flags(&self, flags: &[bool]) -> Result<Ciphertext, HidingError>;

    /// Multiplies `ciphertext` with plain `scalars`.
    fn scale(&self, ciphertext: &Ciphertext, scalars: &[f64]) -> Result<Ciphertext, HidingError>;

    /// Multiplies two ciphertexts. Requires active evaluation keys.
    fn multiply(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Result<Ciphertext, HidingError>;

    /// Computes `1 - x` of encrypted 0/1 flags.
    fn invert_flags(&self, flags: &Ciphertext) -> Result<Ciphertext, HidingError>;

    /// Adds two ciphertexts.
    fn add(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Result<Ciphertext, HidingError>;

    /// Selects `lhs` where `selector` is 1 and `rhs` where it is 0, i.e. computes
    /// `lhs * selector + rhs * (1 - selector)` without looking at the selector.
    fn blend(
        &self,
        lhs: &Ciphertext,
        rhs: &Ciphertext,
        selector: &Ciphertext,
    ) -> Result<Ciphertext, HidingError> {
        let complement = self.invert_flags(selector)?;
        let selected = self.multiply(lhs, selector)?;
        let rejected = self.multiply(rhs, &complement)?;
        self.add(&selected, &rejected)
    }
}

/// Operations which need the secret key or the masking seeds of a client.
pub trait SecretOps: HomomorphicOps {
    /// Decrypts `ciphertext` into the values of the cycle.
    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Vec<f64>, HidingError>;

    /// Masks `values` for the masked quantity identified by `iv`.
    fn mask(&self, values: &[f64], iv: &MaskingIv) -> Result<MaskVect, HidingError>;
}
