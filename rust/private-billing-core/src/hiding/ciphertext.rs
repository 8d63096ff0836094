//! Encrypted vectors.
//!
//! See the [hiding module] documentation since this is a private module anyways.
//!
//! [hiding module]: crate::hiding

use std::{convert::TryInto, fmt, sync::Arc};

use anyhow::{anyhow, Context};
use fhe::bfv::{BfvParameters, Ciphertext as BfvCiphertext};
use fhe_traits::{DeserializeParametrized, Serialize as FheSerialize};

use crate::message::{traits::ToBytes, DecodeError};

#[derive(Clone)]
/// An encrypted vector of fixed point values.
///
/// The scale counts how often the fixed point factor is contained in the encrypted slots, e.g. a
/// fresh encryption has scale 1, an encrypted flag scale 0 and the product of two values scale 2.
///
/// The bound is an upper limit of the absolute slot values. It is set by the encrypting party and
/// propagated through every homomorphic operation, which fails once it reaches half the plaintext
/// modulus.
pub struct Ciphertext {
    pub(crate) inner: BfvCiphertext,
    pub(crate) scale: u8,
    pub(crate) bound: f64,
    par: Arc<BfvParameters>,
}

impl Ciphertext {
    pub(crate) fn new(
        inner: BfvCiphertext,
        scale: u8,
        bound: f64,
        par: &Arc<BfvParameters>,
    ) -> Self {
        Self {
            inner,
            scale,
            bound,
            par: par.clone(),
        }
    }

    /// Gets the fixed point scale.
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Gets the upper limit of the absolute slot values.
    pub fn bound(&self) -> f64 {
        self.bound
    }

    /// Gets the parameters the ciphertext is encrypted under.
    pub fn parameters(&self) -> &Arc<BfvParameters> {
        &self.par
    }

    /// Serializes the ciphertext as a scale byte, the big endian bound and the scheme bytes.
    pub fn to_wire(&self) -> WireCiphertext {
        WireCiphertext {
            scale: self.scale,
            bound: self.bound,
            bytes: self.inner.to_bytes(),
        }
    }

    /// Deserializes a ciphertext under the given parameters.
    ///
    /// # Errors
    /// Fails if the bytes are not a ciphertext under `par` or the bound doesn't fit into the
    /// plaintext space.
    pub fn from_wire(bytes: &[u8], par: &Arc<BfvParameters>) -> Result<Self, DecodeError> {
        let (scale, bytes) = bytes
            .split_first()
            .ok_or_else(|| anyhow!("invalid ciphertext: missing scale"))?;
        if bytes.len() < BOUND_LENGTH {
            return Err(anyhow!("invalid ciphertext: missing bound"));
        }
        let (bound, bytes) = bytes.split_at(BOUND_LENGTH);
        // unwrap safe: the slice has exactly BOUND_LENGTH bytes
        let bound = f64::from_be_bytes(bound.try_into().unwrap());
        if bound.is_nan() || bound < 0.0 || bound >= (par.plaintext() / 2) as f64 {
            return Err(anyhow!("invalid ciphertext: bound {} out of range", bound));
        }
        let inner = BfvCiphertext::from_bytes(bytes, par)
            .map_err(|error| anyhow!("{}", error))
            .context("invalid ciphertext")?;
        Ok(Self::new(inner, *scale, bound, par))
    }
}

impl PartialEq for Ciphertext {
    fn eq(&self, other: &Self) -> bool {
        self.scale == other.scale && self.bound == other.bound && self.inner == other.inner
    }
}

impl fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ciphertext")
            .field("scale", &self.scale)
            .field("bound", &self.bound)
            .field("len", &self.inner.to_bytes().len())
            .finish()
    }
}

const BOUND_LENGTH: usize = 8;

/// A serialized [`Ciphertext`].
pub struct WireCiphertext {
    scale: u8,
    bound: f64,
    bytes: Vec<u8>,
}

impl ToBytes for WireCiphertext {
    fn buffer_length(&self) -> usize {
        1 + BOUND_LENGTH + self.bytes.len()
    }

    fn to_bytes<T: AsMut<[u8]>>(&self, buffer: &mut T) {
        let buffer = buffer.as_mut();
        buffer[0] = self.scale;
        buffer[1..1 + BOUND_LENGTH].copy_from_slice(&self.bound.to_be_bytes());
        let start = 1 + BOUND_LENGTH;
        buffer[start..start + self.bytes.len()].copy_from_slice(&self.bytes);
    }
}
