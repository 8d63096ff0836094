//! The public hiding context.
//!
//! See the [hiding module] documentation since this is a private module anyways.
//!
//! [hiding module]: crate::hiding

use std::{fmt, sync::Arc};

use fhe::bfv::{BfvParameters, Ciphertext as BfvCiphertext, Encoding, Plaintext, PublicKey};
use fhe_traits::{FheEncoder, FheEncrypter, Serialize as FheSerialize};
use rand::thread_rng;

use crate::{
    crypto::Sha256,
    hiding::{
        encoding::FixedPoint,
        keys::EvaluationKeys,
        Ciphertext,
        HidingError,
        HomomorphicOps,
    },
};

/// Identifies a crypto context by its parameters and public key.
pub type ContextId = Sha256;

/// The restricted crypto context of a client.
///
/// It holds the public key and the evaluation keys, hence it can encrypt and evaluate but never
/// decrypt. It is shared by all hidden data a client issues under the same keys.
pub struct PublicHidingContext {
    cycle_length: usize,
    fixed_point: FixedPoint,
    par: Arc<BfvParameters>,
    public_key: PublicKey,
    keys: EvaluationKeys,
    id: ContextId,
}

impl PublicHidingContext {
    pub(crate) fn new(
        cycle_length: usize,
        precision: u8,
        par: Arc<BfvParameters>,
        public_key: PublicKey,
        keys: EvaluationKeys,
    ) -> Result<Self, HidingError> {
        if cycle_length > par.degree() {
            return Err(HidingError::CycleTooLong {
                cycle_length,
                slots: par.degree(),
            });
        }
        let id = Sha256::hash_parts(vec![
            par.to_bytes().as_slice(),
            public_key.to_bytes().as_slice(),
        ]);
        Ok(Self {
            cycle_length,
            fixed_point: FixedPoint::new(precision, par.plaintext()),
            par,
            public_key,
            keys,
            id,
        })
    }

    /// Gets the number of timeslots of a cycle.
    pub fn cycle_length(&self) -> usize {
        self.cycle_length
    }

    /// Gets the number of decimal places of encrypted values.
    pub fn precision(&self) -> u8 {
        self.fixed_point.precision()
    }

    /// Gets the identity of the crypto context.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Gets the scheme parameters.
    pub fn parameters(&self) -> &Arc<BfvParameters> {
        &self.par
    }

    /// Gets the public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Gets the evaluation key store.
    pub fn evaluation_keys(&self) -> &EvaluationKeys {
        &self.keys
    }

    /// Checks whether the evaluation keys are active.
    pub fn is_active(&self) -> bool {
        self.keys.is_active()
    }

    /// Makes sure the evaluation keys are usable for [`multiply()`].
    ///
    /// Deserialized contexts start with inactive keys. Calling this repeatedly is cheap.
    ///
    /// [`multiply()`]: HomomorphicOps::multiply
    pub fn activate_keys(&self) -> Result<(), HidingError> {
        self.keys.ensure_active().map(|_| ())
    }

    pub(crate) fn fixed_point(&self) -> &FixedPoint {
        &self.fixed_point
    }

    fn check_length(&self, len: usize) -> Result<(), HidingError> {
        if len > self.cycle_length {
            return Err(HidingError::LengthMismatch {
                expected: self.cycle_length,
                actual: len,
            });
        }
        Ok(())
    }

    /// Encodes `values` into a plaintext and gets the largest absolute slot.
    fn encode(&self, values: &[f64], scale: u8) -> Result<(Plaintext, f64), HidingError> {
        self.check_length(values.len())?;
        let slots = self.fixed_point.encode(values, scale)?;
        let bound = slots
            .iter()
            .map(|slot| slot.unsigned_abs() as f64)
            .fold(0.0, f64::max);
        let plaintext = Plaintext::try_encode(slots.as_slice(), Encoding::simd(), &self.par)?;
        Ok((plaintext, bound))
    }

    fn encrypt_plaintext(
        &self,
        plaintext: &Plaintext,
        scale: u8,
        bound: f64,
    ) -> Result<Ciphertext, HidingError> {
        let inner: BfvCiphertext = self.public_key.try_encrypt(plaintext, &mut thread_rng())?;
        Ok(Ciphertext::new(inner, scale, bound, &self.par))
    }

    /// Gets the scale of a product, failing if its factor leaves the plaintext space.
    fn product_scale(&self, lhs: u8, rhs: u8) -> Result<u8, HidingError> {
        let scale = lhs.checked_add(rhs).ok_or(HidingError::ScaleOverflow(u8::MAX))?;
        self.fixed_point.factor(scale)?;
        Ok(scale)
    }

    /// Lifts `ciphertext` to the higher `scale` by a constant plaintext factor.
    fn rescale(&self, ciphertext: &Ciphertext, scale: u8) -> Result<Ciphertext, HidingError> {
        if ciphertext.scale == scale {
            return Ok(ciphertext.clone());
        }
        let factor = self.fixed_point.factor(scale - ciphertext.scale)?;
        let bound = self
            .fixed_point
            .check_bound(ciphertext.bound * factor as f64, scale)?;
        // constant over all slots, i.e. a constant polynomial
        let constant = Plaintext::try_encode(
            vec![factor; self.par.degree()].as_slice(),
            Encoding::simd(),
            &self.par,
        )?;
        Ok(Ciphertext::new(
            &ciphertext.inner * &constant,
            scale,
            bound,
            &self.par,
        ))
    }
}

impl HomomorphicOps for PublicHidingContext {
    fn encrypt(&self, values: &[f64]) -> Result<Ciphertext, HidingError> {
        let (plaintext, bound) = self.encode(values, 1)?;
        self.encrypt_plaintext(&plaintext, 1, bound)
    }

    fn encrypt_flags(&self, flags: &[bool]) -> Result<Ciphertext, HidingError> {
        let values: Vec<f64> = flags.iter().map(|flag| f64::from(u8::from(*flag))).collect();
        let (plaintext, bound) = self.encode(&values, 0)?;
        self.encrypt_plaintext(&plaintext, 0, bound)
    }

    fn scale(&self, ciphertext: &Ciphertext, scalars: &[f64]) -> Result<Ciphertext, HidingError> {
        let scale = self.product_scale(ciphertext.scale, 1)?;
        let (plaintext, scalar_bound) = self.encode(scalars, 1)?;
        let bound = self
            .fixed_point
            .check_bound(ciphertext.bound * scalar_bound, scale)?;
        Ok(Ciphertext::new(
            &ciphertext.inner * &plaintext,
            scale,
            bound,
            &self.par,
        ))
    }

    fn multiply(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Result<Ciphertext, HidingError> {
        let rk = self.keys.active()?;
        let scale = self.product_scale(lhs.scale, rhs.scale)?;
        let bound = self.fixed_point.check_bound(lhs.bound * rhs.bound, scale)?;
        let mut product = &lhs.inner * &rhs.inner;
        rk.relinearizes(&mut product)?;
        Ok(Ciphertext::new(product, scale, bound, &self.par))
    }

    fn invert_flags(&self, flags: &Ciphertext) -> Result<Ciphertext, HidingError> {
        let (ones, one) = self.encode(&vec![1.0; self.cycle_length], flags.scale)?;
        let ones = self.encrypt_plaintext(&ones, flags.scale, one)?;
        // 1 - x stays within [0, 1] for flags
        let bound = flags.bound.max(one);
        Ok(Ciphertext::new(
            &ones.inner - &flags.inner,
            flags.scale,
            bound,
            &self.par,
        ))
    }

    fn add(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Result<Ciphertext, HidingError> {
        let scale = lhs.scale.max(rhs.scale);
        let lhs = self.rescale(lhs, scale)?;
        let rhs = self.rescale(rhs, scale)?;
        let bound = self.fixed_point.check_bound(lhs.bound + rhs.bound, scale)?;
        Ok(Ciphertext::new(
            &lhs.inner + &rhs.inner,
            scale,
            bound,
            &self.par,
        ))
    }
}

impl PartialEq for PublicHidingContext {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.cycle_length == other.cycle_length
            && self.fixed_point == other.fixed_point
            && self.keys.encoded() == other.keys.encoded()
    }
}

impl fmt::Debug for PublicHidingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicHidingContext")
            .field("id", &self.id)
            .field("cycle_length", &self.cycle_length)
            .field("precision", &self.precision())
            .field("keys", &self.keys)
            .finish()
    }
}
