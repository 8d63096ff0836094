//! The full hiding context of a client.
//!
//! See the [hiding module] documentation since this is a private module anyways.
//!
//! [hiding module]: crate::hiding

use std::{fmt, sync::Arc};

use fhe::bfv::{Encoding, PublicKey, SecretKey};
use fhe_traits::{FheDecoder, FheDecrypter};
use rand::thread_rng;
use tracing::debug;

use crate::{
    hiding::{
        keys::EvaluationKeys,
        Ciphertext,
        HidingError,
        HidingParams,
        HomomorphicOps,
        PublicHidingContext,
        SecretOps,
    },
    mask::{MaskVect, MaskingIv, SharedMaskGenerator},
};

/// The crypto context of a single client.
///
/// It owns the secret key and the masking seeds of the client. Everything which may leave the
/// client is available via [`get_public_hiding_context()`].
///
/// [`get_public_hiding_context()`]: HidingContext::get_public_hiding_context
pub struct HidingContext {
    public: Arc<PublicHidingContext>,
    secret_key: SecretKey,
    mask_generator: SharedMaskGenerator,
}

impl HidingContext {
    /// Creates a context with fresh keys for cycles of `cycle_length` timeslots.
    ///
    /// # Errors
    /// Fails if the parameters are rejected or the cycle doesn't fit into the plaintext slots.
    pub fn new(
        cycle_length: usize,
        params: &HidingParams,
        mask_generator: SharedMaskGenerator,
    ) -> Result<Self, HidingError> {
        let par = params.build()?;
        if cycle_length > par.degree() {
            return Err(HidingError::CycleTooLong {
                cycle_length,
                slots: par.degree(),
            });
        }
        let mut rng = thread_rng();
        let secret_key = SecretKey::random(&par, &mut rng);
        let public_key = PublicKey::new(&secret_key, &mut rng);
        let keys = EvaluationKeys::generate(&secret_key, &par, &mut rng)?;
        let public = PublicHidingContext::new(cycle_length, params.precision, par, public_key, keys)?;
        debug!("created hiding context {:?}", public.id());
        Ok(Self {
            public: Arc::new(public),
            secret_key,
            mask_generator,
        })
    }

    /// Gets the number of timeslots of a cycle.
    pub fn cycle_length(&self) -> usize {
        self.public.cycle_length()
    }

    /// Checks whether the masking seeds are exchanged with the same set of peers in both
    /// directions.
    pub fn is_ready(&self) -> bool {
        self.mask_generator.is_stable()
    }

    /// Gets the mask generator.
    pub fn mask_generator(&self) -> &SharedMaskGenerator {
        &self.mask_generator
    }

    /// Gets the mask generator, e.g. to exchange seeds with new peers.
    pub fn mask_generator_mut(&mut self) -> &mut SharedMaskGenerator {
        &mut self.mask_generator
    }

    /// Gets the public part of this context.
    pub fn get_public_hiding_context(&self) -> Arc<PublicHidingContext> {
        self.public.clone()
    }

    /// Derives the masking iv of the quantity `name` in the given `round`.
    pub fn get_masking_iv(&self, round: u64, name: &str) -> MaskingIv {
        MaskingIv::derive(round, name)
    }
}

impl HomomorphicOps for HidingContext {
    fn encrypt(&self, values: &[f64]) -> Result<Ciphertext, HidingError> {
        self.public.encrypt(values)
    }

    fn encrypt_flags(&self, flags: &[bool]) -> Result<Ciphertext, HidingError> {
        self.public.encrypt_flags(flags)
    }

    fn scale(&self, ciphertext: &Ciphertext, scalars: &[f64]) -> Result<Ciphertext, HidingError> {
        self.public.scale(ciphertext, scalars)
    }

    fn multiply(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Result<Ciphertext, HidingError> {
        self.public.multiply(lhs, rhs)
    }

    fn invert_flags(&self, flags: &Ciphertext) -> Result<Ciphertext, HidingError> {
        self.public.invert_flags(flags)
    }

    fn add(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Result<Ciphertext, HidingError> {
        self.public.add(lhs, rhs)
    }
}

impl SecretOps for HidingContext {
    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Vec<f64>, HidingError> {
        let plaintext = self.secret_key.try_decrypt(&ciphertext.inner)?;
        let mut slots = Vec::<i64>::try_decode(&plaintext, Encoding::simd())?;
        slots.truncate(self.cycle_length());
        self.public.fixed_point().decode(&slots, ciphertext.scale)
    }

    fn mask(&self, values: &[f64], iv: &MaskingIv) -> Result<MaskVect, HidingError> {
        Ok(self.mask_generator.mask(values, iv)?)
    }
}

impl fmt::Debug for HidingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HidingContext")
            .field("public", &self.public)
            .field("mask_generator", &self.mask_generator)
            .finish()
    }
}
