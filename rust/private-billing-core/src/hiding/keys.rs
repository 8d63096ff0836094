//! The evaluation key store of a public hiding context.
//!
//! See the [hiding module] documentation since this is a private module anyways.
//!
//! [hiding module]: crate::hiding

use std::{fmt, sync::Arc};

use fhe::bfv::{BfvParameters, RelinearizationKey, SecretKey};
use fhe_traits::{DeserializeParametrized, Serialize as FheSerialize};
use once_cell::sync::OnceCell;
use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::hiding::HidingError;

/// Holds the relinearization key of one crypto context.
///
/// The key travels in its encoded form. It has to be activated, i.e. decoded against the
/// parameters of its context, before ciphertexts can be multiplied. Activation happens at most
/// once per store and is safe to request concurrently.
pub struct EvaluationKeys {
    par: Arc<BfvParameters>,
    encoded: Vec<u8>,
    active: OnceCell<RelinearizationKey>,
}

impl EvaluationKeys {
    /// Generates the evaluation keys for `sk`. The keys are active right away.
    pub(crate) fn generate<R: RngCore + CryptoRng>(
        sk: &SecretKey,
        par: &Arc<BfvParameters>,
        rng: &mut R,
    ) -> Result<Self, HidingError> {
        let rk = RelinearizationKey::new(sk, rng)?;
        let encoded = rk.to_bytes();
        let active = OnceCell::new();
        let _ = active.set(rk);
        Ok(Self {
            par: par.clone(),
            encoded,
            active,
        })
    }

    /// Wraps encoded keys received from elsewhere. The keys are inactive.
    pub(crate) fn from_encoded(par: &Arc<BfvParameters>, encoded: Vec<u8>) -> Self {
        Self {
            par: par.clone(),
            encoded,
            active: OnceCell::new(),
        }
    }

    /// Gets the encoded keys.
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    /// Checks whether the keys are active.
    pub fn is_active(&self) -> bool {
        self.active.get().is_some()
    }

    /// Activates the keys if they aren't active yet.
    ///
    /// # Errors
    /// Fails if the encoded keys don't belong to the parameters of the context.
    pub fn ensure_active(&self) -> Result<&RelinearizationKey, HidingError> {
        self.active.get_or_try_init(|| {
            let rk = RelinearizationKey::from_bytes(&self.encoded, &self.par)?;
            debug!("activated evaluation keys");
            Ok(rk)
        })
    }

    /// Gets the active keys.
    ///
    /// # Errors
    /// Fails with [`HidingError::KeysNotActive`] if the keys were never activated.
    pub fn active(&self) -> Result<&RelinearizationKey, HidingError> {
        self.active.get().ok_or(HidingError::KeysNotActive)
    }
}

impl fmt::Debug for EvaluationKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationKeys")
            .field("encoded_len", &self.encoded.len())
            .field("active", &self.is_active())
            .finish()
    }
}
