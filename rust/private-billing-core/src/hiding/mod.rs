//! Encryption, homomorphic evaluation and masking of client data.
//!
//! # Capabilities
//! A client owns a [`HidingContext`], which holds its secret key and its masking seeds. The
//! context can do everything the [`SecretOps`] allow, i.e. decrypt and mask. Its public part, the
//! [`PublicHidingContext`], only implements the [`HomomorphicOps`]. It is handed to whoever
//! computes on the encrypted data of the client, e.g. the aggregator of a billing cycle.
//!
//! ```no_run
//! # use private_billing_core::{
//! #     hiding::{HidingContext, HidingParams, HomomorphicOps, SecretOps},
//! #     mask::{MaskConfig, SharedMaskGenerator},
//! # };
//! let hc = HidingContext::new(
//!     4,
//!     &HidingParams::default(),
//!     SharedMaskGenerator::new(MaskConfig::default()),
//! )
//! .unwrap();
//! let phc = hc.get_public_hiding_context();
//!
//! let consumptions = phc.encrypt(&[1.0, 0.5, 0.0, 2.0]).unwrap();
//! let costs = phc.scale(&consumptions, &[0.21, 0.21, 0.25, 0.25]).unwrap();
//! assert_eq!(hc.decrypt(&costs).unwrap(), vec![0.21, 0.105, 0.0, 0.5]);
//! ```
//!
//! # Fixed point values
//! Ciphertexts hold reals as fixed point integers. Every [`Ciphertext`] carries its scale, which
//! the operations keep track of. Decryption divides by the fixed point factor of the scale.
//!
//! Slots live modulo the plaintext modulus, hence every ciphertext also carries a bound of its
//! absolute slot values. An operation whose result bound reaches half the plaintext modulus fails
//! with [`HidingError::ValueOutOfRange`] instead of wrapping around. A bill has scale 2, so at the
//! default precision of 5 decimal places a single billed amount must stay below roughly 56,000.
//!
//! # Evaluation keys
//! Multiplying two ciphertexts needs the [`EvaluationKeys`] of the context. A context received
//! over the wire holds its keys only in encoded form, so [`PublicHidingContext::activate_keys()`]
//! must be called before the first [`multiply()`]. Otherwise the multiplication fails with
//! [`HidingError::KeysNotActive`].
//!
//! [`multiply()`]: HomomorphicOps::multiply

pub(crate) mod ciphertext;
pub(crate) mod context;
pub(crate) mod encoding;
pub(crate) mod error;
pub(crate) mod keys;
pub(crate) mod ops;
pub(crate) mod params;
pub(crate) mod public;

pub use self::{
    ciphertext::{Ciphertext, WireCiphertext},
    context::HidingContext,
    error::HidingError,
    keys::EvaluationKeys,
    ops::{HomomorphicOps, SecretOps},
    params::{HidingParams, DEFAULT_PRECISION, PLAINTEXT_MODULUS},
    public::{ContextId, PublicHidingContext},
};
