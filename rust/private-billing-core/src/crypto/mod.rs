//! Wrappers around the [sodiumoxide] primitives used next to the homomorphic scheme.
//!
//! Peers exchange their pairwise masking seeds sealed with `C25519` boxes, sign everything they
//! hand to the aggregator with `Ed25519` keys and derive masking ivs and context identities with
//! `SHA256`.
//!
//! # Examples
//! ## Sealing a masking seed for a peer
//! ```
//! # use private_billing_core::crypto::EncryptKeyPair;
//! let keys = EncryptKeyPair::generate();
//! let seed = b"pairwise seed".to_vec();
//! let sealed = keys.public.encrypt(&seed);
//! assert_eq!(seed, keys.secret.decrypt(&sealed, &keys.public).unwrap());
//! ```
//!
//! ## Signing a serialized submission
//! ```
//! # use private_billing_core::crypto::SigningKeyPair;
//! let keys = SigningKeyPair::generate();
//! let payload = b"hidden data".to_vec();
//! let signature = keys.secret.sign_detached(&payload);
//! assert!(keys.public.verify(&signature, &payload).is_ok());
//! ```
//!
//! [sodiumoxide]: https://docs.rs/sodiumoxide/

/// Implements [`ByteObject`] for a newtype around a fixed size [sodiumoxide] byte array.
macro_rules! impl_byte_object {
    ($object:ty, $inner:path, $length:expr) => {
        impl $crate::crypto::ByteObject for $object {
            const LENGTH: usize = $length;

            fn zeroed() -> Self {
                Self($inner([0_u8; $length]))
            }

            fn as_slice(&self) -> &[u8] {
                self.0.as_ref()
            }

            fn from_slice(bytes: &[u8]) -> Option<Self> {
                <$inner>::from_slice(bytes).map(Self)
            }
        }
    };
}

pub(crate) mod encrypt;
pub(crate) mod hash;
pub(crate) mod prng;
pub(crate) mod sign;

use sodiumoxide::randombytes::randombytes;

pub use self::{
    encrypt::{DecryptionError, EncryptKeyPair, PublicEncryptKey, SecretEncryptKey, SEALBYTES},
    hash::Sha256,
    prng::generate_integer,
    sign::{InvalidSignature, PublicSigningKey, SecretSigningKey, Signature, SigningKeyPair},
};

/// An interface for slicing into cryptographic byte objects.
pub trait ByteObject: Sized {
    /// The length in bytes of this object.
    const LENGTH: usize;

    /// Creates a new object with all the bytes initialized to `0`.
    fn zeroed() -> Self;

    /// Gets the object byte representation.
    fn as_slice(&self) -> &[u8];

    /// Creates an object from the given buffer.
    ///
    /// Returns `None` if the length of the buffer isn't equal to the length of the object.
    fn from_slice(bytes: &[u8]) -> Option<Self>;

    /// Generates an object with random bytes.
    fn generate() -> Self {
        // unwrap safe: the buffer has exactly the length of the object
        Self::from_slice(randombytes(Self::LENGTH).as_slice()).unwrap()
    }
}
