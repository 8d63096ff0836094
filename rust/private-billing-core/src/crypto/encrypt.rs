//! Sealed boxes for the exchange of masking seeds between peers.
//!
//! See the [crypto module] documentation since this is a private module anyways.
//!
//! [crypto module]: crate::crypto

use derive_more::{AsMut, AsRef, From};
use serde::{Deserialize, Serialize};
use sodiumoxide::crypto::{box_, sealedbox};
use thiserror::Error;

/// The number of bytes a sealed box adds to its message.
pub const SEALBYTES: usize = sealedbox::SEALBYTES;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// The `C25519` keys with which a client receives masking seeds from its peers.
pub struct EncryptKeyPair {
    pub public: PublicEncryptKey,
    pub secret: SecretEncryptKey,
}

impl EncryptKeyPair {
    /// Generates a fresh random key pair.
    pub fn generate() -> Self {
        let (public, secret) = box_::gen_keypair();
        Self {
            public: public.into(),
            secret: secret.into(),
        }
    }
}

#[derive(AsRef, AsMut, From, Serialize, Deserialize, Hash, Eq, PartialEq, Copy, Clone, Debug)]
/// The public half of an [`EncryptKeyPair`], published to the peers of a client.
pub struct PublicEncryptKey(box_::PublicKey);

impl_byte_object!(PublicEncryptKey, box_::PublicKey, box_::PUBLICKEYBYTES);

impl PublicEncryptKey {
    /// Seals `message` for the owner of this key.
    ///
    /// The sealed box is [`SEALBYTES`] longer than the message and reveals nothing about the
    /// sender.
    pub fn encrypt(&self, message: &[u8]) -> Vec<u8> {
        sealedbox::seal(message, self.as_ref())
    }
}

#[derive(Debug, Error)]
#[error("failed to open a sealed box")]
/// A sealed box was tampered with or sealed for another key.
pub struct DecryptionError;

#[derive(AsRef, AsMut, From, Serialize, Deserialize, Eq, PartialEq, Clone, Debug)]
/// The secret half of an [`EncryptKeyPair`].
///
/// Its bytes are zeroed when it is dropped.
pub struct SecretEncryptKey(box_::SecretKey);

impl_byte_object!(SecretEncryptKey, box_::SecretKey, box_::SECRETKEYBYTES);

impl SecretEncryptKey {
    /// Opens a box sealed for the public key `pk` belonging to this secret key.
    ///
    /// # Errors
    /// Fails if the box wasn't sealed for `pk` or was modified.
    pub fn decrypt(&self, sealed: &[u8], pk: &PublicEncryptKey) -> Result<Vec<u8>, DecryptionError> {
        sealedbox::open(sealed, pk.as_ref(), self.as_ref()).map_err(|_| DecryptionError)
    }

    /// Derives the public key of this secret key.
    pub fn public_key(&self) -> PublicEncryptKey {
        self.0.public_key().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ByteObject;

    #[test]
    fn test_sealed_box_length() {
        let keys = EncryptKeyPair::generate();
        let sealed = keys.public.encrypt(&[9_u8; 32]);
        assert_eq!(sealed.len(), SEALBYTES + 32);
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let keys = EncryptKeyPair::generate();
        let other = EncryptKeyPair::generate();
        let sealed = keys.public.encrypt(b"seed");
        assert!(other.secret.decrypt(&sealed, &other.public).is_err());
        assert_eq!(keys.secret.public_key(), keys.public);
    }

    #[test]
    fn test_key_bytes() {
        let keys = EncryptKeyPair::generate();
        let public = PublicEncryptKey::from_slice(keys.public.as_slice()).unwrap();
        assert_eq!(public, keys.public);
        assert!(PublicEncryptKey::from_slice(&[0_u8; 31]).is_none());
        assert_eq!(SecretEncryptKey::zeroed().as_slice(), &[0_u8; 32][..]);
    }
}
