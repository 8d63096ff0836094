//! Signatures over the submissions of clients.
//!
//! See the [crypto module] documentation since this is a private module anyways.
//!
//! [crypto module]: crate::crypto

use std::convert::TryInto;

use derive_more::{AsMut, AsRef, From};
use serde::{Deserialize, Serialize};
use sodiumoxide::crypto::sign;
use thiserror::Error;

use super::ByteObject;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid signature")]
/// The signature doesn't match the payload and the claimed signer.
pub struct InvalidSignature;

#[derive(Debug, Clone, Serialize, Deserialize)]
/// The `Ed25519` keys with which a client signs what it hands to the aggregator.
pub struct SigningKeyPair {
    pub public: PublicSigningKey,
    pub secret: SecretSigningKey,
}

impl SigningKeyPair {
    /// Generates a fresh random key pair.
    pub fn generate() -> Self {
        let (public, secret) = sign::gen_keypair();
        Self {
            public: public.into(),
            secret: secret.into(),
        }
    }
}

#[derive(AsRef, AsMut, From, Serialize, Deserialize, Hash, Eq, PartialEq, Copy, Clone, Debug)]
/// The public half of a [`SigningKeyPair`].
///
/// This is the key a client registers with the aggregator.
pub struct PublicSigningKey(sign::PublicKey);

impl_byte_object!(PublicSigningKey, sign::PublicKey, sign::PUBLICKEYBYTES);

impl PublicSigningKey {
    /// Checks whether `signature` was made over `message` by the owner of this key.
    pub fn verify_detached(&self, signature: &Signature, message: &[u8]) -> bool {
        sign::verify_detached(signature.as_ref(), message, self.as_ref())
    }

    /// Checks `signature` like [`verify_detached()`].
    ///
    /// # Errors
    /// Fails with [`InvalidSignature`] on a mismatch.
    ///
    /// [`verify_detached()`]: PublicSigningKey::verify_detached
    pub fn verify(&self, signature: &Signature, message: &[u8]) -> Result<(), InvalidSignature> {
        if self.verify_detached(signature, message) {
            Ok(())
        } else {
            Err(InvalidSignature)
        }
    }
}

#[derive(AsRef, AsMut, From, Serialize, Deserialize, Eq, PartialEq, Clone, Debug)]
/// The secret half of a [`SigningKeyPair`].
///
/// Its bytes are zeroed when it is dropped.
pub struct SecretSigningKey(sign::SecretKey);

impl_byte_object!(SecretSigningKey, sign::SecretKey, sign::SECRETKEYBYTES);

impl SecretSigningKey {
    /// Signs `message` without attaching it to the signature.
    pub fn sign_detached(&self, message: &[u8]) -> Signature {
        sign::sign_detached(message, self.as_ref()).into()
    }

    /// Derives the public key of this secret key.
    pub fn public_key(&self) -> PublicSigningKey {
        self.0.public_key().into()
    }
}

#[derive(AsRef, AsMut, From, Eq, PartialEq, Copy, Clone, Debug)]
/// An `Ed25519` signature detached from its message.
pub struct Signature(sign::Signature);

impl ByteObject for Signature {
    const LENGTH: usize = sign::SIGNATUREBYTES;

    fn zeroed() -> Self {
        Self(sign::Signature::new([0_u8; Self::LENGTH]))
    }

    fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_accepts_own_signature() {
        let keys = SigningKeyPair::generate();
        let signature = keys.secret.sign_detached(b"cycle 7");
        assert!(keys.public.verify(&signature, b"cycle 7").is_ok());
    }

    #[test]
    fn test_verify_rejects_tampered_payload() {
        let keys = SigningKeyPair::generate();
        let signature = keys.secret.sign_detached(b"cycle 7");
        assert_eq!(
            keys.public.verify(&signature, b"cycle 8"),
            Err(InvalidSignature)
        );
    }

    #[test]
    fn test_verify_rejects_foreign_signer() {
        let keys = SigningKeyPair::generate();
        let other = SigningKeyPair::generate();
        let signature = other.secret.sign_detached(b"cycle 7");
        assert!(keys.public.verify(&signature, b"cycle 7").is_err());
        assert_eq!(keys.secret.public_key(), keys.public);
    }

    #[test]
    fn test_signature_bytes() {
        let keys = SigningKeyPair::generate();
        let signature = keys.secret.sign_detached(b"cycle 7");
        assert_eq!(Signature::from_slice(signature.as_slice()), Some(signature));
        assert!(Signature::from_slice(&[0_u8; 63]).is_none());
    }
}
