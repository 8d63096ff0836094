//! The wire format of the billing entities.
//!
//! # Entities
//! [`CycleContext`], [`HiddenData`], [`HiddenBill`] and [`PublicHidingContext`] provide a
//! `serialize()` method and a matching `deserialize()` constructor. A serialized entity starts
//! with a two bytes header:
//!
//! ```no_rust
//!  0               1               2
//!  0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |    version    |      tag      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! followed by the fields of the entity in a fixed order. Each field is a [`FieldKind`] byte and
//! a Length-Value item, see [`LengthValueBuffer`]. Decoding checks the version, the tag, the kind
//! and length of every field, and rejects trailing bytes. Hence, untrusted bytes either decode
//! into a complete entity or fail with a [`DecodeError`].
//!
//! Ciphertexts are decoded against the scheme parameters which travel along: [`HiddenData`]
//! embeds the fields of its [`PublicHidingContext`] and [`HiddenBill`] embeds the parameters.
//! The evaluation keys of a deserialized [`PublicHidingContext`] are inactive until
//! [`PublicHidingContext::activate_keys()`] is called.
//!
//! ```
//! # use private_billing_core::billing::CycleContext;
//! let cyc = CycleContext::new(1, 2, vec![0.21; 2], vec![0.05; 2], vec![0.11; 2]).unwrap();
//! let bytes = cyc.serialize();
//! assert_eq!(&bytes[..2], &[1, 1]);
//! assert_eq!(CycleContext::deserialize(&bytes).unwrap(), cyc);
//! ```
//!
//! [`CycleContext`]: crate::billing::CycleContext
//! [`HiddenData`]: crate::billing::HiddenData
//! [`HiddenBill`]: crate::billing::HiddenBill
//! [`PublicHidingContext`]: crate::hiding::PublicHidingContext
//! [`PublicHidingContext::activate_keys()`]: crate::hiding::PublicHidingContext::activate_keys

pub(crate) mod field;
pub(crate) mod header;
mod payload;
pub mod traits;

pub use self::{
    field::{EntityReader, EntityWriter, FieldKind},
    header::{EntityTag, Header, WIRE_VERSION},
    traits::{FromBytes, LengthValueBuffer, ToBytes},
};

/// An error that signals a failure when trying to decode a buffer.
pub type DecodeError = anyhow::Error;
