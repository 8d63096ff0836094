#![cfg_attr(docsrs, feature(doc_cfg))]
//! # Private Billing: peer-to-peer energy bills without disclosing meter data
//!
//! Prosumers which trade energy peer-to-peer within a billing cycle have to be billed on their
//! individual consumption, supply and deviation from what they promised to trade. This crate
//! computes these bills without anybody, the aggregator included, learning the data of a single
//! client.
//!
//! ## Hiding
//! Every client hides its data under its own [`HidingContext`]:
//! - consumption, supply and the flags steering the bill computation are encrypted with a
//!   homomorphic scheme, so that the bill can be computed on the ciphertexts,
//! - the contributions to the cycle-wide totals are masked with pairwise seeds, so that the masks
//!   cancel once the contributions of all clients of the cycle are summed up.
//!
//! ## Billing
//! The aggregator sums the masked contributions into the [`SharedCycleData`] and computes the
//! encrypted [`HiddenBill`] of every client. Each case distinction of the pricing model is
//! expressed as an arithmetic blend of encrypted selectors, hence no encrypted value is ever
//! inspected. Only the client can reveal its bill.
//!
//! ## Modules
//! - [`billing`]: the billing entities and the bill computation.
//! - [`hiding`]: the hiding contexts and their homomorphic operations.
//! - [`mask`]: masking, seed exchange and aggregation.
//! - [`message`]: the wire format of the billing entities.
//! - [`crypto`]: the sodiumoxide wrappers for hashing, sealing and signing.
//!
//! [`HidingContext`]: hiding::HidingContext
//! [`SharedCycleData`]: billing::SharedCycleData
//! [`HiddenBill`]: billing::HiddenBill

pub mod billing;
pub mod crypto;
pub mod hiding;
pub mod mask;
pub mod message;
#[cfg(any(test, feature = "testutils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "testutils")))]
pub mod testutils;

use thiserror::Error;

#[derive(Error, Debug)]
#[error("initialization failed: insufficient system entropy to generate secrets")]
/// An error related to insufficient system entropy for secrets at program startup.
pub struct InitError;

/// Initializes the cryptographic primitives.
///
/// Must be called once before keys or seeds are generated, preferably at program startup.
///
/// # Errors
/// Fails if the system doesn't provide enough entropy.
pub fn init() -> Result<(), InitError> {
    sodiumoxide::init().map_err(|_| InitError)
}

/// The identifier of a client.
pub type ClientId = u64;

/// The identifier of a billing cycle.
pub type CycleId = u64;
