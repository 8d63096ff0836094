//! Serialization of the billing entities.
//!
//! See the [message module] documentation since this is a private module anyways.
//!
//! [message module]: crate::message

mod cycle;
mod hidden_bill;
mod hidden_data;
mod public;

use std::{convert::TryFrom, sync::Arc};

use anyhow::anyhow;
use fhe::bfv::BfvParameters;

use crate::{
    hiding::Ciphertext,
    message::{
        field::{EntityReader, FieldKind},
        DecodeError,
    },
};

/// Reads an integer field which must fit into a `usize`.
fn read_usize(reader: &mut EntityReader, name: &str) -> Result<usize, DecodeError> {
    let value = reader.value::<u64>(FieldKind::Integer, name)?;
    usize::try_from(value).map_err(|_| anyhow!("invalid field {}: {} is too large", name, value))
}

/// Reads a ciphertext field encrypted under `par`.
fn read_ciphertext(
    reader: &mut EntityReader,
    par: &Arc<BfvParameters>,
) -> Result<Ciphertext, DecodeError> {
    Ciphertext::from_wire(reader.field(FieldKind::Ciphertext)?, par)
}
