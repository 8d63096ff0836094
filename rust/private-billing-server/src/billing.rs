//! The aggregator side of a billing cycle.
//!
//! The aggregator keeps track of the clients which take part in the coming cycles, collects
//! their hidden data and computes the hidden bills once every included client submitted its
//! data for a cycle.

use std::collections::HashMap;

use anyhow::anyhow;
use thiserror::Error;
use tracing::{debug, info, warn};

use private_billing_core::{
    billing::{BillingError, CycleContext, HiddenBill, HiddenData},
    crypto::{InvalidSignature, PublicSigningKey, Signature},
    message::DecodeError,
    ClientId,
    CycleId,
};

#[derive(Debug, Error)]
/// Errors of the aggregator.
pub enum SharedBillingError {
    #[error("cycle {0} is not ready for billing")]
    NotReady(CycleId),
    #[error("client {0} is not included")]
    UnknownClient(ClientId),
    #[error("data rejected: {0}")]
    Signature(#[from] InvalidSignature),
    #[error("data rejected: {0:#}")]
    Decode(#[from] DecodeError),
    #[error("billing failed: {0}")]
    Billing(#[from] BillingError),
}

#[derive(Debug, Default)]
/// The collector of the hidden data of all clients.
pub struct SharedBilling {
    /// The hidden data per cycle and client.
    client_data: HashMap<CycleId, HashMap<ClientId, HiddenData>>,
    cycle_contexts: HashMap<CycleId, CycleContext>,
    /// The clients included in the coming cycles and their signing keys.
    clients: HashMap<ClientId, PublicSigningKey>,
}

impl SharedBilling {
    /// Creates an aggregator without any clients.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the context of a cycle, replacing an earlier context of the same cycle.
    pub fn record_contexts(&mut self, cyc: CycleContext) {
        debug!("recorded context of cycle {}", cyc.cycle_id);
        self.cycle_contexts.insert(cyc.cycle_id, cyc);
    }

    /// Includes a client in the coming cycles.
    ///
    /// Data signed by the client is verified against `key`.
    pub fn include_client(&mut self, client: ClientId, key: PublicSigningKey) {
        if self.clients.insert(client, key).is_none() {
            info!("included client {}", client);
        }
    }

    /// Excludes clients from the coming cycles. Unknown clients are ignored.
    pub fn exclude_clients(&mut self, clients: impl IntoIterator<Item = ClientId>) {
        for client in clients {
            if self.clients.remove(&client).is_some() {
                info!("excluded client {}", client);
            }
        }
    }

    /// Checks whether a client is included in the coming cycles.
    pub fn is_included(&self, client: ClientId) -> bool {
        self.clients.contains_key(&client)
    }

    /// Records the hidden data of a client, replacing earlier data of the same client and cycle.
    pub fn record_data(&mut self, data: HiddenData) {
        debug!(
            "recorded data of client {} for cycle {}",
            data.client, data.cycle_id
        );
        self.client_data
            .entry(data.cycle_id)
            .or_default()
            .insert(data.client, data);
    }

    /// Verifies, decodes and records the hidden data which `client` submitted.
    ///
    /// # Errors
    /// Fails if the client isn't included, if the signature doesn't match its key or if the data
    /// can't be decoded or claims to originate from another client.
    pub fn record_signed_data(
        &mut self,
        client: ClientId,
        bytes: &[u8],
        signature: &Signature,
    ) -> Result<(), SharedBillingError> {
        let key = self
            .clients
            .get(&client)
            .ok_or(SharedBillingError::UnknownClient(client))?;
        key.verify(signature, bytes).map_err(|error| {
            warn!("invalid signature on data of client {}", client);
            error
        })?;
        let data = HiddenData::deserialize(bytes)?;
        if data.client != client {
            return Err(anyhow!(
                "data of client {} submitted by client {}",
                data.client,
                client
            )
            .into());
        }
        self.record_data(data);
        Ok(())
    }

    /// Checks whether the bills of a cycle can be computed.
    ///
    /// A cycle is ready if its context is known, at least one client is included and every
    /// included client recorded data for the cycle.
    pub fn is_ready(&self, cycle_id: CycleId) -> bool {
        let context_present = self.cycle_contexts.contains_key(&cycle_id);
        let all_data_present = self
            .client_data
            .get(&cycle_id)
            .map(|cycle_data| {
                self.clients
                    .keys()
                    .all(|client| cycle_data.contains_key(client))
            })
            .unwrap_or(false);
        context_present && !self.clients.is_empty() && all_data_present
    }

    /// Computes the hidden bills of all included clients for a cycle.
    ///
    /// Data recorded by clients which aren't included anymore is ignored.
    ///
    /// # Errors
    /// Fails with [`SharedBillingError::NotReady`] if the cycle is not ready and with a billing
    /// error if the recorded data is invalid or doesn't fit together.
    pub fn compute_bills(
        &self,
        cycle_id: CycleId,
    ) -> Result<HashMap<ClientId, HiddenBill>, SharedBillingError> {
        let (cyc, cycle_data) = match (
            self.cycle_contexts.get(&cycle_id),
            self.client_data.get(&cycle_id),
        ) {
            (Some(cyc), Some(cycle_data)) if self.is_ready(cycle_id) => (cyc, cycle_data),
            _ => return Err(SharedBillingError::NotReady(cycle_id)),
        };

        let included = self
            .clients
            .keys()
            .filter_map(|client| cycle_data.get(client))
            .collect::<Vec<_>>();
        for data in included.iter() {
            data.check_validity(cyc).map_err(BillingError::from)?;
        }

        let scd = HiddenData::unmask_data(included.iter().copied())?;
        scd.check_validity(cyc).map_err(BillingError::from)?;

        let bills = included
            .into_iter()
            .map(|data| Ok((data.client, data.compute_hidden_bill(&scd, cyc)?)))
            .collect::<Result<HashMap<_, _>, BillingError>>()?;
        info!("computed {} bills for cycle {}", bills.len(), cycle_id);
        Ok(bills)
    }
}
