//! Plain utilization data of a client.
//!
//! See the [billing module] documentation since this is a private module anyways.
//!
//! [billing module]: crate::billing

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    billing::{CycleContext, HiddenData, ValidationError},
    hiding::{HidingContext, HidingError, HomomorphicOps, SecretOps},
    ClientId,
    CycleId,
};

/// The masking iv name of the individual deviations.
pub const INDIVIDUAL_DEVIATIONS: &str = "individual_deviations";
/// The masking iv name of the p2p consumer flags.
pub const P2P_CONSUMER_FLAGS: &str = "p2p_consumer_flags";
/// The masking iv name of the p2p producer flags.
pub const P2P_PRODUCER_FLAGS: &str = "p2p_producer_flags";

fn positive_part(values: &[f64]) -> Vec<f64> {
    values.iter().map(|value| value.max(0.0)).collect()
}

fn negative_part(values: &[f64]) -> Vec<f64> {
    values.iter().map(|value| (-value).max(0.0)).collect()
}

fn positive_flags(values: &[f64]) -> Vec<bool> {
    values.iter().map(|value| *value > 0.0).collect()
}

fn as_values(flags: &[bool]) -> Vec<f64> {
    flags.iter().map(|flag| f64::from(u8::from(*flag))).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// The utilization of a client during one cycle.
///
/// A positive utilization (promise) is a consumption (promise), a negative one a supply
/// (promise). A positive promise means the client was accepted for p2p trading as a consumer, a
/// negative one as a producer.
pub struct Data {
    pub client: ClientId,
    pub cycle_id: CycleId,
    pub utilization_promises: Vec<f64>,
    pub utilizations: Vec<f64>,
}

impl Data {
    /// Gets the promised consumption per timeslot.
    pub fn consumption_promises(&self) -> Vec<f64> {
        positive_part(&self.utilization_promises)
    }

    /// Gets the promised supply per timeslot.
    pub fn supply_promises(&self) -> Vec<f64> {
        negative_part(&self.utilization_promises)
    }

    /// Gets the consumption per timeslot.
    pub fn consumptions(&self) -> Vec<f64> {
        positive_part(&self.utilizations)
    }

    /// Gets the supply per timeslot.
    pub fn supplies(&self) -> Vec<f64> {
        negative_part(&self.utilizations)
    }

    /// Flags the timeslots in which the client trades as a consumer.
    pub fn accepted_consumer_flags(&self) -> Vec<bool> {
        self.utilization_promises.iter().map(|p| *p > 0.0).collect()
    }

    /// Flags the timeslots in which the client trades as a producer.
    pub fn accepted_producer_flags(&self) -> Vec<bool> {
        self.utilization_promises.iter().map(|p| *p < 0.0).collect()
    }

    /// Gets the deviation from the promised consumption in accepted timeslots.
    pub fn consumption_deviations(&self) -> Vec<f64> {
        deviations(
            &self.consumptions(),
            &self.consumption_promises(),
            &self.accepted_consumer_flags(),
        )
    }

    /// Gets the deviation from the promised supply in accepted timeslots.
    pub fn supply_deviations(&self) -> Vec<f64> {
        deviations(
            &self.supplies(),
            &self.supply_promises(),
            &self.accepted_producer_flags(),
        )
    }

    /// Gets the supply deviations minus the consumption deviations.
    ///
    /// Summed over all clients this is the net surplus (positive) or shortage (negative).
    pub fn individual_deviations(&self) -> Vec<f64> {
        self.supply_deviations()
            .iter()
            .zip(self.consumption_deviations())
            .map(|(supply, consumption)| supply - consumption)
            .collect()
    }

    /// Flags the timeslots in which the client consumed or supplied more than promised.
    pub fn positive_deviation_flags(&self) -> Vec<bool> {
        positive_flags(&self.consumption_deviations())
            .into_iter()
            .zip(positive_flags(&self.supply_deviations()))
            .map(|(consumption, supply)| consumption || supply)
            .collect()
    }

    /// Flags the timeslots in which the client promised to consume.
    pub fn p2p_consumer_flags(&self) -> Vec<bool> {
        positive_flags(&self.consumption_promises())
    }

    /// Flags the timeslots in which the client promised to supply.
    pub fn p2p_producer_flags(&self) -> Vec<bool> {
        positive_flags(&self.supply_promises())
    }

    /// Checks that the data belongs to the cycle of `cyc` and covers it.
    pub fn check_validity(&self, cyc: &CycleContext) -> Result<(), ValidationError> {
        if self.cycle_id != cyc.cycle_id {
            return Err(ValidationError::new(
                "cycle_id",
                format!("expected cycle {}, got {}", cyc.cycle_id, self.cycle_id),
            ));
        }
        ValidationError::check_length(
            "utilization_promises",
            self.utilization_promises.len(),
            cyc.cycle_length,
        )?;
        ValidationError::check_length("utilizations", self.utilizations.len(), cyc.cycle_length)
    }

    /// Encrypts and masks the data under the context of the client.
    ///
    /// # Errors
    /// Fails if a value can't be encrypted or masked.
    pub fn hide(&self, hc: &HidingContext) -> Result<HiddenData, HidingError> {
        let hidden = HiddenData {
            client: self.client,
            cycle_id: self.cycle_id,
            consumptions: hc.encrypt(&self.consumptions())?,
            supplies: hc.encrypt(&self.supplies())?,
            accepted_consumer_flags: hc.encrypt_flags(&self.accepted_consumer_flags())?,
            accepted_producer_flags: hc.encrypt_flags(&self.accepted_producer_flags())?,
            positive_deviation_flags: hc.encrypt_flags(&self.positive_deviation_flags())?,
            masked_individual_deviations: hc.mask(
                &self.individual_deviations(),
                &hc.get_masking_iv(self.cycle_id, INDIVIDUAL_DEVIATIONS),
            )?,
            masked_p2p_consumer_flags: hc.mask(
                &as_values(&self.p2p_consumer_flags()),
                &hc.get_masking_iv(self.cycle_id, P2P_CONSUMER_FLAGS),
            )?,
            masked_p2p_producer_flags: hc.mask(
                &as_values(&self.p2p_producer_flags()),
                &hc.get_masking_iv(self.cycle_id, P2P_PRODUCER_FLAGS),
            )?,
            phc: hc.get_public_hiding_context(),
        };
        debug!(
            "hid data of client {} for cycle {}",
            self.client, self.cycle_id
        );
        Ok(hidden)
    }
}

fn deviations(actual: &[f64], promised: &[f64], accepted: &[bool]) -> Vec<f64> {
    actual
        .iter()
        .zip(promised)
        .zip(accepted)
        .map(|((actual, promised), accepted)| {
            if *accepted {
                actual - promised
            } else {
                0.0
            }
        })
        .collect()
}
