//! Hidden and revealed bills.
//!
//! See the [billing module] documentation since this is a private module anyways.
//!
//! [billing module]: crate::billing

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    billing::{CycleContext, ValidationError},
    hiding::{Ciphertext, HidingContext, HidingError, SecretOps},
    CycleId,
};

#[derive(Debug, Clone, PartialEq)]
/// The encrypted bill and reward of a client for one cycle.
pub struct HiddenBill {
    pub cycle_id: CycleId,
    pub hidden_bill: Ciphertext,
    pub hidden_reward: Ciphertext,
}

impl HiddenBill {
    /// Decrypts the bill with the context of the client it belongs to.
    ///
    /// The values are rounded to the precision of the context to remove the noise of the
    /// homomorphic evaluation.
    ///
    /// # Errors
    /// Fails if the ciphertexts can't be decrypted.
    pub fn reveal(&self, hc: &HidingContext) -> Result<Bill, HidingError> {
        let factor = 10_f64.powi(hc.get_public_hiding_context().precision() as i32);
        let round = |values: Vec<f64>| -> Vec<f64> {
            values
                .into_iter()
                .take(hc.cycle_length())
                .map(|value| (value * factor).round() / factor)
                .collect()
        };
        let bill = Bill {
            cycle_id: self.cycle_id,
            bill: round(hc.decrypt(&self.hidden_bill)?),
            reward: round(hc.decrypt(&self.hidden_reward)?),
        };
        debug!("revealed bill for cycle {}", self.cycle_id);
        Ok(bill)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// The plain bill and reward of a client for one cycle, one amount per timeslot.
pub struct Bill {
    pub cycle_id: CycleId,
    pub bill: Vec<f64>,
    pub reward: Vec<f64>,
}

impl Bill {
    /// Gets the net amount the client receives in this cycle.
    ///
    /// A negative total is an amount the client owes.
    pub fn total(&self) -> f64 {
        self.reward.iter().sum::<f64>() - self.bill.iter().sum::<f64>()
    }

    /// Checks that the bill covers the cycle of `cyc`.
    pub fn check_validity(&self, cyc: &CycleContext) -> Result<(), ValidationError> {
        ValidationError::check_length("bill", self.bill.len(), cyc.cycle_length)?;
        ValidationError::check_length("reward", self.reward.len(), cyc.cycle_length)
    }
}
