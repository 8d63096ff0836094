//! Billing entities and the privacy preserving bill computation.
//!
//! # Cycle
//! A billing cycle is a sequence of timeslots with public prices, see [`CycleContext`]. Every
//! client records its promised and its actual utilization per timeslot as [`Data`] and hides it
//! under its own [`HidingContext`]:
//! - consumption, supply and the acceptance and deviation flags are encrypted,
//! - the individual deviations and the p2p participation flags are masked.
//!
//! # Aggregation
//! Once the [`HiddenData`] of all clients of a cycle is present, [`HiddenData::unmask_data()`]
//! sums the masked vectors into the [`SharedCycleData`]. Then the bill of every client is
//! computed on its encrypted data with [`HiddenData::compute_hidden_bill()`]. Only the client can
//! [`reveal()`] the resulting [`HiddenBill`].
//!
//! ```no_run
//! # use private_billing_core::{
//! #     billing::{CycleContext, Data, HiddenData},
//! #     hiding::{HidingContext, HidingParams},
//! #     mask::{MaskConfig, SharedMaskGenerator},
//! # };
//! let cyc = CycleContext::new(1, 2, vec![0.21; 2], vec![0.05; 2], vec![0.11; 2]).unwrap();
//! let hc = HidingContext::new(2, &HidingParams::default(), SharedMaskGenerator::new(MaskConfig::default())).unwrap();
//! let data = Data {
//!     client: 0,
//!     cycle_id: 1,
//!     utilization_promises: vec![0.0, 0.0],
//!     utilizations: vec![1.0, -2.0],
//! };
//! let hidden = data.hide(&hc).unwrap();
//!
//! let scd = HiddenData::unmask_data(vec![&hidden]).unwrap();
//! let bill = hidden.compute_hidden_bill(&scd, &cyc).unwrap().reveal(&hc).unwrap();
//! assert_eq!(bill.bill, vec![0.21, 0.0]);
//! assert_eq!(bill.reward, vec![0.0, 0.1]);
//! ```
//!
//! [`HidingContext`]: crate::hiding::HidingContext
//! [`reveal()`]: HiddenBill::reveal

pub(crate) mod bill;
pub(crate) mod cycle;
pub(crate) mod data;
pub(crate) mod error;
pub(crate) mod hidden_data;

pub use self::{
    bill::{Bill, HiddenBill},
    cycle::{CycleContext, SharedCycleData},
    data::{Data, INDIVIDUAL_DEVIATIONS, P2P_CONSUMER_FLAGS, P2P_PRODUCER_FLAGS},
    error::{BillingError, ValidationError},
    hidden_data::HiddenData,
};
