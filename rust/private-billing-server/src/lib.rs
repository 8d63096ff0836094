#![cfg_attr(docsrs, feature(doc_cfg))]
//! # Private Billing: the aggregator
//!
//! The aggregator collects the hidden data of the clients of a billing cycle, sums up their
//! masked contributions once all of them are present and computes the encrypted bill of every
//! client. It never holds a secret key, hence it learns neither the data nor the bills of the
//! clients.
//!
//! - [`billing`]: the collection of hidden client data and the bill computation per cycle.
//! - [`settings`]: loading and validation of the settings shared by the aggregator and the
//!   clients.
//! - [`logging`]: the installation of the tracing subscriber.

pub mod billing;
pub mod logging;
pub mod settings;
