//! This module provides helpers for generating cycle contexts, wired hiding contexts and client
//! data for tests.

pub mod billing;
