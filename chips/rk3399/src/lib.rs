// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Clock and reset unit (CRU) driver for the Rockchip RK3399.
//!
//! The crate models the two clock units of the SoC, the main CRU and the
//! PMU CRU, and exposes them through [`ClockController`]: rates, parents and
//! gates of individual clocks by [`ClockId`], plus the one-time
//! [bring-up](ClockController::bring_up) sequence run in early boot.

#![cfg_attr(not(test), no_std)]

pub mod bringup;
pub mod clock_ids;
pub mod clocks;
pub mod config;
pub mod divider;
pub mod error;
pub mod pll;
pub mod pmucru;
pub mod registers;

#[cfg(test)]
mod test_support;

/// Frequency in hertz.
pub type Hz = u32;

pub use bringup::{BringUpReport, RK3399_RECIPE};
pub use clock_ids::ClockId;
pub use clocks::{known_clocks, ClockController, ClockOutputNames, ParentRef};
pub use error::ClockError;
pub use pll::{Delay, SpinDelay};
pub use registers::{Cru, PmuCru, RegisterBlock};
