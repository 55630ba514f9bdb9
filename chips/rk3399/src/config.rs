// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Compile-time configuration of the clock controller.
//!
//! Board-level target rates live here as constants; behavioural switches are
//! collected in [`CONFIG`], whose fields are derived from Cargo features.

use crate::Hz;

pub const MHZ: Hz = 1_000_000;
pub const KHZ: Hz = 1_000;

/// Crystal oscillator feeding every PLL.
pub const OSC_HZ: Hz = 24 * MHZ;
/// Rate of a PLL in deep-slow mode.
pub const RTC_HZ: Hz = 32_768;

pub const CPU_CLUSTER_HZ: Hz = 816 * MHZ;
pub const GPLL_HZ: Hz = 594 * MHZ;
pub const CPLL_HZ: Hz = 384 * MHZ;
pub const NPLL_HZ: Hz = 600 * MHZ;
pub const PPLL_HZ: Hz = 676 * MHZ;
pub const PMU_PCLK_HZ: Hz = 48 * MHZ;

pub const ACLKM_CORE_HZ: Hz = 300 * MHZ;
pub const ATCLK_CORE_HZ: Hz = 300 * MHZ;
pub const PCLK_DBG_HZ: Hz = 100 * MHZ;

pub const PERIHP_ACLK_HZ: Hz = 148_500 * KHZ;
pub const PERIHP_HCLK_HZ: Hz = 148_500 * KHZ;
pub const PERIHP_PCLK_HZ: Hz = 37_125 * KHZ;

pub const PERILP0_ACLK_HZ: Hz = 99 * MHZ;
pub const PERILP0_HCLK_HZ: Hz = 99 * MHZ;
pub const PERILP0_PCLK_HZ: Hz = 49_500 * KHZ;

pub const PERILP1_HCLK_HZ: Hz = 99 * MHZ;
pub const PERILP1_PCLK_HZ: Hz = 49_500 * KHZ;

/// eMMC controller bus clock, programmed before the card clock.
pub const ACLK_EMMC_HZ: Hz = 198 * MHZ;
/// Upper bound for the display controller's bus clock.
pub const ACLK_VOP_MAX_HZ: Hz = 400 * MHZ;

pub struct Config {
    /// Maximum number of 1 µs waits for a PLL to report lock.
    pub lock_timeout_us: u32,

    /// Skip bus and peripheral setup when the general PLL already runs at
    /// [`GPLL_HZ`], on the assumption that an earlier boot stage completed
    /// the whole sequence.
    ///
    /// A prior stage that programmed the GPLL but not the bus dividers
    /// defeats this check. Enable the `full_clock_bring_up` feature to always
    /// run every step.
    pub trust_prior_bring_up: bool,
}

pub const CONFIG: Config = Config {
    lock_timeout_us: 1000,
    trust_prior_bring_up: !cfg!(feature = "full_clock_bring_up"),
};
