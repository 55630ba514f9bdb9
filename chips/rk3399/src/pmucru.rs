// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Clocks of the always-on PMU power domain.
//!
//! Everything here runs from the PPLL, which is set up once by
//! [`ClockController::init_pmu`] and afterwards treated as fixed: rate
//! requests on the PPLL itself are answered with its current rate.

use crate::clock_ids::pmucru;
use crate::clocks::{ClockController, ClockDescriptor, ClockKind, ClockTree, Composite};
use crate::config::{PMU_PCLK_HZ, PPLL_HZ};
use crate::divider::{choice, exact_divider, DividerClock, MuxChoice, Parent};
use crate::pll::{Delay, PllId};
use crate::registers::{BitField, RegisterBlock, RegisterOffset};

const PMU_PCLK_DIV: BitField = BitField::new(0, 5);

const SPI3_SOURCES: [MuxChoice; 2] = [
    choice(0, Parent::Osc24M),
    choice(1, Parent::Pll(PllId::Ppll)),
];

const PPLL_THEN_OSC: [Parent; 2] = [Parent::Pll(PllId::Ppll), Parent::Osc24M];

const fn i2c(clksel: u8, shift: u8) -> ClockKind {
    ClockKind::Divider(DividerClock::fixed(
        RegisterOffset::ClkSel(clksel),
        BitField::new(shift, 7),
        Parent::Pll(PllId::Ppll),
    ))
}

const fn pmu_pclk(target: crate::clock_ids::ClockId) -> ClockKind {
    ClockKind::Composite(Composite::Alias {
        target,
        read_only: true,
    })
}

static PMU_CLOCKS: [ClockDescriptor; 8] = [
    ClockDescriptor::new(
        pmucru::PLL_PPLL,
        "ppll",
        ClockKind::Composite(Composite::Pinned(PllId::Ppll)),
    ),
    ClockDescriptor::new(
        pmucru::SCLK_SPI3_PMU,
        "clk_spi3_pmu",
        ClockKind::Divider(DividerClock::muxed(
            RegisterOffset::ClkSel(1),
            BitField::new(0, 7),
            BitField::bit(7),
            &SPI3_SOURCES,
            &PPLL_THEN_OSC,
        )),
    ),
    ClockDescriptor::new(pmucru::SCLK_I2C0_PMU, "clk_i2c0_pmu", i2c(2, 0)),
    ClockDescriptor::new(pmucru::SCLK_I2C4_PMU, "clk_i2c4_pmu", i2c(3, 0)),
    ClockDescriptor::new(pmucru::SCLK_I2C8_PMU, "clk_i2c8_pmu", i2c(2, 8)),
    ClockDescriptor::new(
        pmucru::PCLK_PMU_SRC,
        "pclk_pmu_src",
        ClockKind::Divider(DividerClock::fixed(
            RegisterOffset::ClkSel(0),
            PMU_PCLK_DIV,
            Parent::Pll(PllId::Ppll),
        )),
    ),
    ClockDescriptor::new(pmucru::PCLK_RKPWM_PMU, "pclk_rkpwm_pmu", pmu_pclk(pmucru::PCLK_PMU_SRC)),
    ClockDescriptor::new(pmucru::PCLK_WDT_M0_PMU, "pclk_wdt_m0_pmu", pmu_pclk(pmucru::PCLK_PMU_SRC)),
];

pub static PMU_TREE: ClockTree = ClockTree {
    name: "pmucru",
    clocks: &PMU_CLOCKS,
};

impl<R: RegisterBlock, D: Delay> ClockController<'_, R, D> {
    /// Bring up the PMU domain: PPLL first, then the PMU bus clock.
    ///
    /// Panics if the PPLL does not lock.
    pub fn init_pmu(&self) {
        let ppll = PllId::Ppll.pll();
        let ppll_hz = match ppll.set_rate(self.registers(), self.delay(), PPLL_HZ) {
            Ok(hz) => hz,
            Err(error) => panic!("{:?}: {}", PllId::Ppll, error),
        };

        let divider = exact_divider(ppll_hz, PMU_PCLK_HZ, PMU_PCLK_DIV);
        self.registers()
            .write_field(RegisterOffset::ClkSel(0), PMU_PCLK_DIV, divider);
        log::info!("PMU clocks at {} Hz", ppll_hz / (divider + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OSC_HZ;
    use crate::error::ClockError;
    use crate::test_support::{sweep_dividers, CountingDelay, SimulatedBlock};

    fn controller<'a>() -> ClockController<'a, SimulatedBlock, CountingDelay> {
        ClockController::pmu(SimulatedBlock::new(), CountingDelay::new())
    }

    #[test]
    fn tree_is_sorted() {
        for pair in PMU_CLOCKS.windows(2) {
            assert!(pair[0].id < pair[1].id);
        }
    }

    #[test]
    fn init_sets_ppll_and_bus_clock() {
        let clocks = controller();
        clocks.init_pmu();

        assert_eq!(clocks.get_rate(pmucru::PLL_PPLL), Ok(PPLL_HZ));
        assert_eq!(
            clocks.registers().read_field(RegisterOffset::ClkSel(0), PMU_PCLK_DIV),
            13
        );
        assert_eq!(clocks.get_rate(pmucru::PCLK_PMU_SRC), Ok(PPLL_HZ / 14));
        assert_eq!(clocks.get_rate(pmucru::PCLK_WDT_M0_PMU), Ok(PPLL_HZ / 14));
    }

    #[test]
    fn ppll_rate_is_pinned() {
        let clocks = controller();
        clocks.init_pmu();
        clocks.registers().clear_writes();

        assert_eq!(clocks.set_rate(pmucru::PLL_PPLL, 800_000_000), Ok(PPLL_HZ));
        assert!(clocks.registers().writes().is_empty());
    }

    #[test]
    fn i2c_dividers() {
        let clocks = controller();
        clocks.init_pmu();

        assert_eq!(clocks.set_rate(pmucru::SCLK_I2C0_PMU, 200_000_000), Ok(169_000_000));
        assert_eq!(clocks.set_rate(pmucru::SCLK_I2C8_PMU, 100_000_000), Ok(96_571_428));
        assert_eq!(clocks.get_rate(pmucru::SCLK_I2C0_PMU), Ok(169_000_000));
        assert_eq!(clocks.get_rate(pmucru::SCLK_I2C4_PMU), Ok(PPLL_HZ));
    }

    #[test]
    fn spi3_falls_back_to_crystal() {
        let clocks = controller();
        clocks.init_pmu();

        assert_eq!(clocks.set_rate(pmucru::SCLK_SPI3_PMU, 50_000_000), Ok(48_285_714));
        assert_eq!(clocks.set_rate(pmucru::SCLK_SPI3_PMU, 200_000), Ok(200_000));
        assert_eq!(clocks.get_rate(pmucru::SCLK_SPI3_PMU), Ok(OSC_HZ / 120));
    }

    #[test]
    fn every_divider_clock_stays_at_or_below_its_target() {
        let clocks = controller();
        clocks.init_pmu();

        let (exercised, total) = sweep_dividers(
            &clocks,
            &[400_000, 1_000_000, 12_000_000, 33_333_333, 50_000_000, 200_000_000],
        );
        assert_eq!(total, 5);
        assert_eq!(exercised, total);
    }

    #[test]
    fn pwm_clock_is_read_only() {
        let clocks = controller();
        assert_eq!(
            clocks.set_rate(pmucru::PCLK_RKPWM_PMU, 48_000_000),
            Err(ClockError::NotSupported(pmucru::PCLK_RKPWM_PMU))
        );
    }
}
