// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! One-time clock tree bring-up.
//!
//! The sequence is data ([`Recipe`]) run by [`ClockController::bring_up`]:
//!
//! 1. CPU cluster PLLs and their core dividers.
//! 2. Reprogram PLLs an earlier boot stage left at the wrong rate.
//! 3. Stop here if the system PLL already runs at its target (only when
//!    [`Config::trust_prior_bring_up`] is set).
//! 4. Fixed register presets, then the bus fabric dividers, computed from
//!    the rate the system PLL will have once step 6 is done.
//! 5. Default peripheral dividers.
//! 6. The system PLL, last.
//!
//! Steps 1 to 5 run on the old system PLL rate, so reordering them can leave
//! bus clocks above their rated frequency. A wrong divider or a CPU or
//! system PLL that does not lock is fatal: the sequencer panics rather than
//! continue on a clock tree it cannot trust.

use crate::clocks::ClockController;
use crate::config::{self, Config, CONFIG};
use crate::divider::{exact_divider, rounded_up_divider};
use crate::error::ClockError;
use crate::pll::{Delay, PllId};
use crate::registers::{BitField, RegisterBlock, RegisterOffset};
use crate::Hz;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BringUpState {
    NotStarted,
    InProgress,
    Done,
}

/// A set of PLLs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PllSet(u8);

impl PllSet {
    pub const fn empty() -> Self {
        PllSet(0)
    }

    pub fn insert(&mut self, pll: PllId) {
        self.0 |= 1 << pll as u8;
    }

    pub fn contains(&self, pll: PllId) -> bool {
        self.0 & (1 << pll as u8) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = PllId> {
        PllId::ALL.into_iter().filter(move |pll| self.contains(*pll))
    }
}

/// What a bring-up run did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BringUpReport {
    /// PLLs found at the wrong rate and reprogrammed.
    pub resynced: PllSet,
    /// PLLs left in slow mode because they did not lock.
    pub degraded: PllSet,
    /// Bus and peripheral setup was skipped.
    pub shortcut_taken: bool,
}

/// Rates of both CPU clusters before and after controller setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuClusterRates {
    /// Little cluster first.
    pub enter_hz: [Hz; 2],
    pub init_hz: [Hz; 2],
}

pub struct CpuCluster {
    pub pll: PllId,
    /// First of the cluster's two CLKSEL registers.
    pub clksel: u8,
    /// Core mux value selecting `pll`.
    pub select: u32,
}

pub struct CoreRates {
    pub aclkm_hz: Hz,
    pub atclk_hz: Hz,
    pub pclk_dbg_hz: Hz,
}

/// Masked write applied verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterPreset {
    pub offset: RegisterOffset,
    pub mask: u32,
    pub value: u32,
}

const fn preset(clksel: u8, mask: u32, value: u32) -> RegisterPreset {
    RegisterPreset {
        offset: RegisterOffset::ClkSel(clksel),
        mask,
        value,
    }
}

/// Select the GPLL for the I2C controller whose divider starts at `shift`
/// and divide it by `divisor`.
const fn i2c_on_gpll(clksel: u8, shift: u8, divisor: u32) -> RegisterPreset {
    preset(clksel, 0xff << shift, ((divisor - 1) | 1 << 7) << shift)
}

pub struct BusChild {
    pub divider: BitField,
    pub hz: Hz,
}

/// One bus domain: a root divider behind a CPLL/GPLL select bit, and child
/// dividers in the same register fed from the root.
pub struct BusDomain {
    pub name: &'static str,
    pub clksel: u8,
    pub root_hz: Hz,
    pub children: &'static [BusChild],
}

pub struct Recipe {
    pub cpu_clusters: [CpuCluster; 2],
    pub cpu_hz: Hz,
    pub core: CoreRates,
    /// Reprogrammed only when they read a different rate.
    pub resync: [(PllId, Hz); 2],
    /// Programmed last.
    pub system_pll: (PllId, Hz),
    pub raw_presets: &'static [RegisterPreset],
    pub bus_domains: &'static [BusDomain],
    pub peripheral_defaults: &'static [RegisterPreset],
}

const CORE_ACLKM_DIV: BitField = BitField::new(8, 5);
const CORE_PLL_SEL: BitField = BitField::new(6, 2);
const CORE_DIV: BitField = BitField::new(0, 5);
const CORE_PCLK_DBG_DIV: BitField = BitField::new(8, 5);
const CORE_ATCLK_DIV: BitField = BitField::new(0, 5);

const BUS_ROOT_DIV: BitField = BitField::new(0, 5);
const BUS_ROOT_SEL: BitField = BitField::bit(7);
const BUS_ROOT_SEL_GPLL: u32 = 1;

pub static RK3399_RECIPE: Recipe = Recipe {
    cpu_clusters: [
        CpuCluster {
            pll: PllId::Lpll,
            clksel: 0,
            select: 0,
        },
        CpuCluster {
            pll: PllId::Bpll,
            clksel: 2,
            select: 1,
        },
    ],
    cpu_hz: config::CPU_CLUSTER_HZ,
    core: CoreRates {
        aclkm_hz: config::ACLKM_CORE_HZ,
        atclk_hz: config::ATCLK_CORE_HZ,
        pclk_dbg_hz: config::PCLK_DBG_HZ,
    },
    resync: [
        (PllId::Npll, config::NPLL_HZ),
        (PllId::Cpll, config::CPLL_HZ),
    ],
    system_pll: (PllId::Gpll, config::GPLL_HZ),
    // The boot ROM leaves these away from their reset values.
    raw_presets: &[
        preset(12, 0xffff, 0x4101),
        preset(19, 0xffff, 0x033f),
        preset(56, 0x0003, 0x0003),
    ],
    bus_domains: &[
        BusDomain {
            name: "perihp",
            clksel: 14,
            root_hz: config::PERIHP_ACLK_HZ,
            children: &[
                BusChild {
                    divider: BitField::new(8, 2),
                    hz: config::PERIHP_HCLK_HZ,
                },
                BusChild {
                    divider: BitField::new(12, 3),
                    hz: config::PERIHP_PCLK_HZ,
                },
            ],
        },
        BusDomain {
            name: "perilp0",
            clksel: 23,
            root_hz: config::PERILP0_ACLK_HZ,
            children: &[
                BusChild {
                    divider: BitField::new(8, 2),
                    hz: config::PERILP0_HCLK_HZ,
                },
                BusChild {
                    divider: BitField::new(12, 3),
                    hz: config::PERILP0_PCLK_HZ,
                },
            ],
        },
        BusDomain {
            name: "perilp1",
            clksel: 25,
            root_hz: config::PERILP1_HCLK_HZ,
            children: &[BusChild {
                divider: BitField::new(8, 3),
                hz: config::PERILP1_PCLK_HZ,
            }],
        },
    ],
    peripheral_defaults: &[
        // aclk_emmc from GPLL/4, clk_emmc divider 8.
        preset(21, 0x009f, 0x0083),
        preset(22, 0x003f, 0x0007),
        // I2C on GPLL, which the display driver never retunes.
        i2c_on_gpll(61, 0, 4),
        i2c_on_gpll(62, 0, 4),
        i2c_on_gpll(63, 0, 4),
        i2c_on_gpll(61, 8, 4),
        i2c_on_gpll(62, 8, 4),
        i2c_on_gpll(63, 8, 4),
    ],
};

impl<R: RegisterBlock, D: Delay> ClockController<'_, R, D> {
    pub fn bring_up_state(&self) -> BringUpState {
        self.bring_up_state.get()
    }

    /// Run `recipe` with the build configuration.
    pub fn bring_up(&self, recipe: &Recipe) -> BringUpReport {
        self.bring_up_with(recipe, &CONFIG)
    }

    pub fn bring_up_with(&self, recipe: &Recipe, config: &Config) -> BringUpReport {
        if self.bring_up_state.get() == BringUpState::InProgress {
            panic!("clock bring-up re-entered");
        }
        self.bring_up_state.set(BringUpState::InProgress);
        let report = self.run_recipe(recipe, config);
        self.bring_up_state.set(BringUpState::Done);
        report
    }

    /// Record the CPU cluster rates around an optional bring-up, the way the
    /// driver attach does on every boot stage.
    pub fn attach(
        &self,
        recipe: &Recipe,
        init_clocks: bool,
    ) -> (CpuClusterRates, Option<BringUpReport>) {
        let enter_hz = self.cluster_rates(recipe);
        let report = init_clocks.then(|| self.bring_up(recipe));
        let rates = CpuClusterRates {
            enter_hz,
            init_hz: self.cluster_rates(recipe),
        };
        (rates, report)
    }

    fn cluster_rates(&self, recipe: &Recipe) -> [Hz; 2] {
        recipe
            .cpu_clusters
            .each_ref()
            .map(|cluster| cluster.pll.pll().get_rate(self.registers()))
    }

    fn run_recipe(&self, recipe: &Recipe, config: &Config) -> BringUpReport {
        let mut report = BringUpReport::default();

        for cluster in recipe.cpu_clusters.iter() {
            self.configure_cpu(cluster, recipe);
        }

        for &(pll, hz) in recipe.resync.iter() {
            if pll.pll().get_rate(self.registers()) == hz {
                continue;
            }
            match pll.pll().set_rate(self.registers(), self.delay(), hz) {
                Ok(_) => report.resynced.insert(pll),
                Err(ClockError::PllLockTimeout(_)) => {
                    log::warn!("{:?} did not lock, continuing without it", pll);
                    report.degraded.insert(pll);
                }
                Err(error) => panic!("cannot resync {:?}: {}", pll, error),
            }
        }

        let (system_pll, system_hz) = recipe.system_pll;
        if config.trust_prior_bring_up
            && system_pll.pll().get_rate(self.registers()) == system_hz
        {
            log::info!("{:?} already at {} Hz, keeping bus setup", system_pll, system_hz);
            report.shortcut_taken = true;
            return report;
        }

        self.apply(recipe.raw_presets);
        for domain in recipe.bus_domains.iter() {
            self.configure_bus(domain, system_hz);
        }
        self.apply(recipe.peripheral_defaults);

        if let Err(error) = system_pll
            .pll()
            .set_rate(self.registers(), self.delay(), system_hz)
        {
            panic!("{:?}: {}", system_pll, error);
        }
        log::info!("clock bring-up done");
        report
    }

    fn configure_cpu(&self, cluster: &CpuCluster, recipe: &Recipe) {
        let pll_hz = match cluster
            .pll
            .pll()
            .set_rate(self.registers(), self.delay(), recipe.cpu_hz)
        {
            Ok(hz) => hz,
            Err(error) => panic!("{:?}: {}", cluster.pll, error),
        };

        let aclkm = exact_divider(pll_hz, recipe.core.aclkm_hz, CORE_ACLKM_DIV);
        let pclk_dbg = exact_divider(pll_hz, recipe.core.pclk_dbg_hz, CORE_PCLK_DBG_DIV);
        let atclk = exact_divider(pll_hz, recipe.core.atclk_hz, CORE_ATCLK_DIV);

        self.registers().write(
            RegisterOffset::ClkSel(cluster.clksel),
            CORE_ACLKM_DIV.field().val(aclkm)
                + CORE_PLL_SEL.field().val(cluster.select)
                + CORE_DIV.field().val(0),
        );
        self.registers().write(
            RegisterOffset::ClkSel(cluster.clksel + 1),
            CORE_PCLK_DBG_DIV.field().val(pclk_dbg) + CORE_ATCLK_DIV.field().val(atclk),
        );
        log::debug!("{:?} at {} Hz", cluster.pll, pll_hz);
    }

    fn configure_bus(&self, domain: &BusDomain, system_hz: Hz) {
        let root = rounded_up_divider(system_hz, domain.root_hz, BUS_ROOT_DIV);
        let mut mask = BUS_ROOT_DIV.mask() | BUS_ROOT_SEL.mask();
        let mut value = BUS_ROOT_DIV.encode(root) | BUS_ROOT_SEL.encode(BUS_ROOT_SEL_GPLL);
        for child in domain.children.iter() {
            let divider = exact_divider(domain.root_hz, child.hz, child.divider);
            mask |= child.divider.mask();
            value |= child.divider.encode(divider);
        }
        self.registers()
            .update(RegisterOffset::ClkSel(domain.clksel), mask, value);
        log::debug!("{} bus at {} Hz", domain.name, domain.root_hz);
    }

    fn apply(&self, presets: &[RegisterPreset]) {
        for preset in presets.iter() {
            self.registers()
                .update(preset.offset, preset.mask, preset.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock_ids::cru;
    use crate::config::{GPLL_HZ, OSC_HZ};
    use crate::test_support::{CountingDelay, SimulatedBlock};

    const FULL: Config = Config {
        lock_timeout_us: 1000,
        trust_prior_bring_up: false,
    };

    const TRUSTING: Config = Config {
        lock_timeout_us: 1000,
        trust_prior_bring_up: true,
    };

    fn controller<'a>(block: SimulatedBlock) -> ClockController<'a, SimulatedBlock, CountingDelay> {
        ClockController::cru(block, CountingDelay::new())
    }

    fn clksel(clocks: &ClockController<'_, SimulatedBlock, CountingDelay>, n: u8) -> u32 {
        clocks.registers().read(RegisterOffset::ClkSel(n)) & 0xffff
    }

    #[test]
    fn full_sequence_programs_the_recipe() {
        let clocks = controller(SimulatedBlock::new());
        let report = clocks.bring_up_with(&RK3399_RECIPE, &FULL);

        assert!(!report.shortcut_taken);
        assert!(report.degraded.is_empty());
        assert_eq!(
            report.resynced.iter().collect::<std::vec::Vec<_>>(),
            [PllId::Cpll, PllId::Npll]
        );

        for (id, hz) in [
            (cru::PLL_APLLL, 816_000_000),
            (cru::PLL_APLLB, 816_000_000),
            (cru::PLL_GPLL, GPLL_HZ),
            (cru::PLL_CPLL, 384_000_000),
            (cru::PLL_NPLL, 600_000_000),
            (cru::ACLK_PERIHP, 148_500_000),
            (cru::HCLK_PERIHP, 148_500_000),
            (cru::PCLK_PERIHP, 37_125_000),
            (cru::ACLK_PERILP0, 99_000_000),
            (cru::HCLK_PERILP0, 99_000_000),
            (cru::PCLK_PERILP0, 49_500_000),
            (cru::HCLK_PERILP1, 99_000_000),
            (cru::PCLK_PERILP1, 49_500_000),
            (cru::ACLK_EMMC, 148_500_000),
            (cru::SCLK_I2C1, 148_500_000),
            (cru::SCLK_I2C7, 148_500_000),
        ] {
            assert_eq!(clocks.get_rate(id), Ok(hz), "clock {}", id);
        }

        assert_eq!(clksel(&clocks, 0), 0x0100);
        assert_eq!(clksel(&clocks, 1), 0x0701);
        assert_eq!(clksel(&clocks, 2), 0x0140);
        assert_eq!(clksel(&clocks, 12), 0x4101);
        assert_eq!(clksel(&clocks, 14), 0x3083);
        assert_eq!(clksel(&clocks, 25), 0x0185);
        assert_eq!(clksel(&clocks, 22), 0x0007);
        assert_eq!(clocks.bring_up_state(), BringUpState::Done);
    }

    #[test]
    fn system_pll_is_programmed_last() {
        let clocks = controller(SimulatedBlock::new());
        clocks.bring_up_with(&RK3399_RECIPE, &FULL);

        let writes = clocks.registers().writes();
        let gpll = (32..36).map(RegisterOffset::PllCon).collect::<std::vec::Vec<_>>();
        let first = writes
            .iter()
            .position(|write| gpll.contains(&write.offset))
            .unwrap();
        assert!(writes[first..]
            .iter()
            .all(|write| gpll.contains(&write.offset)));
    }

    #[test]
    fn second_run_leaves_registers_unchanged() {
        for config in [FULL, TRUSTING] {
            let clocks = controller(SimulatedBlock::new());
            clocks.bring_up_with(&RK3399_RECIPE, &config);
            let before = clocks.registers().checksum();

            let report = clocks.bring_up_with(&RK3399_RECIPE, &config);
            assert_eq!(clocks.registers().checksum(), before);
            assert!(report.resynced.is_empty());
        }
    }

    #[test]
    fn prior_bring_up_is_trusted_when_configured() {
        let clocks = controller(SimulatedBlock::new());
        clocks.set_rate(cru::PLL_GPLL, GPLL_HZ).unwrap();

        let report = clocks.bring_up_with(&RK3399_RECIPE, &TRUSTING);
        assert!(report.shortcut_taken);
        assert_eq!(clksel(&clocks, 14), 0);
        assert_eq!(clocks.get_rate(cru::PLL_APLLB), Ok(816_000_000));
        assert_eq!(clocks.get_rate(cru::PLL_NPLL), Ok(600_000_000));
    }

    #[test]
    fn full_bring_up_ignores_prior_state() {
        let clocks = controller(SimulatedBlock::new());
        clocks.set_rate(cru::PLL_GPLL, GPLL_HZ).unwrap();

        let report = clocks.bring_up_with(&RK3399_RECIPE, &FULL);
        assert!(!report.shortcut_taken);
        assert_eq!(clksel(&clocks, 14), 0x3083);
    }

    #[test]
    #[should_panic(expected = "did not report lock")]
    fn cpu_pll_without_lock_is_fatal() {
        let clocks = controller(SimulatedBlock::never_locking());
        clocks.bring_up_with(&RK3399_RECIPE, &FULL);
    }

    #[test]
    fn peripheral_pll_without_lock_degrades() {
        let block = SimulatedBlock::new();
        block.stall_pll(40);
        let clocks = controller(block);

        let report = clocks.bring_up_with(&RK3399_RECIPE, &FULL);
        assert!(report.degraded.contains(PllId::Npll));
        assert!(!report.resynced.contains(PllId::Npll));
        assert!(report.resynced.contains(PllId::Cpll));
        assert_eq!(clocks.get_rate(cru::PLL_NPLL), Ok(OSC_HZ));
        assert_eq!(clocks.get_rate(cru::PLL_GPLL), Ok(GPLL_HZ));
    }

    #[test]
    #[should_panic(expected = "re-entered")]
    fn bring_up_is_not_reentrant() {
        let clocks = controller(SimulatedBlock::new());
        clocks.bring_up_state.set(BringUpState::InProgress);
        clocks.bring_up_with(&RK3399_RECIPE, &FULL);
    }

    #[test]
    fn attach_records_cluster_rates() {
        let clocks = controller(SimulatedBlock::new());

        let (rates, report) = clocks.attach(&RK3399_RECIPE, false);
        assert!(report.is_none());
        assert_eq!(rates.enter_hz, [OSC_HZ, OSC_HZ]);
        assert_eq!(rates.init_hz, rates.enter_hz);

        let (rates, report) = clocks.attach(&RK3399_RECIPE, true);
        assert!(report.is_some());
        assert_eq!(rates.enter_hz, [OSC_HZ, OSC_HZ]);
        assert_eq!(rates.init_hz, [816_000_000, 816_000_000]);
    }

    #[test]
    fn pll_set_membership() {
        let mut set = PllSet::empty();
        assert!(set.is_empty());
        set.insert(PllId::Ppll);
        set.insert(PllId::Lpll);
        assert!(set.contains(PllId::Ppll));
        assert!(!set.contains(PllId::Gpll));
        assert_eq!(set.iter().count(), 2);
    }
}
