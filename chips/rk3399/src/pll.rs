// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! RK3399 PLL driver.
//!
//! Every PLL multiplies the 24 MHz crystal:
//!
//! ```text
//! fout = 24 MHz * (fbdiv + frac / 2^24) / (refdiv * postdiv1 * postdiv2)
//! ```
//!
//! where the fractional term only applies when the PLL is not in integer
//! mode. This driver always programs integer mode.
//!
//! A rate is turned into divider settings by, in order:
//!
//! 1. an exact match in [`RK3399_PLL_RATES`],
//! 2. an integer solution with the VCO between 800 MHz and 3.2 GHz.
//!
//! The DDR PLL has no table. It only accepts the memory controller's
//! [`DDR_RATES`], which were validated against the DRAM PHY.
//!
//! Reprogramming moves the PLL to slow mode (24 MHz bypass), writes the
//! dividers, waits for lock and only then switches back to normal mode. A
//! PLL that never locks is left in slow mode.

use tock_registers::register_bitfields;

use crate::config::{CONFIG, OSC_HZ, RTC_HZ};
use crate::error::ClockError;
use crate::registers::{RegisterBlock, RegisterOffset};
use crate::Hz;

register_bitfields![u32,
    PLL_CON0 [
        FBDIV OFFSET(0) NUMBITS(12) []
    ],
    PLL_CON1 [
        POSTDIV2 OFFSET(12) NUMBITS(3) [],
        POSTDIV1 OFFSET(8) NUMBITS(3) [],
        REFDIV OFFSET(0) NUMBITS(6) []
    ],
    PLL_CON2 [
        LOCK OFFSET(31) NUMBITS(1) [],
        FRACDIV OFFSET(0) NUMBITS(24) []
    ],
    PLL_CON3 [
        MODE OFFSET(8) NUMBITS(2) [
            Slow = 0,
            Normal = 1,
            DeepSlow = 2
        ],
        DSMPD OFFSET(3) NUMBITS(1) [
            Fractional = 0,
            Integer = 1
        ]
    ]
];

const VCO_MIN_HZ: u64 = 800_000_000;
const VCO_MAX_HZ: u64 = 3_200_000_000;
const REFDIV_MAX: u32 = 63;
const FBDIV_MIN: u32 = 16;
const FBDIV_MAX: u32 = 3200;
const POSTDIV_MAX: u32 = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PllId {
    /// Little CPU cluster ("APLLL").
    Lpll = 0,
    /// Big CPU cluster ("APLLB").
    Bpll = 1,
    Dpll = 2,
    Cpll = 3,
    Gpll = 4,
    Npll = 5,
    Vpll = 6,
    /// PMU domain PLL, in the PMU CRU.
    Ppll = 7,
}

impl PllId {
    pub const ALL: [PllId; 8] = [
        PllId::Lpll,
        PllId::Bpll,
        PllId::Dpll,
        PllId::Cpll,
        PllId::Gpll,
        PllId::Npll,
        PllId::Vpll,
        PllId::Ppll,
    ];

    pub fn pll(self) -> &'static Pll {
        &PLLS[self as usize]
    }
}

/// One validated divider configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PllRateEntry {
    pub rate: Hz,
    pub refdiv: u32,
    pub fbdiv: u32,
    pub postdiv1: u32,
    pub postdiv2: u32,
    /// Fractional part of the feedback divider, `None` in integer mode.
    pub frac: Option<u32>,
}

impl PllRateEntry {
    pub const fn new(rate: Hz, refdiv: u32, fbdiv: u32, postdiv1: u32, postdiv2: u32) -> Self {
        PllRateEntry {
            rate,
            refdiv,
            fbdiv,
            postdiv1,
            postdiv2,
            frac: None,
        }
    }

    /// The rate these dividers really produce. Equal to `rate` for every
    /// table entry, a little lower for some of the DDR settings.
    pub fn output_rate(&self) -> Hz {
        compute_rate(
            self.refdiv,
            self.fbdiv,
            self.postdiv1,
            self.postdiv2,
            self.frac,
        )
    }
}

const fn rate(mhz: Hz, refdiv: u32, fbdiv: u32, postdiv1: u32, postdiv2: u32) -> PllRateEntry {
    PllRateEntry::new(mhz * 1_000_000, refdiv, fbdiv, postdiv1, postdiv2)
}

pub static RK3399_PLL_RATES: [PllRateEntry; 77] = [
    rate(2208, 1, 92, 1, 1),
    rate(2184, 1, 91, 1, 1),
    rate(2160, 1, 90, 1, 1),
    rate(2136, 1, 89, 1, 1),
    rate(2112, 1, 88, 1, 1),
    rate(2088, 1, 87, 1, 1),
    rate(2064, 1, 86, 1, 1),
    rate(2040, 1, 85, 1, 1),
    rate(2016, 1, 84, 1, 1),
    rate(1992, 1, 83, 1, 1),
    rate(1968, 1, 82, 1, 1),
    rate(1944, 1, 81, 1, 1),
    rate(1920, 1, 80, 1, 1),
    rate(1896, 1, 79, 1, 1),
    rate(1872, 1, 78, 1, 1),
    rate(1848, 1, 77, 1, 1),
    rate(1824, 1, 76, 1, 1),
    rate(1800, 1, 75, 1, 1),
    rate(1776, 1, 74, 1, 1),
    rate(1752, 1, 73, 1, 1),
    rate(1728, 1, 72, 1, 1),
    rate(1704, 1, 71, 1, 1),
    rate(1680, 1, 70, 1, 1),
    rate(1656, 1, 69, 1, 1),
    rate(1632, 1, 68, 1, 1),
    rate(1608, 1, 67, 1, 1),
    rate(1600, 3, 200, 1, 1),
    rate(1584, 1, 66, 1, 1),
    rate(1560, 1, 65, 1, 1),
    rate(1536, 1, 64, 1, 1),
    rate(1512, 1, 63, 1, 1),
    rate(1488, 1, 62, 1, 1),
    rate(1464, 1, 61, 1, 1),
    rate(1440, 1, 60, 1, 1),
    rate(1416, 1, 59, 1, 1),
    rate(1392, 1, 58, 1, 1),
    rate(1368, 1, 57, 1, 1),
    rate(1344, 1, 56, 1, 1),
    rate(1320, 1, 55, 1, 1),
    rate(1296, 1, 54, 1, 1),
    rate(1272, 1, 53, 1, 1),
    rate(1248, 1, 52, 1, 1),
    rate(1200, 1, 50, 1, 1),
    rate(1188, 2, 99, 1, 1),
    rate(1104, 1, 46, 1, 1),
    rate(1100, 12, 550, 1, 1),
    rate(1008, 1, 84, 2, 1),
    rate(1000, 1, 125, 3, 1),
    rate(984, 1, 82, 2, 1),
    rate(960, 1, 80, 2, 1),
    rate(936, 1, 78, 2, 1),
    rate(912, 1, 76, 2, 1),
    rate(900, 4, 300, 2, 1),
    rate(888, 1, 74, 2, 1),
    rate(864, 1, 72, 2, 1),
    rate(840, 1, 70, 2, 1),
    rate(816, 1, 68, 2, 1),
    rate(800, 1, 100, 3, 1),
    rate(700, 6, 350, 2, 1),
    rate(696, 1, 58, 2, 1),
    rate(676, 3, 169, 2, 1),
    rate(600, 1, 75, 3, 1),
    rate(594, 1, 99, 4, 1),
    PllRateEntry::new(533_250_000, 8, 711, 4, 1),
    rate(504, 1, 63, 3, 1),
    rate(500, 6, 250, 2, 1),
    rate(408, 1, 68, 2, 2),
    rate(312, 1, 52, 2, 2),
    rate(297, 1, 99, 4, 2),
    rate(216, 1, 72, 4, 2),
    PllRateEntry::new(148_500_000, 1, 99, 4, 4),
    PllRateEntry::new(106_500_000, 1, 71, 4, 4),
    rate(96, 1, 64, 4, 4),
    PllRateEntry::new(74_250_000, 2, 99, 4, 4),
    rate(65, 1, 65, 6, 4),
    rate(54, 1, 54, 6, 4),
    rate(27, 1, 27, 6, 4),
];

/// Frequencies the DDR PLL can be asked for. The 50 MHz and 933 MHz
/// settings land slightly below their nominal rate (48 MHz and 928 MHz).
pub static DDR_RATES: [PllRateEntry; 7] = [
    rate(50, 1, 12, 3, 2),
    rate(200, 1, 50, 6, 1),
    rate(300, 2, 100, 4, 1),
    rate(400, 1, 50, 3, 1),
    rate(666, 2, 111, 2, 1),
    rate(800, 1, 100, 3, 1),
    rate(933, 1, 116, 3, 1),
];

/// How a PLL turns a requested rate into dividers.
pub enum RateSource {
    /// Exact table match, then an integer solution.
    Table(&'static [PllRateEntry]),
    /// Only the listed rates are accepted.
    Fixed(&'static [PllRateEntry]),
}

pub struct Pll {
    pub id: PllId,
    /// Index of CON0 in the unit's `PllCon` bank.
    con: u8,
    rates: RateSource,
}

static PLLS: [Pll; 8] = [
    Pll::new(PllId::Lpll, 0, RateSource::Table(&RK3399_PLL_RATES)),
    Pll::new(PllId::Bpll, 8, RateSource::Table(&RK3399_PLL_RATES)),
    Pll::new(PllId::Dpll, 16, RateSource::Fixed(&DDR_RATES)),
    Pll::new(PllId::Cpll, 24, RateSource::Table(&RK3399_PLL_RATES)),
    Pll::new(PllId::Gpll, 32, RateSource::Table(&RK3399_PLL_RATES)),
    Pll::new(PllId::Npll, 40, RateSource::Table(&RK3399_PLL_RATES)),
    Pll::new(PllId::Vpll, 48, RateSource::Table(&RK3399_PLL_RATES)),
    // First (and only) PLL of the PMU CRU.
    Pll::new(PllId::Ppll, 0, RateSource::Table(&RK3399_PLL_RATES)),
];

/// Busy-wait provider for the lock poll.
pub trait Delay {
    fn delay_us(&self, us: u32);
}

/// Calibrated spin loop, for use before any timer is running.
pub struct SpinDelay {
    loops_per_us: u32,
}

impl SpinDelay {
    pub const fn new(loops_per_us: u32) -> Self {
        SpinDelay { loops_per_us }
    }
}

impl Delay for SpinDelay {
    fn delay_us(&self, us: u32) {
        for _ in 0..us.saturating_mul(self.loops_per_us) {
            core::hint::spin_loop();
        }
    }
}

fn compute_rate(refdiv: u32, fbdiv: u32, postdiv1: u32, postdiv2: u32, frac: Option<u32>) -> Hz {
    let refdiv = u64::from(refdiv.max(1));
    let mut rate = u64::from(OSC_HZ) * u64::from(fbdiv) / refdiv;
    if let Some(frac) = frac {
        rate += (u64::from(OSC_HZ) * u64::from(frac) / refdiv) >> 24;
    }
    (rate / u64::from(postdiv1.max(1)) / u64::from(postdiv2.max(1))) as Hz
}

const fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Integer divider settings for `hz`, if there are any.
fn solve(hz: Hz) -> Option<PllRateEntry> {
    let fout = u64::from(hz);
    let fin = u64::from(OSC_HZ);
    if fout == 0 || fout > VCO_MAX_HZ {
        return None;
    }

    let (postdiv1, postdiv2) = if fout >= VCO_MIN_HZ {
        (1, 1)
    } else {
        // The hardware requires postdiv1 >= postdiv2.
        (1..=POSTDIV_MAX)
            .flat_map(|p1| (1..=p1).map(move |p2| (p1, p2)))
            .find(|&(p1, p2)| {
                let vco = fout * u64::from(p1 * p2);
                (VCO_MIN_HZ..=VCO_MAX_HZ).contains(&vco)
            })?
    };

    let vco = fout * u64::from(postdiv1 * postdiv2);
    let divisor = gcd(fin, vco);
    let refdiv = (fin / divisor) as u32;
    let fbdiv = (vco / divisor) as u32;
    // The phase detector needs at least 1 MHz at its input.
    if refdiv > REFDIV_MAX || fin / u64::from(refdiv) < 1_000_000 {
        return None;
    }
    if !(FBDIV_MIN..=FBDIV_MAX).contains(&fbdiv) {
        return None;
    }
    Some(PllRateEntry::new(hz, refdiv, fbdiv, postdiv1, postdiv2))
}

impl Pll {
    const fn new(id: PllId, con: u8, rates: RateSource) -> Self {
        Pll { id, con, rates }
    }

    const fn con(&self, n: u8) -> RegisterOffset {
        RegisterOffset::PllCon(self.con + n)
    }

    /// Divider settings that produce `hz`.
    pub fn configuration_for(&self, hz: Hz) -> Result<PllRateEntry, ClockError> {
        match self.rates {
            RateSource::Table(table) => table
                .iter()
                .find(|entry| entry.rate == hz)
                .copied()
                .or_else(|| solve(hz))
                .ok_or(ClockError::UnsupportedRate(hz)),
            RateSource::Fixed(rates) => match rates.iter().find(|entry| entry.rate == hz) {
                Some(entry) => Ok(*entry),
                None => {
                    log::error!("{:?}: {} Hz is not a supported rate", self.id, hz);
                    Err(ClockError::UnsupportedRate(hz))
                }
            },
        }
    }

    pub fn get_rate<R: RegisterBlock>(&self, registers: &R) -> Hz {
        let con3 = registers.read_copy::<PLL_CON3::Register>(self.con(3));
        match con3.read_as_enum(PLL_CON3::MODE) {
            Some(PLL_CON3::MODE::Value::Normal) => {}
            Some(PLL_CON3::MODE::Value::Slow) => return OSC_HZ,
            _ => return RTC_HZ,
        }

        let con0 = registers.read_copy::<PLL_CON0::Register>(self.con(0));
        let con1 = registers.read_copy::<PLL_CON1::Register>(self.con(1));
        let frac = if con3.is_set(PLL_CON3::DSMPD) {
            None
        } else {
            let con2 = registers.read_copy::<PLL_CON2::Register>(self.con(2));
            Some(con2.read(PLL_CON2::FRACDIV))
        };
        compute_rate(
            con1.read(PLL_CON1::REFDIV),
            con0.read(PLL_CON0::FBDIV),
            con1.read(PLL_CON1::POSTDIV1),
            con1.read(PLL_CON1::POSTDIV2),
            frac,
        )
    }

    /// Program the PLL to `hz` and return the rate it reports afterwards.
    pub fn set_rate<R: RegisterBlock, D: Delay>(
        &self,
        registers: &R,
        delay: &D,
        hz: Hz,
    ) -> Result<Hz, ClockError> {
        let entry = self.configuration_for(hz)?;
        self.program(registers, delay, &entry)?;
        Ok(self.get_rate(registers))
    }

    pub fn program<R: RegisterBlock, D: Delay>(
        &self,
        registers: &R,
        delay: &D,
        entry: &PllRateEntry,
    ) -> Result<(), ClockError> {
        log::debug!(
            "{:?}: {} Hz, refdiv {} fbdiv {} postdiv1 {} postdiv2 {}",
            self.id,
            entry.rate,
            entry.refdiv,
            entry.fbdiv,
            entry.postdiv1,
            entry.postdiv2
        );

        registers.write(self.con(3), PLL_CON3::MODE::Slow);
        registers.write(self.con(0), PLL_CON0::FBDIV.val(entry.fbdiv));
        registers.write(
            self.con(1),
            PLL_CON1::POSTDIV2.val(entry.postdiv2)
                + PLL_CON1::POSTDIV1.val(entry.postdiv1)
                + PLL_CON1::REFDIV.val(entry.refdiv),
        );
        match entry.frac {
            None => registers.write(self.con(3), PLL_CON3::DSMPD::Integer),
            Some(frac) => {
                registers.write(self.con(2), PLL_CON2::FRACDIV.val(frac));
                registers.write(self.con(3), PLL_CON3::DSMPD::Fractional);
            }
        }

        self.wait_for_lock(registers, delay)?;
        registers.write(self.con(3), PLL_CON3::MODE::Normal);
        Ok(())
    }

    fn is_locked<R: RegisterBlock>(&self, registers: &R) -> bool {
        registers
            .read_copy::<PLL_CON2::Register>(self.con(2))
            .is_set(PLL_CON2::LOCK)
    }

    fn wait_for_lock<R: RegisterBlock, D: Delay>(
        &self,
        registers: &R,
        delay: &D,
    ) -> Result<(), ClockError> {
        for _ in 0..CONFIG.lock_timeout_us {
            if self.is_locked(registers) {
                return Ok(());
            }
            delay.delay_us(1);
        }
        if self.is_locked(registers) {
            return Ok(());
        }
        log::error!(
            "{:?}: no lock after {} us, left in slow mode",
            self.id,
            CONFIG.lock_timeout_us
        );
        Err(ClockError::PllLockTimeout(self.id))
    }
}
