// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Integer dividers, source multiplexers and gates.
//!
//! A [`DividerClock`] describes one derived clock: the register holding its
//! divider field, where its input comes from, and which inputs to try when a
//! new rate is requested. The output rate is always
//!
//! ```text
//! parent / ((field + 1) * post_divider)
//! ```
//!
//! `post_divider` covers fixed dividers that sit downstream of the CRU, such
//! as the /2 inside the SD/MMC controller.
//!
//! Rates are rounded so the output never runs faster than requested. When a
//! preferred parent is too fast for the divider field, the next preferred
//! parent is tried, which is how a 400 kHz SD card clock ends up on the
//! crystal rather than the general PLL.

use crate::clock_ids::ClockId;
use crate::error::ClockError;
use crate::pll::PllId;
use crate::registers::{BitField, RegisterBlock, RegisterOffset};
use crate::Hz;

/// Something a divider can take its input from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parent {
    Pll(PllId),
    Osc24M,
    /// Another clock of the same controller.
    Clock(ClockId),
    /// An input pin, known by the output name its provider gives it.
    External(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MuxChoice {
    pub value: u32,
    pub parent: Parent,
}

pub const fn choice(value: u32, parent: Parent) -> MuxChoice {
    MuxChoice { value, parent }
}

#[derive(Clone, Copy, Debug)]
pub enum Source {
    Fixed(Parent),
    Mux {
        field: BitField,
        choices: &'static [MuxChoice],
    },
}

#[derive(Clone, Copy, Debug)]
pub struct DividerClock {
    pub offset: RegisterOffset,
    /// `None` for a pure multiplexer.
    pub divider: Option<BitField>,
    pub source: Source,
    /// Parents tried in order by `set_rate`. When empty, the current parent
    /// is kept.
    pub preferred: &'static [Parent],
    pub post_divider: u32,
}

impl DividerClock {
    /// Divider with a single, fixed input.
    pub const fn fixed(offset: RegisterOffset, divider: BitField, parent: Parent) -> Self {
        DividerClock {
            offset,
            divider: Some(divider),
            source: Source::Fixed(parent),
            preferred: &[],
            post_divider: 1,
        }
    }

    /// Divider behind a multiplexer in the same register.
    pub const fn muxed(
        offset: RegisterOffset,
        divider: BitField,
        select: BitField,
        choices: &'static [MuxChoice],
        preferred: &'static [Parent],
    ) -> Self {
        DividerClock {
            offset,
            divider: Some(divider),
            source: Source::Mux {
                field: select,
                choices,
            },
            preferred,
            post_divider: 1,
        }
    }

    pub const fn with_post_divider(mut self, post_divider: u32) -> Self {
        self.post_divider = post_divider;
        self
    }

    /// Largest divisor the register field can express.
    pub fn max_divisor(&self) -> u32 {
        self.divider.map_or(1, |field| field.max() + 1)
    }

    pub fn current_parent<R: RegisterBlock>(&self, registers: &R) -> Result<Parent, ClockError> {
        match self.source {
            Source::Fixed(parent) => Ok(parent),
            Source::Mux { field, choices } => {
                let value = registers.read_field(self.offset, field);
                choices
                    .iter()
                    .find(|choice| choice.value == value)
                    .map(|choice| choice.parent)
                    .ok_or(ClockError::UnsupportedParent)
            }
        }
    }

    fn divisor<R: RegisterBlock>(&self, registers: &R) -> u32 {
        self.divider
            .map_or(1, |field| registers.read_field(self.offset, field) + 1)
    }

    /// Output rate, with `parent_rate` resolving the rate of whichever input
    /// is selected.
    pub fn get_rate<R, F>(&self, registers: &R, parent_rate: F) -> Result<Hz, ClockError>
    where
        R: RegisterBlock,
        F: Fn(Parent) -> Result<Hz, ClockError>,
    {
        let parent_hz = parent_rate(self.current_parent(registers)?)?;
        Ok(parent_hz / (self.divisor(registers) * self.post_divider))
    }

    pub fn set_rate<R, F>(&self, registers: &R, parent_rate: F, hz: Hz) -> Result<Hz, ClockError>
    where
        R: RegisterBlock,
        F: Fn(Parent) -> Result<Hz, ClockError>,
    {
        if hz == 0 {
            return Err(ClockError::UnsupportedRate(hz));
        }

        let current;
        let candidates = if self.preferred.is_empty() {
            current = [self.current_parent(registers)?];
            &current[..]
        } else {
            self.preferred
        };

        let target = u64::from(hz) * u64::from(self.post_divider);
        let mut last = None;
        for &parent in candidates {
            let parent_hz = parent_rate(parent)?;
            let divisor = u64::from(parent_hz).div_ceil(target).max(1);
            if divisor <= u64::from(self.max_divisor()) {
                self.program(registers, parent, divisor as u32);
                return self.get_rate(registers, &parent_rate);
            }
            last = Some((parent, divisor));
        }

        // Every candidate is too fast for the field.
        let (parent, divisor) = last.ok_or(ClockError::UnsupportedParent)?;
        let width = self.divider.map_or(0, |field| field.width);
        debug_assert!(
            divisor <= u64::from(self.max_divisor()),
            "divider {} for {} Hz does not fit {} bits",
            divisor, hz, width
        );
        log::warn!(
            "{}: divider {} for {} Hz clamped to {}",
            self.offset,
            divisor,
            hz,
            self.max_divisor()
        );
        self.program(registers, parent, self.max_divisor());
        Err(ClockError::DividerOverflow {
            divider: divisor.min(u64::from(u32::MAX)) as u32,
            width,
        })
    }

    /// Write the divider and the parent selection in one register access.
    fn program<R: RegisterBlock>(&self, registers: &R, parent: Parent, divisor: u32) {
        let mut mask = 0;
        let mut value = 0;
        if let Some(field) = self.divider {
            mask |= field.mask();
            value |= field.encode(divisor - 1);
        }
        if let Source::Mux { field, choices } = self.source {
            if let Some(choice) = choices.iter().find(|choice| choice.parent == parent) {
                mask |= field.mask();
                value |= field.encode(choice.value);
            }
        }
        if mask != 0 {
            registers.update(self.offset, mask, value);
        }
    }

    pub fn set_parent<R: RegisterBlock>(&self, registers: &R, parent: Parent) -> Result<(), ClockError> {
        match self.source {
            Source::Fixed(fixed) if fixed == parent => Ok(()),
            Source::Fixed(_) => Err(ClockError::UnsupportedParent),
            Source::Mux { field, choices } => {
                let choice = choices
                    .iter()
                    .find(|choice| choice.parent == parent)
                    .ok_or(ClockError::UnsupportedParent)?;
                registers.write_field(self.offset, field, choice.value);
                Ok(())
            }
        }
    }

    /// The external input with output name `name`, if the mux has one.
    pub fn external_parent(&self, name: &str) -> Option<Parent> {
        match self.source {
            Source::Mux { choices, .. } => choices
                .iter()
                .map(|choice| choice.parent)
                .find(|parent| matches!(parent, Parent::External(pin) if *pin == name)),
            Source::Fixed(parent @ Parent::External(pin)) if pin == name => Some(parent),
            Source::Fixed(_) => None,
        }
    }
}

/// Clock gate. A set bit stops the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gate {
    pub offset: RegisterOffset,
    pub bit: u8,
}

impl Gate {
    pub const fn new(offset: RegisterOffset, bit: u8) -> Self {
        Gate { offset, bit }
    }

    pub fn enable<R: RegisterBlock>(&self, registers: &R) {
        registers.write_field(self.offset, BitField::bit(self.bit), 0);
    }

    pub fn disable<R: RegisterBlock>(&self, registers: &R) {
        registers.write_field(self.offset, BitField::bit(self.bit), 1);
    }

    pub fn is_enabled<R: RegisterBlock>(&self, registers: &R) -> bool {
        registers.read_field(self.offset, BitField::bit(self.bit)) == 0
    }
}

/// Field value dividing `parent_hz` down to `rate_hz`, for settings that are
/// fixed at build time. The divisor is rounded down, so `divisor * rate_hz`
/// never exceeds `parent_hz`.
///
/// Panics if the divisor does not fit the field.
pub fn exact_divider(parent_hz: Hz, rate_hz: Hz, field: BitField) -> u32 {
    assert!(rate_hz != 0, "cannot divide {} Hz to 0 Hz", parent_hz);
    checked_divider(parent_hz, rate_hz, parent_hz / rate_hz, field)
}

/// Like [`exact_divider`], but rounding the divisor up so the output never
/// runs faster than `rate_hz`. Only valid when `rate_hz` divides `parent_hz`.
pub fn rounded_up_divider(parent_hz: Hz, rate_hz: Hz, field: BitField) -> u32 {
    assert!(rate_hz != 0, "cannot divide {} Hz to 0 Hz", parent_hz);
    checked_divider(parent_hz, rate_hz, parent_hz.div_ceil(rate_hz), field)
}

fn checked_divider(parent_hz: Hz, rate_hz: Hz, divisor: u32, field: BitField) -> u32 {
    assert!(
        divisor >= 1 && u64::from(divisor) * u64::from(rate_hz) <= u64::from(parent_hz),
        "cannot divide {} Hz to {} Hz",
        parent_hz,
        rate_hz
    );
    assert!(
        divisor - 1 <= field.max(),
        "divider {} for {} Hz from {} Hz does not fit {} bits",
        divisor,
        rate_hz,
        parent_hz,
        field.width
    );
    divisor - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GPLL_HZ, OSC_HZ};
    use crate::test_support::SimulatedBlock;

    const CPLL_HZ: Hz = 384_000_000;

    fn rates(parent: Parent) -> Result<Hz, ClockError> {
        match parent {
            Parent::Pll(PllId::Gpll) => Ok(GPLL_HZ),
            Parent::Pll(PllId::Cpll) => Ok(CPLL_HZ),
            Parent::Osc24M => Ok(OSC_HZ),
            _ => Err(ClockError::UnsupportedParent),
        }
    }

    const SD_CHOICES: [MuxChoice; 3] = [
        choice(0, Parent::Pll(PllId::Cpll)),
        choice(1, Parent::Pll(PllId::Gpll)),
        choice(5, Parent::Osc24M),
    ];

    const SD: DividerClock = DividerClock::muxed(
        RegisterOffset::ClkSel(16),
        BitField::new(0, 7),
        BitField::new(8, 3),
        &SD_CHOICES,
        &[Parent::Pll(PllId::Gpll), Parent::Osc24M],
    )
    .with_post_divider(2);

    const SPI_CHOICES: [MuxChoice; 2] = [
        choice(0, Parent::Pll(PllId::Cpll)),
        choice(1, Parent::Pll(PllId::Gpll)),
    ];

    const SPI1: DividerClock = DividerClock::muxed(
        RegisterOffset::ClkSel(59),
        BitField::new(8, 7),
        BitField::bit(15),
        &SPI_CHOICES,
        &[Parent::Pll(PllId::Gpll)],
    );

    #[test]
    fn sd_card_400khz_falls_back_to_crystal() {
        let block = SimulatedBlock::new();

        assert_eq!(SD.set_rate(&block, rates, 400_000), Ok(400_000));
        assert_eq!(SD.current_parent(&block), Ok(Parent::Osc24M));
        assert_eq!(block.read_field(SD.offset, BitField::new(0, 7)), 29);
        assert_eq!(block.read_field(SD.offset, BitField::new(8, 3)), 5);
    }

    #[test]
    fn sd_card_high_speed_stays_on_gpll() {
        let block = SimulatedBlock::new();

        assert_eq!(SD.set_rate(&block, rates, 50_000_000), Ok(49_500_000));
        assert_eq!(SD.current_parent(&block), Ok(Parent::Pll(PllId::Gpll)));
    }

    #[test]
    fn divider_and_select_share_one_write() {
        let block = SimulatedBlock::new();
        block.preset(SPI1.offset, 0x0033);

        SPI1.set_rate(&block, rates, 50_000_000).unwrap();
        let writes = block.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].mask, 0xff00);
        // Bits of the neighbouring SPI0 field are untouched.
        assert_eq!(block.read(SPI1.offset) & 0xff, 0x33);
    }

    #[test]
    fn achieved_rate_within_one_step_of_target() {
        for target in [5_000_000, 7_000_000, 33_333_333, 99_000_000, 200_000_000, GPLL_HZ] {
            let block = SimulatedBlock::new();
            let achieved = SPI1.set_rate(&block, rates, target).unwrap();
            let divisor = SPI1.divisor(&block);

            assert!(achieved <= target);
            assert!(achieved <= GPLL_HZ);
            if divisor > 1 {
                assert!(GPLL_HZ / (divisor - 1) > target);
            }
        }
    }

    #[test]
    fn target_above_parent_is_capped_at_parent() {
        let block = SimulatedBlock::new();
        assert_eq!(SPI1.set_rate(&block, rates, 1_000_000_000), Ok(GPLL_HZ));
    }

    #[test]
    fn written_fields_stay_in_range() {
        let block = SimulatedBlock::new();
        for target in (1..200).map(|mhz| mhz * 1_000_000) {
            SD.set_rate(&block, rates, target).unwrap();
        }
        for write in block.writes() {
            let divider = BitField::new(0, 7);
            assert!((write.value & divider.mask()) >> divider.shift <= divider.max());
            assert_eq!(write.value & !write.mask, 0);
        }
    }

    #[test]
    fn zero_rate_is_rejected() {
        let block = SimulatedBlock::new();
        assert_eq!(
            SPI1.set_rate(&block, rates, 0),
            Err(ClockError::UnsupportedRate(0))
        );
        assert!(block.writes().is_empty());
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "does not fit"))]
    fn overflow_is_clamped_and_reported() {
        let block = SimulatedBlock::new();
        assert_eq!(
            SPI1.set_rate(&block, rates, 100_000),
            Err(ClockError::DividerOverflow {
                divider: 5940,
                width: 7
            })
        );
        assert_eq!(block.read_field(SPI1.offset, BitField::new(8, 7)), 127);
    }

    #[test]
    fn reads_follow_the_mux() {
        let block = SimulatedBlock::new();
        block.preset(SPI1.offset, 0x0300);
        assert_eq!(SPI1.get_rate(&block, rates), Ok(CPLL_HZ / 4));

        SPI1.set_parent(&block, Parent::Pll(PllId::Gpll)).unwrap();
        assert_eq!(SPI1.get_rate(&block, rates), Ok(GPLL_HZ / 4));
        assert_eq!(
            SPI1.set_parent(&block, Parent::Osc24M),
            Err(ClockError::UnsupportedParent)
        );
    }

    #[test]
    fn gate_bits_are_active_high() {
        let block = SimulatedBlock::new();
        let gate = Gate::new(RegisterOffset::ClkGate(5), 5);

        gate.disable(&block);
        assert_eq!(block.read(gate.offset), 1 << 5);
        assert!(!gate.is_enabled(&block));
        gate.enable(&block);
        assert!(gate.is_enabled(&block));
    }

    #[test]
    fn exact_divider_checks_its_invariant() {
        assert_eq!(exact_divider(594_000_000, 148_500_000, BitField::new(0, 5)), 3);
        assert_eq!(exact_divider(816_000_000, 300_000_000, BitField::new(8, 5)), 1);
        assert_eq!(rounded_up_divider(594_000_000, 99_000_000, BitField::new(0, 5)), 5);
    }

    #[test]
    #[should_panic(expected = "cannot divide")]
    fn rounded_up_divider_needs_an_exact_ratio() {
        rounded_up_divider(594_000_000, 100_000_000, BitField::new(0, 5));
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn exact_divider_rejects_wide_values() {
        exact_divider(594_000_000, 1_000_000, BitField::new(0, 5));
    }
}
