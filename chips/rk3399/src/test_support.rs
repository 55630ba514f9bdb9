// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Host-side stand-ins for the clock units and the delay source.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::vec::Vec;

use crate::clocks::{ClockController, ClockKind};
use crate::divider::Parent;
use crate::pll::Delay;
use crate::registers::{RegisterBlock, RegisterOffset};
use crate::Hz;

const PLL_LOCK: u32 = 1 << 31;

/// One call to [`RegisterBlock::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Write {
    pub offset: RegisterOffset,
    pub mask: u32,
    pub value: u32,
}

/// Register file backed by memory.
///
/// Unwritten registers read as zero, so every PLL starts out in slow mode.
/// Writing a PLL's CON0 or CON1 drops its lock bit; the bit comes back after
/// the configured number of CON2 reads, or never.
pub struct SimulatedBlock {
    words: RefCell<BTreeMap<RegisterOffset, u32>>,
    lock_latency: Option<u32>,
    pending_lock: RefCell<BTreeMap<u8, u32>>,
    stalled: RefCell<BTreeSet<u8>>,
    writes: RefCell<Vec<Write>>,
}

impl SimulatedBlock {
    pub fn new() -> Self {
        Self::with_lock(Some(0))
    }

    pub fn with_lock_latency(polls: u32) -> Self {
        Self::with_lock(Some(polls))
    }

    pub fn never_locking() -> Self {
        Self::with_lock(None)
    }

    fn with_lock(lock_latency: Option<u32>) -> Self {
        SimulatedBlock {
            words: RefCell::new(BTreeMap::new()),
            lock_latency,
            pending_lock: RefCell::new(BTreeMap::new()),
            stalled: RefCell::new(BTreeSet::new()),
            writes: RefCell::new(Vec::new()),
        }
    }

    /// Set a register without recording a write.
    pub fn preset(&self, offset: RegisterOffset, value: u32) {
        self.words.borrow_mut().insert(offset, value);
    }

    /// Keep the PLL whose CON0 is `PllCon(con_base)` from ever locking again.
    pub fn stall_pll(&self, con_base: u8) {
        self.stalled.borrow_mut().insert(con_base);
    }

    pub fn snapshot(&self) -> BTreeMap<RegisterOffset, u32> {
        self.words.borrow().clone()
    }

    pub fn checksum(&self) -> u32 {
        self.words
            .borrow()
            .iter()
            .fold(0x811c_9dc5, |hash: u32, (offset, value)| {
                let hash = (hash ^ offset.cru_byte_offset() as u32).wrapping_mul(0x0100_0193);
                (hash ^ value).wrapping_mul(0x0100_0193)
            })
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.borrow().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.borrow_mut().clear();
    }

    fn poll_lock(&self, con2: RegisterOffset, base: u8) {
        let mut pending = self.pending_lock.borrow_mut();
        match pending.get(&base).copied() {
            Some(0) => {
                pending.remove(&base);
                *self.words.borrow_mut().entry(con2).or_insert(0) |= PLL_LOCK;
            }
            Some(remaining) => {
                pending.insert(base, remaining - 1);
            }
            None => {}
        }
    }
}

impl RegisterBlock for SimulatedBlock {
    fn read(&self, offset: RegisterOffset) -> u32 {
        if let RegisterOffset::PllCon(n) = offset {
            if n % 8 == 2 {
                self.poll_lock(offset, n - 2);
            }
        }
        self.words.borrow().get(&offset).copied().unwrap_or(0)
    }

    fn update(&self, offset: RegisterOffset, mask: u32, value: u32) {
        assert!(
            !offset.is_write_masked() || mask <= 0xffff,
            "{} only has 16 writable bits, mask {:#x}",
            offset,
            mask
        );
        self.writes.borrow_mut().push(Write {
            offset,
            mask,
            value,
        });
        {
            let mut words = self.words.borrow_mut();
            let word = words.entry(offset).or_insert(0);
            *word = (*word & !mask) | (value & mask);
        }

        if let RegisterOffset::PllCon(n) = offset {
            if n % 8 == 0 || n % 8 == 1 {
                let base = n - n % 8;
                let con2 = RegisterOffset::PllCon(base + 2);
                *self.words.borrow_mut().entry(con2).or_insert(0) &= !PLL_LOCK;
                let mut pending = self.pending_lock.borrow_mut();
                match self.lock_latency {
                    Some(_) if self.stalled.borrow().contains(&base) => {
                        pending.remove(&base);
                    }
                    Some(polls) => {
                        pending.insert(base, polls);
                    }
                    None => {
                        pending.remove(&base);
                    }
                }
            }
        }
    }
}

/// Records how long the code under test asked to wait.
pub struct CountingDelay {
    total_us: Cell<u32>,
}

impl CountingDelay {
    pub fn new() -> Self {
        CountingDelay {
            total_us: Cell::new(0),
        }
    }

    pub fn total_us(&self) -> u32 {
        self.total_us.get()
    }
}

impl Delay for CountingDelay {
    fn delay_us(&self, us: u32) {
        self.total_us.set(self.total_us.get() + us);
    }
}

/// Request each of `targets` from every divider clock in the controller's
/// tree and check what the hardware ends up with.
///
/// A target is skipped for a clock when none of its candidate parents can be
/// divided down to it within the field width. Returns the number of divider
/// clocks that took at least one target, and the number of divider clocks.
pub fn sweep_dividers<D: Delay>(
    clocks: &ClockController<'_, SimulatedBlock, D>,
    targets: &[Hz],
) -> (usize, usize) {
    let registers = clocks.registers();
    let mut exercised = 0;
    let mut total = 0;

    for clock in clocks.tree().clocks {
        let ClockKind::Divider(divider) = clock.kind else {
            continue;
        };
        let Some(field) = divider.divider else {
            continue;
        };
        total += 1;
        let mut hit = false;

        for &target in targets {
            let candidates: Vec<Parent> = if divider.preferred.is_empty() {
                std::vec![divider.current_parent(registers).unwrap()]
            } else {
                divider.preferred.to_vec()
            };
            let step = u64::from(target) * u64::from(divider.post_divider);
            let fitting = candidates.iter().find_map(|&parent| {
                let parent_hz = clocks.parent_rate(clock.id, parent).ok()?;
                let divisor = u64::from(parent_hz).div_ceil(step).max(1);
                (divisor <= u64::from(divider.max_divisor())).then_some((parent_hz, divisor as u32))
            });
            let Some((parent_hz, divisor)) = fitting else {
                continue;
            };

            registers.clear_writes();
            let achieved = clocks.set_rate(clock.id, target).unwrap();
            let context = (clock.name, target);

            assert_eq!(clocks.get_rate(clock.id), Ok(achieved), "{:?}", context);
            assert!(achieved <= target, "{:?} ran at {}", context, achieved);
            assert!(achieved <= parent_hz, "{:?} ran at {}", context, achieved);
            if divisor > 1 {
                // One divider step less would overshoot.
                assert!(u64::from(parent_hz) > u64::from(divisor - 1) * step, "{:?}", context);
            }

            for write in registers.writes() {
                assert_eq!(write.offset, divider.offset, "{:?}", context);
                assert_eq!(write.value & !write.mask, 0, "{:?}", context);
                if write.mask & field.mask() != 0 {
                    let written = field.field().read(write.value);
                    assert!(written <= field.max(), "{:?}", context);
                    assert_eq!(written, divisor - 1, "{:?}", context);
                }
            }
            hit = true;
        }

        if hit {
            exercised += 1;
        }
    }
    (exercised, total)
}
