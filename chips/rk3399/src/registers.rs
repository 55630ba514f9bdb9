// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Register access for the RK3399 clock and reset units.
//!
//! Every clock model talks to hardware through the [`RegisterBlock`] trait,
//! which only knows two primitives: read a whole register and update a
//! masked set of bits in it. Registers are named by bank and index with
//! [`RegisterOffset`], and sub-ranges of a register by [`BitField`].
//!
//! Most CRU registers use Rockchip's "write-enable" encoding: the upper 16
//! bits of a write select which of the lower 16 bits change. The MMIO
//! handles ([`Cru`] and [`PmuCru`]) hide that encoding, so a field update
//! never disturbs the neighbouring bits no matter which encoding a given
//! register uses.

use core::fmt;

use tock_registers::fields::{Field, FieldValue};
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_structs, LocalRegisterCopy, RegisterLongName};

register_structs! {
    /// Main clock and reset unit.
    pub CruRegisters {
        /// Seven PLLs, eight words each: LPLL, BPLL, DPLL, CPLL, GPLL, NPLL, VPLL
        (0x000 => pll_con: [ReadWrite<u32>; 56]),
        (0x0e0 => _reserved0),
        (0x100 => clksel_con: [ReadWrite<u32>; 108]),
        (0x2b0 => _reserved1),
        (0x300 => clkgate_con: [ReadWrite<u32>; 35]),
        (0x38c => @END),
    },

    /// Clock and reset unit of the always-on PMU power domain.
    pub PmuCruRegisters {
        (0x000 => ppll_con: [ReadWrite<u32>; 6]),
        (0x018 => _reserved0),
        (0x080 => pmucru_clksel: [ReadWrite<u32>; 6]),
        (0x098 => _reserved1),
        (0x100 => pmucru_clkgate_con: [ReadWrite<u32>; 3]),
        (0x10c => @END),
    }
}

/// A 32-bit configuration register, named by its bank and index.
///
/// The same name means the same bank in both units; the PMU unit's `PllCon`
/// bank holds the PPLL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RegisterOffset {
    PllCon(u8),
    ClkSel(u8),
    ClkGate(u8),
}

impl RegisterOffset {
    /// Whether writes to this register carry a write-enable mask in their
    /// upper half. Only the PLL lock/fraction word (CON2) is a plain register.
    pub const fn is_write_masked(self) -> bool {
        match self {
            RegisterOffset::PllCon(n) => n % 8 != 2,
            _ => true,
        }
    }

    /// Byte offset of the register inside the main CRU.
    pub const fn cru_byte_offset(self) -> usize {
        match self {
            RegisterOffset::PllCon(n) => n as usize * 4,
            RegisterOffset::ClkSel(n) => 0x100 + n as usize * 4,
            RegisterOffset::ClkGate(n) => 0x300 + n as usize * 4,
        }
    }
}

impl fmt::Display for RegisterOffset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RegisterOffset::PllCon(n) => write!(f, "PLL_CON{}", n),
            RegisterOffset::ClkSel(n) => write!(f, "CLKSEL_CON{}", n),
            RegisterOffset::ClkGate(n) => write!(f, "CLKGATE_CON{}", n),
        }
    }
}

/// `width` bits starting at bit `shift`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitField {
    pub shift: u8,
    pub width: u8,
}

impl BitField {
    pub const fn new(shift: u8, width: u8) -> Self {
        BitField { shift, width }
    }

    pub const fn bit(shift: u8) -> Self {
        BitField { shift, width: 1 }
    }

    /// Largest value the field can hold.
    pub const fn max(self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            (1 << self.width) - 1
        }
    }

    pub const fn field(self) -> Field<u32, ()> {
        Field::new(self.max(), self.shift as usize)
    }

    /// Mask of the field in register position.
    pub const fn mask(self) -> u32 {
        self.max() << self.shift
    }

    /// `value` placed into register position, truncated to the field width.
    pub const fn encode(self, value: u32) -> u32 {
        (value & self.max()) << self.shift
    }
}

/// Access to one clock unit's register file.
///
/// Implementors only provide [`read`](RegisterBlock::read) and
/// [`update`](RegisterBlock::update); everything else is layered on top.
/// Offsets are trusted: an implementor may panic on an offset that does not
/// exist in its block.
pub trait RegisterBlock {
    fn read(&self, offset: RegisterOffset) -> u32;

    /// Set the bits selected by `mask` to the matching bits of `value`.
    /// All other bits keep their current value.
    fn update(&self, offset: RegisterOffset, mask: u32, value: u32);

    fn read_copy<R: RegisterLongName>(&self, offset: RegisterOffset) -> LocalRegisterCopy<u32, R> {
        LocalRegisterCopy::new(self.read(offset))
    }

    fn read_field(&self, offset: RegisterOffset, field: BitField) -> u32 {
        field.field().read(self.read(offset))
    }

    fn write_field(&self, offset: RegisterOffset, field: BitField, value: u32) {
        self.update(offset, field.mask(), field.encode(value));
    }

    /// Write one or more typed fields in a single register access.
    fn write<R: RegisterLongName>(&self, offset: RegisterOffset, value: FieldValue<u32, R>) {
        self.update(offset, value.mask(), value.value);
    }
}

impl<T: RegisterBlock + ?Sized> RegisterBlock for &T {
    fn read(&self, offset: RegisterOffset) -> u32 {
        (**self).read(offset)
    }

    fn update(&self, offset: RegisterOffset, mask: u32, value: u32) {
        (**self).update(offset, mask, value);
    }
}

fn masked_update(register: &ReadWrite<u32>, write_masked: bool, mask: u32, value: u32) {
    if write_masked {
        debug_assert!(mask <= 0xffff, "write-enable registers only hold 16 bits");
        register.set((mask << 16) | (value & mask));
    } else {
        register.set((register.get() & !mask) | (value & mask));
    }
}

/// Memory-mapped main CRU.
pub struct Cru<'a> {
    registers: &'a CruRegisters,
}

impl<'a> Cru<'a> {
    pub const fn new(registers: &'a CruRegisters) -> Self {
        Cru { registers }
    }

    /// # Safety
    ///
    /// `base` must be the physical address of the CRU, mapped for the whole
    /// lifetime `'a`, and no other code may write the unit while the handle
    /// exists.
    pub unsafe fn from_base(base: usize) -> Self {
        Cru {
            registers: &*(base as *const CruRegisters),
        }
    }

    fn register(&self, offset: RegisterOffset) -> &ReadWrite<u32> {
        match offset {
            RegisterOffset::PllCon(n) => &self.registers.pll_con[n as usize],
            RegisterOffset::ClkSel(n) => &self.registers.clksel_con[n as usize],
            RegisterOffset::ClkGate(n) => &self.registers.clkgate_con[n as usize],
        }
    }
}

impl RegisterBlock for Cru<'_> {
    fn read(&self, offset: RegisterOffset) -> u32 {
        self.register(offset).get()
    }

    fn update(&self, offset: RegisterOffset, mask: u32, value: u32) {
        masked_update(self.register(offset), offset.is_write_masked(), mask, value);
    }
}

/// Memory-mapped PMU CRU.
pub struct PmuCru<'a> {
    registers: &'a PmuCruRegisters,
}

impl<'a> PmuCru<'a> {
    pub const fn new(registers: &'a PmuCruRegisters) -> Self {
        PmuCru { registers }
    }

    /// # Safety
    ///
    /// Same contract as [`Cru::from_base`], for the PMU CRU.
    pub unsafe fn from_base(base: usize) -> Self {
        PmuCru {
            registers: &*(base as *const PmuCruRegisters),
        }
    }

    fn register(&self, offset: RegisterOffset) -> &ReadWrite<u32> {
        match offset {
            RegisterOffset::PllCon(n) => &self.registers.ppll_con[n as usize],
            RegisterOffset::ClkSel(n) => &self.registers.pmucru_clksel[n as usize],
            RegisterOffset::ClkGate(n) => &self.registers.pmucru_clkgate_con[n as usize],
        }
    }
}

impl RegisterBlock for PmuCru<'_> {
    fn read(&self, offset: RegisterOffset) -> u32 {
        self.register(offset).get()
    }

    fn update(&self, offset: RegisterOffset, mask: u32, value: u32) {
        masked_update(self.register(offset), offset.is_write_masked(), mask, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SimulatedBlock;

    #[test]
    fn bitfield_geometry() {
        let div = BitField::new(8, 5);
        assert_eq!(div.max(), 0x1f);
        assert_eq!(div.mask(), 0x1f00);
        assert_eq!(div.encode(0x25), 0x0500);
        assert_eq!(BitField::bit(15).mask(), 0x8000);
    }

    #[test]
    fn write_field_preserves_neighbours() {
        let block = SimulatedBlock::new();
        let offset = RegisterOffset::ClkSel(14);
        block.preset(offset, 0xffff);

        block.write_field(offset, BitField::new(8, 2), 1);
        assert_eq!(block.read(offset), 0xfdff);
        assert_eq!(block.read_field(offset, BitField::new(8, 2)), 1);
        assert_eq!(block.read_field(offset, BitField::new(12, 3)), 7);
    }

    #[test]
    fn aliased_fields_share_a_register() {
        let block = SimulatedBlock::new();
        let offset = RegisterOffset::ClkSel(61);
        let i2c1 = BitField::new(0, 7);
        let i2c5 = BitField::new(8, 7);

        block.write_field(offset, i2c1, 3);
        block.write_field(offset, i2c5, 9);
        assert_eq!(block.read_field(offset, i2c1), 3);
        assert_eq!(block.read_field(offset, i2c5), 9);
    }

    #[test]
    fn mmio_uses_write_enable_encoding() {
        let registers: CruRegisters = unsafe { core::mem::zeroed() };
        let cru = Cru::new(&registers);

        cru.write_field(RegisterOffset::ClkSel(16), BitField::new(8, 3), 5);
        // The raw word carries the write-enable mask in its upper half.
        assert_eq!(cru.read(RegisterOffset::ClkSel(16)), 0x0700_0500);
    }

    #[test]
    fn mmio_plain_register_is_read_modify_write() {
        let registers: CruRegisters = unsafe { core::mem::zeroed() };
        let cru = Cru::new(&registers);
        let con2 = RegisterOffset::PllCon(2);

        cru.update(con2, 0x00ff_ffff, 0x0012_3456);
        cru.update(con2, 0xff00_0000, 0x8000_0000);
        assert_eq!(cru.read(con2), 0x8012_3456);
    }

    #[test]
    fn blocks_end_after_the_gate_bank() {
        assert_eq!(core::mem::size_of::<CruRegisters>(), 0x38c);
        assert_eq!(core::mem::size_of::<PmuCruRegisters>(), 0x10c);
        assert_eq!(
            RegisterOffset::ClkGate(34).cru_byte_offset() + 4,
            core::mem::size_of::<CruRegisters>()
        );
    }

    #[test]
    fn byte_offsets_follow_the_register_map() {
        assert_eq!(RegisterOffset::PllCon(35).cru_byte_offset(), 0x8c);
        assert_eq!(RegisterOffset::ClkSel(107).cru_byte_offset(), 0x2ac);
        assert_eq!(RegisterOffset::ClkGate(32).cru_byte_offset(), 0x380);
        assert!(!RegisterOffset::PllCon(34).is_write_masked());
        assert!(RegisterOffset::PllCon(35).is_write_masked());
    }
}
