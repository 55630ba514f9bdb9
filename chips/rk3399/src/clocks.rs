// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Clock registry and dispatch.
//!
//! Each clock unit is described by a [`ClockTree`]: a table, sorted by
//! [`ClockId`], of [`ClockDescriptor`]s saying what kind of model drives the
//! clock and which registers it lives in. A [`ClockController`] owns the
//! register handle for one unit, looks identifiers up in its tree and
//! forwards the request to the PLL, divider or composite model.
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! let registers = unsafe { Cru::from_base(0xff76_0000) };
//! let clocks = ClockController::cru(registers, SpinDelay::new(800));
//! clocks.bring_up(&RK3399_RECIPE);
//!
//! clocks.set_rate(cru::SCLK_SDMMC, 400_000)?;
//! clocks.enable(cru::SCLK_MAC)?;
//! ```

use core::cell::Cell;

use tock_cells::optional_cell::OptionalCell;

use crate::bringup::BringUpState;
use crate::clock_ids::{cru, ClockId};
use crate::config::{ACLK_EMMC_HZ, ACLK_VOP_MAX_HZ, MHZ, OSC_HZ};
use crate::divider::{choice, DividerClock, Gate, MuxChoice, Parent, Source};
use crate::error::ClockError;
use crate::pll::{Delay, PllId};
use crate::registers::{BitField, RegisterBlock, RegisterOffset};
use crate::Hz;

/// Looks up the output names another clock provider declares, so that an
/// external pin can be matched against a mux input.
pub trait ClockOutputNames {
    fn output_name(&self, provider_clock: ClockId, index: usize) -> Result<&str, ClockError>;
}

/// Requested parent for [`ClockController::set_parent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParentRef {
    /// A clock of the same controller.
    Internal(ClockId),
    /// A clock owned by another provider.
    External(ClockId),
}

/// Clocks built from more than one register or model.
#[derive(Clone, Copy, Debug)]
pub enum Composite {
    /// A divider whose upstream bus clock must be at `upstream_hz` first.
    Chained {
        upstream: ClockId,
        upstream_hz: Hz,
        divider: DividerClock,
    },
    /// Display pixel clock: bounds the display bus clock, then runs the
    /// PLL feeding `dclk_div` at the pixel rate with an undivided output.
    PixelClock {
        aclk: ClockId,
        dclk_div: ClockId,
        offset: RegisterOffset,
        select: BitField,
    },
    /// Ethernet clock. Only an external source is supported.
    MacClock { rmii_src: ClockId },
    /// Another name for `target`.
    Alias { target: ClockId, read_only: bool },
    /// PLL whose rate is owned by an earlier boot stage.
    Pinned(PllId),
}

#[derive(Clone, Copy, Debug)]
pub enum ClockKind {
    Pll(PllId),
    Divider(DividerClock),
    Fixed(Hz),
    Composite(Composite),
    /// Enabled by default and not rate-controlled here. Reports its declared
    /// rate, and rate requests are accepted without touching hardware.
    Passive(Hz),
    /// Only has a gate.
    GateOnly,
}

#[derive(Clone, Copy, Debug)]
pub struct ClockDescriptor {
    pub id: ClockId,
    pub name: &'static str,
    pub kind: ClockKind,
    pub gate: Option<Gate>,
}

impl ClockDescriptor {
    pub const fn new(id: ClockId, name: &'static str, kind: ClockKind) -> Self {
        ClockDescriptor {
            id,
            name,
            kind,
            gate: None,
        }
    }

    pub const fn gated(mut self, offset: RegisterOffset, bit: u8) -> Self {
        self.gate = Some(Gate::new(offset, bit));
        self
    }
}

/// All clocks of one unit, sorted by identifier.
pub struct ClockTree {
    pub name: &'static str,
    pub clocks: &'static [ClockDescriptor],
}

impl ClockTree {
    pub fn find(&self, id: ClockId) -> Option<&'static ClockDescriptor> {
        let clocks = self.clocks;
        clocks
            .binary_search_by_key(&id, |clock| clock.id)
            .ok()
            .map(|index| &clocks[index])
    }

    /// How a divider of this unit refers to clock `id` as its input.
    fn parent_for(&self, id: ClockId) -> Parent {
        match self.find(id).map(|clock| clock.kind) {
            Some(ClockKind::Pll(pll)) | Some(ClockKind::Composite(Composite::Pinned(pll))) => {
                Parent::Pll(pll)
            }
            _ => Parent::Clock(id),
        }
    }
}

/// One line of the diagnostic clock listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KnownClock {
    pub id: ClockId,
    pub name: &'static str,
    /// Served by the main CRU rather than the PMU CRU.
    pub internal: bool,
}

const fn known(id: ClockId, name: &'static str, internal: bool) -> KnownClock {
    KnownClock { id, name, internal }
}

static KNOWN_CLOCKS: [KnownClock; 16] = [
    known(cru::PLL_APLLL, "aplll", true),
    known(cru::PLL_APLLB, "apllb", true),
    known(cru::PLL_DPLL, "dpll", true),
    known(cru::PLL_CPLL, "cpll", true),
    known(cru::PLL_GPLL, "gpll", true),
    known(cru::PLL_NPLL, "npll", true),
    known(cru::PLL_VPLL, "vpll", true),
    known(cru::ACLK_PERIHP, "aclk_perihp", true),
    known(cru::HCLK_PERIHP, "hclk_perihp", true),
    known(cru::PCLK_PERIHP, "pclk_perihp", true),
    known(cru::ACLK_PERILP0, "aclk_perilp0", true),
    known(cru::HCLK_PERILP0, "hclk_perilp0", true),
    known(cru::PCLK_PERILP0, "pclk_perilp0", true),
    known(cru::HCLK_PERILP1, "hclk_perilp1", true),
    known(cru::PCLK_PERILP1, "pclk_perilp1", true),
    known(crate::clock_ids::pmucru::PLL_PPLL, "ppll", false),
];

/// Clocks worth reporting in a boot log, in reporting order.
pub fn known_clocks() -> &'static [KnownClock] {
    &KNOWN_CLOCKS
}

pub struct ClockController<'a, R: RegisterBlock, D: Delay> {
    registers: R,
    delay: D,
    tree: &'static ClockTree,
    output_names: OptionalCell<&'a dyn ClockOutputNames>,
    pub(crate) bring_up_state: Cell<BringUpState>,
}

impl<'a, R: RegisterBlock, D: Delay> ClockController<'a, R, D> {
    pub fn new(registers: R, delay: D, tree: &'static ClockTree) -> Self {
        ClockController {
            registers,
            delay,
            tree,
            output_names: OptionalCell::empty(),
            bring_up_state: Cell::new(BringUpState::NotStarted),
        }
    }

    /// Controller for the main CRU.
    pub fn cru(registers: R, delay: D) -> Self {
        Self::new(registers, delay, &CRU_TREE)
    }

    /// Controller for the PMU CRU.
    pub fn pmu(registers: R, delay: D) -> Self {
        Self::new(registers, delay, &crate::pmucru::PMU_TREE)
    }

    pub fn registers(&self) -> &R {
        &self.registers
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    pub fn tree(&self) -> &'static ClockTree {
        self.tree
    }

    pub fn set_output_names(&self, names: &'a dyn ClockOutputNames) {
        self.output_names.set(names);
    }

    pub fn resolve(&self, id: ClockId) -> Result<&'static ClockDescriptor, ClockError> {
        self.tree.find(id).ok_or_else(|| {
            log::debug!("{}: unknown clock {}", self.tree.name, id);
            ClockError::UnknownClock(id)
        })
    }

    pub fn get_rate(&self, id: ClockId) -> Result<Hz, ClockError> {
        let clock = self.resolve(id)?;
        match clock.kind {
            ClockKind::Pll(pll) => Ok(pll.pll().get_rate(&self.registers)),
            ClockKind::Divider(divider) => {
                divider.get_rate(&self.registers, |parent| self.parent_rate(id, parent))
            }
            ClockKind::Fixed(hz) => Ok(hz),
            ClockKind::Composite(composite) => self.composite_rate(id, composite),
            ClockKind::Passive(hz) => Ok(hz),
            ClockKind::GateOnly => Err(ClockError::NotSupported(id)),
        }
    }

    /// Program clock `id` as close to `hz` as the hardware allows without
    /// exceeding it, and return the rate it runs at afterwards.
    pub fn set_rate(&self, id: ClockId, hz: Hz) -> Result<Hz, ClockError> {
        let clock = self.resolve(id)?;
        match clock.kind {
            ClockKind::Pll(pll) => pll.pll().set_rate(&self.registers, &self.delay, hz),
            ClockKind::Divider(divider) => {
                divider.set_rate(&self.registers, |parent| self.parent_rate(id, parent), hz)
            }
            ClockKind::Fixed(fixed) if fixed == hz => Ok(fixed),
            ClockKind::Fixed(_) => Err(ClockError::UnsupportedRate(hz)),
            ClockKind::Composite(composite) => self.set_composite_rate(id, composite, hz),
            ClockKind::Passive(fixed) => Ok(fixed),
            ClockKind::GateOnly => Err(ClockError::NotSupported(id)),
        }
    }

    pub fn enable(&self, id: ClockId) -> Result<(), ClockError> {
        let clock = self.resolve(id)?;
        match (clock.gate, clock.kind) {
            (Some(gate), _) => {
                gate.enable(&self.registers);
                Ok(())
            }
            (None, ClockKind::Passive(_)) | (None, ClockKind::Fixed(_)) => Ok(()),
            (None, _) => Err(ClockError::NotSupported(id)),
        }
    }

    pub fn disable(&self, id: ClockId) -> Result<(), ClockError> {
        let clock = self.resolve(id)?;
        match (clock.gate, clock.kind) {
            (Some(gate), _) => {
                gate.disable(&self.registers);
                Ok(())
            }
            (None, ClockKind::Passive(_)) | (None, ClockKind::Fixed(_)) => Ok(()),
            (None, _) => Err(ClockError::NotSupported(id)),
        }
    }

    pub fn set_parent(&self, id: ClockId, parent: ParentRef) -> Result<(), ClockError> {
        let clock = self.resolve(id)?;
        let ClockKind::Divider(divider) = clock.kind else {
            return Err(ClockError::NotSupported(id));
        };

        let parent = match parent {
            ParentRef::Internal(parent) => self.tree.parent_for(parent),
            ParentRef::External(parent) => {
                let names = self
                    .output_names
                    .map(|names| *names)
                    .ok_or(ClockError::MetadataUnavailable)?;
                let name = names
                    .output_name(parent, parent.0 as usize)
                    .map_err(|_| ClockError::MetadataUnavailable)?;
                divider
                    .external_parent(name)
                    .ok_or(ClockError::UnsupportedParent)?
            }
        };
        log::debug!("{}: {} now fed by {:?}", self.tree.name, clock.name, parent);
        divider.set_parent(&self.registers, parent)
    }

    pub(crate) fn parent_rate(&self, id: ClockId, parent: Parent) -> Result<Hz, ClockError> {
        match parent {
            Parent::Pll(pll) => Ok(pll.pll().get_rate(&self.registers)),
            Parent::Osc24M => Ok(OSC_HZ),
            Parent::Clock(parent) => self.get_rate(parent),
            Parent::External(_) => Err(ClockError::NotSupported(id)),
        }
    }

    fn composite_rate(&self, id: ClockId, composite: Composite) -> Result<Hz, ClockError> {
        match composite {
            Composite::Chained { divider, .. } => {
                divider.get_rate(&self.registers, |parent| self.parent_rate(id, parent))
            }
            Composite::PixelClock {
                dclk_div,
                offset,
                select,
                ..
            } => {
                // Only the integer divider output is modelled.
                if self.registers.read_field(offset, select) == 0 {
                    self.get_rate(dclk_div)
                } else {
                    Err(ClockError::NotSupported(id))
                }
            }
            Composite::MacClock { .. } => Err(ClockError::NotSupported(id)),
            Composite::Alias { target, .. } => self.get_rate(target),
            Composite::Pinned(pll) => Ok(pll.pll().get_rate(&self.registers)),
        }
    }

    fn set_composite_rate(
        &self,
        id: ClockId,
        composite: Composite,
        hz: Hz,
    ) -> Result<Hz, ClockError> {
        match composite {
            Composite::Chained {
                upstream,
                upstream_hz,
                divider,
            } => {
                self.set_rate(upstream, upstream_hz)?;
                divider.set_rate(&self.registers, |parent| self.parent_rate(id, parent), hz)
            }
            Composite::PixelClock {
                aclk,
                dclk_div,
                offset,
                select,
            } => {
                self.set_rate(aclk, ACLK_VOP_MAX_HZ)?;
                let ClockKind::Divider(div) = self.resolve(dclk_div)?.kind else {
                    return Err(ClockError::NotSupported(id));
                };
                let Parent::Pll(pll) = div.current_parent(&self.registers)? else {
                    return Err(ClockError::UnsupportedParent);
                };
                pll.pll().set_rate(&self.registers, &self.delay, hz)?;

                let mut mask = select.mask();
                if let Some(field) = div.divider {
                    mask |= field.mask();
                }
                self.registers.update(offset, mask, 0);
                self.get_rate(id)
            }
            Composite::MacClock { rmii_src } => {
                let ClockKind::Divider(rmii) = self.resolve(rmii_src)?.kind else {
                    return Err(ClockError::NotSupported(id));
                };
                match rmii.current_parent(&self.registers)? {
                    // An external oscillator always runs at the right rate.
                    Parent::External(_) => Ok(hz),
                    _ => {
                        log::error!(
                            "{}: internal Ethernet clock source not implemented",
                            self.tree.name
                        );
                        Err(ClockError::NotSupported(id))
                    }
                }
            }
            Composite::Alias {
                read_only: true, ..
            } => Err(ClockError::NotSupported(id)),
            Composite::Alias { target, .. } => self.set_rate(target, hz),
            Composite::Pinned(pll) => Ok(pll.pll().get_rate(&self.registers)),
        }
    }
}

// Input selections shared by several clocks.

const CPLL_GPLL: [MuxChoice; 2] = [
    choice(0, Parent::Pll(PllId::Cpll)),
    choice(1, Parent::Pll(PllId::Gpll)),
];

const MMC_SOURCES: [MuxChoice; 4] = [
    choice(0, Parent::Pll(PllId::Cpll)),
    choice(1, Parent::Pll(PllId::Gpll)),
    choice(2, Parent::Pll(PllId::Npll)),
    choice(5, Parent::Osc24M),
];

const CORE_SOURCES: [MuxChoice; 4] = [
    choice(0, Parent::Pll(PllId::Lpll)),
    choice(1, Parent::Pll(PllId::Bpll)),
    choice(2, Parent::Pll(PllId::Dpll)),
    choice(3, Parent::Pll(PllId::Gpll)),
];

const VOP_ACLK_SOURCES: [MuxChoice; 4] = [
    choice(0, Parent::Pll(PllId::Vpll)),
    choice(1, Parent::Pll(PllId::Cpll)),
    choice(2, Parent::Pll(PllId::Gpll)),
    choice(3, Parent::Pll(PllId::Npll)),
];

const VOP_DCLK_SOURCES: [MuxChoice; 2] = [
    choice(0, Parent::Pll(PllId::Vpll)),
    choice(1, Parent::Pll(PllId::Cpll)),
];

const TSADC_SOURCES: [MuxChoice; 1] = [choice(0, Parent::Osc24M)];

const RMII_SOURCES: [MuxChoice; 2] = [
    choice(0, Parent::Clock(cru::SCLK_MAC)),
    choice(1, Parent::External("clkin_gmac")),
];

/// Default-on clock whose frequency is not tracked by this driver.
const UNTRACKED: ClockKind = ClockKind::Passive(0);
/// UTMI output of a USB 2.0 PHY.
const USB_PHY_480M: ClockKind = ClockKind::Passive(480 * MHZ);

const GPLL_ONLY: [Parent; 1] = [Parent::Pll(PllId::Gpll)];
const GPLL_THEN_OSC: [Parent; 2] = [Parent::Pll(PllId::Gpll), Parent::Osc24M];

const fn sel(n: u8) -> RegisterOffset {
    RegisterOffset::ClkSel(n)
}

const fn gate(n: u8) -> RegisterOffset {
    RegisterOffset::ClkGate(n)
}

/// A 7-bit divider with a CPLL/GPLL select bit right above it, as used by
/// the I2C and SPI controllers.
const fn peripheral(offset: u8, shift: u8) -> ClockKind {
    ClockKind::Divider(DividerClock::muxed(
        sel(offset),
        BitField::new(shift, 7),
        BitField::bit(shift + 7),
        &CPLL_GPLL,
        &GPLL_ONLY,
    ))
}

const fn bus_root(offset: u8) -> ClockKind {
    ClockKind::Divider(DividerClock::muxed(
        sel(offset),
        BitField::new(0, 5),
        BitField::bit(7),
        &CPLL_GPLL,
        &GPLL_ONLY,
    ))
}

const fn bus_child(offset: u8, divider: BitField, parent: ClockId) -> ClockKind {
    ClockKind::Divider(DividerClock::fixed(
        sel(offset),
        divider,
        Parent::Clock(parent),
    ))
}

const fn cpu_cluster(offset: u8) -> ClockKind {
    ClockKind::Divider(DividerClock::muxed(
        sel(offset),
        BitField::new(0, 5),
        BitField::new(6, 2),
        &CORE_SOURCES,
        &[],
    ))
}

const fn vop_aclk(offset: u8) -> ClockKind {
    ClockKind::Divider(DividerClock::muxed(
        sel(offset),
        BitField::new(0, 5),
        BitField::new(6, 2),
        &VOP_ACLK_SOURCES,
        &GPLL_ONLY,
    ))
}

const fn vop_dclk_div(offset: u8) -> ClockKind {
    ClockKind::Divider(DividerClock::muxed(
        sel(offset),
        BitField::new(0, 8),
        BitField::new(8, 2),
        &VOP_DCLK_SOURCES,
        &[],
    ))
}

const fn pixel_clock(aclk: ClockId, dclk_div: ClockId, offset: u8) -> ClockKind {
    ClockKind::Composite(Composite::PixelClock {
        aclk,
        dclk_div,
        offset: sel(offset),
        select: BitField::bit(11),
    })
}

const fn crypto(offset: u8) -> ClockKind {
    ClockKind::Divider(DividerClock::muxed(
        sel(offset),
        BitField::new(0, 5),
        BitField::new(6, 2),
        &CPLL_GPLL,
        &GPLL_ONLY,
    ))
}

const fn alias(target: ClockId, read_only: bool) -> ClockKind {
    ClockKind::Composite(Composite::Alias { target, read_only })
}

const SDMMC: DividerClock = DividerClock::muxed(
    sel(16),
    BitField::new(0, 7),
    BitField::new(8, 3),
    &MMC_SOURCES,
    &GPLL_THEN_OSC,
)
// The SD/MMC controller halves its input internally.
.with_post_divider(2);

const EMMC: DividerClock = DividerClock::muxed(
    sel(22),
    BitField::new(0, 7),
    BitField::new(8, 3),
    &MMC_SOURCES,
    &GPLL_THEN_OSC,
);

static CRU_CLOCKS: [ClockDescriptor; 89] = [
    ClockDescriptor::new(cru::PLL_APLLL, "aplll", ClockKind::Pll(PllId::Lpll)),
    ClockDescriptor::new(cru::PLL_APLLB, "apllb", ClockKind::Pll(PllId::Bpll)),
    ClockDescriptor::new(cru::PLL_DPLL, "dpll", ClockKind::Pll(PllId::Dpll)),
    ClockDescriptor::new(cru::PLL_CPLL, "cpll", ClockKind::Pll(PllId::Cpll)),
    ClockDescriptor::new(cru::PLL_GPLL, "gpll", ClockKind::Pll(PllId::Gpll)),
    ClockDescriptor::new(cru::PLL_NPLL, "npll", ClockKind::Pll(PllId::Npll)),
    ClockDescriptor::new(cru::PLL_VPLL, "vpll", ClockKind::Pll(PllId::Vpll)),
    ClockDescriptor::new(cru::ARMCLKL, "armclkl", cpu_cluster(0)),
    ClockDescriptor::new(cru::ARMCLKB, "armclkb", cpu_cluster(2)),
    ClockDescriptor::new(cru::SCLK_I2C1, "clk_i2c1", peripheral(61, 0)),
    ClockDescriptor::new(cru::SCLK_I2C2, "clk_i2c2", peripheral(62, 0)),
    ClockDescriptor::new(cru::SCLK_I2C3, "clk_i2c3", peripheral(63, 0)),
    ClockDescriptor::new(cru::SCLK_I2C5, "clk_i2c5", peripheral(61, 8)),
    ClockDescriptor::new(cru::SCLK_I2C6, "clk_i2c6", peripheral(62, 8)),
    ClockDescriptor::new(cru::SCLK_I2C7, "clk_i2c7", peripheral(63, 8)),
    ClockDescriptor::new(cru::SCLK_SPI0, "clk_spi0", peripheral(59, 0)),
    ClockDescriptor::new(cru::SCLK_SPI1, "clk_spi1", peripheral(59, 8)),
    ClockDescriptor::new(cru::SCLK_SPI2, "clk_spi2", peripheral(60, 0)),
    ClockDescriptor::new(cru::SCLK_SPI4, "clk_spi4", peripheral(60, 8)),
    ClockDescriptor::new(cru::SCLK_SPI5, "clk_spi5", peripheral(58, 8)),
    ClockDescriptor::new(cru::SCLK_SDMMC, "clk_sdmmc", ClockKind::Divider(SDMMC)),
    ClockDescriptor::new(
        cru::SCLK_EMMC,
        "clk_emmc",
        ClockKind::Composite(Composite::Chained {
            upstream: cru::ACLK_EMMC,
            upstream_hz: ACLK_EMMC_HZ,
            divider: EMMC,
        }),
    ),
    ClockDescriptor::new(
        cru::SCLK_TSADC,
        "clk_tsadc",
        ClockKind::Divider(DividerClock::muxed(
            sel(27),
            BitField::new(0, 10),
            BitField::bit(15),
            &TSADC_SOURCES,
            &[],
        )),
    ),
    ClockDescriptor::new(
        cru::SCLK_SARADC,
        "clk_saradc",
        ClockKind::Divider(DividerClock::fixed(
            sel(26),
            BitField::new(8, 8),
            Parent::Osc24M,
        )),
    ),
    ClockDescriptor::new(cru::SCLK_UART0, "clk_uart0", ClockKind::Fixed(OSC_HZ)),
    ClockDescriptor::new(cru::SCLK_UART1, "clk_uart1", ClockKind::Fixed(OSC_HZ)),
    ClockDescriptor::new(cru::SCLK_UART2, "clk_uart2", ClockKind::Fixed(OSC_HZ)),
    ClockDescriptor::new(cru::SCLK_UART3, "clk_uart3", ClockKind::Fixed(OSC_HZ)),
    ClockDescriptor::new(cru::SCLK_MACREF, "clk_mac_ref", ClockKind::GateOnly).gated(gate(5), 7),
    ClockDescriptor::new(cru::SCLK_MAC_RX, "clk_rmii_rx", ClockKind::GateOnly).gated(gate(5), 8),
    ClockDescriptor::new(cru::SCLK_MAC_TX, "clk_mac_tx", ClockKind::GateOnly).gated(gate(5), 9),
    ClockDescriptor::new(
        cru::SCLK_MAC,
        "clk_gmac",
        ClockKind::Composite(Composite::MacClock {
            rmii_src: cru::SCLK_RMII_SRC,
        }),
    )
    .gated(gate(5), 5),
    ClockDescriptor::new(cru::SCLK_MACREF_OUT, "clk_mac_refout", ClockKind::GateOnly)
        .gated(gate(5), 6),
    ClockDescriptor::new(cru::SCLK_USB2PHY0_REF, "clk_usb2phy0_ref", ClockKind::GateOnly)
        .gated(gate(6), 5),
    ClockDescriptor::new(cru::SCLK_USB2PHY1_REF, "clk_usb2phy1_ref", ClockKind::GateOnly)
        .gated(gate(6), 6),
    ClockDescriptor::new(
        cru::SCLK_UPHY0_TCPDPHY_REF,
        "clk_uphy0_tcpdphy_ref",
        ClockKind::GateOnly,
    )
    .gated(gate(13), 4),
    ClockDescriptor::new(cru::SCLK_UPHY0_TCPDCORE, "clk_uphy0_tcpdcore", UNTRACKED)
        .gated(gate(13), 5),
    ClockDescriptor::new(
        cru::SCLK_UPHY1_TCPDPHY_REF,
        "clk_uphy1_tcpdphy_ref",
        ClockKind::GateOnly,
    )
    .gated(gate(13), 6),
    ClockDescriptor::new(cru::SCLK_UPHY1_TCPDCORE, "clk_uphy1_tcpdcore", UNTRACKED)
        .gated(gate(13), 7),
    ClockDescriptor::new(cru::SCLK_USB3OTG0_REF, "clk_usb3otg0_ref", ClockKind::GateOnly)
        .gated(gate(12), 1),
    ClockDescriptor::new(cru::SCLK_USB3OTG1_REF, "clk_usb3otg1_ref", ClockKind::GateOnly)
        .gated(gate(12), 2),
    ClockDescriptor::new(
        cru::SCLK_USB3OTG0_SUSPEND,
        "clk_usb3otg0_suspend",
        ClockKind::GateOnly,
    )
    .gated(gate(12), 3),
    ClockDescriptor::new(
        cru::SCLK_USB3OTG1_SUSPEND,
        "clk_usb3otg1_suspend",
        ClockKind::GateOnly,
    )
    .gated(gate(12), 4),
    ClockDescriptor::new(cru::SCLK_CRYPTO0, "clk_crypto0", crypto(24)),
    ClockDescriptor::new(cru::SCLK_CRYPTO1, "clk_crypto1", crypto(26)),
    ClockDescriptor::new(cru::SCLK_PCIEPHY_REF, "clk_pciephy_ref", ClockKind::GateOnly)
        .gated(sel(18), 10),
    ClockDescriptor::new(cru::SCLK_USBPHY0_480M_SRC, "clk_usbphy0_480m_src", USB_PHY_480M),
    ClockDescriptor::new(cru::SCLK_USBPHY1_480M_SRC, "clk_usbphy1_480m_src", USB_PHY_480M),
    ClockDescriptor::new(cru::SCLK_DDRCLK, "clk_ddrc", alias(cru::PLL_DPLL, false)),
    ClockDescriptor::new(
        cru::SCLK_RMII_SRC,
        "clk_rmii_src",
        ClockKind::Divider(DividerClock {
            offset: sel(19),
            divider: None,
            source: Source::Mux {
                field: BitField::bit(4),
                choices: &RMII_SOURCES,
            },
            preferred: &[],
            post_divider: 1,
        }),
    ),
    ClockDescriptor::new(cru::DCLK_VOP0, "dclk_vop0", pixel_clock(cru::ACLK_VOP0, cru::DCLK_VOP0_DIV, 49)),
    ClockDescriptor::new(cru::DCLK_VOP1, "dclk_vop1", pixel_clock(cru::ACLK_VOP1, cru::DCLK_VOP1_DIV, 50)),
    ClockDescriptor::new(cru::DCLK_VOP0_DIV, "dclk_vop0_div", vop_dclk_div(49)),
    ClockDescriptor::new(cru::DCLK_VOP1_DIV, "dclk_vop1_div", vop_dclk_div(50)),
    ClockDescriptor::new(cru::ACLK_PERIHP, "aclk_perihp", bus_root(14)),
    ClockDescriptor::new(cru::ACLK_PERILP0, "aclk_perilp0", bus_root(23)),
    ClockDescriptor::new(cru::ACLK_CCI, "aclk_cci", UNTRACKED),
    ClockDescriptor::new(cru::ACLK_GMAC, "aclk_gmac", ClockKind::GateOnly).gated(gate(32), 0),
    ClockDescriptor::new(cru::ACLK_VOP0, "aclk_vop0", vop_aclk(47)),
    ClockDescriptor::new(cru::ACLK_VOP1, "aclk_vop1", vop_aclk(48)),
    ClockDescriptor::new(cru::ACLK_HDCP, "aclk_hdcp", UNTRACKED),
    ClockDescriptor::new(cru::ACLK_VIO, "aclk_vio", UNTRACKED),
    ClockDescriptor::new(
        cru::ACLK_EMMC,
        "aclk_emmc",
        ClockKind::Divider(DividerClock::muxed(
            sel(21),
            BitField::new(0, 5),
            BitField::bit(7),
            &CPLL_GPLL,
            &GPLL_ONLY,
        )),
    ),
    ClockDescriptor::new(cru::ACLK_USB3, "aclk_usb3", ClockKind::GateOnly).gated(gate(12), 0),
    ClockDescriptor::new(cru::ACLK_USB3OTG0, "aclk_usb3otg0", ClockKind::GateOnly)
        .gated(gate(30), 1),
    ClockDescriptor::new(cru::ACLK_USB3OTG1, "aclk_usb3otg1", ClockKind::GateOnly)
        .gated(gate(30), 2),
    ClockDescriptor::new(
        cru::ACLK_USB3_RKSOC_AXI_PERF,
        "aclk_usb3_rksoc_axi_perf",
        ClockKind::GateOnly,
    )
    .gated(gate(30), 3),
    ClockDescriptor::new(cru::ACLK_USB3_GRF, "aclk_usb3_grf", ClockKind::GateOnly)
        .gated(gate(30), 4),
    ClockDescriptor::new(cru::ACLK_GIC_PRE, "aclk_gic_pre", UNTRACKED),
    ClockDescriptor::new(
        cru::PCLK_PERIHP,
        "pclk_perihp",
        bus_child(14, BitField::new(12, 3), cru::ACLK_PERIHP),
    ),
    ClockDescriptor::new(
        cru::PCLK_PERILP0,
        "pclk_perilp0",
        bus_child(23, BitField::new(12, 3), cru::ACLK_PERILP0),
    ),
    ClockDescriptor::new(
        cru::PCLK_PERILP1,
        "pclk_perilp1",
        bus_child(25, BitField::new(8, 3), cru::HCLK_PERILP1),
    ),
    ClockDescriptor::new(cru::PCLK_GMAC, "pclk_gmac", ClockKind::GateOnly).gated(gate(32), 2),
    ClockDescriptor::new(cru::PCLK_HDMI_CTRL, "pclk_hdmi_ctrl", UNTRACKED),
    ClockDescriptor::new(cru::PCLK_EFUSE1024NS, "pclk_efuse1024ns", UNTRACKED),
    ClockDescriptor::new(cru::PCLK_VIO_GRF, "pclk_vio_grf", UNTRACKED),
    ClockDescriptor::new(cru::PCLK_WDT, "pclk_wdt", alias(cru::PCLK_ALIVE, true)),
    ClockDescriptor::new(
        cru::PCLK_ALIVE,
        "pclk_alive",
        ClockKind::Divider(DividerClock::fixed(
            sel(57),
            BitField::new(0, 5),
            Parent::Pll(PllId::Gpll),
        )),
    ),
    ClockDescriptor::new(cru::PCLK_DDR, "pclk_ddr", UNTRACKED),
    ClockDescriptor::new(
        cru::HCLK_PERIHP,
        "hclk_perihp",
        bus_child(14, BitField::new(8, 2), cru::ACLK_PERIHP),
    ),
    ClockDescriptor::new(
        cru::HCLK_PERILP0,
        "hclk_perilp0",
        bus_child(23, BitField::new(8, 2), cru::ACLK_PERILP0),
    ),
    ClockDescriptor::new(cru::HCLK_PERILP1, "hclk_perilp1", bus_root(25)),
    ClockDescriptor::new(cru::HCLK_HOST0, "hclk_host0", ClockKind::GateOnly).gated(gate(20), 5),
    ClockDescriptor::new(cru::HCLK_HOST0_ARB, "hclk_host0_arb", ClockKind::GateOnly)
        .gated(gate(20), 6),
    ClockDescriptor::new(cru::HCLK_HOST1, "hclk_host1", ClockKind::GateOnly).gated(gate(20), 7),
    ClockDescriptor::new(cru::HCLK_HOST1_ARB, "hclk_host1_arb", ClockKind::GateOnly)
        .gated(gate(20), 8),
    ClockDescriptor::new(cru::HCLK_SD, "hclk_sd", UNTRACKED),
    ClockDescriptor::new(cru::HCLK_SDMMC, "hclk_sdmmc", alias(cru::SCLK_SDMMC, false)),
    ClockDescriptor::new(cru::HCLK_VOP1, "hclk_vop1", UNTRACKED),
];

pub static CRU_TREE: ClockTree = ClockTree {
    name: "cru",
    clocks: &CRU_CLOCKS,
};
