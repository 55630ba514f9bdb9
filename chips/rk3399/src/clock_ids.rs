// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Clock identifiers shared with the platform description.
//!
//! The numbering is fixed by the RK3399 device-tree bindings; the controller
//! never invents identifiers of its own.

use core::fmt;

/// Opaque identifier of one clock output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockId(pub u32);

impl fmt::Display for ClockId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outputs of the main CRU.
pub mod cru {
    use super::ClockId;

    pub const PLL_APLLL: ClockId = ClockId(1);
    pub const PLL_APLLB: ClockId = ClockId(2);
    pub const PLL_DPLL: ClockId = ClockId(3);
    pub const PLL_CPLL: ClockId = ClockId(4);
    pub const PLL_GPLL: ClockId = ClockId(5);
    pub const PLL_NPLL: ClockId = ClockId(6);
    pub const PLL_VPLL: ClockId = ClockId(7);
    pub const ARMCLKL: ClockId = ClockId(8);
    pub const ARMCLKB: ClockId = ClockId(9);

    pub const SCLK_I2C1: ClockId = ClockId(65);
    pub const SCLK_I2C2: ClockId = ClockId(66);
    pub const SCLK_I2C3: ClockId = ClockId(67);
    pub const SCLK_I2C5: ClockId = ClockId(68);
    pub const SCLK_I2C6: ClockId = ClockId(69);
    pub const SCLK_I2C7: ClockId = ClockId(70);
    pub const SCLK_SPI0: ClockId = ClockId(71);
    pub const SCLK_SPI1: ClockId = ClockId(72);
    pub const SCLK_SPI2: ClockId = ClockId(73);
    pub const SCLK_SPI4: ClockId = ClockId(74);
    pub const SCLK_SPI5: ClockId = ClockId(75);
    pub const SCLK_SDMMC: ClockId = ClockId(76);
    pub const SCLK_EMMC: ClockId = ClockId(78);
    pub const SCLK_TSADC: ClockId = ClockId(79);
    pub const SCLK_SARADC: ClockId = ClockId(80);
    pub const SCLK_UART0: ClockId = ClockId(81);
    pub const SCLK_UART1: ClockId = ClockId(82);
    pub const SCLK_UART2: ClockId = ClockId(83);
    pub const SCLK_UART3: ClockId = ClockId(84);

    pub const SCLK_MACREF: ClockId = ClockId(102);
    pub const SCLK_MAC_RX: ClockId = ClockId(103);
    pub const SCLK_MAC_TX: ClockId = ClockId(104);
    pub const SCLK_MAC: ClockId = ClockId(105);
    pub const SCLK_MACREF_OUT: ClockId = ClockId(106);

    pub const SCLK_USB2PHY0_REF: ClockId = ClockId(123);
    pub const SCLK_USB2PHY1_REF: ClockId = ClockId(124);
    pub const SCLK_UPHY0_TCPDPHY_REF: ClockId = ClockId(125);
    pub const SCLK_UPHY0_TCPDCORE: ClockId = ClockId(126);
    pub const SCLK_UPHY1_TCPDPHY_REF: ClockId = ClockId(127);
    pub const SCLK_UPHY1_TCPDCORE: ClockId = ClockId(128);
    pub const SCLK_USB3OTG0_REF: ClockId = ClockId(129);
    pub const SCLK_USB3OTG1_REF: ClockId = ClockId(130);
    pub const SCLK_USB3OTG0_SUSPEND: ClockId = ClockId(131);
    pub const SCLK_USB3OTG1_SUSPEND: ClockId = ClockId(132);
    pub const SCLK_CRYPTO0: ClockId = ClockId(133);
    pub const SCLK_CRYPTO1: ClockId = ClockId(134);
    pub const SCLK_PCIEPHY_REF: ClockId = ClockId(138);
    pub const SCLK_USBPHY0_480M_SRC: ClockId = ClockId(161);
    pub const SCLK_USBPHY1_480M_SRC: ClockId = ClockId(162);
    pub const SCLK_DDRCLK: ClockId = ClockId(163);
    pub const SCLK_RMII_SRC: ClockId = ClockId(166);

    pub const DCLK_VOP0: ClockId = ClockId(180);
    pub const DCLK_VOP1: ClockId = ClockId(181);
    pub const DCLK_VOP0_DIV: ClockId = ClockId(182);
    pub const DCLK_VOP1_DIV: ClockId = ClockId(183);

    pub const ACLK_PERIHP: ClockId = ClockId(192);
    pub const ACLK_PERILP0: ClockId = ClockId(194);
    pub const ACLK_CCI: ClockId = ClockId(201);
    pub const ACLK_GMAC: ClockId = ClockId(213);
    pub const ACLK_VOP0: ClockId = ClockId(217);
    pub const ACLK_VOP1: ClockId = ClockId(219);
    pub const ACLK_HDCP: ClockId = ClockId(222);
    pub const ACLK_VIO: ClockId = ClockId(227);
    pub const ACLK_EMMC: ClockId = ClockId(240);
    pub const ACLK_USB3: ClockId = ClockId(244);
    pub const ACLK_USB3OTG0: ClockId = ClockId(246);
    pub const ACLK_USB3OTG1: ClockId = ClockId(247);
    pub const ACLK_USB3_RKSOC_AXI_PERF: ClockId = ClockId(248);
    pub const ACLK_USB3_GRF: ClockId = ClockId(249);
    pub const ACLK_GIC_PRE: ClockId = ClockId(262);

    pub const PCLK_PERIHP: ClockId = ClockId(320);
    pub const PCLK_PERILP0: ClockId = ClockId(322);
    pub const PCLK_PERILP1: ClockId = ClockId(323);
    pub const PCLK_GMAC: ClockId = ClockId(358);
    pub const PCLK_HDMI_CTRL: ClockId = ClockId(364);
    pub const PCLK_EFUSE1024NS: ClockId = ClockId(366);
    pub const PCLK_VIO_GRF: ClockId = ClockId(368);
    pub const PCLK_WDT: ClockId = ClockId(380);
    pub const PCLK_ALIVE: ClockId = ClockId(390);
    pub const PCLK_DDR: ClockId = ClockId(392);

    pub const HCLK_PERIHP: ClockId = ClockId(448);
    pub const HCLK_PERILP0: ClockId = ClockId(449);
    pub const HCLK_PERILP1: ClockId = ClockId(450);
    pub const HCLK_HOST0: ClockId = ClockId(456);
    pub const HCLK_HOST0_ARB: ClockId = ClockId(457);
    pub const HCLK_HOST1: ClockId = ClockId(458);
    pub const HCLK_HOST1_ARB: ClockId = ClockId(459);
    pub const HCLK_SD: ClockId = ClockId(461);
    pub const HCLK_SDMMC: ClockId = ClockId(462);
    pub const HCLK_VOP1: ClockId = ClockId(466);
}

/// Outputs of the PMU CRU. This numbering space is separate from [`cru`].
pub mod pmucru {
    use super::ClockId;

    pub const PLL_PPLL: ClockId = ClockId(1);
    pub const SCLK_SPI3_PMU: ClockId = ClockId(3);
    pub const SCLK_I2C0_PMU: ClockId = ClockId(9);
    pub const SCLK_I2C4_PMU: ClockId = ClockId(10);
    pub const SCLK_I2C8_PMU: ClockId = ClockId(11);
    pub const PCLK_PMU_SRC: ClockId = ClockId(19);
    pub const PCLK_RKPWM_PMU: ClockId = ClockId(30);
    pub const PCLK_WDT_M0_PMU: ClockId = ClockId(35);
}
