// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Errors reported by the clock controller.

use crate::clock_ids::ClockId;
use crate::pll::PllId;
use crate::Hz;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// The identifier is not part of this controller's clock tree.
    #[error("unknown clock {0}")]
    UnknownClock(ClockId),

    /// No table entry or integer solution produces the requested rate.
    #[error("no configuration produces {0} Hz")]
    UnsupportedRate(Hz),

    /// The computed divider does not fit its register field. The field was
    /// clamped to its maximum.
    #[error("divider {divider} does not fit a {width}-bit field")]
    DividerOverflow { divider: u32, width: u8 },

    #[error("{0:?} did not report lock")]
    PllLockTimeout(PllId),

    /// The requested source cannot be selected for this clock.
    #[error("parent not selectable")]
    UnsupportedParent,

    /// The clock is known but has no register for this operation.
    #[error("operation not supported by clock {0}")]
    NotSupported(ClockId),

    /// The external parent's output name could not be looked up.
    #[error("parent output name unavailable")]
    MetadataUnavailable,
}
