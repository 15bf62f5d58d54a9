// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lookup errors and configuration warnings.

use stackbar_core::MarkId;

/// Failure to resolve a rendered bar.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The x domain has zero or non-finite width, or is unavailable (ordinal axes).
    #[error("x domain is degenerate")]
    DegenerateDomain,
    /// The computed ordinal falls outside the rendered bars.
    #[error("bar ordinal {ordinal} is outside 0..{total}")]
    OrdinalOutOfRange {
        /// Computed ordinal.
        ordinal: i64,
        /// Number of rendered bars.
        total: usize,
    },
    /// The mark id does not belong to this chart.
    #[error("unknown mark {0:?}")]
    UnknownMark(MarkId),
}

/// A non-fatal configuration caveat.
///
/// Warnings are returned alongside render output and logged; rendering proceeds regardless.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChartWarning {
    /// A rounding function is configured with centered bars, so brush extents are left unrounded
    /// unless `always_use_rounding` is enabled.
    RoundingWithCenteredBars,
    /// A bar padding outside `0..=1` was clamped.
    BarPaddingOutOfRange {
        /// Value that was requested.
        requested: f64,
        /// Value that was applied.
        applied: f64,
    },
}

impl core::fmt::Display for ChartWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::RoundingWithCenteredBars => f.write_str(
                "rounding with centered bars leaves brush extents unrounded; \
                 enable always_use_rounding to round anyway",
            ),
            Self::BarPaddingOutOfRange { requested, applied } => {
                write!(f, "bar padding {requested} is outside 0..=1, using {applied}")
            }
        }
    }
}
