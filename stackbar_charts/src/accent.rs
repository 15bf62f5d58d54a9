// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping x values to rendered bars for programmatic highlighting.

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use stackbar_core::MarkId;

use crate::error::LookupError;

/// Maps `value` proportionally onto `total` bars spanning `domain`.
///
/// The result is not clamped; values outside the domain produce ordinals outside `0..total`.
pub fn bar_ordinal(value: f64, domain: (f64, f64), total: usize) -> Result<i64, LookupError> {
    let (min, max) = domain;
    let span = max - min;
    if !span.is_finite() || span == 0.0 {
        return Err(LookupError::DegenerateDomain);
    }
    let ordinal = ((value - min) / span * total as f64).floor();
    if !ordinal.is_finite() {
        return Err(LookupError::DegenerateDomain);
    }
    #[allow(clippy::cast_possible_truncation, reason = "saturating float to int cast")]
    let ordinal = ordinal as i64;
    Ok(ordinal)
}

/// Resolves an ordinal against bars listed in document order.
pub fn resolve_ordinal(ordinal: i64, bars: &[MarkId]) -> Result<MarkId, LookupError> {
    usize::try_from(ordinal)
        .ok()
        .and_then(|i| bars.get(i).copied())
        .ok_or(LookupError::OrdinalOutOfRange {
            ordinal,
            total: bars.len(),
        })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn values_map_proportionally() {
        assert_eq!(bar_ordinal(55.0, (0.0, 100.0), 10), Ok(5));
        assert_eq!(bar_ordinal(0.0, (0.0, 100.0), 10), Ok(0));
        assert_eq!(bar_ordinal(100.0, (0.0, 100.0), 10), Ok(10));
        assert_eq!(bar_ordinal(-1.0, (0.0, 100.0), 10), Ok(-1));
    }

    #[test]
    fn degenerate_domains_are_rejected() {
        assert_eq!(
            bar_ordinal(1.0, (5.0, 5.0), 10),
            Err(LookupError::DegenerateDomain)
        );
        assert_eq!(
            bar_ordinal(f64::NAN, (0.0, 1.0), 10),
            Err(LookupError::DegenerateDomain)
        );
    }

    #[test]
    fn ordinals_resolve_without_clamping() {
        let bars: Vec<MarkId> = (0..3).map(MarkId).collect();
        assert_eq!(resolve_ordinal(2, &bars), Ok(MarkId(2)));
        assert_eq!(
            resolve_ordinal(3, &bars),
            Err(LookupError::OrdinalOutOfRange {
                ordinal: 3,
                total: 3
            })
        );
        assert!(resolve_ordinal(-1, &bars).is_err());
    }
}
