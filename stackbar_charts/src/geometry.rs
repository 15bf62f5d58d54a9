// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bar width resolution and per-bar vertical geometry.

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::error::ChartWarning;
use crate::grid::CoordinateGrid;

/// Narrowest bar the chart will draw, in pixels.
pub const MIN_BAR_WIDTH: f64 = 1.0;
/// Default gap between adjacent bars, in pixels.
pub const DEFAULT_GAP_BETWEEN_BARS: f64 = 4.0;
/// Default outer padding of the band scale, in band units.
pub const DEFAULT_OUTER_PADDING: f64 = 0.5;

/// Returns `v` if it is finite, `0` otherwise.
pub fn safe_number(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// The x axis facts bar width depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisGeometry {
    /// Categorical axis.
    pub ordinal: bool,
    /// Band width in pixels (ordinal axes).
    pub band_width: f64,
    /// Axis length in pixels.
    pub axis_length: f64,
    /// Natural unit count of the axis.
    pub unit_count: usize,
}

impl AxisGeometry {
    /// Reads the axis facts from a grid.
    pub fn from_grid<G: CoordinateGrid + ?Sized>(grid: &G) -> Self {
        Self {
            ordinal: grid.is_ordinal(),
            band_width: grid.band_width(),
            axis_length: grid.x_axis_length(),
            unit_count: grid.x_unit_count(),
        }
    }
}

/// Vertical extent of one stacked bar in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarSpan {
    /// Top edge.
    pub top: f64,
    /// Height, never negative.
    pub height: f64,
}

impl BarSpan {
    /// Computes the span of a segment with value `y` stacked on `y0`.
    ///
    /// Negative segments hang below their baseline.
    pub fn of<G: CoordinateGrid + ?Sized>(grid: &G, y: f64, y0: f64) -> Self {
        let end = grid.y(y + y0);
        let height = safe_number((end - grid.y(y0)).abs());
        let mut top = end;
        if y < 0.0 {
            top -= height;
        }
        Self {
            top: safe_number(top),
            height,
        }
    }
}

/// Bar sizing configuration plus the resolved width cache.
///
/// Every setter that affects width drops the cache; [`BarGeometry::resolve`] recomputes it.
#[derive(Clone, Debug, PartialEq)]
pub struct BarGeometry {
    gap: Option<f64>,
    center_bar: bool,
    number_of_bars: Option<usize>,
    bar_padding: f64,
    outer_padding: f64,
    always_use_rounding: bool,
    bar_width: Option<f64>,
}

impl Default for BarGeometry {
    fn default() -> Self {
        Self {
            gap: Some(DEFAULT_GAP_BETWEEN_BARS),
            center_bar: false,
            number_of_bars: None,
            bar_padding: 0.0,
            outer_padding: DEFAULT_OUTER_PADDING,
            always_use_rounding: false,
            bar_width: None,
        }
    }
}

impl BarGeometry {
    /// Creates the default geometry: 4px gaps, left-aligned bars.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the gap between bars.
    pub fn with_gap(mut self, gap: Option<f64>) -> Self {
        self.set_gap(gap);
        self
    }

    /// Centers bars on their x value.
    pub fn with_center_bar(mut self, center: bool) -> Self {
        self.set_center_bar(center);
        self
    }

    /// Overrides the number of bars used for width computation.
    pub fn with_number_of_bars(mut self, n: Option<usize>) -> Self {
        self.set_number_of_bars(n);
        self
    }

    /// Returns the gap between bars.
    pub fn gap(&self) -> Option<f64> {
        self.gap
    }

    /// Sets the gap between bars. `None` defers to the band scale (ordinal) or bar padding.
    pub fn set_gap(&mut self, gap: Option<f64>) {
        self.gap = gap;
        self.invalidate();
    }

    /// Returns `true` if bars are centered on their x value.
    pub fn center_bar(&self) -> bool {
        self.center_bar
    }

    /// Centers bars on their x value.
    pub fn set_center_bar(&mut self, center: bool) {
        self.center_bar = center;
        self.invalidate();
    }

    /// Returns the bar count override.
    pub fn number_of_bars(&self) -> Option<usize> {
        self.number_of_bars
    }

    /// Overrides the number of bars used for width computation.
    pub fn set_number_of_bars(&mut self, n: Option<usize>) {
        self.number_of_bars = n;
        self.invalidate();
    }

    /// Returns the bar padding in band units.
    pub fn bar_padding(&self) -> f64 {
        self.bar_padding
    }

    /// Sets the bar padding in band units and clears the gap.
    ///
    /// Values outside `0..=1` are clamped and reported.
    pub fn set_bar_padding(&mut self, padding: f64) -> Option<ChartWarning> {
        let applied = if padding.is_nan() {
            0.0
        } else {
            padding.clamp(0.0, 1.0)
        };
        self.bar_padding = applied;
        self.gap = None;
        self.invalidate();
        // NaN never equals itself, so it is reported too.
        (applied != padding).then(|| {
            let warning = ChartWarning::BarPaddingOutOfRange {
                requested: padding,
                applied,
            };
            tracing::warn!(%warning);
            warning
        })
    }

    /// Returns the outer padding in band units.
    pub fn outer_padding(&self) -> f64 {
        self.outer_padding
    }

    /// Sets the outer padding in band units. Only used while the gap is unset.
    pub fn set_outer_padding(&mut self, padding: f64) {
        self.outer_padding = padding;
        self.invalidate();
    }

    /// Returns `true` if brush rounding applies even with centered bars.
    pub fn always_use_rounding(&self) -> bool {
        self.always_use_rounding
    }

    /// Applies brush rounding even with centered bars.
    pub fn set_always_use_rounding(&mut self, always: bool) {
        self.always_use_rounding = always;
    }

    /// Returns `true` if the band scale should carry the outer padding.
    pub fn uses_outer_padding(&self) -> bool {
        self.gap.is_none()
    }

    /// Band scale padding `(inner, outer)` to configure on an ordinal grid, while the gap is unset.
    pub fn band_padding(&self) -> Option<(f64, f64)> {
        self.uses_outer_padding()
            .then_some((self.bar_padding, self.outer_padding))
    }

    /// Drops the cached width.
    pub fn invalidate(&mut self) {
        self.bar_width = None;
    }

    /// Returns the cached width, if resolved.
    pub fn bar_width(&self) -> Option<f64> {
        self.bar_width
    }

    /// Returns the cached width or computes and caches it.
    pub fn resolve(&mut self, axis: &AxisGeometry) -> f64 {
        if let Some(w) = self.bar_width {
            return w;
        }
        let w = self.compute_bar_width(axis);
        tracing::debug!(width = w, ?axis, gap = ?self.gap, "resolved bar width");
        self.bar_width = Some(w);
        w
    }

    /// Computes the bar width without touching the cache.
    ///
    /// The result is finite and at least [`MIN_BAR_WIDTH`].
    pub fn compute_bar_width(&self, axis: &AxisGeometry) -> f64 {
        let n = self.number_of_bars.unwrap_or(axis.unit_count) as f64;
        let raw = match self.gap {
            None if axis.ordinal => axis.band_width.floor(),
            Some(gap) if gap != 0.0 => ((axis.axis_length - (n - 1.0) * gap) / n).floor(),
            _ => (axis.axis_length / (1.0 + self.bar_padding) / n).floor(),
        };
        if raw.is_finite() && raw >= MIN_BAR_WIDTH {
            raw
        } else {
            MIN_BAR_WIDTH
        }
    }

    /// Horizontal offset from the grid's x position to a bar's left edge.
    pub fn bar_offset(&self, width: f64, ordinal: bool) -> f64 {
        let mut offset = 0.0;
        if self.center_bar {
            offset -= width / 2.0;
        }
        if let (true, Some(gap)) = (ordinal, self.gap) {
            offset += gap / 2.0;
        }
        offset
    }

    /// Horizontal offset from the grid's x position to a label's anchor.
    pub fn label_offset(&self, width: f64) -> f64 {
        if self.center_bar { 0.0 } else { width / 2.0 }
    }

    /// Returns `true` if brush extents should be rounded when a rounding function is set.
    pub fn rounds_brush(&self) -> bool {
        !self.center_bar || self.always_use_rounding
    }

    /// Reports a rounding function that will be ignored because bars are centered.
    pub fn rounding_warning(&self, has_rounding: bool) -> Option<ChartWarning> {
        (has_rounding && !self.rounds_brush()).then_some(ChartWarning::RoundingWithCenteredBars)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn continuous(axis_length: f64, unit_count: usize) -> AxisGeometry {
        AxisGeometry {
            ordinal: false,
            band_width: 0.0,
            axis_length,
            unit_count,
        }
    }

    #[test]
    fn explicit_gap_divides_the_axis() {
        let g = BarGeometry::new();
        // (100 - 4 * 4) / 5 = 16.8
        assert_eq!(g.compute_bar_width(&continuous(100.0, 5)), 16.0);
        let g = BarGeometry::new().with_number_of_bars(Some(2));
        assert_eq!(g.compute_bar_width(&continuous(100.0, 5)), 48.0);
    }

    #[test]
    fn ordinal_band_width_is_used_only_without_gap() {
        let axis = AxisGeometry {
            ordinal: true,
            band_width: 23.7,
            axis_length: 100.0,
            unit_count: 4,
        };
        assert_eq!(BarGeometry::new().with_gap(None).compute_bar_width(&axis), 23.0);
        assert_eq!(BarGeometry::new().compute_bar_width(&axis), 22.0);
    }

    #[test]
    fn zero_gap_falls_back_to_bar_padding() {
        let mut g = BarGeometry::new().with_gap(Some(0.0));
        assert_eq!(g.compute_bar_width(&continuous(100.0, 4)), 25.0);
        assert_eq!(g.set_bar_padding(0.25), None);
        assert_eq!(g.gap(), None);
        assert_eq!(g.compute_bar_width(&continuous(100.0, 4)), 20.0);
    }

    #[test]
    fn widths_are_clamped_to_the_minimum() {
        let g = BarGeometry::new();
        assert_eq!(g.compute_bar_width(&continuous(10.0, 50)), MIN_BAR_WIDTH);
        assert_eq!(g.compute_bar_width(&continuous(100.0, 0)), MIN_BAR_WIDTH);
        assert_eq!(g.compute_bar_width(&continuous(f64::NAN, 3)), MIN_BAR_WIDTH);
    }

    #[test]
    fn cache_is_dropped_by_setters() {
        let mut g = BarGeometry::new();
        assert_eq!(g.resolve(&continuous(100.0, 5)), 16.0);
        // Cached: a different axis does not change the answer until invalidated.
        assert_eq!(g.resolve(&continuous(200.0, 5)), 16.0);
        g.set_gap(Some(0.0));
        assert_eq!(g.bar_width(), None);
        assert_eq!(g.resolve(&continuous(200.0, 5)), 40.0);
    }

    #[test]
    fn bar_padding_is_clamped_with_a_warning() {
        let mut g = BarGeometry::new();
        assert_eq!(
            g.set_bar_padding(1.5),
            Some(ChartWarning::BarPaddingOutOfRange {
                requested: 1.5,
                applied: 1.0
            })
        );
        assert_eq!(g.bar_padding(), 1.0);
        assert_eq!(g.band_padding(), Some((1.0, DEFAULT_OUTER_PADDING)));
    }

    #[test]
    fn offsets_center_and_split_the_gap() {
        let g = BarGeometry::new();
        assert_eq!(g.bar_offset(10.0, true), 2.0);
        assert_eq!(g.bar_offset(10.0, false), 0.0);
        assert_eq!(g.label_offset(10.0), 5.0);
        let g = g.with_center_bar(true);
        assert_eq!(g.bar_offset(10.0, false), -5.0);
        assert_eq!(g.label_offset(10.0), 0.0);
    }

    #[test]
    fn rounding_is_skipped_for_centered_bars() {
        let mut g = BarGeometry::new().with_center_bar(true);
        assert_eq!(
            g.rounding_warning(true),
            Some(ChartWarning::RoundingWithCenteredBars)
        );
        assert_eq!(g.rounding_warning(false), None);
        g.set_always_use_rounding(true);
        assert!(g.rounds_brush());
        assert_eq!(g.rounding_warning(true), None);
    }

    #[test]
    fn safe_number_zeroes_non_finite_values() {
        assert_eq!(safe_number(f64::NAN), 0.0);
        assert_eq!(safe_number(f64::INFINITY), 0.0);
        assert_eq!(safe_number(-3.5), -3.5);
    }
}
