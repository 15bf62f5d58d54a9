// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tiny scale utilities.
//!
//! These back [`crate::GridFrame`]: a band scale for ordinal x axes, linear and time scales for
//! continuous x axes, and a linear scale for the value axis.

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::domain::StackedSeries;

/// A continuous scale instance.
#[derive(Clone, Copy, Debug)]
pub enum ScaleContinuous {
    /// Linear scale.
    Linear(ScaleLinear),
    /// Time scale.
    Time(ScaleTime),
}

impl ScaleContinuous {
    /// Maps a value from domain space into range space.
    pub fn map(&self, x: f64) -> f64 {
        match self {
            Self::Linear(s) => s.map(x),
            Self::Time(s) => s.map(x),
        }
    }
}

/// A linear mapping from a continuous domain to a continuous range.
#[derive(Clone, Copy, Debug)]
pub struct ScaleLinear {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleLinear {
    /// Creates a new scale mapping `domain` values to `range` values.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps a value from domain space into range space.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = d1 - d0;
        if denom == 0.0 {
            return r0;
        }
        let t = (x - d0) / denom;
        r0 + t * (r1 - r0)
    }
}

/// A discrete band scale for categorical charts.
#[derive(Clone, Copy, Debug)]
pub struct ScaleBand {
    range: (f64, f64),
    count: usize,
    padding_inner: f64,
    padding_outer: f64,
}

impl ScaleBand {
    /// Creates a new band scale covering `count` bands over `range`.
    pub fn new(range: (f64, f64), count: usize) -> Self {
        Self {
            range,
            count,
            padding_inner: 0.1,
            padding_outer: 0.1,
        }
    }

    /// Sets inner and outer padding in band units.
    pub fn with_padding(mut self, inner: f64, outer: f64) -> Self {
        self.padding_inner = inner.max(0.0);
        self.padding_outer = outer.max(0.0);
        self
    }

    /// Returns the computed band width.
    pub fn band_width(&self) -> f64 {
        let (r0, r1) = self.range;
        let n = self.count as f64;
        if n <= 0.0 {
            return 0.0;
        }
        let span = (r1 - r0).abs();
        let denom = n + self.padding_inner * (n - 1.0) + 2.0 * self.padding_outer;
        if denom == 0.0 { 0.0 } else { span / denom }
    }

    /// Returns the number of bands.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the left edge of the band at `index`.
    pub fn x(&self, index: usize) -> f64 {
        let (r0, r1) = self.range;
        let bw = self.band_width();
        let step = bw * (1.0 + self.padding_inner);
        let start = if r1 >= r0 { r0 } else { r1 };
        start + bw * self.padding_outer + step * index as f64
    }
}

/// A time scale: a linear scale over UTC milliseconds.
#[derive(Clone, Copy, Debug)]
pub struct ScaleTime {
    inner: ScaleLinear,
}

impl ScaleTime {
    /// Creates a new time scale over a millisecond domain.
    pub fn new(domain_ms: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            inner: ScaleLinear::new(domain_ms, range),
        }
    }

    /// Maps a timestamp (milliseconds) into range space.
    pub fn map(&self, t: f64) -> f64 {
        self.inner.map(t)
    }
}

/// Infer a `(min, max)` domain of stacked values (`y0` and `y0 + y`) across all layers.
///
/// Non-finite values are ignored. Returns `None` if no finite values are present.
pub fn infer_stacked_domain<D>(series: &StackedSeries<D>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let values = series
        .layers
        .iter()
        .flat_map(|l| l.values.iter())
        .flat_map(|p| [p.y0, p.stacked()]);
    for v in values {
        if !v.is_finite() {
            continue;
        }
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

/// Rounds `v` down to a multiple of `step`.
pub fn floor_to(v: f64, step: f64) -> f64 {
    if step <= 0.0 || !step.is_finite() {
        return v;
    }
    (v / step).floor() * step
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::domain::{DataPoint, Layer};

    #[test]
    fn band_positions_are_monotonic_and_padded() {
        let scale = ScaleBand::new((0.0, 100.0), 4).with_padding(0.0, 0.0);
        assert_eq!(scale.band_width(), 25.0);
        assert_eq!(scale.x(0), 0.0);
        assert_eq!(scale.x(3), 75.0);
        let padded = ScaleBand::new((0.0, 100.0), 4);
        assert!(padded.band_width() < 25.0);
        assert!(padded.x(0) > 0.0);
    }

    #[test]
    fn linear_scale_handles_inverted_ranges() {
        let s = ScaleLinear::new((0.0, 10.0), (100.0, 0.0));
        assert_eq!(s.map(0.0), 100.0);
        assert_eq!(s.map(10.0), 0.0);
        assert_eq!(ScaleLinear::new((3.0, 3.0), (5.0, 0.0)).map(3.0), 5.0);
    }

    #[test]
    fn stacked_domain_covers_baselines_and_tops() {
        let series = StackedSeries::new(vec![
            Layer::new("a", vec![DataPoint::new(0.0, 4.0, 0.0, ())]),
            Layer::new("b", vec![DataPoint::new(0.0, -6.0, 4.0, ())]),
        ]);
        assert_eq!(infer_stacked_domain(&series), Some((-2.0, 4.0)));
        assert_eq!(infer_stacked_domain(&StackedSeries::<()>::default()), None);
    }

    #[test]
    fn floor_to_snaps_to_steps() {
        assert_eq!(floor_to(7.5, 2.0), 6.0);
        assert_eq!(floor_to(7.5, 0.0), 7.5);
    }
}
