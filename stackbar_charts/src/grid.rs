// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The coordinate grid the bar subsystem draws into.
//!
//! [`CoordinateGrid`] is the seam: scales, axis extents, brush and filter state are owned by the
//! grid and only read by the chart. [`GridFrame`] is a small concrete grid good enough for demos
//! and tests.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use hashbrown::HashSet;
use kurbo::{Insets, Size};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::domain::DomainValue;
use crate::scale::{ScaleBand, ScaleContinuous, ScaleLinear, ScaleTime};

/// Read access to the coordinate grid a bar chart is drawn into.
///
/// All pixel values are in plot-local coordinates: `(0, 0)` is the top-left corner of the plot
/// area, inside the margins.
pub trait CoordinateGrid {
    /// Returns `true` if the x axis is categorical (band scale).
    fn is_ordinal(&self) -> bool;
    /// Maps an x domain value to pixels. Ordinal axes return the left edge of the band.
    fn x(&self, value: &DomainValue) -> f64;
    /// Maps a value on the y axis to pixels.
    fn y(&self, value: f64) -> f64;
    /// Pixel length of the x axis.
    fn x_axis_length(&self) -> f64;
    /// Pixel height of the y axis; the y pixel of the plot's bottom edge.
    fn y_axis_height(&self) -> f64;
    /// Number of natural x units (bands, integers, or precision steps) across the x domain.
    fn x_unit_count(&self) -> usize;
    /// Band width in pixels on ordinal axes, `0` otherwise.
    fn band_width(&self) -> f64;
    /// Chart margins around the plot area.
    fn margins(&self) -> Insets;
    /// Full chart width in pixels, margins included.
    fn width(&self) -> f64;
    /// Continuous x domain, `None` on ordinal axes.
    fn x_domain(&self) -> Option<(f64, f64)>;
    /// Lower end of the x axis.
    fn x_axis_min(&self) -> Option<f64> {
        self.x_domain().map(|(min, _)| min)
    }
    /// Upper end of the x axis.
    fn x_axis_max(&self) -> Option<f64> {
        self.x_domain().map(|(_, max)| max)
    }
    /// Axis label used in non-temporal tooltip headers.
    fn x_axis_label(&self) -> &str;
    /// Returns `true` if brushing is enabled on this grid.
    fn brush_on(&self) -> bool;
    /// Returns `true` while a brush drag is in progress.
    fn is_brushing(&self) -> bool;
    /// Current brush extent on the x domain.
    fn brush_extent(&self) -> Option<(f64, f64)>;
    /// Returns `true` if there is no usable brush extent.
    fn brush_is_empty(&self) -> bool {
        self.brush_extent().is_none_or(|(start, end)| end <= start)
    }
    /// Returns `true` if a categorical filter is active.
    fn has_filter(&self) -> bool;
    /// Returns `true` if `value` passes the active filter.
    fn is_filtered(&self, value: &DomainValue) -> bool;
    /// Optional rounding function applied to brush extents.
    fn round(&self) -> Option<&(dyn Fn(f64) -> f64)>;
    /// Time binning of the x axis, used for tooltip date granularity.
    fn time_binning(&self) -> TimeBinning;
}

/// How the x axis buckets time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TimeBinning {
    /// Bin size chosen from the axis span.
    #[default]
    Auto,
    /// Fixed bin size in seconds.
    Seconds(f64),
}

/// Natural units of the x axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum XUnits {
    /// One unit per category. Implied by band axes.
    Ordinal,
    /// One unit per integer step.
    Integers,
    /// One unit per `resolution` step; extends the axis maximum by one resolution.
    Precision(f64),
}

impl XUnits {
    /// Returns the resolution of precision units.
    pub fn resolution(self) -> Option<f64> {
        match self {
            Self::Precision(r) => Some(r),
            Self::Ordinal | Self::Integers => None,
        }
    }

    /// Number of units spanning `start..end` on a continuous axis.
    pub fn count(self, start: f64, end: f64) -> usize {
        let d = match self {
            Self::Ordinal => return 0,
            Self::Integers => (end - start).abs(),
            Self::Precision(r) if r > 0.0 => ((end - start) / r).abs(),
            Self::Precision(_) => return 0,
        };
        if !d.is_finite() {
            return 0;
        }
        let units = if (d - d.floor()) < 1e-10 {
            d.floor()
        } else {
            d.ceil()
        };
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "finite and non-negative"
        )]
        {
            units as usize
        }
    }
}

/// The categorical filter or range selection applied on the x dimension.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FilterState {
    /// Nothing selected.
    #[default]
    Empty,
    /// Categorical selection.
    Members(HashSet<DomainValue>),
    /// Half-open range selection on a continuous axis.
    Extent(f64, f64),
}

impl FilterState {
    /// Returns `true` if `value` is selected.
    pub fn contains(&self, value: &DomainValue) -> bool {
        match self {
            Self::Empty => false,
            Self::Members(set) => set.contains(value),
            Self::Extent(start, end) => value.as_f64().is_some_and(|v| v >= *start && v < *end),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct BrushState {
    enabled: bool,
    extent: Option<(f64, f64)>,
    dragging: bool,
}

#[derive(Clone, Debug)]
enum XAxis {
    Band {
        categories: Vec<DomainValue>,
        padding_inner: f64,
        padding_outer: f64,
    },
    Linear {
        min: f64,
        max: f64,
    },
    Time {
        min_ms: f64,
        max_ms: f64,
    },
}

/// A concrete coordinate grid: one x scale (band, linear, or time), a linear y scale, margins,
/// and the brush/filter state the bar chart reads.
#[derive(Clone)]
pub struct GridFrame {
    size: Size,
    margins: Insets,
    x_axis: XAxis,
    x_units: XUnits,
    y_domain: (f64, f64),
    x_axis_label: String,
    brush: BrushState,
    filter: FilterState,
    rounding: Option<Arc<dyn Fn(f64) -> f64>>,
    time_binning: TimeBinning,
}

impl core::fmt::Debug for GridFrame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GridFrame")
            .field("size", &self.size)
            .field("margins", &self.margins)
            .field("x_axis", &self.x_axis)
            .field("x_units", &self.x_units)
            .field("y_domain", &self.y_domain)
            .field("x_axis_label", &self.x_axis_label)
            .field("brush", &self.brush)
            .field("filter", &self.filter)
            .field("rounding", &self.rounding.as_ref().map(|_| "<fn>"))
            .field("time_binning", &self.time_binning)
            .finish()
    }
}

impl GridFrame {
    fn new(x_axis: XAxis, x_units: XUnits, y_domain: (f64, f64), size: Size) -> Self {
        Self {
            size,
            margins: Insets::new(30.0, 10.0, 10.0, 30.0),
            x_axis,
            x_units,
            y_domain,
            x_axis_label: String::new(),
            brush: BrushState::default(),
            filter: FilterState::Empty,
            rounding: None,
            time_binning: TimeBinning::Auto,
        }
    }

    /// Creates a grid with a band x axis over `categories`.
    pub fn ordinal(categories: Vec<DomainValue>, y_domain: (f64, f64), size: Size) -> Self {
        Self::new(
            XAxis::Band {
                categories,
                padding_inner: 0.0,
                padding_outer: 0.0,
            },
            XUnits::Ordinal,
            y_domain,
            size,
        )
    }

    /// Creates a grid with a linear x axis counting integer units.
    pub fn linear(x_domain: (f64, f64), y_domain: (f64, f64), size: Size) -> Self {
        Self::new(
            XAxis::Linear {
                min: x_domain.0,
                max: x_domain.1,
            },
            XUnits::Integers,
            y_domain,
            size,
        )
    }

    /// Creates a grid with a UTC time x axis over milliseconds, binned by `resolution_ms`.
    #[allow(clippy::cast_precision_loss, reason = "ms timestamps fit in f64 mantissa")]
    pub fn time(x_domain_ms: (i64, i64), resolution_ms: f64, y_domain: (f64, f64), size: Size) -> Self {
        Self::new(
            XAxis::Time {
                min_ms: x_domain_ms.0 as f64,
                max_ms: x_domain_ms.1 as f64,
            },
            XUnits::Precision(resolution_ms),
            y_domain,
            size,
        )
    }

    /// Sets the margins around the plot area.
    pub fn with_margins(mut self, margins: Insets) -> Self {
        self.margins = margins;
        self
    }

    /// Sets the band padding (inner, outer) in band units. Ignored on continuous axes.
    pub fn with_band_padding(mut self, inner: f64, outer: f64) -> Self {
        if let XAxis::Band {
            padding_inner,
            padding_outer,
            ..
        } = &mut self.x_axis
        {
            *padding_inner = inner;
            *padding_outer = outer;
        }
        self
    }

    /// Sets the x units of a continuous axis. Band axes always use [`XUnits::Ordinal`].
    pub fn with_x_units(mut self, units: XUnits) -> Self {
        if !matches!(self.x_axis, XAxis::Band { .. }) {
            self.x_units = units;
        }
        self
    }

    /// Sets the x axis label.
    pub fn with_x_axis_label(mut self, label: impl Into<String>) -> Self {
        self.x_axis_label = label.into();
        self
    }

    /// Enables or disables brushing.
    pub fn with_brush(mut self, enabled: bool) -> Self {
        self.brush.enabled = enabled;
        self
    }

    /// Sets a brush extent rounding function.
    pub fn with_rounding(mut self, round: impl Fn(f64) -> f64 + 'static) -> Self {
        self.rounding = Some(Arc::new(round));
        self
    }

    /// Sets the time binning.
    pub fn with_time_binning(mut self, binning: TimeBinning) -> Self {
        self.time_binning = binning;
        self
    }

    /// Sets the categorical filter.
    pub fn with_filter(mut self, filter: FilterState) -> Self {
        self.filter = filter;
        self
    }

    /// Replaces the brush extent.
    pub fn set_brush_extent(&mut self, extent: Option<(f64, f64)>) {
        self.brush.extent = extent;
    }

    /// Marks a brush drag as started or finished.
    pub fn set_brushing(&mut self, dragging: bool) {
        self.brush.dragging = dragging;
    }

    /// Replaces the filter.
    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
    }

    /// Returns the y scale (bottom of the plot maps the domain minimum).
    pub fn y_scale(&self) -> ScaleLinear {
        ScaleLinear::new(self.y_domain, (self.y_axis_height(), 0.0))
    }

    fn band(&self) -> Option<(ScaleBand, &[DomainValue])> {
        match &self.x_axis {
            XAxis::Band {
                categories,
                padding_inner,
                padding_outer,
            } => Some((
                ScaleBand::new((0.0, self.x_axis_length()), categories.len())
                    .with_padding(*padding_inner, *padding_outer),
                categories,
            )),
            _ => None,
        }
    }

    fn x_continuous(&self) -> Option<ScaleContinuous> {
        let domain = self.x_domain()?;
        let range = (0.0, self.x_axis_length());
        match self.x_axis {
            XAxis::Band { .. } => None,
            XAxis::Linear { .. } => Some(ScaleContinuous::Linear(ScaleLinear::new(domain, range))),
            XAxis::Time { .. } => Some(ScaleContinuous::Time(ScaleTime::new(domain, range))),
        }
    }
}

impl CoordinateGrid for GridFrame {
    fn is_ordinal(&self) -> bool {
        matches!(self.x_units, XUnits::Ordinal)
    }

    fn x(&self, value: &DomainValue) -> f64 {
        if let Some((band, categories)) = self.band() {
            return categories
                .iter()
                .position(|c| c == value)
                .map_or(f64::NAN, |i| band.x(i));
        }
        match (self.x_continuous(), value.as_f64()) {
            (Some(scale), Some(v)) => scale.map(v),
            _ => f64::NAN,
        }
    }

    fn y(&self, value: f64) -> f64 {
        self.y_scale().map(value)
    }

    fn x_axis_length(&self) -> f64 {
        (self.size.width - self.margins.x0 - self.margins.x1).max(0.0)
    }

    fn y_axis_height(&self) -> f64 {
        (self.size.height - self.margins.y0 - self.margins.y1).max(0.0)
    }

    fn x_unit_count(&self) -> usize {
        if let Some((band, _)) = self.band() {
            return band.count();
        }
        self.x_domain()
            .map_or(0, |(start, end)| self.x_units.count(start, end))
    }

    fn band_width(&self) -> f64 {
        self.band().map_or(0.0, |(band, _)| band.band_width())
    }

    fn margins(&self) -> Insets {
        self.margins
    }

    fn width(&self) -> f64 {
        self.size.width
    }

    fn x_domain(&self) -> Option<(f64, f64)> {
        let (min, max) = match self.x_axis {
            XAxis::Band { .. } => return None,
            XAxis::Linear { min, max } => (min, max),
            XAxis::Time { min_ms, max_ms } => (min_ms, max_ms),
        };
        Some((min, max + self.x_units.resolution().unwrap_or(0.0)))
    }

    fn x_axis_label(&self) -> &str {
        &self.x_axis_label
    }

    fn brush_on(&self) -> bool {
        self.brush.enabled
    }

    fn is_brushing(&self) -> bool {
        self.brush.dragging
    }

    fn brush_extent(&self) -> Option<(f64, f64)> {
        self.brush.extent
    }

    fn has_filter(&self) -> bool {
        !matches!(self.filter, FilterState::Empty)
    }

    fn is_filtered(&self, value: &DomainValue) -> bool {
        self.filter.contains(value)
    }

    fn round(&self) -> Option<&(dyn Fn(f64) -> f64)> {
        self.rounding.as_deref()
    }

    fn time_binning(&self) -> TimeBinning {
        self.time_binning
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn size() -> Size {
        Size::new(240.0, 140.0)
    }

    #[test]
    fn precision_units_extend_the_axis_max() {
        let grid = GridFrame::linear((0.0, 10.0), (0.0, 1.0), size())
            .with_x_units(XUnits::Precision(0.5));
        assert_eq!(grid.x_axis_max(), Some(10.5));
        assert_eq!(grid.x_unit_count(), 21);

        let ints = GridFrame::linear((0.0, 10.0), (0.0, 1.0), size());
        assert_eq!(ints.x_axis_max(), Some(10.0));
        assert_eq!(ints.x_unit_count(), 10);
    }

    #[test]
    fn band_axes_are_ordinal_and_map_categories() {
        let grid = GridFrame::ordinal(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            (0.0, 1.0),
            size(),
        )
        .with_margins(Insets::new(20.0, 0.0, 20.0, 0.0));
        assert!(grid.is_ordinal());
        assert_eq!(grid.x_domain(), None);
        assert_eq!(grid.band_width(), 50.0);
        assert_eq!(grid.x(&"c".into()), 100.0);
        assert!(grid.x(&"zz".into()).is_nan());
        assert_eq!(grid.x_unit_count(), 4);
    }

    #[test]
    fn y_scale_is_inverted_over_plot_height() {
        let grid = GridFrame::linear((0.0, 10.0), (0.0, 100.0), size())
            .with_margins(Insets::new(0.0, 20.0, 0.0, 20.0));
        assert_eq!(grid.y_axis_height(), 100.0);
        assert_eq!(grid.y(0.0), 100.0);
        assert_eq!(grid.y(100.0), 0.0);
    }

    #[test]
    fn brush_emptiness_follows_extent_order() {
        let mut grid = GridFrame::linear((0.0, 10.0), (0.0, 1.0), size()).with_brush(true);
        assert!(grid.brush_is_empty());
        grid.set_brush_extent(Some((4.0, 4.0)));
        assert!(grid.brush_is_empty());
        grid.set_brush_extent(Some((4.0, 6.0)));
        assert!(!grid.brush_is_empty());
    }

    #[test]
    fn filters_test_membership() {
        let mut set = HashSet::new();
        set.insert(DomainValue::from("b"));
        let members = FilterState::Members(set);
        assert!(members.contains(&"b".into()));
        assert!(!members.contains(&"a".into()));

        let range = FilterState::Extent(5.0, 10.0);
        assert!(range.contains(&5.0.into()));
        assert!(!range.contains(&10.0.into()));
    }
}
