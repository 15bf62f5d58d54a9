// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stacked bar charts and histograms on top of `stackbar_core`.
//!
//! This crate is the chart layer between stacked data and a scene renderer:
//! - **Geometry** resolves bar widths from the coordinate grid and the gap/padding settings.
//! - **Rendering** reconciles one rect mark per `(layer, x)` and optional value labels over the
//!   top layer.
//! - **Interaction** covers selection classes, pointer hover with tooltips, legend highlighting,
//!   and programmatic accenting of bars by x value.
//!
//! The coordinate grid (scales, axis extents, brush and filter state) is consumed through
//! [`CoordinateGrid`]; [`GridFrame`] is a small concrete implementation.
//!
//! Text shaping is out of scope; text marks store unshaped strings and tooltip placement uses a
//! [`TextMeasurer`] estimate.

#![no_std]

extern crate alloc;

mod accent;
mod bars;
mod chart;
mod domain;
mod error;
#[cfg(not(feature = "std"))]
mod float;
mod geometry;
mod grid;
mod hover;
mod labels;
mod legend;
mod measure;
mod scale;
mod selection;
mod time;
mod tooltip;
mod z_order;

pub use accent::{bar_ordinal, resolve_ordinal};
pub use bars::{PlacedBar, bar_id, bar_mark, label_id, place_layer};
pub use chart::{RenderOutput, StackedBarChart, default_series_fill};
pub use domain::{DataPoint, DomainValue, Layer, StackedSeries, print_single_value};
pub use error::{ChartWarning, LookupError};
pub use geometry::{
    AxisGeometry, BarGeometry, BarSpan, DEFAULT_GAP_BETWEEN_BARS, DEFAULT_OUTER_PADDING,
    MIN_BAR_WIDTH, safe_number,
};
pub use grid::{CoordinateGrid, FilterState, GridFrame, TimeBinning, XUnits};
pub use hover::{
    BarIndex, HoverCandidate, HoverConfig, HoverOutcome, HoverState, PointerEvent,
    apply_hover_opacity, plot_local,
};
pub use labels::{LABEL_PADDING, LabelStyle, label_marks};
pub use legend::LegendItem;
pub use measure::{HeuristicTextMeasurer, TextMeasurer};
pub use scale::{ScaleBand, ScaleContinuous, ScaleLinear, ScaleTime, floor_to, infer_stacked_domain};
pub use selection::{ClassChange, selection_change};
pub use time::{
    DATE_FORMAT, DATE_TIME_FORMAT, format_utc_millis, header_for_time, prefers_date_only, span_days,
};
pub use tooltip::{Tooltip, TooltipAlign, TooltipRow, header_text, tooltip_flips};
pub use z_order::*;
