// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer-driven bar highlighting.
//!
//! Each layer keeps its rendered bars sorted by x. A pointer move picks, per layer, the last bar
//! starting at or left of the pointer and accepts it when the pointer is horizontally within one
//! bar width of it and not too far above its top edge.

extern crate alloc;

use alloc::vec::Vec;

use kurbo::{Insets, Point};
use smallvec::SmallVec;
use stackbar_core::{MarkDiff, MarkId, MarkPayload, Scene};

use crate::tooltip::Tooltip;

/// Hover tuning knobs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverConfig {
    /// How far above a bar's top edge (pixels) the pointer still hits it.
    pub vertical_slack: f64,
    /// Fill opacity of hovered bars.
    pub hover_opacity: f64,
    /// Extra room (pixels) a tooltip needs to the right of the pointer before it flips left.
    pub tooltip_margin: f64,
    /// Font size used to estimate tooltip width.
    pub font_size: f64,
    /// Width of a tooltip row's color swatch, including its spacing.
    pub swatch_width: f64,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            vertical_slack: 32.0,
            hover_opacity: 0.8,
            tooltip_margin: 32.0,
            font_size: 12.0,
            swatch_width: 16.0,
        }
    }
}

impl HoverConfig {
    /// Sets the vertical slack above bar tops.
    pub fn with_vertical_slack(mut self, slack: f64) -> Self {
        self.vertical_slack = slack;
        self
    }

    /// Sets the fill opacity of hovered bars.
    pub fn with_hover_opacity(mut self, opacity: f64) -> Self {
        self.hover_opacity = opacity;
        self
    }

    /// Sets the tooltip flip margin.
    pub fn with_tooltip_margin(mut self, margin: f64) -> Self {
        self.tooltip_margin = margin;
        self
    }

    /// Sets the tooltip font size.
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }
}

/// A pointer event over the chart, in chart coordinates (margins included).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// The pointer moved.
    Move(Point),
    /// The pointer left the chart.
    Leave,
}

/// Hover state of a chart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HoverState {
    /// Nothing highlighted, tooltip hidden.
    #[default]
    Idle,
    /// At least one bar highlighted, tooltip shown.
    Highlighted,
}

/// A bar accepted by a hover hit test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverCandidate {
    /// Rendered mark.
    pub id: MarkId,
    /// Layer index.
    pub layer: usize,
    /// Index of the point within its layer.
    pub index: usize,
    /// Rendered left edge.
    pub x: f64,
    /// Rendered top edge.
    pub top: f64,
}

/// Result of feeding a pointer event to a chart.
#[derive(Debug, Default)]
pub struct HoverOutcome {
    /// State after the event.
    pub state: HoverState,
    /// Opacity updates to apply.
    pub diffs: Vec<MarkDiff>,
    /// Tooltip to show; `None` hides it.
    pub tooltip: Option<Tooltip>,
    /// Hovered bars in layer order.
    pub candidates: SmallVec<[HoverCandidate; 4]>,
}

impl HoverOutcome {
    /// An idle outcome carrying `diffs`.
    pub fn idle(diffs: Vec<MarkDiff>) -> Self {
        Self {
            diffs,
            ..Self::default()
        }
    }
}

/// Per-layer rendered bars sorted by x.
#[derive(Clone, Debug, Default)]
pub struct BarIndex {
    layers: Vec<Vec<HoverCandidate>>,
}

impl BarIndex {
    /// Builds the index from rendered bars in any order.
    ///
    /// Bars with equal x keep their input order.
    pub fn build(bars: impl IntoIterator<Item = HoverCandidate>) -> Self {
        let mut layers: Vec<Vec<HoverCandidate>> = Vec::new();
        for bar in bars {
            if layers.len() <= bar.layer {
                layers.resize_with(bar.layer + 1, Vec::new);
            }
            layers[bar.layer].push(bar);
        }
        for layer in &mut layers {
            layer.sort_by(|a, b| a.x.total_cmp(&b.x));
        }
        Self { layers }
    }

    /// Iterates over every indexed bar, layer by layer.
    pub fn bars(&self) -> impl Iterator<Item = &HoverCandidate> {
        self.layers.iter().flatten()
    }

    /// Returns the last bar of `layer` whose x is at or left of `x`.
    pub fn predecessor(&self, layer: usize, x: f64) -> Option<&HoverCandidate> {
        let bars = self.layers.get(layer)?;
        let i = bars.partition_point(|b| b.x <= x).checked_sub(1)?;
        bars.get(i)
    }

    /// Finds the hovered bar of each layer for a plot-local pointer position.
    ///
    /// Candidates are returned in layer order.
    pub fn hit_test(
        &self,
        local: Point,
        bar_width: f64,
        vertical_slack: f64,
    ) -> SmallVec<[HoverCandidate; 4]> {
        (0..self.layers.len())
            .filter_map(|layer| self.predecessor(layer, local.x))
            .filter(|bar| (bar.x - local.x).abs() < bar_width && local.y > bar.top - vertical_slack)
            .copied()
            .collect()
    }
}

/// Converts a chart-space pointer position to plot-local coordinates.
pub fn plot_local(pointer: Point, margins: Insets) -> Point {
    Point::new(pointer.x - margins.x0, pointer.y - margins.y0)
}

/// Sets every indexed bar's fill opacity: `hover_opacity` for `hovered`, `1` otherwise.
///
/// Returns one `Update` diff per bar whose opacity actually changed.
pub fn apply_hover_opacity(
    scene: &mut Scene,
    index: &BarIndex,
    hovered: &[HoverCandidate],
    hover_opacity: f64,
) -> Vec<MarkDiff> {
    index
        .bars()
        .filter_map(|bar| {
            let opacity = if hovered.iter().any(|h| h.id == bar.id) {
                hover_opacity
            } else {
                1.0
            };
            scene.restyle(bar.id, |payload| {
                if let MarkPayload::Rect(rect) = payload {
                    rect.fill_opacity = opacity;
                }
            })
        })
        .collect()
}
