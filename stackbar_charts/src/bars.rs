// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stacked bar mark generation.
//!
//! One rect mark per `(layer, x)`. Bars enter from a zero-height sliver on the plot's bottom
//! edge and exit by collapsing their height.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Rect;
use peniko::Brush;
use stackbar_core::{ExitTransition, Mark, MarkClasses, MarkId, MarkPayload, RectChannels};

use crate::domain::{DomainValue, Layer};
use crate::geometry::{BarGeometry, BarSpan, safe_number};
use crate::grid::CoordinateGrid;
use crate::hover::HoverCandidate;
use crate::selection::ClassChange;
use crate::z_order;

fn namespace(layer: usize, family: u32) -> u32 {
    u32::try_from(layer)
        .unwrap_or(u32::MAX / 2)
        .saturating_mul(2)
        .saturating_add(family)
}

/// Stable id of the bar for `x` in `layer`.
pub fn bar_id(layer: usize, x: &DomainValue) -> MarkId {
    MarkId::for_row(namespace(layer, 0), x.row_key())
}

/// Stable id of the value label for `x` in `layer`.
pub fn label_id(layer: usize, x: &DomainValue) -> MarkId {
    MarkId::for_row(namespace(layer, 1), x.row_key())
}

/// Where one bar lands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedBar {
    /// Mark id.
    pub id: MarkId,
    /// Layer index.
    pub layer: usize,
    /// Index of the point within its layer.
    pub index: usize,
    /// Bar rectangle in plot-local pixels.
    pub rect: Rect,
}

impl PlacedBar {
    /// Returns the hover index entry for this bar.
    pub fn candidate(&self) -> HoverCandidate {
        HoverCandidate {
            id: self.id,
            layer: self.layer,
            index: self.index,
            x: self.rect.x0,
            top: self.rect.y0,
        }
    }
}

/// Positions every point of one layer.
pub fn place_layer<G, D>(
    grid: &G,
    geometry: &BarGeometry,
    bar_width: f64,
    layer_index: usize,
    layer: &Layer<D>,
) -> Vec<PlacedBar>
where
    G: CoordinateGrid + ?Sized,
{
    let offset = geometry.bar_offset(bar_width, grid.is_ordinal());
    layer
        .values
        .iter()
        .enumerate()
        .map(|(index, p)| {
            let x = safe_number(grid.x(&p.x) + offset);
            let span = BarSpan::of(grid, p.y, p.y0);
            PlacedBar {
                id: bar_id(layer_index, &p.x),
                layer: layer_index,
                index,
                rect: Rect::new(x, span.top, x + bar_width, span.top + span.height),
            }
        })
        .collect()
}

/// Builds the mark for a placed bar.
///
/// Opacity and classes already on the rendered mark (`prior`) carry over; `selection` is applied
/// on top of them.
pub fn bar_mark(
    bar: &PlacedBar,
    fill: Brush,
    title: Option<String>,
    prior: Option<&RectChannels>,
    selection: ClassChange,
    baseline: f64,
) -> Mark {
    let (fill_opacity, mut classes) =
        prior.map_or((1.0, MarkClasses::empty()), |p| (p.fill_opacity, p.classes));
    selection.apply(&mut classes);

    let target = RectChannels {
        rect: bar.rect,
        fill,
        fill_opacity,
        classes,
        title,
    };
    let from = RectChannels {
        rect: Rect::new(bar.rect.x0, baseline, bar.rect.x1, baseline),
        ..target.clone()
    };
    let z = i32::try_from(bar.layer)
        .unwrap_or(i32::MAX)
        .saturating_add(z_order::SERIES_FILL);

    Mark::new(bar.id, MarkPayload::Rect(target))
        .with_z_index(z)
        .with_enter(MarkPayload::Rect(from))
        .with_exit(ExitTransition::CollapseHeight)
}
