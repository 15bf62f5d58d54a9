// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value labels above the top layer's bars.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Point;
use peniko::Brush;
use stackbar_core::{Mark, MarkPayload, TextAnchor, TextBaseline, TextChannels};

use crate::bars::label_id;
use crate::domain::{DataPoint, Layer};
use crate::geometry::{BarGeometry, BarSpan, safe_number};
use crate::grid::CoordinateGrid;
use crate::z_order;

/// Gap between a bar's top edge and its label's baseline, in pixels.
pub const LABEL_PADDING: f64 = 3.0;

/// Text styling for value labels.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelStyle {
    /// Font size.
    pub font_size: f64,
    /// Text paint.
    pub fill: Brush,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            fill: TextChannels::default().fill,
        }
    }
}

/// Generates one label mark per point of `layer`, centered over its bar.
pub fn label_marks<G, D>(
    grid: &G,
    geometry: &BarGeometry,
    bar_width: f64,
    layer_index: usize,
    layer: &Layer<D>,
    text: &dyn Fn(&DataPoint<D>) -> String,
    style: &LabelStyle,
) -> Vec<Mark>
where
    G: CoordinateGrid + ?Sized,
{
    let dx = geometry.label_offset(bar_width);
    layer
        .values
        .iter()
        .map(|p| {
            let x = safe_number(grid.x(&p.x) + dx);
            let span = BarSpan::of(grid, p.y, p.y0);
            let y = safe_number(span.top - LABEL_PADDING);
            Mark::new(
                label_id(layer_index, &p.x),
                MarkPayload::Text(TextChannels {
                    pos: Point::new(x, y),
                    text: text(p),
                    font_size: style.font_size,
                    anchor: TextAnchor::Middle,
                    baseline: TextBaseline::Alphabetic,
                    fill: style.fill.clone(),
                    ..TextChannels::default()
                }),
            )
            .with_z_index(z_order::SERIES_LABELS)
        })
        .collect()
}
