// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover tooltip content and placement.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Point;
use peniko::Brush;

use crate::domain::DomainValue;
use crate::grid::CoordinateGrid;
use crate::hover::HoverConfig;
use crate::measure::TextMeasurer;
use crate::time;

/// Which side of the pointer the tooltip box extends to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TooltipAlign {
    /// Box extends right of the pointer.
    #[default]
    Left,
    /// Box extends left of the pointer.
    Right,
}

/// One tooltip line: a layer's color swatch and its stacked value.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipRow {
    /// Layer the row describes.
    pub layer: usize,
    /// Swatch paint.
    pub swatch: Brush,
    /// Formatted stacked value (`y0 + y`).
    pub value: String,
}

/// A visible tooltip.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    /// Header line.
    pub header: String,
    /// Rows in layer order.
    pub rows: Vec<TooltipRow>,
    /// Anchor position (the pointer, chart coordinates).
    pub position: Point,
    /// Horizontal alignment relative to `position`.
    pub align: TooltipAlign,
    /// Estimated box width.
    pub width: f64,
}

impl Tooltip {
    /// Lays out a tooltip at `pointer`, flipping it left if it would overflow the chart.
    pub fn place(
        header: String,
        rows: Vec<TooltipRow>,
        pointer: Point,
        chart_width: f64,
        config: &HoverConfig,
        measurer: &dyn TextMeasurer,
    ) -> Self {
        let width = estimate_width(&header, &rows, config, measurer);
        let align = if tooltip_flips(pointer.x, width, config.tooltip_margin, chart_width) {
            TooltipAlign::Right
        } else {
            TooltipAlign::Left
        };
        Self {
            header,
            rows,
            position: pointer,
            align,
            width,
        }
    }
}

/// Returns `true` if a tooltip of `width` at `x` needs to flip to stay inside `chart_width`.
pub fn tooltip_flips(x: f64, width: f64, margin: f64, chart_width: f64) -> bool {
    x + (width + margin) > chart_width
}

fn estimate_width(
    header: &str,
    rows: &[TooltipRow],
    config: &HoverConfig,
    measurer: &dyn TextMeasurer,
) -> f64 {
    let (header_w, _) = measurer.measure(header, config.font_size);
    if rows.is_empty() {
        return header_w;
    }
    let values: Vec<&str> = rows.iter().map(|row| row.value.as_str()).collect();
    let rows_w = config.swatch_width + measurer.max_width(&values, config.font_size);
    header_w.max(rows_w)
}

/// Builds the header line for the hovered x value.
///
/// Timestamps are formatted as UTC dates; other values are prefixed with the axis label.
pub fn header_text<G: CoordinateGrid + ?Sized>(
    grid: &G,
    x: &DomainValue,
    format_value: &dyn Fn(f64) -> String,
) -> String {
    match x {
        DomainValue::Time(ms) => {
            let span = match (grid.x_axis_min(), grid.x_axis_max()) {
                (Some(min), Some(max)) => time::span_days(min, max),
                _ => 0.0,
            };
            time::header_for_time(*ms, grid.time_binning(), span)
        }
        DomainValue::Number(v) => format!("{} {}", grid.x_axis_label(), format_value(*v)),
        DomainValue::Category(c) => format!("{} {}", grid.x_axis_label(), c),
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::ToString;
    use alloc::vec;

    use kurbo::Size;
    use peniko::color::palette::css;

    use super::*;
    use crate::domain::print_single_value;
    use crate::grid::{GridFrame, TimeBinning};
    use crate::measure::HeuristicTextMeasurer;

    #[test]
    fn flip_boundary_is_strict() {
        assert!(!tooltip_flips(100.0, 68.0, 32.0, 200.0));
        assert!(tooltip_flips(100.0, 68.1, 32.0, 200.0));
    }

    #[test]
    fn placement_flips_near_the_right_edge() {
        let rows = vec![TooltipRow {
            layer: 0,
            swatch: Brush::Solid(css::ORANGE),
            value: "12".to_string(),
        }];
        let config = HoverConfig::default();
        // Header is 5 chars at 12px: 36px wide.
        let left = Tooltip::place(
            "Bin 3".to_string(),
            rows.clone(),
            Point::new(100.0, 10.0),
            200.0,
            &config,
            &HeuristicTextMeasurer,
        );
        assert_eq!(left.align, TooltipAlign::Left);
        assert!((left.width - 36.0).abs() < 1e-9);

        let right = Tooltip::place(
            "Bin 3".to_string(),
            rows,
            Point::new(150.0, 10.0),
            200.0,
            &config,
            &HeuristicTextMeasurer,
        );
        assert_eq!(right.align, TooltipAlign::Right);
    }

    #[test]
    fn headers_use_axis_label_or_dates() {
        let size = Size::new(300.0, 100.0);
        let grid = GridFrame::linear((0.0, 10.0), (0.0, 1.0), size).with_x_axis_label("Bin");
        assert_eq!(header_text(&grid, &3.0.into(), &print_single_value), "Bin 3");

        let day = 86_400_000;
        let grid = GridFrame::time((0, 30 * day), day as f64, (0.0, 1.0), size)
            .with_time_binning(TimeBinning::Auto);
        assert_eq!(
            header_text(&grid, &DomainValue::Time(2 * day), &print_single_value),
            "Jan 03, 1970"
        );
        let grid = GridFrame::time((0, 2 * day), 3_600_000.0, (0.0, 1.0), size);
        assert_eq!(
            header_text(&grid, &DomainValue::Time(day + 3_600_000), &print_single_value),
            "Jan 02, 1970 \u{b7} 01:00AM"
        );
    }
}
