// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renders an hourly stacked bar chart to SVG and walks it through the interactive operations.
//!
//! Set `RUST_LOG=stackbar_charts=debug` to see width resolution and accent lookups.

mod svg;

use kurbo::{Point, Size};
use stackbar_charts::{
    CoordinateGrid, DomainValue, GridFrame, LegendItem, PointerEvent, StackedBarChart,
    StackedSeries, TimeBinning, default_series_fill, floor_to, infer_stacked_domain,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const HOUR_MS: i64 = 3_600_000;
// 2024-03-04T00:00:00Z
const START_MS: i64 = 1_709_510_400_000;
const HOURS: i64 = 14;
const LAYERS: [&str; 3] = ["web", "mobile", "api"];

#[derive(Clone, Debug)]
struct Requests {
    source: &'static str,
    count: u32,
}

/// Deterministic request counts per source and hour.
fn requests(first_hour: i64) -> StackedSeries<Requests> {
    StackedSeries::stack((0_u32..).zip(LAYERS).map(|(li, source)| {
        let rows: Vec<(DomainValue, f64, Requests)> = (first_hour..first_hour + HOURS)
            .map(|h| {
                let seed = u32::try_from((h * 7 + i64::from(li) * 13) % 23).unwrap_or(0);
                let count = 5 + seed * (3 - li);
                (
                    DomainValue::Time(START_MS + h * HOUR_MS),
                    f64::from(count),
                    Requests { source, count },
                )
            })
            .collect();
        (source.to_string(), rows)
    }))
}

fn grid_for(series: &StackedSeries<Requests>, first_hour: i64) -> GridFrame {
    let y_max = infer_stacked_domain(series).map_or(1.0, |(_, max)| max);
    let start = START_MS + first_hour * HOUR_MS;
    let end = start + (HOURS - 1) * HOUR_MS;
    #[allow(clippy::cast_precision_loss, reason = "hour sized steps are exact in f64")]
    let hour = HOUR_MS as f64;
    GridFrame::time((start, end), hour, (0.0, y_max), Size::new(640.0, 320.0))
        .with_brush(true)
        .with_rounding(move |v: f64| floor_to(v, hour))
        .with_time_binning(TimeBinning::Seconds(3600.0))
}

fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let mut chart = StackedBarChart::new()
        .with_render_label(true)
        .with_render_title(true);
    let mut svg = svg::SvgScene::default();

    let series = requests(0);
    let mut grid = grid_for(&series, 0);
    let out = chart.render_bars(&grid, series);
    svg.apply_diffs(&out.diffs);
    tracing::info!(
        bar_width = out.bar_width,
        marks = svg.len(),
        "initial render"
    );

    // Hover the fourth hour, just above the bottom of the plot.
    let hovered = DomainValue::Time(START_MS + 3 * HOUR_MS);
    let margins = grid.margins();
    let pointer = Point::new(
        margins.x0 + grid.x(&hovered) + 2.0,
        margins.y0 + grid.y_axis_height() - 5.0,
    );
    let hover = chart.handle_pointer(&grid, PointerEvent::Move(pointer));
    svg.apply_diffs(&hover.diffs);
    if let Some(tooltip) = &hover.tooltip {
        tracing::info!(header = %tooltip.header, rows = tooltip.rows.len(), align = ?tooltip.align, "tooltip");
    }

    // Brush hours 4..9 and fade the rest.
    #[allow(clippy::cast_precision_loss, reason = "ms timestamps fit in f64 mantissa")]
    let extent = (
        (START_MS + 4 * HOUR_MS) as f64 + 600_000.0,
        (START_MS + 9 * HOUR_MS) as f64 + 1_200_000.0,
    );
    grid.set_brush_extent(Some(extent));
    if let Some(rounded) = chart.extend_brush(&grid) {
        grid.set_brush_extent(Some(rounded));
    }
    svg.apply_diffs(&chart.fade_deselected_area(&grid));

    // Accent the bar under the brush start.
    match chart.accent(&grid, extent.0) {
        Ok(diff) => svg.apply_diffs(diff.as_slice()),
        Err(err) => tracing::warn!(%err, "accent failed"),
    }

    let legend = LegendItem {
        label: LAYERS[1].to_string(),
        fill: default_series_fill(1),
        hidden: false,
    };
    svg.apply_diffs(&chart.legend_highlight(&legend));
    std::fs::write(
        "stackbar_demo.svg",
        svg.to_svg_string(Size::new(grid.width(), 320.0), margins, hover.tooltip.as_ref()),
    )?;
    svg.apply_diffs(&chart.legend_reset());
    svg.apply_diffs(&chart.handle_pointer(&grid, PointerEvent::Leave).diffs);

    // Slide the window by two hours: two columns exit, two enter.
    let series = requests(2);
    let grid = grid_for(&series, 2);
    let out = chart.render_bars(&grid, series);
    let entered = out.diffs.iter().filter(|d| d.is_enter()).count();
    let exited = out.diffs.iter().filter(|d| d.is_exit()).count();
    svg.apply_diffs(&out.diffs);
    tracing::info!(entered, exited, marks = svg.len(), "slid window");

    if let Some(first) = chart.bars_in_order().first() {
        match chart.click(&grid, *first) {
            Ok(Some(point)) => println!("clicked {} ({})", point.data.source, point.data.count),
            Ok(None) => println!("continuous axis: clicks do not drill down"),
            Err(err) => println!("click failed: {err}"),
        }
    }

    std::fs::write(
        "stackbar_demo_slid.svg",
        svg.to_svg_string(Size::new(grid.width(), 320.0), grid.margins(), None),
    )?;
    println!("wrote stackbar_demo.svg and stackbar_demo_slid.svg");
    Ok(())
}
