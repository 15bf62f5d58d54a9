// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The stacked bar chart: configuration, rendering, and interaction entry points.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::time::Duration;

use hashbrown::HashMap;
use kurbo::Point;
use peniko::Brush;
use peniko::color::palette::css;
use smallvec::SmallVec;
use stackbar_core::{MarkClasses, MarkDiff, MarkId, MarkPayload, Scene};

use crate::accent::{bar_ordinal, resolve_ordinal};
use crate::bars::{PlacedBar, bar_mark, place_layer};
use crate::domain::{DataPoint, StackedSeries, print_single_value};
use crate::error::{ChartWarning, LookupError};
use crate::geometry::{AxisGeometry, BarGeometry, MIN_BAR_WIDTH};
use crate::grid::CoordinateGrid;
use crate::hover::{
    BarIndex, HoverCandidate, HoverConfig, HoverOutcome, HoverState, PointerEvent,
    apply_hover_opacity, plot_local,
};
use crate::labels::{LabelStyle, label_marks};
use crate::legend::LegendItem;
use crate::measure::{HeuristicTextMeasurer, TextMeasurer};
use crate::selection::{ClassChange, selection_change};
use crate::tooltip::{Tooltip, TooltipRow, header_text};

type ColorFn<D> = Arc<dyn Fn(&DataPoint<D>, usize) -> Brush>;
type LabelFn<D> = Arc<dyn Fn(&DataPoint<D>) -> String>;
type TitleFn<D> = Arc<dyn Fn(&str, &DataPoint<D>) -> String>;
type FormatFn = Arc<dyn Fn(f64) -> String>;

const PALETTE: [peniko::Color; 8] = [
    css::CORNFLOWER_BLUE,
    css::ORANGE,
    css::MEDIUM_SEA_GREEN,
    css::CRIMSON,
    css::GOLDENROD,
    css::SLATE_BLUE,
    css::DARK_CYAN,
    css::HOT_PINK,
];

/// Returns the default categorical fill for a layer.
///
/// Colors are taken from named CSS colors and repeat after eight layers.
pub fn default_series_fill(layer: usize) -> Brush {
    Brush::Solid(PALETTE[layer % PALETTE.len()])
}

/// What one render pass produced.
#[derive(Debug)]
pub struct RenderOutput {
    /// Scene changes, exits before enters.
    pub diffs: Vec<MarkDiff>,
    /// Configuration caveats noticed during the pass.
    pub warnings: Vec<ChartWarning>,
    /// Duration renderers should animate the diffs over.
    pub transition: Duration,
    /// Bar width used for this pass.
    pub bar_width: f64,
}

#[derive(Clone, Copy, Debug)]
struct Rendered {
    layer: usize,
    index: usize,
}

/// A stacked bar chart / histogram.
///
/// The chart owns its rendered [`Scene`]; every operation that changes it returns the resulting
/// [`MarkDiff`]s for a renderer to apply. The coordinate grid is passed in by reference and only
/// read.
pub struct StackedBarChart<D> {
    geometry: BarGeometry,
    hover: HoverConfig,
    render_label: bool,
    render_title: bool,
    label_style: LabelStyle,
    label: LabelFn<D>,
    title: TitleFn<D>,
    color: ColorFn<D>,
    format_value: FormatFn,
    measurer: Arc<dyn TextMeasurer>,
    transition: Duration,
    scene: Scene,
    series: StackedSeries<D>,
    rendered: HashMap<MarkId, Rendered>,
    bars_in_order: Vec<MarkId>,
    index: BarIndex,
    num_bars: usize,
    rendered_width: f64,
    hover_state: HoverState,
}

impl<D> core::fmt::Debug for StackedBarChart<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StackedBarChart")
            .field("geometry", &self.geometry)
            .field("hover", &self.hover)
            .field("render_label", &self.render_label)
            .field("render_title", &self.render_title)
            .field("label_style", &self.label_style)
            .field("label", &"<fn>")
            .field("title", &"<fn>")
            .field("color", &"<fn>")
            .field("format_value", &"<fn>")
            .field("transition", &self.transition)
            .field("scene_len", &self.scene.len())
            .field("layers", &self.series.len())
            .field("num_bars", &self.num_bars)
            .field("rendered_width", &self.rendered_width)
            .field("hover_state", &self.hover_state)
            .finish_non_exhaustive()
    }
}

impl<D: 'static> Default for StackedBarChart<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: 'static> StackedBarChart<D> {
    /// Creates a chart with default geometry, hover tuning, and accessors.
    pub fn new() -> Self {
        Self {
            geometry: BarGeometry::new(),
            hover: HoverConfig::default(),
            render_label: false,
            render_title: false,
            label_style: LabelStyle::default(),
            label: Arc::new(|p: &DataPoint<D>| print_single_value(p.stacked())),
            title: Arc::new(|name: &str, p: &DataPoint<D>| {
                format!("{name}: {}", print_single_value(p.y))
            }),
            color: Arc::new(|_: &DataPoint<D>, layer: usize| default_series_fill(layer)),
            format_value: Arc::new(print_single_value),
            measurer: Arc::new(HeuristicTextMeasurer),
            transition: Duration::from_millis(750),
            scene: Scene::new(),
            series: StackedSeries::default(),
            rendered: HashMap::new(),
            bars_in_order: Vec::new(),
            index: BarIndex::default(),
            num_bars: 0,
            rendered_width: MIN_BAR_WIDTH,
            hover_state: HoverState::Idle,
        }
    }

    /// Replaces the bar geometry configuration.
    pub fn with_geometry(mut self, geometry: BarGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Replaces the hover tuning.
    pub fn with_hover_config(mut self, hover: HoverConfig) -> Self {
        self.hover = hover;
        self
    }

    /// Enables value labels over the top layer.
    pub fn with_render_label(mut self, render: bool) -> Self {
        self.render_label = render;
        self
    }

    /// Enables per-bar title text.
    pub fn with_render_title(mut self, render: bool) -> Self {
        self.render_title = render;
        self
    }

    /// Sets the label text accessor.
    pub fn with_label(mut self, f: impl Fn(&DataPoint<D>) -> String + 'static) -> Self {
        self.label = Arc::new(f);
        self
    }

    /// Sets the label styling.
    pub fn with_label_style(mut self, style: LabelStyle) -> Self {
        self.label_style = style;
        self
    }

    /// Sets the title accessor; it receives the layer name and the point.
    pub fn with_title(mut self, f: impl Fn(&str, &DataPoint<D>) -> String + 'static) -> Self {
        self.title = Arc::new(f);
        self
    }

    /// Sets the fill accessor; it receives the point and its layer index.
    pub fn with_color(mut self, f: impl Fn(&DataPoint<D>, usize) -> Brush + 'static) -> Self {
        self.color = Arc::new(f);
        self
    }

    /// Sets the formatter used for tooltip values and numeric headers.
    pub fn with_value_format(mut self, f: impl Fn(f64) -> String + 'static) -> Self {
        self.format_value = Arc::new(f);
        self
    }

    /// Sets the text measurer used for tooltip placement.
    pub fn with_measurer(mut self, measurer: impl TextMeasurer + 'static) -> Self {
        self.measurer = Arc::new(measurer);
        self
    }

    /// Sets the transition duration reported with render output.
    pub fn with_transition(mut self, duration: Duration) -> Self {
        self.transition = duration;
        self
    }
}

impl<D> StackedBarChart<D> {
    /// Returns the bar geometry configuration.
    pub fn geometry(&self) -> &BarGeometry {
        &self.geometry
    }

    /// Returns the bar geometry configuration for mutation.
    pub fn geometry_mut(&mut self) -> &mut BarGeometry {
        &mut self.geometry
    }

    /// Returns the gap between bars.
    pub fn gap(&self) -> Option<f64> {
        self.geometry.gap()
    }

    /// Sets the gap between bars.
    pub fn set_gap(&mut self, gap: Option<f64>) {
        self.geometry.set_gap(gap);
    }

    /// Returns `true` if bars are centered on their x value.
    pub fn center_bar(&self) -> bool {
        self.geometry.center_bar()
    }

    /// Centers bars on their x value.
    pub fn set_center_bar(&mut self, center: bool) {
        self.geometry.set_center_bar(center);
    }

    /// Returns the bar count override.
    pub fn number_of_bars(&self) -> Option<usize> {
        self.geometry.number_of_bars()
    }

    /// Overrides the number of bars used for width computation.
    pub fn set_number_of_bars(&mut self, n: Option<usize>) {
        self.geometry.set_number_of_bars(n);
    }

    /// Returns the bar padding.
    pub fn bar_padding(&self) -> f64 {
        self.geometry.bar_padding()
    }

    /// Sets the bar padding and clears the gap. Out-of-range values are clamped and reported.
    pub fn set_bar_padding(&mut self, padding: f64) -> Option<ChartWarning> {
        self.geometry.set_bar_padding(padding)
    }

    /// Returns the outer padding.
    pub fn outer_padding(&self) -> f64 {
        self.geometry.outer_padding()
    }

    /// Sets the outer padding.
    pub fn set_outer_padding(&mut self, padding: f64) {
        self.geometry.set_outer_padding(padding);
    }

    /// Returns `true` if brush rounding applies even with centered bars.
    pub fn always_use_rounding(&self) -> bool {
        self.geometry.always_use_rounding()
    }

    /// Applies brush rounding even with centered bars.
    pub fn set_always_use_rounding(&mut self, always: bool) {
        self.geometry.set_always_use_rounding(always);
    }

    /// Drops the cached bar width.
    pub fn rescale(&mut self) {
        self.geometry.invalidate();
    }

    /// Returns the cached bar width; `None` once a setter or [`Self::rescale`] dropped it.
    pub fn bar_width(&self) -> Option<f64> {
        self.geometry.bar_width()
    }

    /// Returns the width the current bars were rendered with.
    pub fn rendered_width(&self) -> f64 {
        self.rendered_width
    }

    /// Returns the rendered scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Returns the last rendered data.
    pub fn series(&self) -> &StackedSeries<D> {
        &self.series
    }

    /// Returns rendered bar ids in document order: layer by layer, each in creation order.
    pub fn bars_in_order(&self) -> &[MarkId] {
        &self.bars_in_order
    }

    /// Number of bars in the last rendered layer.
    pub fn num_bars(&self) -> usize {
        self.num_bars
    }

    /// Returns the current hover state.
    pub fn hover_state(&self) -> HoverState {
        self.hover_state
    }

    /// Renders `series` into the scene and returns the diffs.
    ///
    /// Bar width is recomputed, then every layer's bars are reconciled by `(layer, x)`, the top
    /// layer's labels follow when enabled, and selection classes are applied to the new targets.
    pub fn render_bars<G>(&mut self, grid: &G, series: StackedSeries<D>) -> RenderOutput
    where
        G: CoordinateGrid + ?Sized,
    {
        let mut warnings = Vec::new();
        if let Some(warning) = self.geometry.rounding_warning(grid.round().is_some()) {
            tracing::warn!(%warning);
            warnings.push(warning);
        }

        self.geometry.invalidate();
        let bar_width = self.geometry.resolve(&AxisGeometry::from_grid(grid));
        let baseline = grid.y_axis_height();
        let top_layer = series.layers.len().checked_sub(1);

        let mut marks = Vec::new();
        let mut placed = Vec::new();
        let mut rendered = HashMap::new();
        for (li, layer) in series.layers.iter().enumerate() {
            let bars = place_layer(grid, &self.geometry, bar_width, li, layer);
            for (bar, p) in bars.iter().zip(&layer.values) {
                let prior = self.scene.payload(bar.id).and_then(MarkPayload::as_rect);
                let title = self.render_title.then(|| (self.title)(&layer.name, p));
                marks.push(bar_mark(
                    bar,
                    (self.color)(p, li),
                    title,
                    prior,
                    selection_change(grid, &p.x),
                    baseline,
                ));
                rendered.insert(bar.id, Rendered { layer: li, index: bar.index });
            }
            placed.extend(bars);

            if self.render_label && Some(li) == top_layer {
                let labels = label_marks(
                    grid,
                    &self.geometry,
                    bar_width,
                    li,
                    layer,
                    &*self.label,
                    &self.label_style,
                );
                for (index, label) in labels.iter().enumerate() {
                    rendered.insert(label.id, Rendered { layer: li, index });
                }
                marks.extend(labels);
            }
        }

        let mark_count = marks.len();
        let diffs = self.scene.tick(marks);

        let mut order: Vec<(usize, u64, MarkId)> = placed
            .iter()
            .map(|b| (b.layer, self.scene.sequence(b.id).unwrap_or(u64::MAX), b.id))
            .collect();
        order.sort_unstable();
        self.bars_in_order = order.into_iter().map(|(_, _, id)| id).collect();
        self.index = BarIndex::build(placed.iter().map(PlacedBar::candidate));
        self.num_bars = series.top().map_or(0, |l| l.values.len());
        self.rendered_width = bar_width;
        self.rendered = rendered;
        self.series = series;

        tracing::trace!(
            layers = self.series.len(),
            marks = mark_count,
            diffs = diffs.len(),
            bar_width,
            "rendered stacked bars"
        );

        RenderOutput {
            diffs,
            warnings,
            transition: self.transition,
            bar_width,
        }
    }

    /// Re-applies selection classes to every rendered bar after the filter or brush changed.
    pub fn fade_deselected_area<G>(&mut self, grid: &G) -> Vec<MarkDiff>
    where
        G: CoordinateGrid + ?Sized,
    {
        let changes: Vec<(MarkId, ClassChange)> = self
            .bars_in_order
            .iter()
            .filter_map(|id| {
                let at = self.rendered.get(id)?;
                let p = self.series.point(at.layer, at.index)?;
                Some((*id, selection_change(grid, &p.x)))
            })
            .collect();
        self.apply_class_changes(changes)
    }

    /// Feeds a pointer event to the hover engine.
    ///
    /// Nothing happens unless the grid has brushing enabled.
    pub fn handle_pointer<G>(&mut self, grid: &G, event: PointerEvent) -> HoverOutcome
    where
        G: CoordinateGrid + ?Sized,
    {
        if !grid.brush_on() {
            return HoverOutcome::idle(Vec::new());
        }
        let outcome = match event {
            PointerEvent::Leave => {
                HoverOutcome::idle(apply_hover_opacity(&mut self.scene, &self.index, &[], 1.0))
            }
            PointerEvent::Move(_) if grid.is_brushing() => HoverOutcome::idle(Vec::new()),
            PointerEvent::Move(pointer) => self.highlight(grid, pointer),
        };
        self.hover_state = outcome.state;
        outcome
    }

    fn highlight<G>(&mut self, grid: &G, pointer: Point) -> HoverOutcome
    where
        G: CoordinateGrid + ?Sized,
    {
        let local = plot_local(pointer, grid.margins());
        let candidates = self
            .index
            .hit_test(local, self.rendered_width, self.hover.vertical_slack);
        let diffs = apply_hover_opacity(
            &mut self.scene,
            &self.index,
            &candidates,
            self.hover.hover_opacity,
        );
        tracing::trace!(x = local.x, y = local.y, hits = candidates.len(), "hover");

        let tooltip = self.tooltip(grid, pointer, &candidates);
        let state = if tooltip.is_some() {
            HoverState::Highlighted
        } else {
            HoverState::Idle
        };
        HoverOutcome {
            state,
            diffs,
            tooltip,
            candidates,
        }
    }

    fn tooltip<G>(
        &self,
        grid: &G,
        pointer: Point,
        candidates: &SmallVec<[HoverCandidate; 4]>,
    ) -> Option<Tooltip>
    where
        G: CoordinateGrid + ?Sized,
    {
        let first = candidates.first()?;
        let head = self.series.point(first.layer, first.index)?;
        let header = header_text(grid, &head.x, &*self.format_value);
        let rows = candidates
            .iter()
            .filter_map(|c| {
                let p = self.series.point(c.layer, c.index)?;
                Some(TooltipRow {
                    layer: c.layer,
                    swatch: (self.color)(p, c.layer),
                    value: (self.format_value)(p.stacked()),
                })
            })
            .collect();
        Some(Tooltip::place(
            header,
            rows,
            pointer,
            grid.width(),
            &self.hover,
            &*self.measurer,
        ))
    }

    /// Adds the accent class to the bar `value` maps to.
    pub fn accent<G>(&mut self, grid: &G, value: f64) -> Result<Option<MarkDiff>, LookupError>
    where
        G: CoordinateGrid + ?Sized,
    {
        self.change_accent(grid, value, ClassChange::insert(MarkClasses::ACCENTED))
    }

    /// Removes the accent class from the bar `value` maps to.
    pub fn un_accent<G>(&mut self, grid: &G, value: f64) -> Result<Option<MarkDiff>, LookupError>
    where
        G: CoordinateGrid + ?Sized,
    {
        self.change_accent(grid, value, ClassChange::remove(MarkClasses::ACCENTED))
    }

    fn change_accent<G>(
        &mut self,
        grid: &G,
        value: f64,
        change: ClassChange,
    ) -> Result<Option<MarkDiff>, LookupError>
    where
        G: CoordinateGrid + ?Sized,
    {
        let domain = grid.x_domain().ok_or(LookupError::DegenerateDomain)?;
        let ordinal = bar_ordinal(value, domain, self.num_bars)?;
        let id = resolve_ordinal(ordinal, &self.bars_in_order)?;
        tracing::debug!(value, ordinal, ?id, "accent");
        Ok(self.scene.restyle(id, |p| change.apply(p.classes_mut())))
    }

    /// Highlights bars painted like `item` and fades the rest.
    pub fn legend_highlight(&mut self, item: &LegendItem) -> Vec<MarkDiff> {
        let changes: Vec<(MarkId, ClassChange)> = self
            .bars_in_order
            .iter()
            .filter_map(|id| {
                let rect = self.scene.payload(*id)?.as_rect()?;
                Some((*id, item.highlight(&rect.fill)?))
            })
            .collect();
        self.apply_class_changes(changes)
    }

    /// Clears legend highlighting from every bar, whatever the legend items' visibility.
    pub fn legend_reset(&mut self) -> Vec<MarkDiff> {
        let change = ClassChange::remove(MarkClasses::HIGHLIGHT | MarkClasses::FADEOUT);
        let changes = self.bars_in_order.iter().map(|id| (*id, change)).collect();
        self.apply_class_changes(changes)
    }

    /// Resolves a click on a bar or label to its datum.
    ///
    /// Only ordinal charts drill down; continuous charts return `Ok(None)`.
    pub fn click<G>(&self, grid: &G, id: MarkId) -> Result<Option<&DataPoint<D>>, LookupError>
    where
        G: CoordinateGrid + ?Sized,
    {
        let at = self.rendered.get(&id).ok_or(LookupError::UnknownMark(id))?;
        if !grid.is_ordinal() {
            return Ok(None);
        }
        Ok(self.series.point(at.layer, at.index))
    }

    /// Returns the brush extent, rounded when the grid has a rounding function and bars are not
    /// centered (or rounding is forced).
    pub fn extend_brush<G>(&self, grid: &G) -> Option<(f64, f64)>
    where
        G: CoordinateGrid + ?Sized,
    {
        let (start, end) = grid.brush_extent()?;
        match grid.round() {
            Some(round) if self.geometry.rounds_brush() => Some((round(start), round(end))),
            _ => Some((start, end)),
        }
    }

    fn apply_class_changes(&mut self, changes: Vec<(MarkId, ClassChange)>) -> Vec<MarkDiff> {
        changes
            .into_iter()
            .filter_map(|(id, change)| self.scene.restyle(id, |p| change.apply(p.classes_mut())))
            .collect()
    }
}
