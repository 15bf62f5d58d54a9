// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal SVG dump of a chart's scene.

use std::collections::HashMap;
use std::fmt::Write as _;

use kurbo::{Insets, Size};
use peniko::Brush;
use stackbar_charts::{Tooltip, TooltipAlign};
use stackbar_core::{MarkClasses, MarkDiff, MarkId, MarkPayload, TextAnchor, TextBaseline};

/// Mirrors a chart scene by applying its diffs, the way a retained renderer would.
#[derive(Debug, Default)]
pub(crate) struct SvgScene {
    marks: HashMap<MarkId, (i32, MarkPayload)>,
}

impl SvgScene {
    pub(crate) fn apply_diffs(&mut self, diffs: &[MarkDiff]) {
        for diff in diffs {
            match diff {
                MarkDiff::Enter {
                    id, z_index, new, ..
                } => {
                    self.marks.insert(*id, (*z_index, (**new).clone()));
                }
                MarkDiff::Update {
                    id,
                    new_z_index,
                    new,
                    ..
                } => {
                    self.marks.insert(*id, (*new_z_index, (**new).clone()));
                }
                // Transitions are not animated; exiting marks are dropped immediately.
                MarkDiff::Exit { id, .. } => {
                    self.marks.remove(id);
                }
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.marks.len()
    }

    /// Renders the plot-local marks shifted by `margins`, plus an optional tooltip overlay.
    pub(crate) fn to_svg_string(
        &self,
        size: Size,
        margins: Insets,
        tooltip: Option<&Tooltip>,
    ) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
            w = size.width,
            h = size.height,
        );
        out.push_str(concat!(
            "<style>",
            ".deselected{opacity:0.3}",
            ".fadeout{opacity:0.4}",
            ".accented{stroke:#222;stroke-width:2}",
            "</style>\n"
        ));
        let _ = writeln!(
            out,
            r#"<g transform="translate({} {})">"#,
            margins.x0, margins.y0
        );

        let mut ids: Vec<(i32, u64)> = self.marks.iter().map(|(id, (z, _))| (*z, id.0)).collect();
        ids.sort_unstable();

        for (_, raw) in ids {
            let Some((_, payload)) = self.marks.get(&MarkId(raw)) else {
                continue;
            };
            match payload {
                MarkPayload::Rect(r) => {
                    let _ = write!(
                        out,
                        r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                        r.rect.x0,
                        r.rect.y0,
                        r.rect.width(),
                        r.rect.height(),
                    );
                    write_paint_attr(&mut out, "fill", &r.fill, r.fill_opacity);
                    write_class_attr(&mut out, r.classes);
                    match &r.title {
                        Some(title) => {
                            let _ = writeln!(out, "><title>{}</title></rect>", escape_xml(title));
                        }
                        None => out.push_str("/>\n"),
                    }
                }
                MarkPayload::Text(t) => {
                    let baseline = match t.baseline {
                        TextBaseline::Middle => "middle",
                        TextBaseline::Alphabetic => "alphabetic",
                        TextBaseline::Hanging => "hanging",
                    };
                    let _ = write!(
                        out,
                        r#"<text x="{}" y="{}" font-size="{}" dominant-baseline="{}" text-anchor="{}""#,
                        t.pos.x,
                        t.pos.y,
                        t.font_size,
                        baseline,
                        anchor_attr(t.anchor),
                    );
                    write_paint_attr(&mut out, "fill", &t.fill, 1.0);
                    write_class_attr(&mut out, t.classes);
                    let _ = writeln!(out, ">{}</text>", escape_xml(&t.text));
                }
            }
        }
        out.push_str("</g>\n");

        if let Some(tooltip) = tooltip {
            write_tooltip(&mut out, tooltip);
        }

        out.push_str("</svg>\n");
        out
    }
}

fn write_tooltip(out: &mut String, tooltip: &Tooltip) {
    let line = 16.0;
    let height = line * (tooltip.rows.len() as f64 + 1.0) + 8.0;
    let x = match tooltip.align {
        TooltipAlign::Left => tooltip.position.x + 12.0,
        TooltipAlign::Right => tooltip.position.x - 12.0 - tooltip.width,
    };
    let y = tooltip.position.y;
    let _ = writeln!(
        out,
        r##"<g class="tooltip"><rect x="{x}" y="{y}" width="{}" height="{height}" fill="#fff" stroke="#999"/>"##,
        tooltip.width + 8.0,
    );
    let _ = writeln!(
        out,
        r#"<text x="{}" y="{}" font-size="12" font-weight="bold">{}</text>"#,
        x + 4.0,
        y + line,
        escape_xml(&tooltip.header),
    );
    for (i, row) in tooltip.rows.iter().enumerate() {
        let row_y = y + line * (i as f64 + 2.0);
        let _ = write!(
            out,
            r#"<rect x="{}" y="{}" width="10" height="10""#,
            x + 4.0,
            row_y - 9.0,
        );
        write_paint_attr(out, "fill", &row.swatch, 1.0);
        let _ = writeln!(
            out,
            r#"/><text x="{}" y="{}" font-size="12">{}</text>"#,
            x + 20.0,
            row_y,
            escape_xml(&row.value),
        );
    }
    out.push_str("</g>\n");
}

fn anchor_attr(anchor: TextAnchor) -> &'static str {
    match anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    }
}

fn svg_paint(brush: &Brush) -> (String, f64) {
    match brush {
        Brush::Solid(color) => {
            let rgba = color.to_rgba8();
            let fill = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
            (fill, f64::from(rgba.a) / 255.0)
        }
        _ => ("none".to_string(), 1.0),
    }
}

fn write_paint_attr(out: &mut String, name: &str, brush: &Brush, opacity: f64) {
    let (value, alpha) = svg_paint(brush);
    let _ = write!(out, r#" {name}="{value}""#);
    let opacity = alpha * opacity;
    if opacity < 1.0 {
        let _ = write!(out, r#" {name}-opacity="{opacity}""#);
    }
}

fn write_class_attr(out: &mut String, classes: MarkClasses) {
    if classes.is_empty() {
        return;
    }
    let names: Vec<&str> = classes
        .iter_names()
        .map(|(name, _)| match name {
            "SELECTED" => "selected",
            "DESELECTED" => "deselected",
            "HIGHLIGHT" => "highlight",
            "FADEOUT" => "fadeout",
            "ACCENTED" => "accented",
            _ => "",
        })
        .collect();
    let _ = write!(out, r#" class="{}""#, names.join(" "));
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
