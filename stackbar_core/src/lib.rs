// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `stackbar_core`: the scene model underneath the stacked bar renderer.
//!
//! This crate provides:
//! - stable mark identity ([`MarkId`])
//! - evaluated per-kind payloads ([`MarkPayload`]) with style classes ([`MarkClasses`])
//! - keyed structural reconciliation with `Enter/Update/Exit` diffs ([`Scene::tick`])
//! - in-place restyling of already rendered marks ([`Scene::restyle`])
//!
//! Chart code builds one [`Mark`] per visual item with its target payload, hands the full set to
//! [`Scene::tick`], and forwards the resulting [`MarkDiff`] stream to a renderer. Transitions are
//! described (enter/exit payloads) but never executed here.

#![no_std]

extern crate alloc;

use alloc::{boxed::Box, string::String, vec::Vec};

use bitflags::bitflags;
use hashbrown::HashMap;
use kurbo::{Point, Rect};
use peniko::{Brush, Color};

/// Stable identifier for a [`Mark`].
///
/// `MarkId`s must remain stable across frames for the same conceptual visual item; this is what
/// enables `Enter/Update/Exit` diffs and smooth transitions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkId(pub u64);

impl MarkId {
    /// Create a stable mark id for a row key within a namespace.
    ///
    /// Namespaces separate independent mark families (for example bars and labels of one layer)
    /// that share the same row keys.
    pub fn for_row(namespace: u32, row_key: u64) -> Self {
        // 64-bit mix based on golden ratio and some rotation; deterministic across runs.
        let ns = u64::from(namespace).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let mixed = ns ^ row_key.rotate_left(17) ^ row_key.wrapping_mul(0xD6E8_FEB8_6659_FD93);
        Self(mixed)
    }
}

/// The geometric kind of a mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkKind {
    /// An axis-aligned rectangle using [`RectChannels`].
    Rect,
    /// A text item using [`TextChannels`].
    Text,
}

bitflags! {
    /// Style classes toggled on marks by interaction and selection passes.
    ///
    /// Renderers map these onto their own styling (CSS classes, tints, outlines).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MarkClasses: u8 {
        /// Member of the active categorical filter.
        const SELECTED = 1 << 0;
        /// Outside the active filter or brush extent.
        const DESELECTED = 1 << 1;
        /// Matches the hovered legend item.
        const HIGHLIGHT = 1 << 2;
        /// Does not match the hovered legend item.
        const FADEOUT = 1 << 3;
        /// Programmatically emphasized.
        const ACCENTED = 1 << 4;
    }
}

/// Evaluated channels for [`MarkKind::Rect`].
#[derive(Clone, Debug, PartialEq)]
pub struct RectChannels {
    /// Rectangle geometry in scene coordinates.
    pub rect: Rect,
    /// Fill paint.
    pub fill: Brush,
    /// Fill opacity multiplier in `[0, 1]`.
    pub fill_opacity: f64,
    /// Style classes.
    pub classes: MarkClasses,
    /// Optional tooltip-on-element text.
    pub title: Option<String>,
}

/// Evaluated channels for [`MarkKind::Text`].
#[derive(Clone, Debug, PartialEq)]
pub struct TextChannels {
    /// Anchor position in scene coordinates.
    pub pos: Point,
    /// Text content (unshaped).
    pub text: String,
    /// Font size in scene coordinates.
    pub font_size: f64,
    /// Horizontal text anchoring relative to [`TextChannels::pos`].
    pub anchor: TextAnchor,
    /// Vertical alignment relative to [`TextChannels::pos`].
    pub baseline: TextBaseline,
    /// Fill paint.
    pub fill: Brush,
    /// Style classes.
    pub classes: MarkClasses,
}

/// Horizontal anchoring for text.
///
/// In SVG terms, this maps to the `text-anchor` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextAnchor {
    /// Anchor at the start (left in LTR).
    Start,
    /// Anchor in the middle.
    Middle,
    /// Anchor at the end (right in LTR).
    End,
}

/// Vertical alignment for text.
///
/// In SVG terms, this maps to the `dominant-baseline` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextBaseline {
    /// Baseline is centered on the anchor point.
    Middle,
    /// Baseline is the font's alphabetic baseline.
    Alphabetic,
    /// Baseline is the font's hanging baseline.
    Hanging,
}

impl Default for RectChannels {
    fn default() -> Self {
        Self {
            rect: Rect::new(0.0, 0.0, 0.0, 0.0),
            fill: Brush::Solid(Color::from_rgba8(0, 0, 0, 255)),
            fill_opacity: 1.0,
            classes: MarkClasses::empty(),
            title: None,
        }
    }
}

impl Default for TextChannels {
    fn default() -> Self {
        Self {
            pos: Point::new(0.0, 0.0),
            text: String::new(),
            font_size: 12.0,
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Alphabetic,
            fill: Brush::Solid(Color::from_rgba8(0, 0, 0, 255)),
            classes: MarkClasses::empty(),
        }
    }
}

/// Evaluated per-kind channels for a mark instance.
///
/// This is what downstream renderers consume and what appears (boxed) in [`MarkDiff`]s.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkPayload {
    /// An axis-aligned rectangle.
    Rect(RectChannels),
    /// A text item positioned at a point.
    Text(TextChannels),
}

impl MarkPayload {
    /// Return the kind of this payload.
    pub fn kind(&self) -> MarkKind {
        match self {
            Self::Rect(_) => MarkKind::Rect,
            Self::Text(_) => MarkKind::Text,
        }
    }

    /// Optional bounds hint for downstream damage calculation.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Rect(r) => Some(r.rect),
            // Text shaping is downstream; bounds are not known here.
            Self::Text(_) => None,
        }
    }

    /// Returns the style classes of this payload.
    pub fn classes(&self) -> MarkClasses {
        match self {
            Self::Rect(r) => r.classes,
            Self::Text(t) => t.classes,
        }
    }

    /// Returns the style classes of this payload for mutation.
    pub fn classes_mut(&mut self) -> &mut MarkClasses {
        match self {
            Self::Rect(r) => &mut r.classes,
            Self::Text(t) => &mut t.classes,
        }
    }

    /// Returns the rect channels, if this is a rect payload.
    pub fn as_rect(&self) -> Option<&RectChannels> {
        match self {
            Self::Rect(r) => Some(r),
            Self::Text(_) => None,
        }
    }

    /// Returns the text channels, if this is a text payload.
    pub fn as_text(&self) -> Option<&TextChannels> {
        match self {
            Self::Text(t) => Some(t),
            Self::Rect(_) => None,
        }
    }
}

/// How a mark leaves the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExitTransition {
    /// Removed immediately.
    #[default]
    Remove,
    /// Rect height collapses to zero (top edge kept), then removed.
    CollapseHeight,
}

/// A mark description for one frame: identity, paint order, and target payload.
#[derive(Clone, Debug)]
pub struct Mark {
    /// Stable identity.
    pub id: MarkId,
    /// Rendering order hint; higher values are drawn above lower values.
    pub z_index: i32,
    /// Target payload for this frame.
    pub payload: MarkPayload,
    /// Payload a newly entering mark animates from.
    pub enter: Option<MarkPayload>,
    /// Exit behavior used if this mark is absent from a later frame.
    pub exit: ExitTransition,
}

impl Mark {
    /// Creates a mark with `z_index = 0`, no enter payload, and immediate removal on exit.
    pub fn new(id: MarkId, payload: MarkPayload) -> Self {
        Self {
            id,
            z_index: 0,
            payload,
            enter: None,
            exit: ExitTransition::Remove,
        }
    }

    /// Sets the z-index used for render ordering.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Sets the payload an entering mark animates from.
    pub fn with_enter(mut self, from: MarkPayload) -> Self {
        self.enter = Some(from);
        self
    }

    /// Sets the exit behavior.
    pub fn with_exit(mut self, exit: ExitTransition) -> Self {
        self.exit = exit;
        self
    }

    /// Returns the mark kind.
    pub fn kind(&self) -> MarkKind {
        self.payload.kind()
    }

    fn exit_payload(&self) -> Option<MarkPayload> {
        match (self.exit, &self.payload) {
            (ExitTransition::CollapseHeight, MarkPayload::Rect(r)) => {
                let mut collapsed = r.clone();
                collapsed.rect = Rect::new(r.rect.x0, r.rect.y0, r.rect.x1, r.rect.y0);
                Some(MarkPayload::Rect(collapsed))
            }
            _ => None,
        }
    }
}

/// Mark-level diffs keyed by stable identity.
///
/// Payloads are boxed to keep `MarkDiff` itself reasonably sized.
#[derive(Debug)]
pub enum MarkDiff {
    /// A mark is newly present.
    Enter {
        /// Stable identifier.
        id: MarkId,
        /// Z-ordering for rendering.
        z_index: i32,
        /// The mark kind.
        kind: MarkKind,
        /// Payload to animate from, if the mark declared one.
        from: Option<Box<MarkPayload>>,
        /// Target payload.
        new: Box<MarkPayload>,
        /// Optional bounds hint for downstream damage calculation.
        bounds: Option<Rect>,
    },
    /// A mark exists and some channels changed.
    Update {
        /// Stable identifier.
        id: MarkId,
        /// Previous z-index.
        old_z_index: i32,
        /// New z-index.
        new_z_index: i32,
        /// The mark kind.
        kind: MarkKind,
        /// Previously cached payload.
        old: Box<MarkPayload>,
        /// New payload.
        new: Box<MarkPayload>,
        /// Union of old and new bounds when both are known.
        damage: Option<Rect>,
    },
    /// A mark was removed.
    Exit {
        /// Stable identifier.
        id: MarkId,
        /// Z-ordering for rendering.
        z_index: i32,
        /// The mark kind.
        kind: MarkKind,
        /// Last cached payload.
        old: Box<MarkPayload>,
        /// Payload to animate to before removal, if the mark declared an exit transition.
        to: Option<Box<MarkPayload>>,
        /// Optional bounds hint for downstream damage calculation.
        bounds: Option<Rect>,
    },
}

impl MarkDiff {
    /// Returns the id of the mark this diff refers to.
    pub fn id(&self) -> MarkId {
        match self {
            Self::Enter { id, .. } | Self::Update { id, .. } | Self::Exit { id, .. } => *id,
        }
    }

    /// Returns `true` for `Enter` diffs.
    pub fn is_enter(&self) -> bool {
        matches!(self, Self::Enter { .. })
    }

    /// Returns `true` for `Exit` diffs.
    pub fn is_exit(&self) -> bool {
        matches!(self, Self::Exit { .. })
    }
}

#[derive(Debug)]
struct SceneMark {
    mark: Mark,
    seq: u64,
}

/// A keyed collection of rendered marks.
///
/// Marks keep a creation sequence number, so [`Scene::ids_in_order`] reflects the order in which
/// items first appeared (existing items keep their position, new ones are appended).
#[derive(Debug, Default)]
pub struct Scene {
    marks: HashMap<MarkId, SceneMark>,
    next_seq: u64,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of marks in the scene.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Returns `true` if the scene holds no marks.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Returns a rendered mark by id.
    pub fn get(&self, id: MarkId) -> Option<&Mark> {
        self.marks.get(&id).map(|m| &m.mark)
    }

    /// Returns the rendered payload of a mark.
    pub fn payload(&self, id: MarkId) -> Option<&MarkPayload> {
        self.get(id).map(|m| &m.payload)
    }

    /// Returns the creation sequence number of a mark.
    pub fn sequence(&self, id: MarkId) -> Option<u64> {
        self.marks.get(&id).map(|m| m.seq)
    }

    /// Returns all mark ids ordered by creation sequence.
    pub fn ids_in_order(&self) -> Vec<MarkId> {
        let mut ids: Vec<(u64, MarkId)> = self.marks.iter().map(|(id, m)| (m.seq, *id)).collect();
        ids.sort_unstable();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Replace the scene's mark set and return the resulting diffs.
    ///
    /// The provided marks are the complete current frame:
    /// - ids not seen before produce `Enter`,
    /// - ids whose payload or z-index changed produce `Update`,
    /// - ids missing from `marks` produce `Exit`,
    /// - a mark whose [`MarkKind`] changed exits and re-enters.
    ///
    /// Identical frames produce no diffs.
    pub fn tick<I>(&mut self, marks: I) -> Vec<MarkDiff>
    where
        I: IntoIterator<Item = Mark>,
    {
        let mut old_marks = core::mem::take(&mut self.marks);
        let mut diffs = Vec::new();
        let mut enters = Vec::new();

        for mark in marks {
            match old_marks.remove(&mark.id) {
                Some(old) if old.mark.kind() == mark.kind() => {
                    if old.mark.payload != mark.payload || old.mark.z_index != mark.z_index {
                        let damage = union_bounds(old.mark.payload.bounds(), mark.payload.bounds());
                        diffs.push(MarkDiff::Update {
                            id: mark.id,
                            old_z_index: old.mark.z_index,
                            new_z_index: mark.z_index,
                            kind: mark.kind(),
                            old: Box::new(old.mark.payload),
                            new: Box::new(mark.payload.clone()),
                            damage,
                        });
                    }
                    self.marks.insert(mark.id, SceneMark { mark, seq: old.seq });
                }
                Some(old) => {
                    diffs.push(exit_diff(old.mark));
                    enters.push(mark);
                }
                None => enters.push(mark),
            }
        }

        for (_, old) in old_marks {
            diffs.push(exit_diff(old.mark));
        }

        for mark in enters {
            diffs.push(MarkDiff::Enter {
                id: mark.id,
                z_index: mark.z_index,
                kind: mark.kind(),
                from: mark.enter.clone().map(Box::new),
                new: Box::new(mark.payload.clone()),
                bounds: mark.payload.bounds(),
            });
            let seq = self.next_seq;
            self.next_seq += 1;
            self.marks.insert(mark.id, SceneMark { mark, seq });
        }

        diffs
    }

    /// Mutate a rendered mark's payload in place.
    ///
    /// Returns an `Update` diff if the payload changed, `None` if it did not or the id is unknown.
    pub fn restyle(
        &mut self,
        id: MarkId,
        f: impl FnOnce(&mut MarkPayload),
    ) -> Option<MarkDiff> {
        let entry = self.marks.get_mut(&id)?;
        let old = entry.mark.payload.clone();
        f(&mut entry.mark.payload);
        if old == entry.mark.payload {
            return None;
        }
        let damage = union_bounds(old.bounds(), entry.mark.payload.bounds());
        Some(MarkDiff::Update {
            id,
            old_z_index: entry.mark.z_index,
            new_z_index: entry.mark.z_index,
            kind: entry.mark.kind(),
            old: Box::new(old),
            new: Box::new(entry.mark.payload.clone()),
            damage,
        })
    }

    /// Remove every mark, producing `Exit` diffs.
    pub fn clear(&mut self) -> Vec<MarkDiff> {
        self.tick(core::iter::empty())
    }
}

fn exit_diff(mark: Mark) -> MarkDiff {
    let to = mark.exit_payload().map(Box::new);
    let bounds = mark.payload.bounds();
    MarkDiff::Exit {
        id: mark.id,
        z_index: mark.z_index,
        kind: mark.kind(),
        old: Box::new(mark.payload),
        to,
        bounds,
    }
}

fn union_bounds(a: Option<Rect>, b: Option<Rect>) -> Option<Rect> {
    let a = a?;
    let b = b?;
    Some(a.union(b))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::ToString;
    use alloc::vec;

    use super::*;

    fn rect_mark(id: u64, x: f64) -> Mark {
        Mark::new(
            MarkId(id),
            MarkPayload::Rect(RectChannels {
                rect: Rect::new(x, 0.0, x + 10.0, 20.0),
                ..RectChannels::default()
            }),
        )
    }

    #[test]
    fn enter_update_exit_smoke() {
        let mut scene = Scene::new();

        let diffs = scene.tick([rect_mark(1, 0.0)]);
        assert!(matches!(&diffs[..], [MarkDiff::Enter { id, .. }] if *id == MarkId(1)));

        let diffs = scene.tick([rect_mark(1, 5.0)]);
        let [MarkDiff::Update { old, new, .. }] = &diffs[..] else {
            panic!("expected a single update diff");
        };
        assert_ne!(old.bounds(), new.bounds());

        let diffs = scene.clear();
        assert!(matches!(&diffs[..], [MarkDiff::Exit { id, .. }] if *id == MarkId(1)));
        assert!(scene.is_empty());
    }

    #[test]
    fn identical_frames_produce_no_diffs() {
        let mut scene = Scene::new();
        let _ = scene.tick([rect_mark(1, 0.0), rect_mark(2, 10.0)]);
        let diffs = scene.tick([rect_mark(1, 0.0), rect_mark(2, 10.0)]);
        assert!(diffs.is_empty(), "unexpected diffs: {diffs:?}");
    }

    #[test]
    fn keyed_reconciliation_exits_and_enters_by_id() {
        let mut scene = Scene::new();
        let _ = scene.tick([rect_mark(10, 0.0), rect_mark(11, 10.0)]);
        let diffs = scene.tick([rect_mark(11, 10.0), rect_mark(12, 20.0)]);

        let enters: Vec<_> = diffs.iter().filter(|d| d.is_enter()).map(MarkDiff::id).collect();
        let exits: Vec<_> = diffs.iter().filter(|d| d.is_exit()).map(MarkDiff::id).collect();
        assert_eq!(enters, vec![MarkId(12)]);
        assert_eq!(exits, vec![MarkId(10)]);
    }

    #[test]
    fn creation_order_is_kept_for_surviving_marks() {
        let mut scene = Scene::new();
        let _ = scene.tick([rect_mark(3, 0.0), rect_mark(1, 10.0)]);
        let _ = scene.tick([rect_mark(2, 20.0), rect_mark(1, 10.0), rect_mark(3, 0.0)]);
        assert_eq!(scene.ids_in_order(), vec![MarkId(3), MarkId(1), MarkId(2)]);
    }

    #[test]
    fn collapse_exit_keeps_top_edge_with_zero_height() {
        let mut scene = Scene::new();
        let _ = scene.tick([rect_mark(1, 0.0).with_exit(ExitTransition::CollapseHeight)]);
        let diffs = scene.clear();
        let [MarkDiff::Exit { to: Some(to), .. }] = &diffs[..] else {
            panic!("expected an exit with a collapse target");
        };
        let rect = to.as_rect().expect("rect payload").rect;
        assert_eq!(rect.height(), 0.0);
        assert_eq!(rect.y0, 0.0);
    }

    #[test]
    fn kind_change_exits_then_reenters() {
        let mut scene = Scene::new();
        let _ = scene.tick([rect_mark(1, 0.0)]);
        let text = Mark::new(
            MarkId(1),
            MarkPayload::Text(TextChannels {
                text: "1".to_string(),
                ..TextChannels::default()
            }),
        );
        let diffs = scene.tick([text]);
        assert_eq!(diffs.len(), 2);
        assert!(diffs[0].is_exit());
        assert!(diffs[1].is_enter());
    }

    #[test]
    fn restyle_reports_only_real_changes() {
        let mut scene = Scene::new();
        let _ = scene.tick([rect_mark(1, 0.0)]);

        let diff = scene.restyle(MarkId(1), |p| p.classes_mut().insert(MarkClasses::ACCENTED));
        assert!(matches!(diff, Some(MarkDiff::Update { .. })));

        let diff = scene.restyle(MarkId(1), |p| p.classes_mut().insert(MarkClasses::ACCENTED));
        assert!(diff.is_none());
        assert!(scene.restyle(MarkId(99), |_| {}).is_none());
    }

    #[test]
    fn row_ids_are_namespaced() {
        assert_ne!(MarkId::for_row(0, 7), MarkId::for_row(1, 7));
        assert_eq!(MarkId::for_row(3, 7), MarkId::for_row(3, 7));
    }
}
