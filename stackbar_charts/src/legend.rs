// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Legend hover feedback on bars.
//!
//! Legend rendering lives elsewhere; this module only decides which bars a hovered legend item
//! highlights.

extern crate alloc;

use alloc::string::String;

use peniko::{Brush, Color};
use stackbar_core::MarkClasses;

use crate::selection::ClassChange;

/// A legend row as seen by the chart.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendItem {
    /// The label string shown next to the swatch.
    pub label: String,
    /// The swatch fill paint.
    pub fill: Brush,
    /// Hidden items are ignored by highlighting.
    pub hidden: bool,
}

impl LegendItem {
    /// Convenience constructor for a visible solid-color swatch.
    pub fn solid(label: impl Into<String>, color: Color) -> Self {
        Self {
            label: label.into(),
            fill: Brush::Solid(color),
            hidden: false,
        }
    }

    /// Hides or shows the item.
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Class change for a bar with `fill` while this item is hovered.
    ///
    /// Matching bars are highlighted, others fade. Hidden items change nothing.
    pub fn highlight(&self, fill: &Brush) -> Option<ClassChange> {
        if self.hidden {
            return None;
        }
        let (on, off) = if *fill == self.fill {
            (MarkClasses::HIGHLIGHT, MarkClasses::FADEOUT)
        } else {
            (MarkClasses::FADEOUT, MarkClasses::HIGHLIGHT)
        };
        Some(ClassChange {
            insert: on,
            remove: off,
        })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use peniko::color::palette::css;

    use super::*;

    #[test]
    fn matching_fills_highlight_and_others_fade() {
        let item = LegendItem::solid("a", css::ORANGE);
        let mut classes = MarkClasses::FADEOUT;
        item.highlight(&Brush::Solid(css::ORANGE))
            .unwrap()
            .apply(&mut classes);
        assert_eq!(classes, MarkClasses::HIGHLIGHT);

        let mut classes = MarkClasses::empty();
        item.highlight(&Brush::Solid(css::CRIMSON))
            .unwrap()
            .apply(&mut classes);
        assert_eq!(classes, MarkClasses::FADEOUT);
    }

    #[test]
    fn hidden_items_are_ignored() {
        let item = LegendItem::solid("a", css::ORANGE).with_hidden(true);
        assert!(item.highlight(&Brush::Solid(css::ORANGE)).is_none());
    }
}
