// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection-state classes for rendered bars.
//!
//! Ordinal axes mark every bar `SELECTED` or `DESELECTED` against the active filter. Continuous
//! axes only dim bars outside the brush extent.

use stackbar_core::MarkClasses;

use crate::domain::DomainValue;
use crate::grid::CoordinateGrid;

/// Classes to add and remove on a mark.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClassChange {
    /// Classes to add.
    pub insert: MarkClasses,
    /// Classes to remove.
    pub remove: MarkClasses,
}

impl ClassChange {
    /// Adds `classes`.
    pub fn insert(classes: MarkClasses) -> Self {
        Self {
            insert: classes,
            remove: MarkClasses::empty(),
        }
    }

    /// Removes `classes`.
    pub fn remove(classes: MarkClasses) -> Self {
        Self {
            insert: MarkClasses::empty(),
            remove: classes,
        }
    }

    /// Applies the change. Removal happens before insertion.
    pub fn apply(self, classes: &mut MarkClasses) {
        classes.remove(self.remove);
        classes.insert(self.insert);
    }
}

/// Computes the selection classes for a bar at `x`.
pub fn selection_change<G: CoordinateGrid + ?Sized>(grid: &G, x: &DomainValue) -> ClassChange {
    if grid.is_ordinal() {
        if !grid.has_filter() {
            return ClassChange::remove(MarkClasses::SELECTED | MarkClasses::DESELECTED);
        }
        return if grid.is_filtered(x) {
            ClassChange {
                insert: MarkClasses::SELECTED,
                remove: MarkClasses::DESELECTED,
            }
        } else {
            ClassChange {
                insert: MarkClasses::DESELECTED,
                remove: MarkClasses::SELECTED,
            }
        };
    }

    match (grid.brush_is_empty(), grid.brush_extent(), x.as_f64()) {
        (false, Some((start, end)), Some(v)) if v < start || v >= end => {
            ClassChange::insert(MarkClasses::DESELECTED)
        }
        _ => ClassChange::remove(MarkClasses::DESELECTED),
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use hashbrown::HashSet;
    use kurbo::Size;

    use super::*;
    use crate::grid::{FilterState, GridFrame};

    fn classes_after(change: ClassChange, start: MarkClasses) -> MarkClasses {
        let mut c = start;
        change.apply(&mut c);
        c
    }

    #[test]
    fn continuous_extent_is_half_open() {
        let mut grid = GridFrame::linear((0.0, 20.0), (0.0, 1.0), Size::new(200.0, 100.0));
        grid.set_brush_extent(Some((5.0, 10.0)));
        let deselected = |x: f64| {
            classes_after(selection_change(&grid, &x.into()), MarkClasses::empty())
                .contains(MarkClasses::DESELECTED)
        };
        assert!(deselected(4.0));
        assert!(!deselected(5.0));
        assert!(!deselected(9.0));
        assert!(deselected(10.0));
    }

    #[test]
    fn empty_brush_clears_deselection_and_never_selects() {
        let grid = GridFrame::linear((0.0, 20.0), (0.0, 1.0), Size::new(200.0, 100.0));
        let c = classes_after(selection_change(&grid, &3.0.into()), MarkClasses::DESELECTED);
        assert_eq!(c, MarkClasses::empty());
    }

    #[test]
    fn ordinal_filters_select_members() {
        let mut grid = GridFrame::ordinal(
            vec!["a".into(), "b".into()],
            (0.0, 1.0),
            Size::new(200.0, 100.0),
        );
        let mut set = HashSet::new();
        set.insert(DomainValue::from("a"));
        grid.set_filter(FilterState::Members(set));

        let a = classes_after(selection_change(&grid, &"a".into()), MarkClasses::DESELECTED);
        assert_eq!(a, MarkClasses::SELECTED);
        let b = classes_after(selection_change(&grid, &"b".into()), MarkClasses::empty());
        assert_eq!(b, MarkClasses::DESELECTED);

        grid.set_filter(FilterState::Empty);
        let cleared = classes_after(selection_change(&grid, &"a".into()), MarkClasses::SELECTED);
        assert_eq!(cleared, MarkClasses::empty());
    }
}
