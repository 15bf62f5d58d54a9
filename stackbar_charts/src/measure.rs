// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement hooks for tooltip placement.
//!
//! Shaping is downstream of this crate, so tooltip placement takes a measurer for rough width
//! estimation.

/// A minimal text measurement interface.
///
/// Callers can plug in a real text measurement backend (e.g. based on shaping), or use
/// [`HeuristicTextMeasurer`].
pub trait TextMeasurer {
    /// Returns `(width, height)` in the same coordinate system as the marks.
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64);

    /// Returns the widest of `lines`, or `0` for none.
    fn max_width(&self, lines: &[&str], font_size: f64) -> f64 {
        lines
            .iter()
            .map(|line| self.measure(line, font_size).0)
            .fold(0.0, f64::max)
    }
}

/// A tiny heuristic text measurer suitable for demos and tests.
///
/// It assumes an average glyph width of ~0.6em and height of 1em.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicTextMeasurer;

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64) {
        let width = 0.6 * font_size * text.chars().count() as f64;
        (width, font_size)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn heuristic_width_scales_with_chars_and_size() {
        let m = HeuristicTextMeasurer;
        assert_eq!(m.measure("abcde", 10.0), (30.0, 10.0));
        assert_eq!(m.max_width(&["ab", "abcd", ""], 10.0), 24.0);
        assert_eq!(m.max_width(&[], 10.0), 0.0);
    }
}
