// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stacked data model consumed by the bar renderer.
//!
//! The stacking transform itself is an upstream collaborator; these types are what it hands over:
//! an ordered list of layers, each an ordered list of points carrying their stacked baseline.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::hash::{Hash, Hasher};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

/// A value on the x domain: an ordinal category, a number, or a UTC timestamp.
#[derive(Clone, Debug)]
pub enum DomainValue {
    /// Ordinal category.
    Category(String),
    /// Continuous number.
    Number(f64),
    /// Milliseconds since the Unix epoch (UTC).
    Time(i64),
}

impl DomainValue {
    /// Returns the value on a continuous axis, if it has one.
    ///
    /// Timestamps map to their millisecond count.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Category(_) => None,
            Self::Number(v) => Some(*v),
            #[allow(clippy::cast_precision_loss, reason = "ms timestamps fit in f64 mantissa")]
            Self::Time(ms) => Some(*ms as f64),
        }
    }

    /// Returns a stable 64-bit key used for mark identity.
    pub fn row_key(&self) -> u64 {
        match self {
            Self::Category(s) => fnv1a(s.as_bytes()),
            Self::Number(v) => number_bits(*v),
            #[allow(clippy::cast_sign_loss, reason = "bit reinterpretation for hashing")]
            Self::Time(ms) => (*ms as u64).rotate_left(32) ^ 0x7469_6d65,
        }
    }
}

// `-0.0` keys like `0.0`.
fn number_bits(v: f64) -> u64 {
    if v == 0.0 { 0_u64 } else { v.to_bits() }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

// Numbers compare bitwise, signed zeros folded, so they can key marks and filter sets.
impl PartialEq for DomainValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Category(a), Self::Category(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => number_bits(*a) == number_bits(*b),
            (Self::Time(a), Self::Time(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for DomainValue {}

impl Hash for DomainValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Self::Category(s) => s.hash(state),
            Self::Number(v) => number_bits(*v).hash(state),
            Self::Time(ms) => ms.hash(state),
        }
    }
}

impl From<&str> for DomainValue {
    fn from(value: &str) -> Self {
        Self::Category(String::from(value))
    }
}

impl From<String> for DomainValue {
    fn from(value: String) -> Self {
        Self::Category(value)
    }
}

impl From<f64> for DomainValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// One stacked value at one x position.
#[derive(Clone, Debug, PartialEq)]
pub struct DataPoint<D> {
    /// Position on the x domain. Unique within a layer.
    pub x: DomainValue,
    /// This layer's value.
    pub y: f64,
    /// Sum of all lower layers' `y` at the same `x`.
    pub y0: f64,
    /// The original record.
    pub data: D,
}

impl<D> DataPoint<D> {
    /// Creates a point.
    pub fn new(x: impl Into<DomainValue>, y: f64, y0: f64, data: D) -> Self {
        Self {
            x: x.into(),
            y,
            y0,
            data,
        }
    }

    /// Returns the stacked top value `y0 + y`.
    pub fn stacked(&self) -> f64 {
        self.y0 + self.y
    }
}

/// One stack level across all x positions.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer<D> {
    /// Series name, passed to title accessors.
    pub name: String,
    /// Points in data order.
    pub values: Vec<DataPoint<D>>,
}

impl<D> Layer<D> {
    /// Creates a layer.
    pub fn new(name: impl Into<String>, values: Vec<DataPoint<D>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Ordered layers, bottom first. The last layer is the top of the stack.
#[derive(Clone, Debug, PartialEq)]
pub struct StackedSeries<D> {
    /// Layers in stacking order.
    pub layers: Vec<Layer<D>>,
}

impl<D> Default for StackedSeries<D> {
    fn default() -> Self {
        Self { layers: Vec::new() }
    }
}

impl<D> StackedSeries<D> {
    /// Wraps already-stacked layers.
    pub fn new(layers: Vec<Layer<D>>) -> Self {
        Self { layers }
    }

    /// Stacks unstacked `(x, y, data)` rows per layer by accumulating `y0` at each `x`.
    ///
    /// Rows are visited layer by layer; each point's baseline is the running sum of the lower
    /// layers at that `x`.
    pub fn stack<I, R>(layers: I) -> Self
    where
        I: IntoIterator<Item = (String, R)>,
        R: IntoIterator<Item = (DomainValue, f64, D)>,
    {
        let mut totals: hashbrown::HashMap<DomainValue, f64> = hashbrown::HashMap::new();
        let layers = layers
            .into_iter()
            .map(|(name, rows)| {
                let values = rows
                    .into_iter()
                    .map(|(x, y, data)| {
                        let base = totals.entry(x.clone()).or_insert(0.0);
                        let y0 = *base;
                        *base += y;
                        DataPoint { x, y, y0, data }
                    })
                    .collect();
                Layer { name, values }
            })
            .collect();
        Self { layers }
    }

    /// Returns the top (label-eligible) layer.
    pub fn top(&self) -> Option<&Layer<D>> {
        self.layers.last()
    }

    /// Returns the number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if there are no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Returns the point at `index` in `layer`.
    pub fn point(&self, layer: usize, index: usize) -> Option<&DataPoint<D>> {
        self.layers.get(layer)?.values.get(index)
    }
}

/// Formats a single value for display.
///
/// Integers print without decimals, other finite numbers with two.
pub fn print_single_value(v: f64) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    if v.round() == v {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    #[test]
    fn stack_accumulates_baselines_per_x() {
        let series = StackedSeries::stack([
            (
                String::from("a"),
                vec![(DomainValue::from(1.0), 2.0, ()), (DomainValue::from(2.0), 5.0, ())],
            ),
            (
                String::from("b"),
                vec![(DomainValue::from(1.0), 3.0, ()), (DomainValue::from(2.0), -1.0, ())],
            ),
        ]);
        let b = &series.layers[1].values;
        assert_eq!(b[0].y0, 2.0);
        assert_eq!(b[0].stacked(), 5.0);
        assert_eq!(b[1].y0, 5.0);
        assert_eq!(b[1].stacked(), 4.0);
    }

    #[test]
    fn numeric_values_key_bitwise() {
        assert_eq!(DomainValue::from(1.5), DomainValue::Number(1.5));
        assert_ne!(DomainValue::from(1.5), DomainValue::Time(1));
        assert_eq!(
            DomainValue::from("x").row_key(),
            DomainValue::Category(String::from("x")).row_key()
        );
        assert_ne!(DomainValue::from("x").row_key(), DomainValue::from("y").row_key());
    }

    #[test]
    fn signed_zeros_are_one_key() {
        let pos = DomainValue::from(0.0);
        let neg = DomainValue::from(-0.0);
        assert_eq!(pos, neg);
        assert_eq!(pos.row_key(), neg.row_key());

        let mut set = hashbrown::HashSet::new();
        set.insert(pos);
        assert!(set.contains(&neg));
    }

    #[test]
    fn single_values_print_like_labels() {
        assert_eq!(print_single_value(12.0), "12");
        assert_eq!(print_single_value(-3.0), "-3");
        assert_eq!(print_single_value(1.256), "1.26");
    }
}
