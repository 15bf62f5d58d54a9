// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Z-order conventions for chart-generated marks.
//!
//! Renderers should sort by `(z_index, MarkId)` for a deterministic tie-break.

/// Bars. Each layer draws at `SERIES_FILL + layer`.
pub const SERIES_FILL: i32 = 0;
/// Value labels above the top layer.
pub const SERIES_LABELS: i32 = 40;
