// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Affine interpolation between two ranges.  Every coordinate and
//! colour transform in the renderer goes through here: pixels to
//! points, points to pixels, histogram counts to the unit interval,
//! the unit interval to a colour weight, and the cumulative buffer to
//! eight-bit samples.
//!
//! There is no clamping.  A value outside the source range lands
//! outside the destination range, on the same line.

use crate::errors::NebulaError;

/// A validated map from the range `from` onto the range `to`.  The
/// only thing that can go wrong with an affine map is a source range
/// of zero width, so that is checked once, at construction, and
/// `map()` itself cannot fail.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RangeMapper {
    from: (f64, f64),
    to: (f64, f64),
}

impl RangeMapper {
    /// Build a mapper from `from` to `to`.  Fails with
    /// `DivisionByZero` if both ends of `from` are the same.  The
    /// ranges may run in either direction.
    pub fn new(from: (f64, f64), to: (f64, f64)) -> Result<RangeMapper, NebulaError> {
        if from.0 == from.1 {
            return Err(NebulaError::DivisionByZero {
                start: from.0,
                end: from.1,
            });
        }
        Ok(RangeMapper { from, to })
    }

    /// A mapper out of the unit interval.  The source can't be
    /// degenerate, so this one can't fail.
    pub fn from_unit(to: (f64, f64)) -> RangeMapper {
        RangeMapper {
            from: (0.0, 1.0),
            to,
        }
    }

    /// Interpolate.  Operation order is fixed so that results are
    /// reproducible: `(value - a) * (d - c) / (b - a) + c`.
    #[inline]
    pub fn map(&self, value: f64) -> f64 {
        let (a, b) = self.from;
        let (c, d) = self.to;
        (value - a) * (d - c) / (b - a) + c
    }
}

/// One-shot form of `RangeMapper`, for callers that map a single
/// value and would rather not keep the mapper around.
pub fn remap(value: f64, from: (f64, f64), to: (f64, f64)) -> Result<f64, NebulaError> {
    RangeMapper::new(from, to).map(|mapper| mapper.map(value))
}
