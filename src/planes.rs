// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the RenderArea struct, which describes a relationship
//! between a square on the integral plane with an origin at 0,0, and
//! a rectangle on the complex plane given by a range on each axis.
//! Both directions of the mapping go through `RangeMapper`.

use crate::errors::NebulaError;
use crate::escape::ComplexPoint;
use crate::ranges::RangeMapper;

/// Describes the x, y of a point on the integral plane.  Signed,
/// because points outside the view map to pixels outside the grid,
/// and the caller decides what to do with those.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub i64, pub i64);

/// Rejects ranges that are inverted, empty, or not finite.  `axis`
/// names the range in the error.
pub fn check_window(axis: &'static str, range: (f64, f64)) -> Result<(), NebulaError> {
    if range.0.is_finite() && range.1.is_finite() && range.1 > range.0 {
        Ok(())
    } else {
        Err(NebulaError::BadWindow {
            axis,
            start: range.0,
            end: range.1,
        })
    }
}

/// A square grid of `side` pixels on each edge, and the window on
/// the complex plane that it shows.  The real axis runs along x, the
/// imaginary axis along y, and the buffer is row-major.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderArea {
    /// Width and height of the grid.
    pub side: usize,
    /// The real range shown, left to right.
    pub view_x: (f64, f64),
    /// The imaginary range shown, top to bottom of the buffer.
    pub view_y: (f64, f64),
    // Point to pixel, per axis.
    to_pixel: (RangeMapper, RangeMapper),
    // Pixel to point, per axis.
    to_point: (RangeMapper, RangeMapper),
}

impl RenderArea {
    /// Constructor.  Takes the side of the integral square and the
    /// two ranges describing the complex window.
    pub fn new(side: usize, view_x: (f64, f64), view_y: (f64, f64)) -> Result<Self, NebulaError> {
        if side == 0 {
            return Err(NebulaError::BadConfig(
                "the image must be at least one pixel wide".to_string(),
            ));
        }
        check_window("view real", view_x)?;
        check_window("view imaginary", view_y)?;
        let grid = (0.0, side as f64);
        Ok(RenderArea {
            side,
            view_x,
            view_y,
            to_pixel: (RangeMapper::new(view_x, grid)?, RangeMapper::new(view_y, grid)?),
            to_point: (RangeMapper::new(grid, view_x)?, RangeMapper::new(grid, view_y)?),
        })
    }

    /// The total number of pixels in the grid.  Used to size buffers.
    pub fn len(&self) -> usize {
        self.side * self.side
    }

    /// A validated area is never empty; here for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.side == 0
    }

    /// True if the pixel is on the grid.
    pub fn within_bounds(&self, pixel: Pixel) -> bool {
        let side = self.side as i64;
        pixel.0 >= 0 && pixel.0 < side && pixel.1 >= 0 && pixel.1 < side
    }

    /// The linear offset of a pixel from the root of a row-major
    /// buffer, or None if it is off the grid.
    pub fn offset(&self, pixel: Pixel) -> Option<usize> {
        if self.within_bounds(pixel) {
            Some((pixel.1 as usize) * self.side + (pixel.0 as usize))
        } else {
            None
        }
    }

    /// Given a complex number corresponding to a location on the
    /// complex plane, map it to a pixel by truncation.
    pub fn point_to_pixel(&self, point: &ComplexPoint) -> Pixel {
        Pixel(
            self.to_pixel.0.map(point.re) as i64,
            self.to_pixel.1.map(point.im) as i64,
        )
    }

    /// Given a pixel on the integral plane, return the complex number
    /// at its top-left corner.
    pub fn pixel_to_point(&self, pixel: Pixel) -> ComplexPoint {
        ComplexPoint::new(
            self.to_point.0.map(pixel.0 as f64),
            self.to_point.1.map(pixel.1 as f64),
        )
    }

    /// Since the nebula tracks the progress of a complex number as it
    /// orbits, we have to map those complex numbers back to the pixel
    /// plane and increment the pixels the orbit passes through.  This
    /// takes a point and returns its offset into the buffer, if it
    /// lands on the grid at all.
    #[inline]
    pub fn point_to_offset(&self, point: &ComplexPoint) -> Option<usize> {
        self.offset(self.point_to_pixel(point))
    }
}

/// Maps pixel `(x, y)` of a `grid_size` square onto the window
/// `view_x × view_y`.  Fails only if `grid_size` is zero.
pub fn pixel_to_plane(
    x: usize,
    y: usize,
    grid_size: usize,
    view_x: (f64, f64),
    view_y: (f64, f64),
) -> Result<ComplexPoint, NebulaError> {
    let grid = (0.0, grid_size as f64);
    Ok(ComplexPoint::new(
        RangeMapper::new(grid, view_x)?.map(x as f64),
        RangeMapper::new(grid, view_y)?.map(y as f64),
    ))
}

/// Maps a point into `[0, side]` on each axis of `area`, truncating
/// toward zero.  The result may be off the grid; check it with
/// `RenderArea::within_bounds` before indexing.
pub fn plane_to_pixel(point: &ComplexPoint, area: &RenderArea) -> Pixel {
    area.point_to_pixel(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::iproduct;

    #[test]
    fn render_area_fails_on_bad_shape() {
        assert!(RenderArea::new(4, (1.0, -1.0), (-1.0, 1.0)).is_err());
        assert!(RenderArea::new(4, (-1.0, 1.0), (1.0, 1.0)).is_err());
        assert!(RenderArea::new(4, (-1.0, std::f64::INFINITY), (-1.0, 1.0)).is_err());
        assert!(RenderArea::new(0, (-1.0, 1.0), (-1.0, 1.0)).is_err());
    }

    #[test]
    fn render_area_names_the_bad_axis() {
        assert_eq!(
            RenderArea::new(4, (-1.0, 1.0), (2.0, -2.0)),
            Err(NebulaError::BadWindow {
                axis: "view imaginary",
                start: 2.0,
                end: -2.0
            })
        );
    }

    #[test]
    fn render_area_passes_on_good_shape() {
        let area = RenderArea::new(4, (-1.0, 1.0), (-1.0, 1.0)).unwrap();
        assert_eq!(area.len(), 16);
        assert!(!area.is_empty());
    }

    #[test]
    fn point_to_pixel_on_positive_planes() {
        let area = RenderArea::new(5, (0.0, 5.0), (0.0, 5.0)).unwrap();
        assert_eq!(area.point_to_pixel(&ComplexPoint::new(0.0, 0.0)), Pixel(0, 0));
        assert_eq!(area.point_to_pixel(&ComplexPoint::new(2.0, 2.0)), Pixel(2, 2));
        assert_eq!(area.point_to_pixel(&ComplexPoint::new(4.0, 4.0)), Pixel(4, 4));
        assert_eq!(area.point_to_pixel(&ComplexPoint::new(4.9, 3.5)), Pixel(4, 3));
    }

    #[test]
    fn point_to_pixel_on_mixed_planes() {
        let area = RenderArea::new(4, (-2.0, 2.0), (-2.0, 2.0)).unwrap();
        assert_eq!(plane_to_pixel(&ComplexPoint::new(0.0, 0.0), &area), Pixel(2, 2));
        assert_eq!(plane_to_pixel(&ComplexPoint::new(-2.0, -2.0), &area), Pixel(0, 0));
        assert_eq!(plane_to_pixel(&ComplexPoint::new(2.0, 2.0), &area), Pixel(4, 4));
    }

    #[test]
    fn point_to_pixel_maps_on_large_mixed_planes() {
        let area = RenderArea::new(640, (-2.0, 2.0), (-2.0, 2.0)).unwrap();
        assert_eq!(area.point_to_pixel(&ComplexPoint::new(0.0, 0.0)), Pixel(320, 320));
        assert_eq!(area.point_to_pixel(&ComplexPoint::new(-2.0, -2.0)), Pixel(0, 0));
        assert_eq!(area.point_to_pixel(&ComplexPoint::new(2.0, 2.0)), Pixel(640, 640));
        assert_eq!(area.point_to_pixel(&ComplexPoint::new(1.0, 2.0)), Pixel(480, 640));
    }

    #[test]
    fn truncation_pulls_toward_zero() {
        let area = RenderArea::new(4, (-1.0, 1.0), (-1.0, 1.0)).unwrap();
        // Half a pixel left of the view truncates onto column zero.
        assert_eq!(area.point_to_pixel(&ComplexPoint::new(-1.25, 0.0)), Pixel(0, 2));
        assert_eq!(area.point_to_pixel(&ComplexPoint::new(-2.0, 0.0)), Pixel(-2, 2));
    }

    #[test]
    fn bounds_and_offsets() {
        let area = RenderArea::new(4, (-1.0, 1.0), (-1.0, 1.0)).unwrap();
        assert!(area.within_bounds(Pixel(0, 0)));
        assert!(area.within_bounds(Pixel(3, 3)));
        assert!(!area.within_bounds(Pixel(4, 0)));
        assert!(!area.within_bounds(Pixel(0, 4)));
        assert!(!area.within_bounds(Pixel(-1, 2)));
        assert_eq!(area.offset(Pixel(2, 1)), Some(6));
        assert_eq!(area.offset(Pixel(1, 2)), Some(9));
        assert_eq!(area.point_to_offset(&ComplexPoint::new(1.0, 0.0)), None);
        assert_eq!(area.point_to_offset(&ComplexPoint::new(0.25, 0.25)), Some(10));
    }

    #[test]
    fn pixel_to_point_on_positive_planes() {
        let area = RenderArea::new(5, (0.0, 5.0), (0.0, 5.0)).unwrap();
        assert_eq!(area.pixel_to_point(Pixel(0, 0)), ComplexPoint::new(0.0, 0.0));
        assert_eq!(area.pixel_to_point(Pixel(2, 2)), ComplexPoint::new(2.0, 2.0));
        assert_eq!(area.pixel_to_point(Pixel(4, 4)), ComplexPoint::new(4.0, 4.0));
    }

    #[test]
    fn pixel_to_points_on_mixed_planes() {
        let view = (-2.0, 2.0);
        assert_eq!(pixel_to_plane(2, 2, 4, view, view), Ok(ComplexPoint::new(0.0, 0.0)));
        assert_eq!(pixel_to_plane(0, 0, 4, view, view), Ok(ComplexPoint::new(-2.0, -2.0)));
        assert_eq!(pixel_to_plane(4, 4, 4, view, view), Ok(ComplexPoint::new(2.0, 2.0)));
        assert!(pixel_to_plane(0, 0, 0, view, view).is_err());
    }

    #[test]
    fn pixels_survive_the_round_trip() {
        let area = RenderArea::new(16, (-2.0, 1.0), (-1.5, 1.5)).unwrap();
        for (x, y) in iproduct!(0..16, 0..16) {
            // Nudge into the cell so truncation is unambiguous.
            let corner = area.pixel_to_point(Pixel(x, y));
            let inside = corner + ComplexPoint::new(0.05, 0.05);
            assert_eq!(area.point_to_pixel(&inside), Pixel(x, y));
        }
    }
}
