// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time iterator.  This is the classic Mandelbrot inner
//! loop, `z -> z² + c`, with two differences from the usual version:
//! the orbit starts at `c` rather than at zero, and every value the
//! orbit visits along the way can be handed to an observer, which is
//! how the histogram renderer plots the orbit later.

use num::Complex;

use crate::errors::NebulaError;

/// We don't need a Point, as a single Complex number is a Point.
pub type ComplexPoint = Complex<f64>;

/// The result of running one sample through the iterator.
///
/// A point that never escapes reports `iterations` equal to the limit
/// it was run with and has no `end`.  A point that escapes reports
/// the step at which it escaped, which is always below the limit, and
/// the value it escaped with.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MandelPoint {
    /// Steps taken before escape, or the limit if it never escaped.
    pub iterations: usize,
    /// The sample itself, `c`.
    pub start: ComplexPoint,
    /// The first orbit value at or beyond the escape radius.
    pub end: Option<ComplexPoint>,
}

impl MandelPoint {
    /// True if the orbit left the escape radius.  Only these points
    /// take part in a nebula.
    pub fn escaped(&self) -> bool {
        self.end.is_some()
    }
}

/// Runs the escape-time recurrence from `start` for at most `limit`
/// steps, calling `observer` with every orbit value that does not end
/// the run.  The value that crosses `radius`, and the value computed
/// on the final permitted step, are never observed.
///
/// For an escaping point with `iterations == k` the observer sees
/// exactly `k - 1` values, and re-running with a limit of `k` replays
/// those same `k - 1` values.
pub fn trace<F>(start: ComplexPoint, limit: usize, radius: f64, mut observer: F) -> MandelPoint
where
    F: FnMut(ComplexPoint),
{
    let bailout = radius * radius;
    let mut z = start;
    for step in 0..limit {
        if z.norm_sqr() >= bailout {
            return MandelPoint {
                iterations: step,
                start,
                end: Some(z),
            };
        }
        z = z * z + start;
        if step + 1 < limit && z.norm_sqr() < bailout {
            observer(z);
        }
    }
    MandelPoint {
        iterations: limit,
        start,
        end: None,
    }
}

/// The fixed parameters of the escape test: how long to wait and how
/// far out counts as gone.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EscapeEvaluator {
    /// Maximum number of steps before a point is declared inside.
    pub limit: usize,
    /// Escape radius.  The reference render uses 16.0.
    pub radius: f64,
}

impl EscapeEvaluator {
    /// Checked constructor.
    pub fn new(limit: usize, radius: f64) -> Result<Self, NebulaError> {
        if limit == 0 {
            return Err(NebulaError::BadConfig(
                "the iteration limit must be at least 1".to_string(),
            ));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(NebulaError::BadConfig(format!(
                "the escape radius must be a positive number, not {}",
                radius
            )));
        }
        Ok(EscapeEvaluator { limit, radius })
    }

    /// Evaluate a sample without watching its orbit.
    #[inline]
    pub fn evaluate(&self, start: ComplexPoint) -> MandelPoint {
        trace(start, self.limit, self.radius, |_| ())
    }

    /// Replay the orbit of a point this evaluator already found to
    /// escape, feeding every intermediate value to `observer`.  Uses
    /// the point's own iteration count as the limit, so nothing past
    /// the escape is ever computed.
    #[inline]
    pub fn replay<F>(&self, point: &MandelPoint, observer: F)
    where
        F: FnMut(ComplexPoint),
    {
        trace(point.start, point.iterations, self.radius, observer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orbit(start: ComplexPoint, limit: usize) -> (MandelPoint, Vec<ComplexPoint>) {
        let mut seen = vec![];
        let point = trace(start, limit, 16.0, |z| seen.push(z));
        (point, seen)
    }

    #[test]
    fn origin_never_escapes() {
        for &limit in [1, 2, 17, 4096].iter() {
            let (point, seen) = orbit(Complex::new(0.0, 0.0), limit);
            assert_eq!(point.iterations, limit);
            assert_eq!(point.end, None);
            assert!(!point.escaped());
            assert_eq!(seen.len(), limit - 1);
        }
    }

    #[test]
    fn far_point_escapes_at_once() {
        let (point, seen) = orbit(Complex::new(10.0, 10.0), 4096);
        assert!(point.escaped());
        assert_eq!(point.iterations, 1);
        assert_eq!(point.end, Some(Complex::new(10.0, 210.0)));
        assert!(seen.is_empty());
    }

    #[test]
    fn start_outside_radius_escapes_at_step_zero() {
        let (point, seen) = orbit(Complex::new(20.0, 0.0), 10);
        assert_eq!(point.iterations, 0);
        assert_eq!(point.end, Some(Complex::new(20.0, 0.0)));
        assert!(seen.is_empty());
    }

    #[test]
    fn orbit_of_one_is_observed_until_escape() {
        // 1 -> 2 -> 5 -> 26
        let (point, seen) = orbit(Complex::new(1.0, 0.0), 100);
        assert_eq!(point.iterations, 3);
        assert_eq!(point.end, Some(Complex::new(26.0, 0.0)));
        assert_eq!(seen, vec![Complex::new(2.0, 0.0), Complex::new(5.0, 0.0)]);
    }

    #[test]
    fn limit_cuts_an_escaping_orbit_short() {
        let (point, seen) = orbit(Complex::new(1.0, 0.0), 2);
        assert_eq!(point.iterations, 2);
        assert_eq!(point.end, None);
        assert_eq!(seen, vec![Complex::new(2.0, 0.0)]);
    }

    #[test]
    fn replay_sees_the_same_orbit() {
        let evaluator = EscapeEvaluator::new(4096, 16.0).unwrap();
        let start = Complex::new(-0.75, 0.1);
        let mut first = vec![];
        let point = trace(start, evaluator.limit, evaluator.radius, |z| first.push(z));
        assert!(point.escaped());
        assert_eq!(first.len(), point.iterations - 1);

        let mut second = vec![];
        evaluator.replay(&point, |z| second.push(z));
        assert_eq!(first, second);
    }

    #[test]
    fn radius_is_a_parameter() {
        let small = trace(Complex::new(1.0, 0.0), 100, 2.0, |_| ());
        assert_eq!(small.iterations, 1);
        assert_eq!(small.end, Some(Complex::new(2.0, 0.0)));
    }

    #[test]
    fn evaluator_rejects_nonsense() {
        assert!(EscapeEvaluator::new(0, 16.0).is_err());
        assert!(EscapeEvaluator::new(10, 0.0).is_err());
        assert!(EscapeEvaluator::new(10, std::f64::NAN).is_err());
        assert!(EscapeEvaluator::new(10, 16.0).is_ok());
    }
}
