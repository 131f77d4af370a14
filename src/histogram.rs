// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Renders one colour channel of a nebula.  The points a channel
//! cares about have their orbits replayed, every orbit value that
//! lands on the grid bumps that pixel by one, and the finished count
//! grid is normalized into the unit interval and spread over the
//! channel's colour weights.
//!
//! Orbits are not stored between the sampling pass and this one;
//! they are recomputed, which costs time but keeps memory flat no
//! matter how long the orbits are.

use crossbeam::thread::ScopedJoinHandle;
use itertools::{Itertools, MinMaxResult};
use log::debug;

use crate::channels::ColorChannel;
use crate::errors::NebulaError;
use crate::escape::{ComplexPoint, EscapeEvaluator, MandelPoint};
use crate::planes::RenderArea;
use crate::ranges::RangeMapper;

/// A per-pixel visitation count for one channel.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    counts: Vec<u64>,
}

impl Histogram {
    /// An all-zero histogram the size of the area.
    pub fn new(area: &RenderArea) -> Self {
        Histogram {
            counts: vec![0; area.len()],
        }
    }

    /// Increment the pixel under `point`, if there is one.  Returns
    /// whether anything was counted.
    #[inline]
    pub fn plot(&mut self, area: &RenderArea, point: &ComplexPoint) -> bool {
        match area.point_to_offset(point) {
            Some(offset) => {
                self.counts[offset] += 1;
                true
            }
            None => false,
        }
    }

    /// Replay a point's orbit and plot every value along it.
    pub fn trace(&mut self, area: &RenderArea, evaluator: &EscapeEvaluator, point: &MandelPoint) {
        evaluator.replay(point, |z| {
            self.plot(area, &z);
        });
    }

    /// Add another histogram of the same area into this one.
    pub fn merge(&mut self, other: &Histogram) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine += theirs;
        }
    }

    /// The raw counts, row-major.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// The sum of every count.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Maps every count from `[min, max]` of the grid onto `[0, 1]`.
    /// A grid where every count is the same, including one where
    /// nothing was plotted, has no range to map from and normalizes to
    /// all zeros.
    pub fn normalize(&self) -> Result<Vec<f64>, NebulaError> {
        match self.counts.iter().minmax() {
            MinMaxResult::MinMax(&min, &max) if min != max => {
                let mapper = RangeMapper::new((min as f64, max as f64), (0.0, 1.0))?;
                Ok(self.counts.iter().map(|&c| mapper.map(c as f64)).collect())
            }
            _ => Ok(vec![0.0; self.counts.len()]),
        }
    }
}

/// Spreads a normalized grid over a channel's weights, producing a
/// flat buffer of three floats per pixel.
pub fn spread(channel: &ColorChannel, normalized: &[f64]) -> Vec<f64> {
    normalized
        .iter()
        .flat_map(|&value| channel.spread(value).to_vec())
        .collect()
}

/// Renders single channels.  Holds the parameters shared by every
/// channel of a nebula: the grid, the escape test the points were
/// sampled with, and how many threads to replay orbits on.
#[derive(Copy, Clone, Debug)]
pub struct ChannelRenderer {
    /// The grid being rendered.
    pub area: RenderArea,
    /// The escape test the points were found with.
    pub evaluator: EscapeEvaluator,
    /// Number of worker threads.
    pub threads: usize,
}

impl ChannelRenderer {
    /// Constructor.
    pub fn new(area: RenderArea, evaluator: EscapeEvaluator, threads: usize) -> Self {
        ChannelRenderer {
            area,
            evaluator,
            threads: threads.max(1),
        }
    }

    /// Build the visitation histogram for one channel.  Points are
    /// dealt out to the workers in contiguous runs; each worker
    /// plots into its own histogram and the partials are summed once
    /// everyone has joined.
    pub fn histogram(
        &self,
        channel: &ColorChannel,
        points: &[MandelPoint],
    ) -> Result<Histogram, NebulaError> {
        let selected: Vec<&MandelPoint> = points.iter().filter(|p| channel.contains(p)).collect();
        debug!(
            "channel {}..{}: replaying {} orbits",
            channel.iterations.start,
            channel.iterations.end,
            selected.len()
        );

        let mut histogram = Histogram::new(&self.area);
        if selected.is_empty() {
            return Ok(histogram);
        }

        let run = (selected.len() + self.threads - 1) / self.threads;
        let area = &self.area;
        let evaluator = &self.evaluator;
        let partials = crossbeam::scope(|spawner| {
            let handles: Vec<ScopedJoinHandle<Histogram>> = selected
                .chunks(run)
                .map(|points| {
                    spawner.spawn(move |_| {
                        let mut partial = Histogram::new(area);
                        for point in points {
                            partial.trace(area, evaluator, point);
                        }
                        partial
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Result<Vec<Histogram>, _>>()
        })
        .map_err(|_| NebulaError::WorkerPanicked)?
        .map_err(|_| NebulaError::WorkerPanicked)?;

        for partial in &partials {
            histogram.merge(partial);
        }
        Ok(histogram)
    }

    /// Render one channel into a flat `side * side * 3` buffer.
    pub fn render(
        &self,
        channel: &ColorChannel,
        points: &[MandelPoint],
    ) -> Result<Vec<f64>, NebulaError> {
        let histogram = self.histogram(channel, points)?;
        Ok(spread(channel, &histogram.normalize()?))
    }
}
