// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The long exposure.  Each pass draws a fresh batch of random
//! samples from the compute window, keeps the ones that escape,
//! renders a nebula from them, and adds that into a running total.
//! The total only ever grows, so every pass sharpens the picture; the
//! loop has no end of its own and stops only when told to.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::thread::ScopedJoinHandle;
use itertools::Itertools;
use log::{error, info, warn};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::channels::ColorChannel;
use crate::compositor::NebulaCompositor;
use crate::config::NebulaConfig;
use crate::errors::NebulaError;
use crate::escape::{ComplexPoint, EscapeEvaluator, MandelPoint};
use crate::histogram::ChannelRenderer;
use crate::planes::RenderArea;
use crate::ranges::RangeMapper;

/// An eight-bit RGB image, row-major, three bytes per pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Width and height in pixels.
    pub side: usize,
    /// `side * side * 3` samples.
    pub pixels: Vec<u8>,
}

impl Frame {
    /// The RGB triple at column `x`, row `y`.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.side + x) * 3;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }
}

/// What happened during one pass.
#[derive(Clone, Debug, PartialEq)]
pub struct PassReport {
    /// One-based pass number.
    pub pass: usize,
    /// Samples drawn.
    pub samples: usize,
    /// Samples whose orbits escaped.
    pub escaped: usize,
    /// Escaped samples per channel, in channel order.
    pub channel_counts: Vec<usize>,
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "pass {}: {} of {} samples escaped",
            self.pass, self.escaped, self.samples
        )
    }
}

/// Owns the cumulative buffer and everything needed to add to it.
pub struct Accumulator {
    area: RenderArea,
    evaluator: EscapeEvaluator,
    compositor: NebulaCompositor,
    sample_re: Uniform<f64>,
    sample_im: Uniform<f64>,
    batch_size: usize,
    threads: usize,
    rng: StdRng,
    cumulative: Vec<f64>,
    passes: usize,
}

impl Accumulator {
    /// Validates the configuration and allocates a zeroed buffer.
    pub fn new(config: &NebulaConfig) -> Result<Self, NebulaError> {
        config.validate()?;
        let area = config.area()?;
        let evaluator = config.evaluator()?;
        let renderer = ChannelRenderer::new(area, evaluator, config.threads);
        let compositor = NebulaCompositor::new(renderer, config.channels.clone())?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Accumulator {
            area,
            evaluator,
            compositor,
            sample_re: Uniform::new(config.compute_x.0, config.compute_x.1),
            sample_im: Uniform::new(config.compute_y.0, config.compute_y.1),
            batch_size: config.batch_size,
            threads: config.threads,
            rng,
            cumulative: vec![0.0; area.len() * 3],
            passes: 0,
        })
    }

    /// The channels being rendered.
    pub fn channels(&self) -> &[ColorChannel] {
        self.compositor.channels()
    }

    /// Completed passes.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// The running total, `side * side * 3` floats.
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Draw one batch of uniform samples from the compute window and
    /// return the ones that escape.  The batch is split evenly over
    /// the workers, and each worker gets its own generator seeded from
    /// the driver's, so a seeded run is repeatable for a given thread
    /// count.
    pub fn sample(&mut self) -> Result<Vec<MandelPoint>, NebulaError> {
        let (each, extra) = (self.batch_size / self.threads, self.batch_size % self.threads);
        let shares: Vec<(usize, u64)> = (0..self.threads)
            .map(|i| (each + if i < extra { 1 } else { 0 }, self.rng.gen()))
            .collect();

        let evaluator = &self.evaluator;
        let (re, im) = (&self.sample_re, &self.sample_im);
        let batches = crossbeam::scope(|spawner| {
            let handles: Vec<ScopedJoinHandle<Vec<MandelPoint>>> = shares
                .into_iter()
                .map(|(count, seed)| {
                    spawner.spawn(move |_| {
                        let mut rng = StdRng::seed_from_u64(seed);
                        let mut escaped = vec![];
                        for _ in 0..count {
                            let c = ComplexPoint::new(re.sample(&mut rng), im.sample(&mut rng));
                            let point = evaluator.evaluate(c);
                            if point.escaped() {
                                escaped.push(point);
                            }
                        }
                        escaped
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Result<Vec<Vec<MandelPoint>>, _>>()
        })
        .map_err(|_| NebulaError::WorkerPanicked)?
        .map_err(|_| NebulaError::WorkerPanicked)?;

        Ok(batches.into_iter().flatten().collect())
    }

    /// One full pass: sample, render, and add into the total.  All
    /// workers have joined before the total is touched.
    pub fn run_pass(&mut self) -> Result<PassReport, NebulaError> {
        let points = self.sample()?;
        let channel_counts = self.compositor.channel_counts(&points);
        let layer = self.compositor.compose(&points)?;
        accumulate(&mut self.cumulative, &layer);
        self.passes += 1;
        Ok(PassReport {
            pass: self.passes,
            samples: self.batch_size,
            escaped: points.len(),
            channel_counts,
        })
    }

    /// Scale the total from `[0, max]` to `[0, 255]`, truncating.  A
    /// total with nothing in it yet is black.
    pub fn frame(&self) -> Result<Frame, NebulaError> {
        let max = self.cumulative.iter().cloned().fold(0.0, f64::max);
        let pixels = if max > 0.0 {
            let mapper = RangeMapper::new((0.0, max), (0.0, 255.0))?;
            self.cumulative.iter().map(|&v| mapper.map(v) as u8).collect()
        } else {
            vec![0; self.cumulative.len()]
        };
        Ok(Frame {
            side: self.area.side,
            pixels,
        })
    }
}

/// Adds a pass's frame into the total, element by element.
pub fn accumulate(cumulative: &mut [f64], layer: &[f64]) {
    for (total, value) in cumulative.iter_mut().zip(layer.iter()) {
        *total += value;
    }
}

/// Runs passes until `stop` is raised, or until `max_passes` passes
/// have completed if a cap is given.  `stop` is only looked at
/// between passes.  After every pass the new frame goes to `sink`; a
/// sink failure is logged and the loop carries on, since the total
/// is unaffected and the next pass will try again.  Returns the
/// number of passes completed.
pub fn run<F>(
    accumulator: &mut Accumulator,
    stop: &AtomicBool,
    max_passes: Option<usize>,
    mut sink: F,
) -> Result<usize, NebulaError>
where
    F: FnMut(usize, &Frame) -> Result<(), failure::Error>,
{
    while !stop.load(Ordering::SeqCst) {
        if max_passes.map_or(false, |max| accumulator.passes() >= max) {
            break;
        }
        let report = accumulator.run_pass()?;
        if report.escaped == 0 {
            warn!("{}: nothing to plot", report);
        } else {
            info!(
                "{} ({})",
                report,
                report
                    .channel_counts
                    .iter()
                    .zip(accumulator.channels())
                    .map(|(count, channel)| format!(
                        "{}..{}: {}",
                        channel.iterations.start, channel.iterations.end, count
                    ))
                    .join(", ")
            );
        }
        let frame = accumulator.frame()?;
        if let Err(e) = sink(report.pass, &frame) {
            error!("pass {}: could not write the frame: {}", report.pass, e);
        }
    }
    Ok(accumulator.passes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::reference_channels;
    use failure::format_err;

    fn small_config(seed: u64) -> NebulaConfig {
        NebulaConfig {
            side: 16,
            batch_size: 2000,
            limit: 200,
            channels: reference_channels(200),
            threads: 3,
            seed: Some(seed),
            ..NebulaConfig::default()
        }
    }

    #[test]
    fn refuses_bad_configuration() {
        let config = NebulaConfig {
            batch_size: 0,
            ..small_config(1)
        };
        assert!(Accumulator::new(&config).is_err());
    }

    #[test]
    fn an_empty_total_is_black() {
        let accumulator = Accumulator::new(&small_config(1)).unwrap();
        let frame = accumulator.frame().unwrap();
        assert_eq!(frame.side, 16);
        assert_eq!(frame.pixels, vec![0; 16 * 16 * 3]);
    }

    #[test]
    fn sample_returns_only_escapers() {
        let mut accumulator = Accumulator::new(&small_config(2)).unwrap();
        let points = accumulator.sample().unwrap();
        assert!(!points.is_empty());
        assert!(points.len() <= 2000);
        assert!(points.iter().all(|p| p.escaped() && p.iterations < 200));
        assert!(points.iter().all(|p| {
            p.start.re >= -2.5 && p.start.re <= 1.5 && p.start.im >= -2.0 && p.start.im <= 2.0
        }));
    }

    #[test]
    fn passes_only_add() {
        let mut accumulator = Accumulator::new(&small_config(3)).unwrap();
        let first = accumulator.run_pass().unwrap();
        assert_eq!(first.pass, 1);
        assert_eq!(first.samples, 2000);
        assert_eq!(first.channel_counts.iter().sum::<usize>(), first.escaped);
        let after_one = accumulator.cumulative().to_vec();
        assert!(after_one.iter().any(|&v| v > 0.0));

        accumulator.run_pass().unwrap();
        for (before, after) in after_one.iter().zip(accumulator.cumulative()) {
            assert!(after >= before);
        }
        assert_eq!(accumulator.passes(), 2);
    }

    #[test]
    fn seeded_runs_repeat() {
        let mut a = Accumulator::new(&small_config(4)).unwrap();
        let mut b = Accumulator::new(&small_config(4)).unwrap();
        assert_eq!(a.run_pass().unwrap(), b.run_pass().unwrap());
        assert_eq!(a.cumulative(), b.cumulative());
        assert_eq!(a.frame().unwrap(), b.frame().unwrap());
    }

    #[test]
    fn frame_spans_the_byte_range() {
        let mut accumulator = Accumulator::new(&small_config(5)).unwrap();
        accumulator.run_pass().unwrap();
        let frame = accumulator.frame().unwrap();
        assert_eq!(frame.pixels.len(), 16 * 16 * 3);
        assert!(*frame.pixels.iter().max().unwrap() >= 254);
    }

    #[test]
    fn accumulate_adds_elementwise() {
        let mut total = vec![1.0, 2.0, 3.0];
        accumulate(&mut total, &[0.5, 0.0, 1.0]);
        assert_eq!(total, vec![1.5, 2.0, 4.0]);
    }

    #[test]
    fn run_stops_at_the_cap() {
        let mut accumulator = Accumulator::new(&small_config(6)).unwrap();
        let stop = AtomicBool::new(false);
        let mut seen = vec![];
        let passes = run(&mut accumulator, &stop, Some(3), |pass, frame| {
            assert_eq!(frame.side, 16);
            seen.push(pass);
            Ok(())
        })
        .unwrap();
        assert_eq!(passes, 3);
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn run_honours_the_stop_flag() {
        let mut accumulator = Accumulator::new(&small_config(7)).unwrap();
        let stop = AtomicBool::new(true);
        let passes = run(&mut accumulator, &stop, None, |_, _| {
            panic!("no pass should have run");
        })
        .unwrap();
        assert_eq!(passes, 0);
    }

    #[test]
    fn stop_raised_mid_run_finishes_the_pass() {
        let mut accumulator = Accumulator::new(&small_config(8)).unwrap();
        let stop = AtomicBool::new(false);
        let passes = run(&mut accumulator, &stop, None, |pass, _| {
            if pass == 2 {
                stop.store(true, Ordering::SeqCst);
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(passes, 2);
    }

    #[test]
    fn failed_writes_do_not_stop_the_run() {
        let mut accumulator = Accumulator::new(&small_config(9)).unwrap();
        let stop = AtomicBool::new(false);
        let mut attempts = 0;
        let passes = run(&mut accumulator, &stop, Some(2), |_, _| {
            attempts += 1;
            Err(format_err!("disk full"))
        })
        .unwrap();
        assert_eq!(passes, 2);
        assert_eq!(attempts, 2);
    }
}
