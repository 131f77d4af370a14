// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{App, Arg, ArgMatches};
use failure::format_err;
use log::{info, warn};

use nebulabrot::{reference_channels, run, Accumulator, ImageSink, NebulaConfig};

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const VIEW_X: &str = "view-x";
const VIEW_Y: &str = "view-y";
const COMPUTE_X: &str = "compute-x";
const COMPUTE_Y: &str = "compute-y";
const BATCH: &str = "batch";
const ITERATIONS: &str = "iterations";
const RADIUS: &str = "radius";
const THREADS: &str = "threads";
const SEED: &str = "seed";
const PASSES: &str = "passes";
const NO_SNAPSHOTS: &str = "no-snapshots";

fn range_arg(
    name: &'static str,
    default: &'static str,
    help: &'static str,
) -> Arg<'static, 'static> {
    Arg::with_name(name)
        .required(false)
        .long(name)
        .takes_value(true)
        .allow_hyphen_values(true)
        .default_value(default)
        .validator(|s| validate_pair::<f64>(&s, ',', "Expected two numbers, as in -2.0,1.0"))
        .help(help)
}

fn args() -> ArgMatches<'static> {
    let max_threads = num_cpus::get();

    App::new("nebula")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Nebulabrot renderer: keeps refining until interrupted")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Directory to write images into"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1024")
                .validator(|s| {
                    validate_range(
                        &s,
                        1usize,
                        16384,
                        "Could not parse image size",
                        "Image size must be between 1 and 16384",
                    )
                })
                .help("Width and height of the output image"),
        )
        .arg(range_arg(VIEW_X, "-2.0,1.0", "Real range of the view window"))
        .arg(range_arg(VIEW_Y, "-1.5,1.5", "Imaginary range of the view window"))
        .arg(range_arg(COMPUTE_X, "-2.5,1.5", "Real range samples are drawn from"))
        .arg(range_arg(COMPUTE_Y, "-2.0,2.0", "Imaginary range samples are drawn from"))
        .arg(
            Arg::with_name(BATCH)
                .required(false)
                .long(BATCH)
                .short("b")
                .takes_value(true)
                .default_value("4194304")
                .validator(|s| {
                    validate_range(
                        &s,
                        1usize,
                        1 << 30,
                        "Could not parse batch size",
                        "Batch size must be between 1 and 1073741824",
                    )
                })
                .help("Random samples drawn per pass"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("4096")
                .validator(|s| {
                    validate_range(
                        &s,
                        1usize,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Iterations before a point is considered inside the set"),
        )
        .arg(
            Arg::with_name(RADIUS)
                .required(false)
                .long(RADIUS)
                .short("r")
                .takes_value(true)
                .default_value("16.0")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse escape radius",
                        "Escape radius must be positive",
                    )
                })
                .help("Escape radius"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use (default: one per CPU)"),
        )
        .arg(
            Arg::with_name(SEED)
                .required(false)
                .long(SEED)
                .takes_value(true)
                .validator(|s| {
                    u64::from_str(&s)
                        .map(|_| ())
                        .map_err(|_| "Could not parse seed".to_string())
                })
                .help("Seed the sampler for a repeatable run"),
        )
        .arg(
            Arg::with_name(PASSES)
                .required(false)
                .long(PASSES)
                .short("p")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1usize,
                        std::usize::MAX,
                        "Could not parse pass count",
                        "Pass count must be at least 1",
                    )
                })
                .help("Stop after this many passes (default: run until interrupted)"),
        )
        .arg(
            Arg::with_name(NO_SNAPSHOTS)
                .long(NO_SNAPSHOTS)
                .help("Only keep the latest image, not one per pass"),
        )
        .get_matches()
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, failure::Error> {
    let raw = matches
        .value_of(name)
        .ok_or_else(|| format_err!("missing --{}", name))?;
    T::from_str(raw).map_err(|_| format_err!("could not parse --{} {}", name, raw))
}

fn pair(matches: &ArgMatches, name: &str) -> Result<(f64, f64), failure::Error> {
    let raw = matches
        .value_of(name)
        .ok_or_else(|| format_err!("missing --{}", name))?;
    parse_pair(raw, ',').ok_or_else(|| format_err!("could not parse --{} {}", name, raw))
}

fn configure(matches: &ArgMatches) -> Result<NebulaConfig, failure::Error> {
    let limit = value(matches, ITERATIONS)?;
    Ok(NebulaConfig {
        side: value(matches, SIZE)?,
        view_x: pair(matches, VIEW_X)?,
        view_y: pair(matches, VIEW_Y)?,
        compute_x: pair(matches, COMPUTE_X)?,
        compute_y: pair(matches, COMPUTE_Y)?,
        batch_size: value(matches, BATCH)?,
        limit,
        radius: value(matches, RADIUS)?,
        channels: reference_channels(limit),
        threads: match matches.value_of(THREADS) {
            Some(_) => value(matches, THREADS)?,
            None => num_cpus::get(),
        },
        seed: match matches.value_of(SEED) {
            Some(_) => Some(value(matches, SEED)?),
            None => None,
        },
    })
}

fn render(matches: &ArgMatches) -> Result<(), failure::Error> {
    let config = configure(matches)?;
    let passes = match matches.value_of(PASSES) {
        Some(_) => Some(value(matches, PASSES)?),
        None => None,
    };
    let sink = ImageSink::new(
        matches.value_of(OUTPUT).unwrap_or("."),
        !matches.is_present(NO_SNAPSHOTS),
    );

    let mut accumulator = Accumulator::new(&config)?;
    info!(
        "rendering {0}x{0} with {1} samples per pass, {2} iterations, {3} threads",
        config.side, config.batch_size, config.limit, config.threads
    );

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::SeqCst);
        })?;
    }

    let completed = run(&mut accumulator, &stop, passes, |pass, frame| {
        sink.write(pass, frame)
    })?;

    if stop.load(Ordering::SeqCst) && completed > 0 {
        warn!("interrupted after {} passes; flushing the last frame", completed);
        sink.flush(&accumulator.frame()?)?;
    }
    info!("done after {} passes", completed);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = args();
    if let Err(e) = render(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
