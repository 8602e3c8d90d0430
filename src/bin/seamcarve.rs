// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use anyhow::{bail, Context};
use clap::{App, Arg, ArgMatches};
use image::imageops::{self, FilterType};
use image::RgbImage;
use seamcarve::energy::{build_energy, energy_to_image};
use seamcarve::SeamCarver;
use std::path::PathBuf;
use std::time::Instant;

// Default values for some of the program arguments.
const DEFAULT_SEAMS: &str = "50";
const DEFAULT_OUTPUT: &str = "carved.png";

fn main() -> anyhow::Result<()> {
    let matches = App::new("seamcarve")
        .version(std::env!("CARGO_PKG_VERSION"))
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Narrow an image by carving out its least important vertical seams")
        .arg(
            Arg::with_name("image")
                .help("The image to narrow")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("seams")
                .short("n")
                .long("seams")
                .value_name("N")
                .default_value(DEFAULT_SEAMS)
                .help("Number of vertical seams to remove"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("path")
                .default_value(DEFAULT_OUTPUT)
                .help("Where to write the narrowed image; the extension picks the format"),
        )
        .arg(
            Arg::with_name("overlay")
                .long("overlay")
                .value_name("path")
                .help("Also write the original with every removed seam painted green"),
        )
        .arg(
            Arg::with_name("energy")
                .long("energy")
                .value_name("path")
                .help("Also write the energy map of the input as a greyscale image"),
        )
        .arg(
            Arg::with_name("max-width")
                .long("max-width")
                .value_name("px")
                .help("Scale the input down to at most this width before carving"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Multiple levels of verbosity (up to -vvvv)"),
        )
        .get_matches();

    // Set log verbosity.
    stderrlog::new()
        .quiet(false)
        .verbosity(matches.occurrences_of("verbose") as usize)
        .show_level(false)
        .color(stderrlog::ColorChoice::Never)
        .init()
        .context("Failed to initialize log verbosity")?;

    run(get_args(&matches)?)
}

/// Type holding command line arguments.
#[derive(Debug)]
struct Args {
    input: PathBuf,
    output: PathBuf,
    overlay: Option<PathBuf>,
    energy: Option<PathBuf>,
    seams: u32,
    max_width: Option<u32>,
}

/// Retrieve the program arguments from clap matches.
fn get_args(matches: &ArgMatches) -> anyhow::Result<Args> {
    let seams = matches.value_of("seams").unwrap_or(DEFAULT_SEAMS);
    let max_width = match matches.value_of("max-width") {
        None => None,
        Some(px) => match px.parse::<u32>().context("--max-width must be a whole number")? {
            0 => bail!("--max-width must be at least 1"),
            px => Some(px),
        },
    };
    Ok(Args {
        input: matches.value_of("image").context("No image given")?.into(),
        output: matches.value_of("output").unwrap_or(DEFAULT_OUTPUT).into(),
        overlay: matches.value_of("overlay").map(PathBuf::from),
        energy: matches.value_of("energy").map(PathBuf::from),
        seams: seams
            .parse()
            .with_context(|| format!("Invalid seam count {:?}", seams))?,
        max_width,
    })
}

// Proportional shrink, so large inputs don't take forever to carve.
fn limit_width(picture: RgbImage, max_width: u32) -> RgbImage {
    let (width, height) = picture.dimensions();
    if width <= max_width {
        return picture;
    }
    let scale = f64::from(max_width) / f64::from(width);
    let new_height = (f64::from(height) * scale).round().max(1.0) as u32;
    log::info!(
        "Scaling {}x{} down to {}x{}",
        width,
        height,
        max_width,
        new_height
    );
    imageops::resize(&picture, max_width, new_height, FilterType::Triangle)
}

/// Start actual program with command line arguments successfully parsed.
fn run(args: Args) -> anyhow::Result<()> {
    let now = Instant::now();
    let mut picture = image::open(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?
        .to_rgb8();
    log::info!("Loading image took {:.1} s", now.elapsed().as_secs_f32());
    if let Some(max_width) = args.max_width {
        picture = limit_width(picture, max_width);
    }

    if let Some(path) = &args.energy {
        energy_to_image(&build_energy(&picture)?)
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let now = Instant::now();
    let carved = SeamCarver::new(&picture)
        .carve(args.seams)
        .with_context(|| format!("Failed to remove {} seams", args.seams))?;
    log::warn!(
        "Removed {} seams in {:.1} s",
        args.seams,
        now.elapsed().as_secs_f32()
    );

    carved
        .image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    if let Some(path) = &args.overlay {
        carved
            .overlay
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}
