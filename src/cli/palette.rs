use std::collections::HashMap;
use std::path::PathBuf;

use clap::Args;

use crate::error::Result;
use crate::output::{display_path, plural, Printer};
use crate::render::load_raster;
use crate::types::{Colour, Raster, Region};

use super::RegionArgs;

/// List the colours of an image, most frequent first
#[derive(Args, Debug)]
pub struct PaletteArgs {
    /// Image to extract colours from
    #[arg(required = true)]
    pub file: PathBuf,

    #[command(flatten)]
    pub region: RegionArgs,

    /// Maximum number of colours to output
    #[arg(long)]
    pub max: Option<usize>,
}

/// Distinct non-transparent colours inside `region`, most frequent first.
/// Equal counts keep the order of first appearance.
pub fn colour_counts(raster: &Raster, region: &Region) -> Result<Vec<(Colour, usize)>> {
    let bounds = region.bounds(raster)?;

    let mut counts: HashMap<Colour, (usize, usize)> = HashMap::new();
    for y in bounds.y..bounds.y + bounds.height {
        for x in bounds.x..bounds.x + bounds.width {
            if !region.includes(x, y) {
                continue;
            }
            let colour = raster.get(x, y);
            if colour.is_transparent() {
                continue;
            }
            let next = counts.len();
            counts.entry(colour).or_insert((0, next)).0 += 1;
        }
    }

    let mut colours: Vec<(Colour, (usize, usize))> = counts.into_iter().collect();
    colours.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));

    Ok(colours.into_iter().map(|(c, (n, _))| (c, n)).collect())
}

pub fn run(args: PaletteArgs, printer: &Printer) -> Result<Vec<Colour>> {
    let region = args.region.region()?;
    let raster = load_raster(&args.file)?;

    let mut colours = colour_counts(&raster, &region)?;
    if let Some(max) = args.max {
        colours.truncate(max);
    }

    printer.status(
        "Sampled",
        &format!(
            "{} from {}",
            plural(colours.len(), "colour", "colours"),
            display_path(&args.file)
        ),
    );

    for (colour, count) in &colours {
        println!("{}", colour);
        printer.verbose("Pixels", &format!("{} {}", colour, count));
    }

    Ok(colours.into_iter().map(|(c, _)| c).collect())
}
