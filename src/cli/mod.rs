pub mod completions;
pub mod detect;
pub mod init;
pub mod palette;
pub mod restore;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::{PxError, Result};
use crate::types::{Polygon, Rect, Region};

/// realpx - Restore upscaled pixel art to its true resolution
#[derive(Parser, Debug)]
#[command(name = "realpx")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Print per-candidate scores and cell counters
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Settings file (default: ./realpx.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Downsample images to one pixel per grid cell
    Restore(restore::RestoreArgs),

    /// Report the detected grid size of an image
    Detect(detect::DetectArgs),

    /// List the colours of an image, most frequent first
    Palette(palette::PaletteArgs),

    /// Write a default realpx.yaml
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Region selection shared by the image commands.
#[derive(Args, Debug, Default, Clone)]
pub struct RegionArgs {
    /// Rectangular region as x,y,w,h
    #[arg(long, conflicts_with = "polygon")]
    pub region: Option<String>,

    /// Polygon region as space-separated x,y vertices
    #[arg(long)]
    pub polygon: Option<String>,
}

impl RegionArgs {
    pub fn region(&self) -> Result<Region> {
        match (&self.region, &self.polygon) {
            (Some(_), Some(_)) => Err(PxError::Parse {
                message: "--region and --polygon cannot be combined".to_string(),
                help: None,
            }),
            (Some(rect), None) => Ok(Region::Rect(rect.parse::<Rect>()?)),
            (None, Some(poly)) => Ok(Region::Polygon(poly.parse::<Polygon>()?)),
            (None, None) => Ok(Region::Full),
        }
    }
}

/// Parse an "X,Y" pair.
pub(crate) fn parse_pair(s: &str) -> Result<(u32, u32)> {
    let invalid = || PxError::Parse {
        message: format!("Invalid pair '{}': expected X,Y (e.g. 2,3)", s),
        help: Some("Both values must be non-negative integers".to_string()),
    };

    let (x, y) = s.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse().map_err(|_| invalid())?;
    let y = y.trim().parse().map_err(|_| invalid())?;
    Ok((x, y))
}
