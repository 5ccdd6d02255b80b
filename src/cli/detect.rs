//! Detect command implementation.
//!
//! Runs grid detection only and reports the result, as text or JSON on stdout.

use std::path::PathBuf;

use clap::Args;

use crate::detect::{detect_with, DetectionResult};
use crate::error::{PxError, Result};
use crate::output::{display_path, Printer};
use crate::render::load_raster;
use crate::settings::Settings;

use super::RegionArgs;

/// Report the detected grid size of an image
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Image to analyse
    #[arg(required = true)]
    pub input: PathBuf,

    #[command(flatten)]
    pub region: RegionArgs,

    /// Smallest cell size to try
    #[arg(long)]
    pub min_size: Option<u32>,

    /// Largest cell size to try
    #[arg(long)]
    pub max_size: Option<u32>,

    /// Detect the grid offset as well as the size
    #[arg(long)]
    pub detect_offset: bool,

    /// Print the full result, including candidate scores, as JSON
    #[arg(long)]
    pub json: bool,
}

/// Plain-text summary printed on stdout.
fn summary(result: &DetectionResult) -> String {
    let mut out = format!(
        "cell_size: {}\nconfidence: {:.3}\n",
        result.cell_size, result.confidence
    );
    if let Some((x, y)) = result.offset {
        out.push_str(&format!("offset: {},{}\n", x, y));
    }
    out
}

pub fn run(args: DetectArgs, settings: &Settings, printer: &Printer) -> Result<DetectionResult> {
    let region = args.region.region()?;
    let options = settings.detect_options(args.min_size, args.max_size, args.detect_offset)?;

    printer.status("Analyzing", &display_path(&args.input));
    let raster = load_raster(&args.input)?;
    let result = detect_with(&raster, &region, &options)?;

    for candidate in &result.candidates {
        printer.verbose(
            "Candidate",
            &format!("{:>3}px  score {:.4}", candidate.cell_size, candidate.score),
        );
    }

    if args.json {
        let json = serde_json::to_string_pretty(&result).map_err(|e| PxError::Parse {
            message: format!("Failed to serialize detection result: {}", e),
            help: None,
        })?;
        println!("{}", json);
    } else {
        print!("{}", summary(&result));
    }

    if result.found_grid() {
        printer.success("Detected", &format!("{}px cells", result.cell_size));
    } else {
        printer.warning("Warning", "No pixel grid detected");
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Candidate;
    use crate::output::Verbosity;
    use crate::render::write_raster;
    use crate::types::{Colour, Raster};
    use tempfile::tempdir;

    fn result(offset: Option<(u32, u32)>) -> DetectionResult {
        DetectionResult {
            cell_size: 8,
            confidence: 0.95,
            offset,
            candidates: vec![Candidate {
                cell_size: 8,
                score: 1.0,
            }],
            baseline: 0.0,
        }
    }

    #[test]
    fn test_summary() {
        insta::assert_snapshot!(summary(&result(None)).trim_end(), @r"
        cell_size: 8
        confidence: 0.950
        ");
    }

    #[test]
    fn test_summary_with_offset() {
        insta::assert_snapshot!(summary(&result(Some((2, 3)))).trim_end(), @r"
        cell_size: 8
        confidence: 0.950
        offset: 2,3
        ");
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(result(Some((1, 0)))).unwrap();
        assert_eq!(value["cell_size"], 8);
        assert_eq!(value["offset"], serde_json::json!([1, 0]));
        assert_eq!(value["candidates"][0]["score"], 1.0);
    }

    #[test]
    fn test_run_on_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("stripes.png");
        let raster = Raster::from_fn(30, 30, |x, y| {
            if (x / 6 + y / 6) % 2 == 0 {
                Colour::BLACK
            } else {
                Colour::WHITE
            }
        })
        .unwrap();
        write_raster(&raster, &input).unwrap();

        let args = DetectArgs {
            input,
            region: RegionArgs::default(),
            min_size: None,
            max_size: None,
            detect_offset: false,
            json: false,
        };
        let printer = Printer::with_verbosity(Verbosity::Quiet);
        let result = run(args, &Settings::default(), &printer).unwrap();
        assert_eq!(result.cell_size, 6);
    }
}
