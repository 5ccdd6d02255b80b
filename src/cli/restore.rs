//! Restore command implementation.
//!
//! Loads upscaled images, finds their grid (given, marked or detected),
//! downsamples them to one pixel per cell and writes the result as PNG.

use std::path::{Path, PathBuf};

use clap::Args;
use walkdir::WalkDir;

use crate::detect::{detect_with, DetectOptions, DetectionResult};
use crate::error::{PxError, Result};
use crate::output::{display_path, plural, Printer};
use crate::render::{
    draw_grid_overlay, fit_square, load_raster, write_raster, OverlayStyle, SIZE_PRESETS,
    SUPPORTED_EXTENSIONS,
};
use crate::settings::Settings;
use crate::transform::transform;
use crate::types::{BitDepth, GridSpec, Raster, Rect, Region, SampleMode, TransformConfig};

use super::{parse_pair, RegionArgs};

/// Detection confidence below which a warning is printed.
const LOW_CONFIDENCE: f64 = 0.2;

/// Downsample images to one pixel per grid cell
#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Image files or directories to restore
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Cell size in pixels (skips detection)
    #[arg(long, conflicts_with = "pixel")]
    pub grid_size: Option<u32>,

    /// Grid offset as X,Y relative to the region origin
    #[arg(long)]
    pub offset: Option<String>,

    /// One logical pixel as x,y,w,h; sets cell size and offset
    #[arg(long)]
    pub pixel: Option<String>,

    #[command(flatten)]
    pub region: RegionArgs,

    /// Smallest cell size to try when detecting
    #[arg(long)]
    pub min_size: Option<u32>,

    /// Largest cell size to try when detecting
    #[arg(long)]
    pub max_size: Option<u32>,

    /// Detect the grid offset as well as the size
    #[arg(long)]
    pub detect_offset: bool,

    /// Output bits per channel (1, 2, 4 or 8)
    #[arg(long)]
    pub bit_depth: Option<u32>,

    /// Colour to make transparent (hex or name, repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Colour match tolerance for --exclude
    #[arg(long)]
    pub tolerance: Option<u32>,

    /// How each cell's colour is sampled
    #[arg(long, value_enum)]
    pub sample: Option<SampleMode>,

    /// Fit the output into an NxN square (8, 16, 24, 32, 48, 64, 96, 128, 256)
    #[arg(long)]
    pub resize: Option<u32>,

    /// Also write the source with the grid drawn over it
    #[arg(long)]
    pub show_grid: bool,

    /// Leave sampling markers out of the grid overlay
    #[arg(long, requires = "show_grid")]
    pub no_center_markers: bool,

    /// Output file, or directory when restoring several images
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Settings for one restore run, merged from realpx.yaml and flags.
#[derive(Debug, Clone)]
struct Plan {
    region: Region,
    grid: GridChoice,
    offset: Option<(u32, u32)>,
    detect: DetectOptions,
    template: TransformConfig,
    resize: u32,
    output_suffix: String,
    grid_suffix: String,
    overlay: Option<OverlayStyle>,
}

#[derive(Debug, Clone, Copy)]
enum GridChoice {
    Fixed(u32),
    Pixel(Rect),
    Detect,
}

/// What one input produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restored {
    pub input: PathBuf,
    pub output: PathBuf,
    pub overlay: Option<PathBuf>,
    pub grid: GridSpec,
    pub width: u32,
    pub height: u32,
}

impl Plan {
    fn new(args: &RestoreArgs, settings: &Settings) -> Result<Self> {
        let grid = match (args.grid_size, &args.pixel) {
            (Some(n), _) => GridChoice::Fixed(n),
            (None, Some(pixel)) => GridChoice::Pixel(pixel.parse()?),
            (None, None) => GridChoice::Detect,
        };
        let offset = args.offset.as_deref().map(parse_pair).transpose()?;

        let bit_depth = match args.bit_depth {
            Some(bits) => BitDepth::try_from(bits)?,
            None => settings.bit_depth()?,
        };
        let template = TransformConfig::new(GridSpec::new(1))
            .with_bit_depth(bit_depth)
            .with_exclusions(settings.exclusions(&args.exclude, args.tolerance)?)
            .with_sample(args.sample.unwrap_or(settings.sample));

        let resize = args.resize.unwrap_or(settings.resize);
        if !SIZE_PRESETS.contains(&resize) {
            return Err(PxError::Parse {
                message: format!("Unsupported output size {}", resize),
                help: Some(format!(
                    "Use one of {}",
                    SIZE_PRESETS
                        .iter()
                        .skip(1)
                        .map(u32::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
            });
        }

        let overlay = args.show_grid.then(|| OverlayStyle {
            show_centers: !args.no_center_markers,
            ..Default::default()
        });

        Ok(Self {
            region: args.region.region()?,
            grid,
            offset,
            detect: settings.detect_options(args.min_size, args.max_size, args.detect_offset)?,
            template,
            resize,
            output_suffix: settings.output_suffix.clone(),
            grid_suffix: settings.grid_suffix.clone(),
            overlay,
        })
    }

    /// Resolve the grid for one raster.
    fn grid_for(&self, raster: &Raster, printer: &Printer) -> Result<GridSpec> {
        let grid = match self.grid {
            GridChoice::Fixed(n) => {
                let (ox, oy) = self.offset.unwrap_or((0, 0));
                GridSpec::new(n).with_offset(ox, oy)
            }
            GridChoice::Pixel(pixel) => {
                let bounds = self.region.bounds(raster)?;
                GridSpec::from_defined_pixel(pixel, (bounds.x, bounds.y))?
            }
            GridChoice::Detect => {
                let result = detect_with(raster, &self.region, &self.detect)?;
                report_detection(&result, printer);
                let grid = result.grid_spec();
                match self.offset {
                    Some((ox, oy)) => grid.with_offset(ox, oy),
                    None => grid,
                }
            }
        };
        Ok(grid)
    }
}

fn report_detection(result: &DetectionResult, printer: &Printer) {
    for candidate in &result.candidates {
        printer.verbose(
            "Candidate",
            &format!("{:>3}px  score {:.4}", candidate.cell_size, candidate.score),
        );
    }
    printer.verbose("Baseline", &format!("1:1 score {:.4}", result.baseline));

    if !result.found_grid() {
        printer.warning("Warning", "No pixel grid detected; output keeps the source resolution");
        return;
    }

    printer.status(
        "Detected",
        &format!(
            "{}px cells (confidence {:.2})",
            result.cell_size, result.confidence
        ),
    );
    if result.confidence < LOW_CONFIDENCE {
        printer.warning(
            "Warning",
            "Low detection confidence; consider --grid-size or --pixel",
        );
    }
}

/// Expand files and directories into the list of images to restore.
///
/// Directory walks skip files that already carry an output or overlay suffix.
fn collect_inputs(paths: &[PathBuf], settings: &Settings) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();

    for path in paths {
        if path.is_file() {
            inputs.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            return Err(PxError::Io {
                path: path.clone(),
                message: format!("File not found: {}", display_path(path)),
            });
        }

        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && is_supported_image(p))
            .filter(|p| {
                let stem = p.file_stem().and_then(|s| s.to_str()).unwrap_or("");
                !stem.ends_with(&settings.output_suffix) && !stem.ends_with(&settings.grid_suffix)
            })
            .collect();
        found.sort();
        inputs.extend(found);
    }

    if inputs.is_empty() {
        return Err(PxError::Parse {
            message: "No images to restore".to_string(),
            help: Some(format!("Supported formats: {}", SUPPORTED_EXTENSIONS.join(", "))),
        });
    }
    Ok(inputs)
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Output path for `input`: `<stem><suffix>.png` next to the input, or
/// inside `output` when it names a directory.
fn output_path(input: &Path, output: Option<&Path>, batch: bool, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let name = format!("{}{}.png", stem, suffix);

    match output {
        Some(out) if batch || out.is_dir() => out.join(name),
        Some(out) => out.to_path_buf(),
        None => input.with_file_name(name),
    }
}

fn restore_one(
    input: &Path,
    plan: &Plan,
    output: Option<&Path>,
    batch: bool,
    printer: &Printer,
) -> Result<Restored> {
    printer.status("Loading", &display_path(input));
    let raster = load_raster(input)?;
    printer.verbose(
        "Decoded",
        &format!("{}x{} pixels", raster.width(), raster.height()),
    );

    let grid = plan.grid_for(&raster, printer)?;
    let config = TransformConfig {
        grid,
        ..plan.template.clone()
    };

    let (restored, diagnostics) = transform(&raster, &plan.region, &config)?;
    printer.verbose(
        "Cells",
        &format!(
            "{} sampled, {} excluded, {} outside mask",
            diagnostics.cells_sampled, diagnostics.cells_excluded, diagnostics.cells_outside_mask
        ),
    );
    let (width, height) = (restored.width(), restored.height());
    let restored = fit_square(&restored, plan.resize)?;

    let out_path = output_path(input, output, batch, &plan.output_suffix);
    write_raster(&restored, &out_path)?;
    printer.success(
        "Restored",
        &format!(
            "{} ({}x{}, {}px cells)",
            display_path(&out_path),
            width,
            height,
            grid.cell_size
        ),
    );

    let overlay = match &plan.overlay {
        Some(style) => {
            let image = draw_grid_overlay(&raster, &plan.region, &config, style)?;
            let dir = out_path.parent().unwrap_or_else(|| Path::new(""));
            let path = output_path(input, Some(dir), true, &plan.grid_suffix);
            write_raster(&image, &path)?;
            printer.info("Overlay", &display_path(&path));
            Some(path)
        }
        None => None,
    };

    Ok(Restored {
        input: input.to_path_buf(),
        output: out_path,
        overlay,
        grid,
        width,
        height,
    })
}

pub fn run(args: RestoreArgs, settings: &Settings, printer: &Printer) -> Result<Vec<Restored>> {
    let plan = Plan::new(&args, settings)?;
    let inputs = collect_inputs(&args.inputs, settings)?;
    let batch = inputs.len() > 1;

    if batch {
        printer.info("Found", &plural(inputs.len(), "image", "images"));
    }

    let mut restored = Vec::with_capacity(inputs.len());
    for input in &inputs {
        restored.push(restore_one(input, &plan, args.output.as_deref(), batch, printer)?);
    }

    if batch {
        printer.success("Finished", &plural(restored.len(), "image", "images"));
    }
    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Verbosity;
    use crate::types::Colour;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: RestoreArgs,
    }

    fn args(argv: &[&str]) -> RestoreArgs {
        let mut full = vec!["restore"];
        full.extend_from_slice(argv);
        Harness::parse_from(full).args
    }

    fn quiet() -> Printer {
        Printer::with_verbosity(Verbosity::Quiet)
    }

    fn checkerboard(cells: u32, cell: u32) -> Raster {
        let size = cells * cell;
        Raster::from_fn(size, size, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Colour::rgb(255, 0, 0)
            } else {
                Colour::rgb(0, 0, 255)
            }
        })
        .unwrap()
    }

    #[test]
    fn test_restore_detects_grid() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("board.png");
        write_raster(&checkerboard(8, 8), &input).unwrap();

        let restored = run(
            args(&[input.to_str().unwrap()]),
            &Settings::default(),
            &quiet(),
        )
        .unwrap();

        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].output, dir.path().join("board_real.png"));
        assert_eq!(restored[0].grid, GridSpec::new(8));

        let out = load_raster(&restored[0].output).unwrap();
        assert_eq!((out.width(), out.height()), (8, 8));
        assert_eq!(out.get(0, 0), Colour::rgb(255, 0, 0));
        assert_eq!(out.get(1, 0), Colour::rgb(0, 0, 255));
    }

    #[test]
    fn test_restore_fixed_grid_with_exclusion_and_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("board.png");
        let output = dir.path().join("out.png");
        write_raster(&checkerboard(4, 4), &input).unwrap();

        let restored = run(
            args(&[
                input.to_str().unwrap(),
                "--grid-size",
                "4",
                "--exclude",
                "blue",
                "--tolerance",
                "0",
                "-o",
                output.to_str().unwrap(),
            ]),
            &Settings::default(),
            &quiet(),
        )
        .unwrap();

        assert_eq!(restored[0].output, output);
        let out = load_raster(&output).unwrap();
        assert_eq!(out.get(0, 0), Colour::rgb(255, 0, 0));
        assert!(out.get(1, 0).is_transparent());
    }

    #[test]
    fn test_restore_directory_batch_with_overlay() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let out = dir.path().join("out");
        write_raster(&checkerboard(4, 3), &src.join("a.png")).unwrap();
        write_raster(&checkerboard(2, 5), &src.join("b.png")).unwrap();
        // Previous output is not picked up again
        write_raster(&checkerboard(2, 1), &src.join("a_real.png")).unwrap();
        std::fs::write(src.join("notes.txt"), "not an image").unwrap();

        let restored = run(
            args(&[
                src.to_str().unwrap(),
                "--grid-size",
                "3",
                "--show-grid",
                "-o",
                out.to_str().unwrap(),
            ]),
            &Settings::default(),
            &quiet(),
        )
        .unwrap();

        let outputs: Vec<PathBuf> = restored.iter().map(|r| r.output.clone()).collect();
        assert_eq!(outputs, vec![out.join("a_real.png"), out.join("b_real.png")]);
        assert_eq!(restored[0].overlay, Some(out.join("a_grid.png")));
        assert!(out.join("b_grid.png").is_file());
        assert_eq!((restored[0].width, restored[0].height), (4, 4));
    }

    #[test]
    fn test_restore_pixel_definition() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("board.png");
        write_raster(&checkerboard(6, 4), &input).unwrap();

        let restored = run(
            args(&[input.to_str().unwrap(), "--pixel", "8,4,4,4"]),
            &Settings::default(),
            &quiet(),
        )
        .unwrap();
        assert_eq!(restored[0].grid, GridSpec::new(4));
        assert_eq!((restored[0].width, restored[0].height), (6, 6));
    }

    #[test]
    fn test_restore_resize_and_bit_depth() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("board.png");
        write_raster(&checkerboard(4, 2), &input).unwrap();

        let restored = run(
            args(&[
                input.to_str().unwrap(),
                "--grid-size",
                "2",
                "--bit-depth",
                "1",
                "--resize",
                "16",
            ]),
            &Settings::default(),
            &quiet(),
        )
        .unwrap();

        let out = load_raster(&restored[0].output).unwrap();
        assert_eq!((out.width(), out.height()), (16, 16));
        assert_eq!(out.get(0, 0), Colour::rgb(255, 0, 0));
    }

    #[test]
    fn test_restore_rejects_bad_options() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("board.png");
        write_raster(&checkerboard(4, 2), &input).unwrap();
        let path = input.to_str().unwrap();

        let err = run(args(&[path, "--bit-depth", "3"]), &Settings::default(), &quiet())
            .unwrap_err();
        assert_eq!(err.exit_code(), 6);

        let err = run(args(&[path, "--resize", "20"]), &Settings::default(), &quiet())
            .unwrap_err();
        assert!(matches!(err, PxError::Parse { .. }));

        let err = run(args(&[path, "--grid-size", "9"]), &Settings::default(), &quiet())
            .unwrap_err();
        assert!(matches!(err, PxError::InvalidGrid { .. }));

        let missing = dir.path().join("missing.png");
        let err = run(
            args(&[missing.to_str().unwrap()]),
            &Settings::default(),
            &quiet(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_settings_supply_defaults() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("board.png");
        write_raster(&checkerboard(4, 2), &input).unwrap();

        let settings = Settings::parse("output_suffix: \"-1x\"\nexclude: [red]\ntolerance: 0")
            .unwrap();
        let restored = run(
            args(&[input.to_str().unwrap(), "--grid-size", "2"]),
            &settings,
            &quiet(),
        )
        .unwrap();

        assert_eq!(restored[0].output, dir.path().join("board-1x.png"));
        let out = load_raster(&restored[0].output).unwrap();
        assert!(out.get(0, 0).is_transparent());
        assert_eq!(out.get(1, 0), Colour::rgb(0, 0, 255));
    }

    #[test]
    fn test_output_path() {
        let input = Path::new("art/hero.png");
        assert_eq!(
            output_path(input, None, false, "_real"),
            PathBuf::from("art/hero_real.png")
        );
        assert_eq!(
            output_path(input, Some(Path::new("dist/x.png")), false, "_real"),
            PathBuf::from("dist/x.png")
        );
        assert_eq!(
            output_path(input, Some(Path::new("dist")), true, "_grid"),
            PathBuf::from("dist/hero_grid.png")
        );
    }
}
