//! Grid size detection.
//!
//! Infers the cell size of upscaled pixel art from the spacing of colour
//! changes along rows and columns. Every candidate size in the search range
//! is scored on the axes that change at all; the best candidate wins, with
//! ties going to the coarser grid.

mod scan;
mod score;

use serde::Serialize;

use crate::error::{PxError, Result};
use crate::types::{GridSpec, Raster, Rect, Region};

use scan::{scan_axis, AxisProfile, Axis, Mask};

/// Default per-channel difference above which neighbouring pixels differ.
pub const DEFAULT_CHANGE_THRESHOLD: u8 = 10;

/// Scores closer than this are treated as equal.
const SCORE_EPSILON: f64 = 1e-9;

/// Inclusive range of cell sizes to try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CandidateRange {
    pub min: u32,
    pub max: u32,
}

impl CandidateRange {
    pub fn new(min: u32, max: u32) -> Result<Self> {
        if min == 0 || min > max {
            return Err(PxError::Parse {
                message: format!("Invalid candidate range {}..={}", min, max),
                help: Some("The range needs 1 <= min <= max".to_string()),
            });
        }
        Ok(Self { min, max })
    }

    /// `2..=min(w, h) / 2` for a region, never narrower than `2..=2`.
    pub fn for_region(bounds: &Rect) -> Self {
        let max = (bounds.width.min(bounds.height) / 2).max(2);
        Self { min: 2, max }
    }

    /// Sizes in the range that fit inside the region, skipping the size-1 baseline.
    fn sizes(&self, bounds: &Rect) -> impl Iterator<Item = u32> {
        let limit = bounds.width.min(bounds.height);
        self.min.max(2)..=self.max.min(limit)
    }
}

/// Options for [`detect_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectOptions {
    /// Search range; derived from the region when `None`.
    pub range: Option<CandidateRange>,
    /// Per-channel difference that counts as a colour change.
    pub change_threshold: u8,
    /// Also search the grid offset for the winning size.
    pub detect_offset: bool,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            range: None,
            change_threshold: DEFAULT_CHANGE_THRESHOLD,
            detect_offset: false,
        }
    }
}

/// Score of a single candidate size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    pub cell_size: u32,
    pub score: f64,
}

/// Outcome of a detection run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub cell_size: u32,
    /// `(best - runner_up) / best`, in `[0, 1]`.
    pub confidence: f64,
    /// Grid offset relative to the region origin, when requested.
    pub offset: Option<(u32, u32)>,
    /// Every evaluated size, smallest first.
    pub candidates: Vec<Candidate>,
    /// Score of the 1:1 interpretation; a winner must beat it.
    pub baseline: f64,
}

impl DetectionResult {
    /// Grid spec for the detected size and offset.
    pub fn grid_spec(&self) -> GridSpec {
        let (ox, oy) = self.offset.unwrap_or((0, 0));
        GridSpec::new(self.cell_size).with_offset(ox, oy)
    }

    /// Whether a grid coarser than 1:1 was found.
    pub fn found_grid(&self) -> bool {
        self.cell_size > 1
    }
}

/// Detect the cell size of `raster` within `region`.
pub fn detect(
    raster: &Raster,
    region: &Region,
    range: Option<CandidateRange>,
) -> Result<DetectionResult> {
    detect_with(
        raster,
        region,
        &DetectOptions {
            range,
            ..Default::default()
        },
    )
}

/// Detect with explicit options.
pub fn detect_with(
    raster: &Raster,
    region: &Region,
    options: &DetectOptions,
) -> Result<DetectionResult> {
    let bounds = region.bounds(raster)?;
    if bounds.area() < 4 || bounds.width < 2 || bounds.height < 2 {
        return Err(PxError::InvalidRegion {
            message: format!(
                "a {}x{} region cannot contain a 2x2 grid",
                bounds.width, bounds.height
            ),
            help: Some("Select a region of at least 2x2 pixels".to_string()),
        });
    }

    let mask = Mask::new(region, bounds);
    let horizontal = scan_axis(raster, &mask, Axis::Horizontal, options.change_threshold);
    let vertical = scan_axis(raster, &mask, Axis::Vertical, options.change_threshold);

    let range = options
        .range
        .unwrap_or_else(|| CandidateRange::for_region(&bounds));

    let candidates: Vec<Candidate> = range
        .sizes(&bounds)
        .map(|n| Candidate {
            cell_size: n,
            score: combined_score(&horizontal, &vertical, n),
        })
        .collect();

    let baseline = combined_score(&horizontal, &vertical, 1);

    let Some((winner, runner_up)) = rank(&candidates) else {
        return Ok(no_grid(candidates, baseline));
    };
    if winner.score <= SCORE_EPSILON || winner.score <= baseline {
        return Ok(no_grid(candidates, baseline));
    }

    let confidence = match runner_up {
        Some(second) => ((winner.score - second.score) / winner.score).clamp(0.0, 1.0),
        None => 0.0,
    };

    let offset = options.detect_offset.then(|| {
        // An axis that never changes has no phase to find
        let phase = |profile: &AxisProfile| {
            score::axis_evidence(profile, winner.cell_size).map_or(0, |e| e.phase)
        };
        (phase(&horizontal), phase(&vertical))
    });

    Ok(DetectionResult {
        cell_size: winner.cell_size,
        confidence,
        offset,
        candidates,
        baseline,
    })
}

fn combined_score(horizontal: &AxisProfile, vertical: &AxisProfile, n: u32) -> f64 {
    score::combined(&[horizontal, vertical], n)
}

/// Best and second-best candidates. Ties prefer the larger cell size, then
/// the earlier candidate.
fn rank(candidates: &[Candidate]) -> Option<(Candidate, Option<Candidate>)> {
    let mut order: Vec<(usize, Candidate)> = candidates.iter().copied().enumerate().collect();
    order.sort_by(|(ia, a), (ib, b)| {
        let by_score = if (a.score - b.score).abs() <= SCORE_EPSILON {
            std::cmp::Ordering::Equal
        } else {
            b.score.total_cmp(&a.score)
        };
        by_score
            .then(b.cell_size.cmp(&a.cell_size))
            .then(ia.cmp(ib))
    });

    let mut iter = order.into_iter().map(|(_, c)| c);
    let best = iter.next()?;
    Some((best, iter.next()))
}

fn no_grid(candidates: Vec<Candidate>, baseline: f64) -> DetectionResult {
    DetectionResult {
        cell_size: 1,
        confidence: 0.0,
        offset: None,
        candidates,
        baseline,
    }
}
