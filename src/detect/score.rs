//! Uniformity scoring of candidate cell sizes.
//!
//! An axis fits cell size `n` when the gaps between boundaries are multiples
//! of `n` and when the grid lines of period `n` actually carry changes. The
//! second term keeps subdivisions of the true grid (n/2, n/3) from tying with
//! it: half of their lines fall inside solid cells.
//!
//! An axis without any colour change says nothing about the grid. It is left
//! out of the combined score instead of zeroing it, so vertical stripes are
//! judged on their rows alone.

use super::scan::AxisProfile;

/// Weight of a gap that is one pixel off a multiple of the cell size.
const NEAR_MISS_WEIGHT: f64 = 0.5;

/// Exponent applied to the combined evidence. Spreads near-perfect fits
/// apart so the runner-up falls well behind the winner.
const SHARPNESS: i32 = 8;

/// Fraction of gaps that are multiples of `n`, with near misses at half
/// weight. `None` when the axis has no gaps at all.
pub fn gap_fit(profile: &AxisProfile, n: u32) -> Option<f64> {
    let total = profile.total_gaps();
    if total == 0 || n == 0 {
        return None;
    }

    let weighted: f64 = profile
        .gaps
        .iter()
        .map(|(&gap, &count)| {
            let r = gap % n;
            let weight = if r == 0 {
                1.0
            } else if r == 1 || r == n - 1 {
                NEAR_MISS_WEIGHT
            } else {
                0.0
            };
            weight * count as f64
        })
        .sum();

    Some(weighted / total as f64)
}

/// Best phase in `0..n` and the share of its grid lines that carry a change.
///
/// Lines are the positions `phase + k * n` strictly inside the region that
/// were compared at least once. Ties go to the smallest phase.
pub fn phase_coverage(profile: &AxisProfile, n: u32) -> (u32, f64) {
    let mut best = (0, 0.0);
    if n == 0 {
        return best;
    }

    for phase in 0..n {
        let (lines, supported) = (phase..profile.len)
            .step_by(n as usize)
            .filter(|&pos| pos > 0)
            .filter_map(|pos| profile.supported(pos))
            .fold((0u32, 0u32), |(lines, hits), hit| (lines + 1, hits + hit as u32));
        if lines == 0 {
            continue;
        }
        let coverage = supported as f64 / lines as f64;
        if coverage > best.1 {
            best = (phase, coverage);
        }
    }

    best
}

/// What one axis says about cell size `n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisEvidence {
    pub fit: f64,
    pub coverage: f64,
    pub phase: u32,
    /// Number of gaps behind the fit.
    pub weight: f64,
}

/// Evidence from `profile` for size `n`, or `None` when the axis never changes.
pub fn axis_evidence(profile: &AxisProfile, n: u32) -> Option<AxisEvidence> {
    if profile.total_changes() == 0 {
        return None;
    }
    let fit = gap_fit(profile, n)?;
    let (phase, coverage) = phase_coverage(profile, n);
    Some(AxisEvidence {
        fit,
        coverage,
        phase,
        weight: profile.total_gaps() as f64,
    })
}

/// Score for cell size `n` over all informative axes, in `[0, 1]`.
///
/// Fit and coverage are averaged across axes weighted by gap count, then
/// multiplied and sharpened. Zero when no axis changes.
pub fn combined(profiles: &[&AxisProfile], n: u32) -> f64 {
    let evidence: Vec<AxisEvidence> = profiles
        .iter()
        .filter_map(|profile| axis_evidence(profile, n))
        .collect();

    let total: f64 = evidence.iter().map(|e| e.weight).sum();
    if total == 0.0 {
        return 0.0;
    }

    let fit = evidence.iter().map(|e| e.fit * e.weight).sum::<f64>() / total;
    let coverage = evidence.iter().map(|e| e.coverage * e.weight).sum::<f64>() / total;
    (fit * coverage).powi(SHARPNESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Profile of `lines` identical scan lines changing at `positions`,
    /// with the region edges closing the first and last gap.
    fn profile(len: u32, lines: u32, positions: &[u32]) -> AxisProfile {
        let mut changes = vec![0; len as usize];
        let mut compared = vec![lines; len as usize];
        compared[0] = 0;
        for &p in positions {
            changes[p as usize] = lines;
        }
        let mut gaps = BTreeMap::new();
        if !positions.is_empty() {
            let bounded: Vec<u32> = std::iter::once(0)
                .chain(positions.iter().copied())
                .chain(std::iter::once(len))
                .collect();
            for w in bounded.windows(2) {
                *gaps.entry(w[1] - w[0]).or_insert(0) += lines;
            }
        }
        AxisProfile {
            len,
            changes,
            compared,
            gaps,
        }
    }

    #[test]
    fn test_gap_fit() {
        let p = profile(32, 4, &[8, 16, 24]);
        assert_eq!(gap_fit(&p, 8), Some(1.0));
        assert_eq!(gap_fit(&p, 4), Some(1.0));
        assert_eq!(gap_fit(&p, 16), Some(0.0));
        assert_eq!(gap_fit(&p, 7), Some(NEAR_MISS_WEIGHT));
        assert_eq!(gap_fit(&p, 9), Some(NEAR_MISS_WEIGHT));
    }

    #[test]
    fn test_gap_fit_without_changes() {
        let p = profile(32, 4, &[]);
        assert_eq!(gap_fit(&p, 8), None);
        assert_eq!(axis_evidence(&p, 8), None);
    }

    #[test]
    fn test_single_change_still_has_gaps() {
        let p = profile(32, 4, &[8]);
        // 8 and 24 are both multiples of 8
        assert_eq!(gap_fit(&p, 8), Some(1.0));
        assert_eq!(gap_fit(&p, 16), Some(0.5));
    }

    #[test]
    fn test_phase_coverage_finds_offset() {
        let p = profile(30, 2, &[3, 9, 15, 21, 27]);
        assert_eq!(phase_coverage(&p, 6), (3, 1.0));
    }

    #[test]
    fn test_coverage_counts_supported_lines() {
        let p = profile(64, 8, &[8, 16, 24, 32, 40, 48, 56]);
        assert_eq!(phase_coverage(&p, 8), (0, 1.0));
        // Lines at 4, 8, ..., 60: only the odd multiples of 4 are empty
        assert_eq!(phase_coverage(&p, 4), (0, 7.0 / 15.0));
    }

    #[test]
    fn test_subdivision_scores_lower() {
        let p = profile(64, 8, &[8, 16, 24, 32, 40, 48, 56]);
        let true_score = combined(&[&p, &p], 8);
        let half_score = combined(&[&p, &p], 4);

        assert_eq!(true_score, 1.0);
        assert!(half_score < 0.01, "half score {}", half_score);
    }

    #[test]
    fn test_axis_without_changes_is_neutral() {
        let stripes = profile(32, 32, &[4, 8, 12, 16, 20, 24, 28]);
        let flat = profile(32, 32, &[]);

        assert_eq!(combined(&[&stripes, &flat], 4), combined(&[&stripes], 4));
        assert_eq!(combined(&[&stripes, &flat], 4), 1.0);
        assert_eq!(combined(&[&flat, &flat], 4), 0.0);
    }

    #[test]
    fn test_axes_weighted_by_gap_count() {
        let dense = profile(32, 32, &[4, 8, 12, 16, 20, 24, 28]);
        let sparse = profile(32, 1, &[6]);
        let evidence = axis_evidence(&sparse, 4).unwrap();
        assert_eq!(evidence.weight, 2.0);

        // The one-line axis pulls the score down only slightly
        let score = combined(&[&dense, &sparse], 4);
        assert!(score > 0.85 && score < 1.0, "score {}", score);
    }
}
