//! Colour-change scanning along one axis.
//!
//! Every row (for the horizontal axis) or column (for the vertical axis) of
//! the region is walked pixel by pixel. A change is recorded at position `p`
//! when pixel `p` differs from pixel `p - 1` by more than the threshold on
//! any channel. Gaps between consecutive boundaries on the same scan line are
//! collected into a histogram, where the edges of the region's bounding box
//! count as boundaries too. Edges of a polygon mask inside the box do not.

use std::collections::BTreeMap;

use crate::types::{Raster, Rect, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Inclusion mask for the pixels of a region's bounding box.
pub struct Mask {
    bounds: Rect,
    inside: Vec<bool>,
}

impl Mask {
    pub fn new(region: &Region, bounds: Rect) -> Self {
        let inside = match region.mask() {
            Some(_) => (0..bounds.height)
                .flat_map(|dy| (0..bounds.width).map(move |dx| (dx, dy)))
                .map(|(dx, dy)| region.includes(bounds.x + dx, bounds.y + dy))
                .collect(),
            None => vec![true; bounds.area() as usize],
        };
        Self { bounds, inside }
    }

    /// Whether the pixel at region-relative (dx, dy) is selected.
    pub fn contains(&self, dx: u32, dy: u32) -> bool {
        self.inside[(dy * self.bounds.width + dx) as usize]
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Change statistics for one axis of a region.
#[derive(Debug, Clone, Default)]
pub struct AxisProfile {
    /// Extent of the region along the axis.
    pub len: u32,
    /// `changes[p]`: scan lines with a change between `p - 1` and `p`.
    pub changes: Vec<u32>,
    /// `compared[p]`: scan lines where both `p - 1` and `p` were in the mask.
    pub compared: Vec<u32>,
    /// Gap length -> occurrences.
    pub gaps: BTreeMap<u32, u32>,
}

impl AxisProfile {
    pub fn total_gaps(&self) -> u32 {
        self.gaps.values().sum()
    }

    pub fn total_changes(&self) -> u32 {
        self.changes.iter().sum()
    }

    /// Whether any scan line changed at `pos`; `None` if nothing was compared there.
    pub fn supported(&self, pos: u32) -> Option<bool> {
        let compared = *self.compared.get(pos as usize)?;
        if compared == 0 {
            return None;
        }
        Some(self.changes[pos as usize] > 0)
    }
}

/// Scan `raster` inside `mask` along `axis`.
pub fn scan_axis(raster: &Raster, mask: &Mask, axis: Axis, threshold: u8) -> AxisProfile {
    let bounds = mask.bounds();
    let (len, lines) = match axis {
        Axis::Horizontal => (bounds.width, bounds.height),
        Axis::Vertical => (bounds.height, bounds.width),
    };

    let mut profile = AxisProfile {
        len,
        changes: vec![0; len as usize],
        compared: vec![0; len as usize],
        gaps: BTreeMap::new(),
    };

    for line in 0..lines {
        let mut prev = None;
        let mut last_boundary: Option<u32> = None;

        for pos in 0..len {
            let (dx, dy) = match axis {
                Axis::Horizontal => (pos, line),
                Axis::Vertical => (line, pos),
            };

            if !mask.contains(dx, dy) {
                prev = None;
                last_boundary = None;
                continue;
            }

            let colour = raster.get(bounds.x + dx, bounds.y + dy);
            match prev {
                None if pos == 0 => last_boundary = Some(0),
                None => {}
                Some(previous) => {
                    profile.compared[pos as usize] += 1;
                    if colour.max_channel_diff(previous) > threshold {
                        profile.changes[pos as usize] += 1;
                        if let Some(last) = last_boundary {
                            *profile.gaps.entry(pos - last).or_insert(0) += 1;
                        }
                        last_boundary = Some(pos);
                    }
                }
            }
            prev = Some(colour);
        }

        // Close the run at the far edge, unless the line never changed
        if prev.is_some() {
            if let Some(last) = last_boundary.filter(|&last| last > 0) {
                *profile.gaps.entry(len - last).or_insert(0) += 1;
            }
        }
    }

    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Colour, Polygon};

    fn stripes(width: u32, height: u32, stripe: u32) -> Raster {
        Raster::from_fn(width, height, |x, _| {
            if (x / stripe) % 2 == 0 {
                Colour::BLACK
            } else {
                Colour::WHITE
            }
        })
        .unwrap()
    }

    #[test]
    fn test_horizontal_changes_and_gaps() {
        let raster = stripes(12, 2, 3);
        let bounds = Rect::new(0, 0, 12, 2);
        let mask = Mask::new(&Region::Full, bounds);
        let profile = scan_axis(&raster, &mask, Axis::Horizontal, 0);

        assert_eq!(profile.len, 12);
        assert_eq!(profile.changes[3], 2);
        assert_eq!(profile.changes[6], 2);
        assert_eq!(profile.changes[9], 2);
        assert_eq!(profile.total_changes(), 6);
        // Both region edges close a gap: 0-3, 3-6, 6-9, 9-12 on each row
        assert_eq!(profile.gaps.get(&3), Some(&8));
        assert_eq!(profile.total_gaps(), 8);
        assert_eq!(profile.compared[0], 0);
        assert_eq!(profile.supported(3), Some(true));
        assert_eq!(profile.supported(4), Some(false));
        assert_eq!(profile.supported(0), None);
    }

    #[test]
    fn test_vertical_axis_sees_no_changes_in_vertical_stripes() {
        let raster = stripes(12, 6, 3);
        let bounds = Rect::new(0, 0, 12, 6);
        let mask = Mask::new(&Region::Full, bounds);
        let profile = scan_axis(&raster, &mask, Axis::Vertical, 0);

        assert_eq!(profile.len, 6);
        assert_eq!(profile.total_changes(), 0);
        assert!(profile.gaps.is_empty());
    }

    #[test]
    fn test_threshold_ignores_small_differences() {
        let raster = Raster::from_fn(8, 1, |x, _| Colour::rgb((x * 4) as u8, 0, 0)).unwrap();
        let bounds = Rect::new(0, 0, 8, 1);
        let mask = Mask::new(&Region::Full, bounds);

        assert_eq!(scan_axis(&raster, &mask, Axis::Horizontal, 4).total_changes(), 0);
        assert_eq!(scan_axis(&raster, &mask, Axis::Horizontal, 3).total_changes(), 7);
    }

    #[test]
    fn test_mask_breaks_gap_runs() {
        let raster = stripes(12, 1, 3);
        // Mask covers only x < 7
        let poly = Polygon::new(vec![(-1, -4), (7, -4), (7, 8), (-1, 8)]).unwrap();
        let region = Region::Polygon(poly);
        let bounds = Rect::new(0, 0, 12, 1);
        let mask = Mask::new(&region, bounds);
        let profile = scan_axis(&raster, &mask, Axis::Horizontal, 0);

        assert_eq!(profile.changes[3], 1);
        assert_eq!(profile.changes[6], 1);
        assert_eq!(profile.changes[9], 0);
        assert_eq!(profile.compared[9], 0);
        // 0-3 and 3-6; the mask edge at 7 closes nothing
        assert_eq!(profile.gaps.get(&3), Some(&2));
        assert_eq!(profile.total_gaps(), 2);
    }

    #[test]
    fn test_single_change_is_measured_from_the_edges() {
        // One boundary at x = 8 in a 12px row
        let raster = Raster::from_fn(12, 1, |x, _| {
            if x < 8 {
                Colour::BLACK
            } else {
                Colour::WHITE
            }
        })
        .unwrap();
        let bounds = Rect::new(0, 0, 12, 1);
        let mask = Mask::new(&Region::Full, bounds);
        let profile = scan_axis(&raster, &mask, Axis::Horizontal, 10);

        assert_eq!(profile.gaps.get(&8), Some(&1));
        assert_eq!(profile.gaps.get(&4), Some(&1));
        assert_eq!(profile.total_gaps(), 2);
    }

    #[test]
    fn test_uniform_line_has_no_gaps() {
        let raster = Raster::filled(9, 3, Colour::WHITE).unwrap();
        let bounds = Rect::new(0, 0, 9, 3);
        let mask = Mask::new(&Region::Full, bounds);
        let profile = scan_axis(&raster, &mask, Axis::Horizontal, 10);

        assert_eq!(profile.total_changes(), 0);
        assert!(profile.gaps.is_empty());
    }
}
