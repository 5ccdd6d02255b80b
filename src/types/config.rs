//! Per-run transform configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PxError, Result};

use super::{Colour, GridSpec};

/// Output precision per colour channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BitDepth {
    One,
    Two,
    Four,
    #[default]
    Eight,
}

impl BitDepth {
    pub fn bits(self) -> u32 {
        match self {
            BitDepth::One => 1,
            BitDepth::Two => 2,
            BitDepth::Four => 4,
            BitDepth::Eight => 8,
        }
    }

    /// Quantize one channel to `2^bits` evenly spaced levels over 0..=255.
    pub fn quantize(self, value: u8) -> u8 {
        if self == BitDepth::Eight {
            return value;
        }
        let levels = ((1u32 << self.bits()) - 1) as f64;
        let step = 255.0 / levels;
        ((value as f64 / step).round() * step).round().clamp(0.0, 255.0) as u8
    }

    /// Quantize the colour channels, leaving alpha untouched.
    pub fn quantize_colour(self, c: Colour) -> Colour {
        Colour::new(
            self.quantize(c.r),
            self.quantize(c.g),
            self.quantize(c.b),
            c.a,
        )
    }
}

impl TryFrom<u32> for BitDepth {
    type Error = PxError;

    fn try_from(bits: u32) -> Result<Self> {
        match bits {
            1 => Ok(BitDepth::One),
            2 => Ok(BitDepth::Two),
            4 => Ok(BitDepth::Four),
            8 => Ok(BitDepth::Eight),
            depth => Err(PxError::UnsupportedBitDepth { depth }),
        }
    }
}

impl From<BitDepth> for u32 {
    fn from(depth: BitDepth) -> u32 {
        depth.bits()
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// How a cell's representative colour is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SampleMode {
    /// The single pixel at the cell centre.
    #[default]
    Center,
    /// Mean of the 3x3 neighbourhood around the centre, kept inside the cell.
    Average,
}

/// One excluded colour and its match tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exclusion {
    pub colour: Colour,
    /// Maximum Euclidean RGB distance still counted as a match.
    pub tolerance: u32,
}

impl Exclusion {
    pub fn new(colour: Colour, tolerance: u32) -> Self {
        Self { colour, tolerance }
    }

    pub fn matches(&self, c: Colour) -> bool {
        let tol = self.tolerance as u64;
        (c.distance_sq(self.colour) as u64) <= tol * tol
    }
}

/// Ordered set of excluded colours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorExclusionSpec {
    entries: Vec<Exclusion>,
}

impl ColorExclusionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; duplicates of an existing colour replace its tolerance.
    pub fn push(&mut self, entry: Exclusion) {
        match self.entries.iter_mut().find(|e| e.colour == entry.colour) {
            Some(existing) => existing.tolerance = entry.tolerance,
            None => self.entries.push(entry),
        }
    }

    pub fn with(mut self, colour: Colour, tolerance: u32) -> Self {
        self.push(Exclusion::new(colour, tolerance));
        self
    }

    /// Parse colour strings that all share one tolerance.
    pub fn parse_all<S: AsRef<str>>(colours: &[S], tolerance: u32) -> Result<Self> {
        let mut spec = Self::new();
        for s in colours {
            spec.push(Exclusion::new(Colour::from_str(s.as_ref())?, tolerance));
        }
        Ok(spec)
    }

    pub fn entries(&self) -> &[Exclusion] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry matches `c`.
    pub fn matches(&self, c: Colour) -> bool {
        self.entries.iter().any(|e| e.matches(c))
    }
}

/// Everything the transformer needs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformConfig {
    pub grid: GridSpec,
    pub bit_depth: BitDepth,
    pub excluded: ColorExclusionSpec,
    pub sample: SampleMode,
}

impl TransformConfig {
    /// Default config for a grid: 8-bit, no exclusions, centre sampling.
    pub fn new(grid: GridSpec) -> Self {
        Self {
            grid,
            bit_depth: BitDepth::Eight,
            excluded: ColorExclusionSpec::new(),
            sample: SampleMode::Center,
        }
    }

    pub fn with_bit_depth(self, bit_depth: BitDepth) -> Self {
        Self { bit_depth, ..self }
    }

    pub fn with_exclusions(self, excluded: ColorExclusionSpec) -> Self {
        Self { excluded, ..self }
    }

    pub fn with_sample(self, sample: SampleMode) -> Self {
        Self { sample, ..self }
    }
}
