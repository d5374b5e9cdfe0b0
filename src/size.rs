//! Size labels, tracked properties and static size tables.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A per-cluster size label that confidence scores are kept over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SizeLabel {
    S,
    M,
    L,
    XL,
}

impl SizeLabel {
    /// All labels, in tie-break order.
    pub const ALL: [SizeLabel; 4] = [SizeLabel::S, SizeLabel::M, SizeLabel::L, SizeLabel::XL];

    pub fn as_str(self) -> &'static str {
        match self {
            SizeLabel::S => "S",
            SizeLabel::M => "M",
            SizeLabel::L => "L",
            SizeLabel::XL => "XL",
        }
    }
}

impl fmt::Display for SizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeLabel {
    type Err = Error;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Ok(SizeLabel::S),
            "M" => Ok(SizeLabel::M),
            "L" => Ok(SizeLabel::L),
            "XL" => Ok(SizeLabel::XL),
            _ => Err(Error::UnknownSize(s.to_string())),
        }
    }
}

/// A body measurement that carries its own confidence distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Property {
    Height,
    Weight,
    #[serde(rename = "Bust/Chest")]
    BustChest,
    Waist,
    Hips,
}

impl Property {
    pub const ALL: [Property; 5] = [
        Property::Height,
        Property::Weight,
        Property::BustChest,
        Property::Waist,
        Property::Hips,
    ];

    /// Name as used in feedback requests and dataset headers.
    pub fn name(self) -> &'static str {
        match self {
            Property::Height => "Height",
            Property::Weight => "Weight",
            Property::BustChest => "Bust/Chest",
            Property::Waist => "Waist",
            Property::Hips => "Hips",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Property {
    type Err = Error;

    /// Exact match against [`Property::name`].
    fn from_str(s: &str) -> Result<Self> {
        Property::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| Error::UnknownProperty(s.to_string()))
    }
}

/// Confidence of each [`SizeLabel`] for one (group, cluster, property) entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeScores {
    #[serde(rename = "S")]
    pub s: f64,
    #[serde(rename = "M")]
    pub m: f64,
    #[serde(rename = "L")]
    pub l: f64,
    #[serde(rename = "XL")]
    pub xl: f64,
}

impl SizeScores {
    /// Equal confidence in every size.
    pub const UNIFORM: SizeScores = SizeScores {
        s: 0.25,
        m: 0.25,
        l: 0.25,
        xl: 0.25,
    };

    pub const ZERO: SizeScores = SizeScores {
        s: 0.0,
        m: 0.0,
        l: 0.0,
        xl: 0.0,
    };

    pub fn get(&self, label: SizeLabel) -> f64 {
        match label {
            SizeLabel::S => self.s,
            SizeLabel::M => self.m,
            SizeLabel::L => self.l,
            SizeLabel::XL => self.xl,
        }
    }

    pub fn get_mut(&mut self, label: SizeLabel) -> &mut f64 {
        match label {
            SizeLabel::S => &mut self.s,
            SizeLabel::M => &mut self.m,
            SizeLabel::L => &mut self.l,
            SizeLabel::XL => &mut self.xl,
        }
    }

    pub fn total(&self) -> f64 {
        self.s + self.m + self.l + self.xl
    }

    /// Label with the highest score; ties keep the earlier label in S, M, L, XL order.
    pub fn best(&self) -> SizeLabel {
        let mut best = SizeLabel::S;
        for label in SizeLabel::ALL {
            if self.get(label) > self.get(best) {
                best = label;
            }
        }
        best
    }

    /// Scale so the scores sum to 1. A zero total is left untouched.
    pub fn normalize(&mut self) {
        let total = self.total();
        if total > 0.0 {
            for label in SizeLabel::ALL {
                *self.get_mut(label) /= total;
            }
        }
    }
}

impl Default for SizeScores {
    fn default() -> Self {
        SizeScores::UNIFORM
    }
}

impl std::ops::AddAssign for SizeScores {
    fn add_assign(&mut self, rhs: Self) {
        self.s += rhs.s;
        self.m += rhs.m;
        self.l += rhs.l;
        self.xl += rhs.xl;
    }
}

/// Descriptive labels for the per-population clusters, indexed by cluster id.
pub const SIZE_MAPPING: [&str; 11] = [
    "Short-Small",
    "Short-Medium",
    "Short-Full",
    "Medium-Very Small",
    "Medium-Small",
    "Medium-Medium",
    "Medium-Full",
    "Tall-Very Small",
    "Tall-Small",
    "Tall-Medium",
    "Tall-Full",
];

/// Descriptive label for a cluster id, or `"Unknown"` past the mapping.
pub fn cluster_label(cluster: usize) -> &'static str {
    SIZE_MAPPING.get(cluster).copied().unwrap_or("Unknown")
}

/// A cross-population size band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GenericSize {
    XS,
    S,
    M,
    L,
    XL,
}

impl GenericSize {
    pub const ALL: [GenericSize; 5] = [
        GenericSize::XS,
        GenericSize::S,
        GenericSize::M,
        GenericSize::L,
        GenericSize::XL,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GenericSize::XS => "XS",
            GenericSize::S => "S",
            GenericSize::M => "M",
            GenericSize::L => "L",
            GenericSize::XL => "XL",
        }
    }

    /// Labels for a chart of `n` bands, smallest first.
    ///
    /// Fewer than five bands keep the middle of the range rather than its
    /// start, so a three-band chart is S/M/L and not XS/S/M.
    pub fn labels_for(n: usize) -> Result<&'static [GenericSize]> {
        use GenericSize::*;
        let labels: &'static [GenericSize] = match n {
            1 => &[M],
            2 => &[S, L],
            3 => &[S, M, L],
            4 => &[S, M, L, XL],
            5 => &GenericSize::ALL,
            _ => {
                return Err(Error::InvalidParameter {
                    name: "num_sizes",
                    message: "must be between 1 and 5",
                })
            }
        };
        Ok(labels)
    }

    /// Fixed chest/bust, waist and hip ranges for this size, in inches.
    pub fn reference(self) -> ReferenceMeasurements {
        let (chest, waist, hips) = match self {
            GenericSize::XS => ((32.0, 33.0), (24.0, 25.0), (34.5, 35.5)),
            GenericSize::S => ((34.0, 35.0), (26.0, 27.0), (36.0, 37.0)),
            GenericSize::M => ((36.0, 37.0), (28.0, 29.0), (38.5, 39.5)),
            GenericSize::L => ((38.5, 40.0), (30.5, 32.0), (41.0, 42.5)),
            GenericSize::XL => ((41.5, 43.0), (33.5, 35.0), (44.0, 45.5)),
        };
        ReferenceMeasurements {
            chest_bust_in: Range::new(chest.0, chest.1),
            waist_in: Range::new(waist.0, waist.1),
            hips_in: Range::new(hips.0, hips.1),
        }
    }
}

impl fmt::Display for GenericSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Smallest range covering both.
    pub fn union(self, other: Range) -> Range {
        Range::new(self.min.min(other.min), self.max.max(other.max))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Static garment measurements for a generic size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceMeasurements {
    pub chest_bust_in: Range,
    pub waist_in: Range,
    pub hips_in: Range,
}
