//! Measurement records and the in-memory store they are grouped in.
//!
//! The store is loaded from a CSV dataset with the columns
//! `Height, Weight, Bust/Chest, Waist, Hips, Body Shape Index, Gender`.
//! Heights are given as `F'I` (feet and inches) and converted to centimetres.
//! Rows with a missing or unparseable required value are dropped and counted;
//! they never abort the load.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

const CM_PER_FOOT: f64 = 30.48;
const CM_PER_INCH: f64 = 2.54;

/// Convert an `F'I` height string (e.g. `5'7`) to centimetres, rounded to 2 decimals.
///
/// Double quotes are ignored, so `5'7"` is accepted too. Returns `None` for
/// anything that is not exactly two integers separated by `'`.
pub fn convert_height(height: &str) -> Option<f64> {
    let cleaned: String = height.chars().filter(|&c| c != '"').collect();
    let (feet, inches) = cleaned.trim().split_once('\'')?;
    let feet: i64 = feet.trim().parse().ok()?;
    let inches: i64 = inches.trim().parse().ok()?;
    let cm = feet as f64 * CM_PER_FOOT + inches as f64 * CM_PER_INCH;
    Some((cm * 100.0).round() / 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = Error;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(Error::UnknownGender(s.to_string())),
        }
    }
}

/// Identifies one independently clustered population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    pub gender: Gender,
    pub body_shape: i64,
}

impl GroupKey {
    pub fn new(gender: Gender, body_shape: i64) -> Self {
        Self { gender, body_shape }
    }

    /// Build a key from an unnormalized gender string.
    pub fn parse(gender: &str, body_shape: i64) -> Result<Self> {
        Ok(Self::new(gender.parse()?, body_shape))
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.gender, self.body_shape)
    }
}

/// The five clustering features, in model order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub height_cm: f64,
    pub weight: f64,
    pub bust_chest: f64,
    pub waist: f64,
    pub hips: f64,
}

impl Features {
    pub const LEN: usize = 5;

    pub fn new(height_cm: f64, weight: f64, bust_chest: f64, waist: f64, hips: f64) -> Self {
        Self {
            height_cm,
            weight,
            bust_chest,
            waist,
            hips,
        }
    }

    /// Like [`Features::new`] with the height given as `F'I`.
    pub fn with_height_str(
        height: &str,
        weight: f64,
        bust_chest: f64,
        waist: f64,
        hips: f64,
    ) -> Result<Self> {
        let height_cm = convert_height(height).ok_or_else(|| Error::InvalidHeight(height.into()))?;
        Ok(Self::new(height_cm, weight, bust_chest, waist, hips))
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|x| x.is_finite())
    }

    pub fn to_array(self) -> [f64; Self::LEN] {
        [
            self.height_cm,
            self.weight,
            self.bust_chest,
            self.waist,
            self.hips,
        ]
    }

    /// Single-precision vector for the clustering models.
    pub fn to_point(self) -> Vec<f32> {
        self.to_array().iter().map(|&x| x as f32).collect()
    }
}

/// One cleaned row of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    #[serde(flatten)]
    pub features: Features,
    pub gender: Gender,
    pub body_shape: i64,
}

impl MeasurementRecord {
    pub fn group(&self) -> GroupKey {
        GroupKey::new(self.gender, self.body_shape)
    }
}

/// A dataset row as read, before coercion.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Height")]
    height: Option<String>,
    #[serde(rename = "Weight")]
    weight: Option<String>,
    #[serde(rename = "Bust/Chest")]
    bust_chest: Option<String>,
    #[serde(rename = "Waist")]
    waist: Option<String>,
    #[serde(rename = "Hips")]
    hips: Option<String>,
    #[serde(rename = "Body Shape Index")]
    body_shape: Option<String>,
    #[serde(rename = "Gender")]
    gender: Option<String>,
}

const REQUIRED_COLUMNS: [&str; 7] = [
    "Height",
    "Weight",
    "Bust/Chest",
    "Waist",
    "Hips",
    "Body Shape Index",
    "Gender",
];

fn missing(field: &str) -> String {
    format!("missing or unparseable {field}")
}

fn parse_number(value: Option<&str>, field: &str) -> std::result::Result<f64, String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| missing(field))
}

fn parse_body_shape(value: Option<&str>) -> std::result::Result<i64, String> {
    let value = value.map(str::trim).unwrap_or_default();
    if let Ok(v) = value.parse::<i64>() {
        return Ok(v);
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        _ => Err(missing("Body Shape Index")),
    }
}

impl TryFrom<RawRecord> for MeasurementRecord {
    type Error = String;

    fn try_from(raw: RawRecord) -> std::result::Result<Self, String> {
        let height_cm = raw
            .height
            .as_deref()
            .and_then(convert_height)
            .ok_or_else(|| missing("Height"))?;
        let features = Features::new(
            height_cm,
            parse_number(raw.weight.as_deref(), "Weight")?,
            parse_number(raw.bust_chest.as_deref(), "Bust/Chest")?,
            parse_number(raw.waist.as_deref(), "Waist")?,
            parse_number(raw.hips.as_deref(), "Hips")?,
        );
        let body_shape = parse_body_shape(raw.body_shape.as_deref())?;
        let gender = raw
            .gender
            .as_deref()
            .and_then(|g| g.parse::<Gender>().ok())
            .ok_or_else(|| missing("Gender"))?;
        Ok(MeasurementRecord {
            features,
            gender,
            body_shape,
        })
    }
}

/// Cleaned records indexed by population.
#[derive(Debug, Clone, Default)]
pub struct MeasurementStore {
    groups: BTreeMap<GroupKey, Vec<MeasurementRecord>>,
    dropped: usize,
}

impl MeasurementStore {
    /// Build a store from in-memory records, keeping their order within each group.
    ///
    /// Records with a non-finite measurement are dropped and counted, as in
    /// [`MeasurementStore::from_reader`].
    pub fn from_records(records: impl IntoIterator<Item = MeasurementRecord>) -> Self {
        let mut store = Self::default();
        for record in records {
            if !record.features.is_finite() {
                debug!(group = %record.group(), "dropping record with non-finite measurements");
                store.dropped += 1;
                continue;
            }
            store.insert(record);
        }
        store
    }

    /// Load a CSV dataset from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let store = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            records = store.len(),
            dropped = store.dropped(),
            "loaded measurement dataset"
        );
        Ok(store)
    }

    /// Load a CSV dataset from any reader.
    ///
    /// # Errors
    ///
    /// Fails when the input cannot be read or a required column is absent.
    /// Individual bad rows are dropped and counted in [`MeasurementStore::dropped`].
    pub fn from_reader(reader: impl io::Read) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(Error::MissingColumn(column));
            }
        }

        let mut store = Self::default();
        for (idx, row) in csv.deserialize::<RawRecord>().enumerate() {
            // Header is line 1.
            let fallback_line = idx as u64 + 2;
            let record = match row {
                Ok(raw) => MeasurementRecord::try_from(raw).map_err(|reason| (reason, None)),
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
                Err(e) => {
                    let line = e.position().map(csv::Position::line);
                    Err((e.to_string(), line))
                }
            };
            match record {
                Ok(record) => store.insert(record),
                Err((reason, line)) => {
                    let line = line.unwrap_or(fallback_line);
                    let err = Error::InvalidRecord { line, reason };
                    debug!(%err, "dropping dataset row");
                    store.dropped += 1;
                }
            }
        }
        Ok(store)
    }

    pub fn insert(&mut self, record: MeasurementRecord) {
        self.groups.entry(record.group()).or_default().push(record);
    }

    /// Records of one group, in load order.
    pub fn records(&self, group: &GroupKey) -> Option<&[MeasurementRecord]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    pub fn contains_group(&self, group: &GroupKey) -> bool {
        self.groups.contains_key(group)
    }

    /// Groups and their records, in [`GroupKey`] order.
    pub fn groups(&self) -> impl Iterator<Item = (&GroupKey, &[MeasurementRecord])> {
        self.groups.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Total number of kept records.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Rows dropped while loading.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}
