//! Garment size recommendation from body measurements.
//!
//! `presize` partitions historical measurements into clusters per
//! (gender, body shape) population, keeps a confidence distribution over
//! sizes S/M/L/XL for each cluster and body measurement, refines those
//! distributions from user feedback, and merges clusters into generic
//! XS–XL size charts.
//!
//! The entry point is [`SizingEngine`]: build it once from a dataset, then
//! predict, adjust and export charts against it. Engine state lives in memory
//! only.
//!
//! ```rust
//! use presize::{EngineConfig, Features, Gender, GroupKey, MeasurementRecord, MeasurementStore, SizingEngine};
//!
//! let records = (0..15).map(|i| MeasurementRecord {
//!     features: Features::new(150.0 + i as f64 * 2.0, 50.0 + i as f64, 85.0, 70.0, 92.0),
//!     gender: Gender::Female,
//!     body_shape: 0,
//! });
//! let engine = SizingEngine::build(MeasurementStore::from_records(records), EngineConfig::default()).unwrap();
//!
//! let group = GroupKey::new(Gender::Female, 0);
//! let scores = engine.adjust_confidence(&group, 3, "Height", "S", "M", 0.1).unwrap();
//! assert!((scores.m - 0.35).abs() < 1e-9);
//!
//! let prediction = engine.predict(&group, &Features::new(160.0, 55.0, 85.0, 70.0, 92.0)).unwrap();
//! assert_eq!(prediction.scores.total().round(), 5.0);
//! ```

#![forbid(unsafe_code)]

pub mod chart;
pub mod cluster;
pub mod confidence;
pub mod config;
pub mod engine;
pub mod error;
pub mod measurement;
pub mod model;
pub mod predict;
pub mod size;

pub use chart::{ClusterSummary, DetailedChart, GenericChartBuilder, SizeBand};
pub use cluster::{Assign, Clustering, Kmeans, KmeansFit};
pub use confidence::{adjust_scores, ClusterConfidence, ConfidenceTable};
pub use config::EngineConfig;
pub use engine::{FeedbackOutcome, FeedbackRequest, PredictRequest, SizingEngine};
pub use error::{Error, ErrorKind, Result};
pub use measurement::{
    convert_height, Features, Gender, GroupKey, MeasurementRecord, MeasurementStore,
};
pub use model::{ClusterModelBuilder, GroupModel};
pub use predict::{Prediction, Predictor};
pub use size::{cluster_label, GenericSize, Property, Range, SizeLabel, SizeScores, SIZE_MAPPING};
