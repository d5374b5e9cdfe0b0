//! The sizing engine: owns the dataset, the fitted models and the confidence table.

use crate::chart::{self, DetailedChart, GenericChartBuilder, SizeBand};
use crate::confidence::ConfidenceTable;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::measurement::{Features, GroupKey, MeasurementStore};
use crate::model::{ClusterModelBuilder, GroupModel};
use crate::predict::{Prediction, Predictor};
use crate::size::{Property, SizeLabel, SizeScores};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// A size correction reported by a user, as received from a transport layer.
///
/// Gender and sizes are case-insensitive; the property name must match exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub gender: String,
    pub body_shape: i64,
    pub cluster_label: usize,
    pub property_name: String,
    pub original_size: String,
    pub new_size: String,
    #[serde(default)]
    pub learning_rate: Option<f64>,
}

/// Measurements for a prediction, as received from a transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub gender: String,
    pub body_shape: i64,
    /// Height as `F'I`, e.g. `5'7`.
    pub height: String,
    pub weight: f64,
    pub bust_chest: f64,
    pub waist: f64,
    pub hips: f64,
}

/// Result of applying a [`FeedbackRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackOutcome {
    pub message: &'static str,
    pub group: GroupKey,
    pub cluster_id: usize,
    pub property: Property,
    pub before: SizeScores,
    pub confidence_scores: SizeScores,
}

/// Size recommendation engine built once from a dataset.
#[derive(Debug)]
pub struct SizingEngine {
    config: EngineConfig,
    store: MeasurementStore,
    models: BTreeMap<GroupKey, GroupModel>,
    confidence: ConfidenceTable,
}

impl SizingEngine {
    /// Fit models for every eligible group and start each cluster at uniform confidence.
    pub fn build(store: MeasurementStore, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let models = ClusterModelBuilder::new(&config).build(&store)?;

        let mut confidence = ConfidenceTable::new();
        for (group, model) in &models {
            confidence.insert_group(*group, model.n_clusters());
        }

        info!(
            records = store.len(),
            dropped = store.dropped(),
            groups = store.groups().count(),
            models = models.len(),
            "sizing engine initialized"
        );

        Ok(Self {
            config,
            store,
            models,
            confidence,
        })
    }

    /// Load a CSV dataset and build the engine.
    pub fn from_path(path: impl AsRef<Path>, config: EngineConfig) -> Result<Self> {
        let store = MeasurementStore::from_path(path)?;
        Self::build(store, config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &MeasurementStore {
        &self.store
    }

    pub fn confidence(&self) -> &ConfidenceTable {
        &self.confidence
    }

    /// Groups that have a model, in [`GroupKey`] order.
    pub fn groups(&self) -> impl Iterator<Item = &GroupKey> {
        self.models.keys()
    }

    pub fn model(&self, group: &GroupKey) -> Option<&GroupModel> {
        self.models.get(group)
    }

    /// Recommend a size for a measurement vector.
    pub fn predict(&self, group: &GroupKey, features: &Features) -> Result<Prediction> {
        let prediction =
            Predictor::new(&self.store, &self.models, &self.confidence).predict(group, features)?;
        debug!(
            %group,
            cluster = prediction.cluster_id,
            size = %prediction.size,
            "predicted size"
        );
        Ok(prediction)
    }

    /// Like [`SizingEngine::predict`] with unnormalized inputs and an `F'I` height.
    pub fn predict_request(&self, request: &PredictRequest) -> Result<Prediction> {
        let features = Features::with_height_str(
            &request.height,
            request.weight,
            request.bust_chest,
            request.waist,
            request.hips,
        )?;
        let group = GroupKey::parse(&request.gender, request.body_shape)?;
        self.predict(&group, &features)
    }

    /// Current scores of one entry, with the property given by name.
    pub fn lookup_confidence(
        &self,
        group: &GroupKey,
        cluster: usize,
        property_name: &str,
    ) -> Result<SizeScores> {
        let entry = self.confidence.cluster(group, cluster)?;
        let property: Property = property_name.parse()?;
        Ok(entry.get(property))
    }

    /// Move `rate` of one entry's confidence from `from_size` to `to_size`.
    ///
    /// Checks run in order: group, cluster, property, sizes, rate.
    pub fn adjust_confidence(
        &self,
        group: &GroupKey,
        cluster: usize,
        property_name: &str,
        from_size: &str,
        to_size: &str,
        rate: f64,
    ) -> Result<SizeScores> {
        let entry = self.confidence.cluster(group, cluster)?;
        let property: Property = property_name.parse()?;
        let from: SizeLabel = from_size.parse()?;
        let to: SizeLabel = to_size.parse()?;
        let scores = entry.adjust(property, from, to, rate)?;
        debug!(%group, cluster, %property, %from, %to, rate, "adjusted confidence");
        Ok(scores)
    }

    /// Apply user feedback, defaulting the rate from config.
    pub fn apply_feedback(&self, request: &FeedbackRequest) -> Result<FeedbackOutcome> {
        let group = GroupKey::parse(&request.gender, request.body_shape)?;
        let entry = self.confidence.cluster(&group, request.cluster_label)?;
        let property: Property = request.property_name.parse()?;
        let from: SizeLabel = request.original_size.parse()?;
        let to: SizeLabel = request.new_size.parse()?;
        let rate = request
            .learning_rate
            .unwrap_or(self.config.default_learning_rate);

        let (before, after) = entry.update(property, from, to, rate)?;
        info!(
            %group,
            cluster = request.cluster_label,
            %property,
            %from,
            %to,
            rate,
            "applied size feedback"
        );

        Ok(FeedbackOutcome {
            message: "Confidence scores updated successfully.",
            group,
            cluster_id: request.cluster_label,
            property,
            before,
            confidence_scores: after,
        })
    }

    /// Merge all clusters into `num_sizes` generic bands.
    pub fn generic_chart(&self, num_sizes: usize) -> Result<Vec<SizeBand>> {
        let summaries = chart::summarize(self.models.values());
        GenericChartBuilder::new(&self.config).build(&summaries, num_sizes)
    }

    /// Every cluster of every model, with samples and confidence.
    pub fn detailed_charts(&self) -> Result<Vec<DetailedChart>> {
        chart::detailed_charts(self.models.values(), &self.confidence, self.config.sample_size)
    }
}
