//! Size prediction for a new measurement vector.

use crate::confidence::ConfidenceTable;
use crate::error::{Error, Result};
use crate::measurement::{Features, GroupKey, MeasurementStore};
use crate::model::GroupModel;
use crate::size::{SizeLabel, SizeScores};
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub group: GroupKey,
    pub cluster_id: usize,
    /// Label with the highest aggregate score.
    pub size: SizeLabel,
    /// Per-size sum of confidence over the five properties.
    pub scores: SizeScores,
}

/// Assigns measurements to clusters and reads off the most confident size.
#[derive(Debug, Clone, Copy)]
pub struct Predictor<'a> {
    store: &'a MeasurementStore,
    models: &'a BTreeMap<GroupKey, GroupModel>,
    confidence: &'a ConfidenceTable,
}

impl<'a> Predictor<'a> {
    pub fn new(
        store: &'a MeasurementStore,
        models: &'a BTreeMap<GroupKey, GroupModel>,
        confidence: &'a ConfidenceTable,
    ) -> Self {
        Self {
            store,
            models,
            confidence,
        }
    }

    /// Predict a size for `features` within `group`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownGroup`] if the dataset had no records for the group
    /// - [`Error::ModelUnavailable`] if it had too few to fit a model
    pub fn predict(&self, group: &GroupKey, features: &Features) -> Result<Prediction> {
        let model = self.models.get(group).ok_or_else(|| {
            match self.store.records(group) {
                Some(records) => Error::ModelUnavailable {
                    group: *group,
                    records: records.len(),
                },
                None => Error::UnknownGroup(*group),
            }
        })?;

        let cluster_id = model.assign(features)?;
        let scores = self.confidence.cluster(group, cluster_id)?.aggregate();

        Ok(Prediction {
            group: *group,
            cluster_id,
            size: scores.best(),
            scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::measurement::{Gender, MeasurementRecord};
    use crate::model::ClusterModelBuilder;
    use crate::size::Property;

    fn fixture() -> (MeasurementStore, BTreeMap<GroupKey, GroupModel>, ConfidenceTable) {
        let mut records: Vec<MeasurementRecord> = (0..20)
            .map(|i| {
                let i = i as f64;
                MeasurementRecord {
                    features: Features::new(150.0 + i * 2.0, 50.0 + i, 82.0 + i, 62.0 + i, 88.0 + i),
                    gender: Gender::Female,
                    body_shape: 1,
                }
            })
            .collect();
        records.push(MeasurementRecord {
            features: Features::new(175.0, 70.0, 95.0, 80.0, 100.0),
            gender: Gender::Male,
            body_shape: 1,
        });
        let store = MeasurementStore::from_records(records);
        let models = ClusterModelBuilder::new(&EngineConfig::default())
            .build(&store)
            .unwrap();
        let mut confidence = ConfidenceTable::new();
        for (group, model) in &models {
            confidence.insert_group(*group, model.n_clusters());
        }
        (store, models, confidence)
    }

    #[test]
    fn test_fresh_table_predicts_first_label() {
        let (store, models, confidence) = fixture();
        let predictor = Predictor::new(&store, &models, &confidence);
        let group = GroupKey::new(Gender::Female, 1);

        let p = predictor
            .predict(&group, &Features::new(160.0, 55.0, 87.0, 67.0, 93.0))
            .unwrap();
        assert_eq!(p.size, SizeLabel::S);
        assert!((p.scores.total() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_centroid_predicts_adjusted_cluster() {
        let (store, models, confidence) = fixture();
        let group = GroupKey::new(Gender::Female, 1);
        let model = &models[&group];
        let centroid = model.centroid(4).unwrap();

        confidence
            .adjust(&group, 4, Property::Waist, SizeLabel::S, SizeLabel::L, 0.2)
            .unwrap();

        let p = Predictor::new(&store, &models, &confidence)
            .predict(&group, &centroid)
            .unwrap();
        assert_eq!(p.cluster_id, 4);
        assert_eq!(p.size, SizeLabel::L);
    }

    #[test]
    fn test_missing_groups() {
        let (store, models, confidence) = fixture();
        let predictor = Predictor::new(&store, &models, &confidence);
        let features = Features::new(170.0, 60.0, 90.0, 70.0, 95.0);

        assert!(matches!(
            predictor.predict(&GroupKey::new(Gender::Male, 1), &features),
            Err(Error::ModelUnavailable { records: 1, .. })
        ));
        assert!(matches!(
            predictor.predict(&GroupKey::new(Gender::Male, 9), &features),
            Err(Error::UnknownGroup(_))
        ));
    }
}
