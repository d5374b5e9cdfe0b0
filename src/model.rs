//! Per-population cluster models.

use crate::cluster::{Assign, Kmeans, KmeansFit};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::measurement::{Features, GroupKey, MeasurementRecord, MeasurementStore};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A fitted model for one (gender, body shape) population, with the records it was fit on.
#[derive(Debug, Clone)]
pub struct GroupModel {
    group: GroupKey,
    fit: KmeansFit,
    records: Vec<MeasurementRecord>,
}

impl GroupModel {
    pub fn group(&self) -> GroupKey {
        self.group
    }

    pub fn n_clusters(&self) -> usize {
        self.fit.n_clusters()
    }

    /// Centroid of a cluster in feature order, or `None` past the last cluster.
    pub fn centroid(&self, cluster: usize) -> Option<Features> {
        let c = self.fit.centroids.get(cluster)?;
        let c: Vec<f64> = c.iter().map(|&x| f64::from(x)).collect();
        Some(Features::new(c[0], c[1], c[2], c[3], c[4]))
    }

    /// Nearest cluster for a measurement vector.
    pub fn assign(&self, features: &Features) -> Result<usize> {
        self.fit.assign(&features.to_point())
    }

    /// Training records with their cluster ids, in load order.
    pub fn labelled(&self) -> impl Iterator<Item = (&MeasurementRecord, usize)> {
        self.records.iter().zip(self.fit.labels.iter().copied())
    }

    /// Training records of one cluster, in load order.
    pub fn members(&self, cluster: usize) -> impl Iterator<Item = &MeasurementRecord> {
        self.labelled()
            .filter(move |&(_, label)| label == cluster)
            .map(|(record, _)| record)
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.fit.cluster_sizes()
    }

    pub fn fit(&self) -> &KmeansFit {
        &self.fit
    }
}

/// Fits one model per sufficiently populated group.
#[derive(Debug, Clone)]
pub struct ClusterModelBuilder {
    kmeans: Kmeans,
    n_clusters: usize,
}

impl ClusterModelBuilder {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            kmeans: Kmeans::new(config.n_clusters)
                .with_seed(config.seed)
                .with_max_iter(config.max_iter)
                .with_tol(config.tol),
            n_clusters: config.n_clusters,
        }
    }

    /// Whether a group of `records` records gets a model.
    pub fn is_eligible(&self, records: usize) -> bool {
        records > self.n_clusters
    }

    /// Fit a single group. Returns `Ok(None)` when the group is too small.
    pub fn build_group(
        &self,
        group: GroupKey,
        records: &[MeasurementRecord],
    ) -> Result<Option<GroupModel>> {
        if !self.is_eligible(records.len()) {
            debug!(
                %group,
                records = records.len(),
                "skipping group with insufficient data"
            );
            return Ok(None);
        }

        let points: Vec<Vec<f32>> = records.iter().map(|r| r.features.to_point()).collect();
        let fit = self.kmeans.fit(&points)?;
        debug!(%group, records = records.len(), iterations = fit.n_iter, "fitted group model");

        Ok(Some(GroupModel {
            group,
            fit,
            records: records.to_vec(),
        }))
    }

    /// Fit every eligible group in the store.
    pub fn build(&self, store: &MeasurementStore) -> Result<BTreeMap<GroupKey, GroupModel>> {
        let mut models = BTreeMap::new();
        for (group, records) in store.groups() {
            if let Some(model) = self.build_group(*group, records)? {
                models.insert(*group, model);
            }
        }
        if models.is_empty() && !store.is_empty() {
            warn!(
                min_records = self.n_clusters + 1,
                "no group has enough records for a model"
            );
        }
        Ok(models)
    }
}
