//! Per-cluster confidence distributions over size labels.
//!
//! Every (group, cluster, property) entry holds a [`SizeScores`] that sums to 1.
//! Entries start uniform and move only through [`ClusterConfidence::adjust`],
//! which shifts mass from one label to another and renormalizes.
//!
//! The table's shape is fixed once a group is inserted; each entry sits behind
//! its own lock, so adjustments to different entries never contend and an
//! adjustment's read-modify-write of all four values is atomic.

use crate::error::{Error, Result};
use crate::measurement::GroupKey;
use crate::size::{Property, SizeLabel, SizeScores};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};

/// Shift `rate` of confidence from `from` to `to`, then renormalize.
///
/// `from` is floored at 0 and `to` capped at 1 before renormalizing.
/// `from == to` leaves the scores unchanged.
pub fn adjust_scores(scores: &mut SizeScores, from: SizeLabel, to: SizeLabel, rate: f64) {
    if from != to {
        let lowered = (scores.get(from) - rate).max(0.0);
        *scores.get_mut(from) = lowered;
        let raised = (scores.get(to) + rate).min(1.0);
        *scores.get_mut(to) = raised;
    }
    scores.normalize();
}

fn check_rate(rate: f64) -> Result<()> {
    if rate.is_finite() && rate >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name: "learning_rate",
            message: "must be a finite non-negative number",
        })
    }
}

/// Confidence entries for the five properties of one cluster.
#[derive(Debug)]
pub struct ClusterConfidence {
    properties: [Mutex<SizeScores>; 5],
}

impl Default for ClusterConfidence {
    fn default() -> Self {
        Self {
            properties: std::array::from_fn(|_| Mutex::new(SizeScores::UNIFORM)),
        }
    }
}

impl ClusterConfidence {
    /// Current scores for one property.
    pub fn get(&self, property: Property) -> SizeScores {
        *self.properties[property.index()].lock()
    }

    /// Apply one feedback step and return the updated scores.
    pub fn adjust(
        &self,
        property: Property,
        from: SizeLabel,
        to: SizeLabel,
        rate: f64,
    ) -> Result<SizeScores> {
        self.update(property, from, to, rate).map(|(_, after)| after)
    }

    /// Like [`ClusterConfidence::adjust`], also returning the scores the step
    /// started from. Both are read under the same lock.
    pub fn update(
        &self,
        property: Property,
        from: SizeLabel,
        to: SizeLabel,
        rate: f64,
    ) -> Result<(SizeScores, SizeScores)> {
        check_rate(rate)?;
        let mut scores = self.properties[property.index()].lock();
        let before = *scores;
        adjust_scores(&mut scores, from, to, rate);
        Ok((before, *scores))
    }

    /// Snapshot of every property's scores.
    pub fn snapshot(&self) -> BTreeMap<Property, SizeScores> {
        Property::ALL.into_iter().map(|p| (p, self.get(p))).collect()
    }

    /// Per-size sum over the five properties; each value lies in `[0, 5]`.
    pub fn aggregate(&self) -> SizeScores {
        let mut total = SizeScores::ZERO;
        for property in Property::ALL {
            total += self.get(property);
        }
        total
    }
}

/// Confidence entries for every modelled group.
#[derive(Debug, Default)]
pub struct ConfidenceTable {
    groups: HashMap<GroupKey, Vec<ClusterConfidence>>,
}

impl ConfidenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add uniform entries for clusters `0..n_clusters` of `group`.
    ///
    /// Replaces any entries the group already had.
    pub fn insert_group(&mut self, group: GroupKey, n_clusters: usize) {
        let clusters = (0..n_clusters).map(|_| ClusterConfidence::default()).collect();
        self.groups.insert(group, clusters);
    }

    pub fn contains_group(&self, group: &GroupKey) -> bool {
        self.groups.contains_key(group)
    }

    /// Number of clusters tracked for `group`.
    pub fn n_clusters(&self, group: &GroupKey) -> Option<usize> {
        self.groups.get(group).map(Vec::len)
    }

    /// Entries of one cluster.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownGroup`] or [`Error::UnknownCluster`].
    pub fn cluster(&self, group: &GroupKey, cluster: usize) -> Result<&ClusterConfidence> {
        let clusters = self
            .groups
            .get(group)
            .ok_or(Error::UnknownGroup(*group))?;
        clusters.get(cluster).ok_or(Error::UnknownCluster {
            group: *group,
            cluster,
        })
    }

    pub fn lookup(&self, group: &GroupKey, cluster: usize, property: Property) -> Result<SizeScores> {
        Ok(self.cluster(group, cluster)?.get(property))
    }

    pub fn adjust(
        &self,
        group: &GroupKey,
        cluster: usize,
        property: Property,
        from: SizeLabel,
        to: SizeLabel,
        rate: f64,
    ) -> Result<SizeScores> {
        self.cluster(group, cluster)?.adjust(property, from, to, rate)
    }

    /// Current distribution of every property in one cluster.
    pub fn cluster_scores(
        &self,
        group: &GroupKey,
        cluster: usize,
    ) -> Result<BTreeMap<Property, SizeScores>> {
        Ok(self.cluster(group, cluster)?.snapshot())
    }
}
