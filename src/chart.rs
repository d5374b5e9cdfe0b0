//! Size charts built from fitted group models.
//!
//! The generic chart merges every (group, cluster) pair into a handful of
//! cross-population bands:
//!
//! 1. summarize each non-empty cluster by mean/min/max height and weight,
//! 2. standardize the mean height and mean weight across all summaries,
//! 3. k-means the standardized points into N bands,
//! 4. order bands from smallest to largest by combined standardized size and
//!    label them XS..XL (see [`GenericSize::labels_for`]),
//! 5. report each band's height and weight range as the union of its members' ranges.
//!
//! Chest, waist and hip ranges come from a fixed reference table.

use crate::cluster::{standardize, Kmeans};
use crate::config::EngineConfig;
use crate::confidence::ConfidenceTable;
use crate::error::{Error, Result};
use crate::measurement::{Features, GroupKey};
use crate::model::GroupModel;
use crate::size::{cluster_label, GenericSize, Property, Range, SizeScores};
use serde::Serialize;
use std::collections::BTreeMap;

/// Height and weight statistics of one (group, cluster) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub group: GroupKey,
    pub cluster_id: usize,
    pub height_mean: f64,
    pub weight_mean: f64,
    pub height: Range,
    pub weight: Range,
}

/// One row of the generic size chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeBand {
    pub size: GenericSize,
    /// `None` when no cluster landed in this band.
    pub height_range_cm: Option<Range>,
    pub weight_range_kg: Option<Range>,
    pub chest_bust_in: Range,
    pub waist_in: Range,
    pub hips_in: Range,
    /// (group, cluster) pairs merged into this band.
    pub members: Vec<(GroupKey, usize)>,
}

/// One cluster of one group, for inspection UIs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedChart {
    pub group: GroupKey,
    pub cluster_id: usize,
    pub size_label: &'static str,
    pub centroid: Features,
    pub member_count: usize,
    pub sample_records: Vec<Features>,
    pub confidence_scores: BTreeMap<Property, SizeScores>,
}

/// Summaries of every non-empty cluster, in group then cluster order.
pub fn summarize<'a>(models: impl IntoIterator<Item = &'a GroupModel>) -> Vec<ClusterSummary> {
    let mut summaries = Vec::new();
    for model in models {
        for cluster_id in 0..model.n_clusters() {
            let mut count = 0usize;
            let (mut h_sum, mut w_sum) = (0.0, 0.0);
            let mut height = Range::new(f64::INFINITY, f64::NEG_INFINITY);
            let mut weight = height;
            for record in model.members(cluster_id) {
                let f = record.features;
                count += 1;
                h_sum += f.height_cm;
                w_sum += f.weight;
                height = height.union(Range::new(f.height_cm, f.height_cm));
                weight = weight.union(Range::new(f.weight, f.weight));
            }
            if count == 0 {
                continue;
            }
            summaries.push(ClusterSummary {
                group: model.group(),
                cluster_id,
                height_mean: h_sum / count as f64,
                weight_mean: w_sum / count as f64,
                height,
                weight,
            });
        }
    }
    summaries
}

/// Builds generic size charts.
#[derive(Debug, Clone)]
pub struct GenericChartBuilder {
    seed: u64,
    max_iter: usize,
    tol: f64,
}

impl GenericChartBuilder {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            seed: config.seed,
            max_iter: config.max_iter,
            tol: config.tol,
        }
    }

    /// Merge cluster summaries into `num_sizes` bands, smallest first.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParameter`] if `num_sizes` is not in `1..=5`
    /// - [`Error::EmptyInput`] if there are no summaries
    /// - [`Error::InvalidClusterCount`] if there are fewer summaries than bands
    pub fn build(&self, summaries: &[ClusterSummary], num_sizes: usize) -> Result<Vec<SizeBand>> {
        let labels = GenericSize::labels_for(num_sizes)?;
        if summaries.is_empty() {
            return Err(Error::EmptyInput);
        }

        let means: Vec<Vec<f64>> = summaries
            .iter()
            .map(|s| vec![s.height_mean, s.weight_mean])
            .collect();
        let scaled = standardize(&means);
        let points: Vec<Vec<f32>> = scaled
            .iter()
            .map(|row| row.iter().map(|&x| x as f32).collect())
            .collect();

        let fit = Kmeans::new(num_sizes)
            .with_seed(self.seed)
            .with_max_iter(self.max_iter)
            .with_tol(self.tol)
            .fit(&points)?;

        // Band order: ascending height + weight, then height, then cluster id.
        let mut order: Vec<usize> = (0..fit.n_clusters()).collect();
        order.sort_by(|&a, &b| {
            let (ca, cb) = (&fit.centroids[a], &fit.centroids[b]);
            (ca[0] + ca[1])
                .total_cmp(&(cb[0] + cb[1]))
                .then(ca[0].total_cmp(&cb[0]))
                .then(a.cmp(&b))
        });

        let bands = order
            .iter()
            .zip(labels)
            .map(|(&cluster, &size)| {
                let members: Vec<&ClusterSummary> = summaries
                    .iter()
                    .zip(&fit.labels)
                    .filter(|&(_, &label)| label == cluster)
                    .map(|(s, _)| s)
                    .collect();
                let height_range_cm = members.iter().map(|s| s.height).reduce(Range::union);
                let weight_range_kg = members.iter().map(|s| s.weight).reduce(Range::union);
                let reference = size.reference();
                SizeBand {
                    size,
                    height_range_cm,
                    weight_range_kg,
                    chest_bust_in: reference.chest_bust_in,
                    waist_in: reference.waist_in,
                    hips_in: reference.hips_in,
                    members: members.iter().map(|s| (s.group, s.cluster_id)).collect(),
                }
            })
            .collect();
        Ok(bands)
    }
}

/// Every cluster of every model with its centroid, members and confidence.
///
/// # Errors
///
/// [`Error::UnknownGroup`] or [`Error::UnknownCluster`] if `confidence` has
/// no entry for one of the models' clusters.
pub fn detailed_charts<'a>(
    models: impl IntoIterator<Item = &'a GroupModel>,
    confidence: &ConfidenceTable,
    sample_size: usize,
) -> Result<Vec<DetailedChart>> {
    let mut charts = Vec::new();
    for model in models {
        let group = model.group();
        for cluster_id in 0..model.n_clusters() {
            let Some(centroid) = model.centroid(cluster_id) else {
                continue;
            };
            let confidence_scores = confidence.cluster_scores(&group, cluster_id)?;
            charts.push(DetailedChart {
                group,
                cluster_id,
                size_label: cluster_label(cluster_id),
                centroid,
                member_count: model.members(cluster_id).count(),
                sample_records: model
                    .members(cluster_id)
                    .take(sample_size)
                    .map(|r| r.features)
                    .collect(),
                confidence_scores,
            });
        }
    }
    Ok(charts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::{Gender, MeasurementRecord};
    use crate::model::ClusterModelBuilder;

    fn summary(body_shape: i64, cluster_id: usize, h: f64, w: f64) -> ClusterSummary {
        ClusterSummary {
            group: GroupKey::new(Gender::Female, body_shape),
            cluster_id,
            height_mean: h,
            weight_mean: w,
            height: Range::new(h - 2.0, h + 2.0),
            weight: Range::new(w - 1.0, w + 1.0),
        }
    }

    fn three_tiers() -> Vec<ClusterSummary> {
        vec![
            summary(0, 0, 180.0, 90.0),
            summary(0, 1, 150.0, 45.0),
            summary(0, 2, 165.0, 65.0),
            summary(1, 0, 151.0, 46.0),
            summary(1, 1, 181.0, 91.0),
            summary(1, 2, 166.0, 66.0),
        ]
    }

    #[test]
    fn test_bands_are_ordered_smallest_first() {
        let builder = GenericChartBuilder::new(&EngineConfig::default());
        let bands = builder.build(&three_tiers(), 3).unwrap();

        let sizes: Vec<_> = bands.iter().map(|b| b.size).collect();
        assert_eq!(sizes, vec![GenericSize::S, GenericSize::M, GenericSize::L]);

        assert_eq!(bands[0].height_range_cm, Some(Range::new(148.0, 153.0)));
        assert_eq!(bands[1].weight_range_kg, Some(Range::new(64.0, 67.0)));
        assert_eq!(bands[2].height_range_cm, Some(Range::new(178.0, 183.0)));
        assert_eq!(bands[2].members.len(), 2);
    }

    #[test]
    fn test_band_reference_measurements() {
        let builder = GenericChartBuilder::new(&EngineConfig::default());
        let bands = builder.build(&three_tiers(), 1).unwrap();
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].size, GenericSize::M);
        assert_eq!(bands[0].waist_in, Range::new(28.0, 29.0));
        assert_eq!(bands[0].height_range_cm, Some(Range::new(148.0, 183.0)));
        assert_eq!(bands[0].members.len(), 6);
    }

    #[test]
    fn test_every_summary_lands_in_one_band() {
        let builder = GenericChartBuilder::new(&EngineConfig::default());
        let bands = builder.build(&three_tiers(), 5).unwrap();
        assert_eq!(bands.len(), 5);
        let total: usize = bands.iter().map(|b| b.members.len()).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_invalid_band_counts() {
        let builder = GenericChartBuilder::new(&EngineConfig::default());
        assert!(matches!(
            builder.build(&three_tiers(), 0),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(matches!(
            builder.build(&three_tiers(), 6),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(matches!(builder.build(&[], 3), Err(Error::EmptyInput)));
        assert!(matches!(
            builder.build(&three_tiers()[..2], 3),
            Err(Error::InvalidClusterCount { .. })
        ));
    }

    fn group_model(group: GroupKey) -> GroupModel {
        let records: Vec<MeasurementRecord> = (0..15)
            .map(|i| {
                let i = i as f64;
                MeasurementRecord {
                    features: Features::new(150.0 + i * 2.0, 45.0 + i * 1.5, 80.0 + i, 60.0 + i, 85.0 + i),
                    gender: group.gender,
                    body_shape: group.body_shape,
                }
            })
            .collect();
        ClusterModelBuilder::new(&EngineConfig::default())
            .build_group(group, &records)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_detailed_charts_carry_confidence() {
        let group = GroupKey::new(Gender::Female, 0);
        let model = group_model(group);
        let mut table = ConfidenceTable::new();
        table.insert_group(group, model.n_clusters());

        let charts = detailed_charts([&model], &table, 3).unwrap();
        assert_eq!(charts.len(), 11);
        assert_eq!(charts.iter().map(|c| c.member_count).sum::<usize>(), 15);
        for chart in &charts {
            assert_eq!(chart.confidence_scores.len(), 5);
            assert!(chart.sample_records.len() <= 3);
        }
    }

    #[test]
    fn test_detailed_charts_reject_missing_confidence() {
        let group = GroupKey::new(Gender::Female, 0);
        let model = group_model(group);

        let empty = ConfidenceTable::new();
        assert!(matches!(
            detailed_charts([&model], &empty, 5),
            Err(Error::UnknownGroup(g)) if g == group
        ));

        let mut short = ConfidenceTable::new();
        short.insert_group(group, 4);
        assert!(matches!(
            detailed_charts([&model], &short, 5),
            Err(Error::UnknownCluster { cluster: 4, .. })
        ));
    }
}
