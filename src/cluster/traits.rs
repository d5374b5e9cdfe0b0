use crate::error::Result;

/// Common interface for hard clustering algorithms (one label per point).
pub trait Clustering {
    /// Fit the model and return one cluster label per input point.
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>>;

    /// The configured number of clusters.
    fn n_clusters(&self) -> usize;
}

/// A fitted model that can place unseen points into its clusters.
pub trait Assign {
    /// Cluster id for `point`.
    fn assign(&self, point: &[f32]) -> Result<usize>;
}

impl Assign for super::KmeansFit {
    fn assign(&self, point: &[f32]) -> Result<usize> {
        self.predict(point)
    }
}
