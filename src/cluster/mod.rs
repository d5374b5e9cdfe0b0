//! Clustering primitives used by the sizing engine.
//!
//! ## K-means
//!
//! The classic algorithm: assign each point to the nearest centroid, then
//! update centroids to the mean of their points. Repeat.
//!
//! **Objective**: Minimize within-cluster sum of squares:
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! **Assumptions**:
//! - Clusters are roughly spherical
//! - Clusters have similar sizes
//! - You know k in advance
//!
//! K-means runs on raw features when partitioning one population (all five
//! measurements share a scale of centimetres, kilograms and inches), and on
//! [`standardize`]d features when merging cluster summaries into generic sizes.
//!
//! ## Usage
//!
//! ```rust
//! use presize::cluster::{Assign, Clustering, Kmeans};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! let labels = Kmeans::new(2).with_seed(42).fit_predict(&data).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//!
//! // Keep the fitted model to place new points.
//! let fit = Kmeans::new(2).with_seed(42).fit(&data).unwrap();
//! assert_eq!(fit.assign(&[9.9, 10.0]).unwrap(), labels[2]);
//! ```

mod kmeans;
mod traits;
mod util;

pub use kmeans::{Kmeans, KmeansFit};
pub use traits::{Assign, Clustering};
pub use util::standardize;
