use crate::measurement::GroupKey;
use thiserror::Error;

/// Errors returned by the sizing engine and its clustering primitives.
#[derive(Debug, Error)]
pub enum Error {
    /// Input slice is empty.
    #[error("empty input")]
    EmptyInput,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Points in a dataset have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// Height string is not in `F'I` (feet, inches) form.
    #[error("invalid height {0:?}: expected feet'inches, e.g. 5'7")]
    InvalidHeight(String),

    /// A dataset row could not be turned into a measurement record.
    #[error("invalid record at line {line}: {reason}")]
    InvalidRecord {
        /// 1-based line in the source file (0 when unknown).
        line: u64,
        /// What was wrong with the row.
        reason: String,
    },

    /// No records exist for this (gender, body shape) population.
    #[error("no model for group {0}: data not available for this gender and body shape index")]
    UnknownGroup(GroupKey),

    /// Gender string is neither `male` nor `female`.
    #[error("unknown gender {0:?}")]
    UnknownGender(String),

    /// Cluster id is out of range for the group's model.
    #[error("unknown cluster {cluster} for group {group}")]
    UnknownCluster {
        /// Group the lookup was made against.
        group: GroupKey,
        /// Requested cluster id.
        cluster: usize,
    },

    /// Property name is not one of the tracked body measurements.
    #[error("unknown property {0:?}")]
    UnknownProperty(String),

    /// Size value is not one of S, M, L, XL.
    #[error("unknown size value {0:?}")]
    UnknownSize(String),

    /// The group exists but had too few records to fit a model.
    #[error("model unavailable for group {group}: only {records} records")]
    ModelUnavailable {
        /// Group without a model.
        group: GroupKey,
        /// Number of valid records the group had.
        records: usize,
    },

    /// Dataset column required by the loader is absent.
    #[error("dataset is missing required column {0:?}")]
    MissingColumn(&'static str),

    /// Dataset could not be read.
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset is not valid CSV.
    #[error("failed to parse dataset: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration could not be loaded or is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Coarse classification of [`Error`] for callers mapping errors onto responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A malformed input record; recovered by dropping it.
    Data,
    /// Unknown group, cluster, property or size.
    NotFound,
    /// The group had insufficient data for a model.
    ModelUnavailable,
    /// The dataset or configuration could not be loaded.
    Startup,
    /// A parameter or input shape was rejected.
    InvalidInput,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidHeight(_) | Error::InvalidRecord { .. } => ErrorKind::Data,
            Error::UnknownGroup(_)
            | Error::UnknownGender(_)
            | Error::UnknownCluster { .. }
            | Error::UnknownProperty(_)
            | Error::UnknownSize(_) => ErrorKind::NotFound,
            Error::ModelUnavailable { .. } => ErrorKind::ModelUnavailable,
            Error::MissingColumn(_) | Error::Io(_) | Error::Csv(_) | Error::Config(_) => {
                ErrorKind::Startup
            }
            Error::EmptyInput
            | Error::InvalidParameter { .. }
            | Error::InvalidClusterCount { .. }
            | Error::DimensionMismatch { .. } => ErrorKind::InvalidInput,
        }
    }
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::Gender;

    #[test]
    fn test_error_kinds() {
        let group = GroupKey::new(Gender::Female, 0);
        assert_eq!(Error::UnknownGroup(group).kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::ModelUnavailable { group, records: 3 }.kind(),
            ErrorKind::ModelUnavailable
        );
        assert_eq!(Error::InvalidHeight("x".into()).kind(), ErrorKind::Data);
        assert_eq!(Error::MissingColumn("Height").kind(), ErrorKind::Startup);
        assert_eq!(Error::EmptyInput.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_error_messages_name_the_group() {
        let group = GroupKey::new(Gender::Male, 4);
        let msg = Error::UnknownCluster { group, cluster: 12 }.to_string();
        assert_eq!(msg, "unknown cluster 12 for group male/4");
    }
}
