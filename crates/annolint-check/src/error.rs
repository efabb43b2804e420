use annolint_geometry::error::GeometryError;

/// An error type for the annotation checking engine.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CheckError {
    /// Error when a dataset contains no frames at all.
    #[error("Dataset contains no frames")]
    EmptyDataset,

    /// Error when an object's orientation quaternion has NaN or infinite
    /// components.
    #[error("Object {token} has a non-finite orientation quaternion")]
    NonFiniteOrientation {
        /// Token of the offending object.
        token: String,
    },

    /// Error when timestamps within a track are duplicated or go backwards.
    #[error(
        "Track {track_id} has non-monotonic timestamps at frame {frame_index}: {prev_us} -> {next_us}"
    )]
    NonMonotonicTrack {
        /// Identifier of the offending track.
        track_id: String,
        /// Frame index of the offending pose.
        frame_index: usize,
        /// Timestamp of the preceding pose, in microseconds.
        prev_us: i64,
        /// Timestamp of the offending pose, in microseconds.
        next_us: i64,
    },

    /// Error when a category has no configured size bounds and the
    /// configuration mandates strictness.
    #[error("Category '{label}' has no configured size bounds")]
    MissingCategoryBounds {
        /// Label of the unconfigured category.
        label: String,
    },

    /// Error when a configured dimension range is inverted or non-finite.
    #[error("Size bounds for {category}/{dimension} are invalid: [{min}, {max}]")]
    InvalidDimensionRange {
        /// Category label the range belongs to.
        category: String,
        /// Dimension name (length, width or height).
        dimension: &'static str,
        /// Lower bound of the range.
        min: f64,
        /// Upper bound of the range.
        max: f64,
    },

    /// Error when a configured threshold is non-finite or out of range.
    #[error("Threshold {name} is invalid: {value}")]
    InvalidThreshold {
        /// Name of the offending configuration field.
        name: &'static str,
        /// Configured value.
        value: f64,
    },

    /// Error from the underlying geometry primitives.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
