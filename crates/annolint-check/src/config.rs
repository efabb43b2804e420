use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::Category;
use crate::error::CheckError;

/// An inclusive `[min, max]` range for one box dimension, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionRange {
    /// Lower bound, inclusive.
    pub min: f64,
    /// Upper bound, inclusive.
    pub max: f64,
}

impl DimensionRange {
    /// Create a new range.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check whether a value lies within the range, bounds included.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Plausible size ranges for one object category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryBounds {
    /// Range for the box length.
    pub length: DimensionRange,
    /// Range for the box width.
    pub width: DimensionRange,
    /// Range for the box height.
    pub height: DimensionRange,
}

/// How to treat objects whose category has no configured size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownCategoryPolicy {
    /// Skip the size and pose rules for the object, without any record.
    #[default]
    Skip,
    /// Record the object as unchecked so it is never conflated with a
    /// passed check.
    Strict,
}

/// Thresholds for all checks. Every field has a default; callers override
/// any subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Minimum number of LiDAR points a box must contain.
    pub min_points: u32,
    /// Tolerated deviation of a quaternion norm from 1.
    pub quaternion_tolerance: f64,
    /// Maximum tolerated absolute roll or pitch, in radians.
    pub pose_angle_limit_rad: f64,
    /// Horizontal displacement below which a transition counts as
    /// stationary, in meters.
    pub motion_displacement_threshold_m: f64,
    /// Maximum tolerated angle between labeled heading and displacement
    /// direction, in radians.
    pub motion_angle_limit_rad: f64,
    /// Half-width of the band around π treated as reverse driving, in
    /// radians.
    pub reverse_tolerance_rad: f64,
    /// Policy for categories with no configured size bounds.
    pub unknown_category: UnknownCategoryPolicy,
    /// Per-category plausible size ranges.
    pub size_bounds: BTreeMap<Category, CategoryBounds>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        let mut size_bounds = BTreeMap::new();
        size_bounds.insert(
            Category::Vehicle,
            CategoryBounds {
                length: DimensionRange::new(2.0, 12.0),
                width: DimensionRange::new(1.0, 3.0),
                height: DimensionRange::new(1.0, 4.0),
            },
        );
        size_bounds.insert(
            Category::Pedestrian,
            CategoryBounds {
                length: DimensionRange::new(0.3, 1.5),
                width: DimensionRange::new(0.3, 1.5),
                height: DimensionRange::new(1.0, 2.2),
            },
        );
        size_bounds.insert(
            Category::Cone,
            CategoryBounds {
                length: DimensionRange::new(0.15, 0.8),
                width: DimensionRange::new(0.15, 0.8),
                height: DimensionRange::new(0.3, 1.2),
            },
        );
        size_bounds.insert(
            Category::Sign,
            CategoryBounds {
                length: DimensionRange::new(0.05, 2.5),
                width: DimensionRange::new(0.05, 2.5),
                height: DimensionRange::new(0.3, 4.0),
            },
        );

        Self {
            min_points: 3,
            quaternion_tolerance: 0.01,
            pose_angle_limit_rad: 0.5,
            motion_displacement_threshold_m: 0.5,
            motion_angle_limit_rad: 0.52,
            reverse_tolerance_rad: 0.1,
            unknown_category: UnknownCategoryPolicy::Skip,
            size_bounds,
        }
    }
}

impl CheckConfig {
    /// Validate the configuration before any checking starts.
    ///
    /// # Returns
    ///
    /// An error for inverted or non-finite size ranges and for
    /// non-positive tolerances.
    pub fn validate(&self) -> Result<(), CheckError> {
        let thresholds = [
            ("quaternion_tolerance", self.quaternion_tolerance),
            ("pose_angle_limit_rad", self.pose_angle_limit_rad),
            (
                "motion_displacement_threshold_m",
                self.motion_displacement_threshold_m,
            ),
            ("motion_angle_limit_rad", self.motion_angle_limit_rad),
            ("reverse_tolerance_rad", self.reverse_tolerance_rad),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value <= 0.0 {
                return Err(CheckError::InvalidThreshold { name, value });
            }
        }

        for (category, bounds) in &self.size_bounds {
            let dimensions = [
                ("length", bounds.length),
                ("width", bounds.width),
                ("height", bounds.height),
            ];
            for (dimension, range) in dimensions {
                if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                    return Err(CheckError::InvalidDimensionRange {
                        category: category.label().to_string(),
                        dimension,
                        min: range.min,
                        max: range.max,
                    });
                }
            }
        }

        Ok(())
    }
}
