use annolint_geometry::quat::{quat_is_finite, quat_norm, quat_to_euler};
use serde::Serialize;

use crate::config::{CategoryBounds, CheckConfig, UnknownCategoryPolicy};
use crate::dataset::{ObjectAnnotation, Orientation};
use crate::error::CheckError;

/// The fixed rule catalogue.
///
/// Variant order is the deterministic emission order within one object's
/// evaluation; [`MotionHeading`](Rule::MotionHeading) is evaluated in a
/// separate cross-frame pass and always sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Too few LiDAR points inside the box.
    MinPointCount,
    /// Orientation quaternion is not normalized.
    QuaternionNorm,
    /// A box dimension is outside its category's plausible range.
    SizeBounds,
    /// Roll or pitch beyond the plausible limit.
    PoseAngle,
    /// Labeled heading inconsistent with inter-frame displacement.
    MotionHeading,
}

impl Rule {
    /// Stable rule name used in report counters.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MinPointCount => "min_point_count",
            Self::QuaternionNorm => "quaternion_norm",
            Self::SizeBounds => "size_bounds",
            Self::PoseAngle => "pose_angle",
            Self::MotionHeading => "motion_heading",
        }
    }
}

/// One rule violation, before frame/object context is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// The violated rule.
    pub rule: Rule,
    /// The measured value that violated the threshold.
    pub value: f64,
    /// The threshold that was violated.
    pub limit: f64,
    /// Human-readable description with the offending numbers.
    pub message: String,
}

/// Result of evaluating the static rules on one object.
#[derive(Debug, Clone, Default)]
pub struct ObjectOutcome {
    /// Violations found, in fixed rule order.
    pub violations: Vec<Violation>,
    /// Reason the size/pose rules could not run, under the strict
    /// unknown-category policy.
    pub unchecked: Option<String>,
}

/// Evaluate all static (single-frame) rules on one aligned object.
///
/// # Arguments
///
/// * `object` - The object, already aligned to vehicle coordinates.
/// * `config` - The thresholds to apply.
///
/// # Returns
///
/// The violations found, in the fixed order point-count, quaternion,
/// size, pose-angle. A data-integrity error (non-finite orientation)
/// aborts the object's evaluation instead of producing findings.
pub fn evaluate_static_rules(
    object: &ObjectAnnotation,
    config: &CheckConfig,
) -> Result<ObjectOutcome, CheckError> {
    if !object.orientation.is_finite() {
        return Err(CheckError::NonFiniteOrientation {
            token: object.token.clone(),
        });
    }

    let mut outcome = ObjectOutcome::default();

    if let Some(violation) = check_min_points(object, config.min_points) {
        outcome.violations.push(violation);
    }
    if let Some(violation) = check_quaternion_norm(object, config.quaternion_tolerance) {
        outcome.violations.push(violation);
    }

    match config.size_bounds.get(&object.category) {
        Some(bounds) => {
            outcome.violations.extend(check_size_bounds(object, bounds));
            outcome
                .violations
                .extend(check_pose_angle(object, config.pose_angle_limit_rad));
        }
        None => match config.unknown_category {
            UnknownCategoryPolicy::Skip => {}
            UnknownCategoryPolicy::Strict => {
                outcome.unchecked = Some(
                    CheckError::MissingCategoryBounds {
                        label: object.category.label().to_string(),
                    }
                    .to_string(),
                );
            }
        },
    }

    Ok(outcome)
}

/// Check the minimum LiDAR point membership count.
pub fn check_min_points(object: &ObjectAnnotation, min_points: u32) -> Option<Violation> {
    if object.num_points < min_points {
        Some(Violation {
            rule: Rule::MinPointCount,
            value: object.num_points as f64,
            limit: min_points as f64,
            message: format!(
                "point count {} below minimum {}",
                object.num_points, min_points
            ),
        })
    } else {
        None
    }
}

/// Check that a quaternion orientation is normalized.
///
/// Yaw-only orientations have nothing to check and never produce a
/// violation.
pub fn check_quaternion_norm(object: &ObjectAnnotation, tolerance: f64) -> Option<Violation> {
    let Orientation::Quaternion(q) = &object.orientation else {
        return None;
    };
    let deviation = (quat_norm(q) - 1.0).abs();
    if deviation > tolerance {
        Some(Violation {
            rule: Rule::QuaternionNorm,
            value: deviation,
            limit: tolerance,
            message: format!(
                "quaternion norm deviates from 1 by {:.4} (tolerance {})",
                deviation, tolerance
            ),
        })
    } else {
        None
    }
}

/// Check each box dimension against its category's inclusive range.
///
/// Emits one violation per offending dimension so the report stays
/// diagnostic.
pub fn check_size_bounds(object: &ObjectAnnotation, bounds: &CategoryBounds) -> Vec<Violation> {
    let dimensions = [
        ("length", object.size.length, bounds.length),
        ("width", object.size.width, bounds.width),
        ("height", object.size.height, bounds.height),
    ];

    dimensions
        .into_iter()
        .filter(|(_, value, range)| !range.contains(*value))
        .map(|(dimension, value, range)| Violation {
            rule: Rule::SizeBounds,
            value,
            limit: if value < range.min { range.min } else { range.max },
            message: format!(
                "{} {:.2}m outside [{:.2}, {:.2}]m for category '{}'",
                dimension,
                value,
                range.min,
                range.max,
                object.category.label()
            ),
        })
        .collect()
}

/// Check roll and pitch against the pose angle limit.
///
/// Applies only to categories with a defined up axis and quaternion
/// orientations; a bare yaw carries no roll or pitch to check.
pub fn check_pose_angle(object: &ObjectAnnotation, limit_rad: f64) -> Vec<Violation> {
    if !object.category.has_up_axis() {
        return Vec::new();
    }
    let Orientation::Quaternion(q) = &object.orientation else {
        return Vec::new();
    };
    if !quat_is_finite(q) {
        return Vec::new();
    }

    let angles = quat_to_euler(q);
    let mut violations = Vec::new();
    for (name, angle) in [("roll", angles.roll), ("pitch", angles.pitch)] {
        if angle.abs() > limit_rad {
            violations.push(Violation {
                rule: Rule::PoseAngle,
                value: angle,
                limit: limit_rad,
                message: format!("{} {:.2} rad exceeds limit {:.2} rad", name, angle, limit_rad),
            });
        }
    }
    violations
}
