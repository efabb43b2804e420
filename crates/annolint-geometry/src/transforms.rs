use crate::error::GeometryError;
use crate::quat::quat_to_rotation_matrix;

/// A rigid body transform between two coordinate frames.
///
/// Applies the rotation first, then the translation.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidTransform {
    /// The rotation matrix.
    pub rotation: [[f64; 3]; 3],
    /// The translation vector.
    pub translation: [f64; 3],
}

impl RigidTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        translation: [0.0, 0.0, 0.0],
    };

    /// Build a rigid transform from a `[w, x, y, z]` quaternion and a
    /// translation vector.
    ///
    /// # Arguments
    ///
    /// * `q` - The rotation as a quaternion, scalar-first convention.
    /// * `translation` - The translation vector.
    ///
    /// # Returns
    ///
    /// The rigid transform, or an error if the quaternion or translation
    /// is not finite.
    pub fn from_quaternion(q: &[f64; 4], translation: [f64; 3]) -> Result<Self, GeometryError> {
        if !translation.iter().all(|c| c.is_finite()) {
            return Err(GeometryError::NonFiniteTranslation(
                translation[0],
                translation[1],
                translation[2],
            ));
        }
        let rotation = quat_to_rotation_matrix(q)?;
        Ok(Self {
            rotation,
            translation,
        })
    }

    /// Transform a point from the source frame to the destination frame.
    ///
    /// # Arguments
    ///
    /// * `point` - The point in the source frame.
    ///
    /// # Returns
    ///
    /// The point in the destination frame, computed as `R * p + t`.
    ///
    /// Example:
    ///
    /// ```
    /// use annolint_geometry::transforms::RigidTransform;
    ///
    /// let point = RigidTransform::IDENTITY.transform_point(&[1.0, 2.0, 3.0]);
    /// assert_eq!(point, [1.0, 2.0, 3.0]);
    /// ```
    pub fn transform_point(&self, point: &[f64; 3]) -> [f64; 3] {
        let r = &self.rotation;
        let t = &self.translation;
        [
            r[0][0] * point[0] + r[0][1] * point[1] + r[0][2] * point[2] + t[0],
            r[1][0] * point[0] + r[1][1] * point[1] + r[1][2] * point[2] + t[1],
            r[2][0] * point[0] + r[2][1] * point[1] + r[2][2] * point[2] + t[2],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quat::quat_from_yaw;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_transform_point_identity() {
        let point = RigidTransform::IDENTITY.transform_point(&[2.0, 3.0, 4.0]);
        assert_eq!(point, [2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_transform_point_translation_only() -> Result<(), GeometryError> {
        let transform = RigidTransform::from_quaternion(&[1.0, 0.0, 0.0, 0.0], [1.0, -2.0, 0.5])?;
        let point = transform.transform_point(&[1.0, 1.0, 1.0]);
        assert_relative_eq!(point[0], 2.0);
        assert_relative_eq!(point[1], -1.0);
        assert_relative_eq!(point[2], 1.5);
        Ok(())
    }

    #[test]
    fn test_transform_point_rotate_then_translate() -> Result<(), GeometryError> {
        // 90 degrees around z, then shift along x
        let transform = RigidTransform::from_quaternion(&quat_from_yaw(FRAC_PI_2), [1.0, 0.0, 0.0])?;
        let point = transform.transform_point(&[1.0, 0.0, 0.0]);
        assert_relative_eq!(point[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(point[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(point[2], 0.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_from_quaternion_rejects_non_finite_translation() {
        let result = RigidTransform::from_quaternion(&[1.0, 0.0, 0.0, 0.0], [f64::NAN, 0.0, 0.0]);
        assert!(result.is_err());
    }
}
