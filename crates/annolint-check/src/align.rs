use annolint_geometry::angles::wrap_angle;
use annolint_geometry::quat::{quat_mul, quat_norm, quat_to_euler};
use annolint_geometry::transforms::RigidTransform;

use crate::dataset::Orientation;
use crate::error::CheckError;

/// Immutable description of how sensor coordinates map to vehicle
/// coordinates. Shared read-only by every frame alignment in a run.
#[derive(Debug, Clone)]
pub struct CoordinateFrameContext {
    mode: AlignMode,
}

#[derive(Debug, Clone)]
enum AlignMode {
    /// Full rigid transform from calibrated sensor extrinsics.
    Extrinsics {
        transform: RigidTransform,
        // unit quaternion of the extrinsic rotation, for composing with
        // labeled orientations
        rotation_q: [f64; 4],
        rotation_yaw: f64,
    },
    /// Only the sensor mounting height is known; horizontal position and
    /// orientation pass through unchanged. Less accurate for roll/pitch
    /// dependent checks.
    SensorHeight(f64),
}

impl CoordinateFrameContext {
    /// Build a context from sensor extrinsics.
    ///
    /// # Arguments
    ///
    /// * `rotation_q` - Rotation from sensor to vehicle frame, as a
    ///   `[w, x, y, z]` quaternion.
    /// * `translation` - Translation from sensor to vehicle frame, in
    ///   meters.
    ///
    /// # Returns
    ///
    /// The context, or an error if the extrinsics are degenerate or not
    /// finite.
    pub fn from_extrinsics(
        rotation_q: [f64; 4],
        translation: [f64; 3],
    ) -> Result<Self, CheckError> {
        let transform = RigidTransform::from_quaternion(&rotation_q, translation)?;
        let norm = quat_norm(&rotation_q);
        let unit_q = [
            rotation_q[0] / norm,
            rotation_q[1] / norm,
            rotation_q[2] / norm,
            rotation_q[3] / norm,
        ];
        let rotation_yaw = quat_to_euler(&unit_q).yaw;
        Ok(Self {
            mode: AlignMode::Extrinsics {
                transform,
                rotation_q: unit_q,
                rotation_yaw,
            },
        })
    }

    /// Build a fallback context from the sensor mounting height alone.
    ///
    /// # Arguments
    ///
    /// * `sensor_height` - Height of the sensor above the vehicle frame
    ///   origin, in meters.
    pub fn from_sensor_height(sensor_height: f64) -> Result<Self, CheckError> {
        if !sensor_height.is_finite() {
            return Err(CheckError::InvalidThreshold {
                name: "sensor_height",
                value: sensor_height,
            });
        }
        Ok(Self {
            mode: AlignMode::SensorHeight(sensor_height),
        })
    }

    /// Whether full extrinsics are available.
    pub fn has_extrinsics(&self) -> bool {
        matches!(self.mode, AlignMode::Extrinsics { .. })
    }

    /// Map a pose from sensor coordinates to vehicle coordinates.
    ///
    /// Pure function of the pose and this context: with extrinsics the
    /// center is rotated then translated and the orientation composed
    /// with the extrinsic rotation; with the height fallback only a
    /// vertical offset is applied.
    pub fn align_pose(
        &self,
        center: &[f64; 3],
        orientation: &Orientation,
    ) -> ([f64; 3], Orientation) {
        match &self.mode {
            AlignMode::Extrinsics {
                transform,
                rotation_q,
                rotation_yaw,
            } => {
                let aligned_center = transform.transform_point(center);
                let aligned_orientation = match orientation {
                    Orientation::Quaternion(q) => Orientation::Quaternion(quat_mul(rotation_q, q)),
                    Orientation::Yaw(yaw) => Orientation::Yaw(wrap_angle(yaw + rotation_yaw)),
                };
                (aligned_center, aligned_orientation)
            }
            AlignMode::SensorHeight(height) => (
                [center[0], center[1], center[2] + height],
                orientation.clone(),
            ),
        }
    }
}
