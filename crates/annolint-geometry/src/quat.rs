use crate::error::GeometryError;

/// Euler angles extracted from a quaternion, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles {
    /// Rotation around the x axis.
    pub roll: f64,
    /// Rotation around the y axis.
    pub pitch: f64,
    /// Rotation around the z axis.
    pub yaw: f64,
}

/// Compute the Euclidean norm of a `[w, x, y, z]` quaternion.
#[inline]
pub fn quat_norm(q: &[f64; 4]) -> f64 {
    (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt()
}

/// Check that all quaternion components are finite.
#[inline]
pub fn quat_is_finite(q: &[f64; 4]) -> bool {
    q.iter().all(|c| c.is_finite())
}

/// Convert a `[w, x, y, z]` quaternion to Euler angles.
///
/// # Arguments
///
/// * `q` - The quaternion, scalar-first convention.
///
/// # Returns
///
/// The roll, pitch and yaw angles in radians. The pitch argument of
/// `asin` is clamped to `[-1, 1]` so near-gimbal-lock quaternions map to
/// `±π/2` instead of NaN.
///
/// Example:
///
/// ```
/// use annolint_geometry::quat::quat_to_euler;
///
/// let angles = quat_to_euler(&[1.0, 0.0, 0.0, 0.0]);
/// assert_eq!(angles.yaw, 0.0);
/// ```
pub fn quat_to_euler(q: &[f64; 4]) -> EulerAngles {
    let (w, x, y, z) = (q[0], q[1], q[2], q[3]);

    let sinr_cosp = 2.0 * (w * x + y * z);
    let cosr_cosp = 1.0 - 2.0 * (x * x + y * y);
    let roll = sinr_cosp.atan2(cosr_cosp);

    let sinp = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0);
    let pitch = sinp.asin();

    let siny_cosp = 2.0 * (w * z + x * y);
    let cosy_cosp = 1.0 - 2.0 * (y * y + z * z);
    let yaw = siny_cosp.atan2(cosy_cosp);

    EulerAngles { roll, pitch, yaw }
}

/// Convert a `[w, x, y, z]` quaternion to a rotation matrix.
///
/// # Arguments
///
/// * `q` - The quaternion, scalar-first convention.
///
/// # Returns
///
/// The 3x3 rotation matrix, or an error if the quaternion is not finite
/// or has a norm too small to normalize.
///
/// PRECONDITION: callers that need an orthonormal matrix should pass a
/// unit quaternion; the input is normalized here before expansion.
pub fn quat_to_rotation_matrix(q: &[f64; 4]) -> Result<[[f64; 3]; 3], GeometryError> {
    if !quat_is_finite(q) {
        return Err(GeometryError::NonFiniteQuaternion {
            w: q[0],
            x: q[1],
            y: q[2],
            z: q[3],
        });
    }

    let norm = quat_norm(q);
    if norm < 1e-10 {
        return Err(GeometryError::DegenerateQuaternion(norm));
    }

    let (w, x, y, z) = (q[0] / norm, q[1] / norm, q[2] / norm, q[3] / norm);

    Ok([
        [
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y - w * z),
            2.0 * (x * z + w * y),
        ],
        [
            2.0 * (x * y + w * z),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z - w * x),
        ],
        [
            2.0 * (x * z - w * y),
            2.0 * (y * z + w * x),
            1.0 - 2.0 * (x * x + y * y),
        ],
    ])
}

/// Hamilton product of two `[w, x, y, z]` quaternions.
///
/// The result rotates by `b` first, then by `a`.
pub fn quat_mul(a: &[f64; 4], b: &[f64; 4]) -> [f64; 4] {
    let (aw, ax, ay, az) = (a[0], a[1], a[2], a[3]);
    let (bw, bx, by, bz) = (b[0], b[1], b[2], b[3]);
    [
        aw * bw - ax * bx - ay * by - az * bz,
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
    ]
}

/// Build a `[w, x, y, z]` quaternion for a rotation of `yaw` radians
/// around the z axis.
pub fn quat_from_yaw(yaw: f64) -> [f64; 4] {
    let half = yaw / 2.0;
    [half.cos(), 0.0, 0.0, half.sin()]
}
