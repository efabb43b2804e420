/// An error type for the geometry module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum GeometryError {
    /// Error when a quaternion contains NaN or infinite components.
    #[error("Quaternion [{w}, {x}, {y}, {z}] has non-finite components")]
    NonFiniteQuaternion {
        /// Scalar component.
        w: f64,
        /// First vector component.
        x: f64,
        /// Second vector component.
        y: f64,
        /// Third vector component.
        z: f64,
    },

    /// Error when a quaternion norm is too close to zero to normalize.
    #[error("Quaternion norm ({0}) is too small to represent a rotation")]
    DegenerateQuaternion(f64),

    /// Error when a translation vector contains NaN or infinite components.
    #[error("Translation [{0}, {1}, {2}] has non-finite components")]
    NonFiniteTranslation(f64, f64, f64),
}
