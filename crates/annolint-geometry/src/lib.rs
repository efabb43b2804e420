#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Angle wrapping and angular differences.
pub mod angles;

/// Error types for the geometry module.
pub mod error;

/// LiDAR point cloud container.
pub mod pointcloud;

/// Quaternion operations.
pub mod quat;

/// Rigid body transforms.
pub mod transforms;
