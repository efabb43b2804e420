use annolint_geometry::pointcloud::PointCloud;
use annolint_geometry::quat::{quat_is_finite, quat_to_euler};
use serde::{Deserialize, Serialize};

use crate::error::CheckError;

/// Object class of an annotation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// Cars, trucks, buses and other vehicles.
    Vehicle,
    /// Persons on foot.
    Pedestrian,
    /// Traffic cones.
    Cone,
    /// Traffic signs.
    Sign,
    /// Any class label not recognized above.
    Other(String),
}

impl Category {
    /// Resolve a raw class label into a category.
    ///
    /// Matching is case-insensitive and accepts sub-class labels such as
    /// `vehicle.car` by substring, the same way annotation formats in the
    /// nuScenes family spell their attribute tokens.
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("vehicle") {
            Self::Vehicle
        } else if lower.contains("pedestrian") {
            Self::Pedestrian
        } else if lower.contains("cone") {
            Self::Cone
        } else if lower.contains("sign") {
            Self::Sign
        } else {
            Self::Other(label.to_string())
        }
    }

    /// Canonical label used in reports and configuration keys.
    pub fn label(&self) -> &str {
        match self {
            Self::Vehicle => "vehicle",
            Self::Pedestrian => "pedestrian",
            Self::Cone => "cone",
            Self::Sign => "sign",
            Self::Other(label) => label,
        }
    }

    /// Whether the labeled yaw of this category encodes a travel heading.
    ///
    /// Only headings of vehicle-like objects are compared against their
    /// displacement; a pedestrian can legitimately walk sideways.
    pub fn has_heading(&self) -> bool {
        matches!(self, Self::Vehicle)
    }

    /// Whether this category has a defined "up" axis for roll/pitch checks.
    pub fn has_up_axis(&self) -> bool {
        matches!(self, Self::Vehicle)
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.label().to_string()
    }
}

/// Box orientation, either a full quaternion or a bare yaw angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Orientation {
    /// A `[w, x, y, z]` quaternion, scalar-first convention.
    Quaternion([f64; 4]),
    /// Rotation around the vertical axis only, in radians.
    Yaw(f64),
}

impl Orientation {
    /// Extract the yaw component of the orientation.
    ///
    /// PRECONDITION: the orientation is finite (see [`Orientation::is_finite`]).
    pub fn yaw(&self) -> f64 {
        match self {
            Self::Quaternion(q) => quat_to_euler(q).yaw,
            Self::Yaw(yaw) => *yaw,
        }
    }

    /// Check that all orientation components are finite.
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Quaternion(q) => quat_is_finite(q),
            Self::Yaw(yaw) => yaw.is_finite(),
        }
    }
}

/// Box dimensions in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSize {
    /// Extent along the box's forward axis.
    pub length: f64,
    /// Extent along the box's lateral axis.
    pub width: f64,
    /// Extent along the box's vertical axis.
    pub height: f64,
}

/// One annotated object instance within a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectAnnotation {
    /// Unique token of this annotation instance.
    pub token: String,
    /// Identifier shared by annotations of the same physical entity
    /// across frames, if tracked.
    pub track_id: Option<String>,
    /// Resolved object category.
    pub category: Category,
    /// Raw class label as found in the source annotation.
    pub raw_label: String,
    /// Box center position, in sensor coordinates.
    pub center: [f64; 3],
    /// Box dimensions.
    pub size: BoxSize,
    /// Box orientation, in sensor coordinates.
    pub orientation: Orientation,
    /// Number of LiDAR points falling inside the box.
    pub num_points: u32,
}

/// An ordered snapshot of annotated objects at one timestamp.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Stable index of this frame within its dataset, assigned at load
    /// time by [`Dataset::new`].
    pub index: usize,
    /// Capture timestamp, in microseconds.
    pub timestamp_us: i64,
    /// The annotated objects of this frame.
    pub objects: Vec<ObjectAnnotation>,
    /// The raw point cloud captured at this timestamp, when loaded.
    pub cloud: Option<PointCloud>,
}

/// A full annotation dataset: frames ordered by timestamp.
#[derive(Debug, Clone)]
pub struct Dataset {
    frames: Vec<Frame>,
}

impl Dataset {
    /// Build a dataset from loaded frames.
    ///
    /// Frames are sorted by timestamp and assigned their stable index;
    /// they are never mutated afterwards.
    ///
    /// # Arguments
    ///
    /// * `frames` - The loaded frames, in any order.
    ///
    /// # Returns
    ///
    /// The dataset, or [`CheckError::EmptyDataset`] when no frames were
    /// supplied.
    pub fn new(mut frames: Vec<Frame>) -> Result<Self, CheckError> {
        if frames.is_empty() {
            return Err(CheckError::EmptyDataset);
        }
        frames.sort_by_key(|frame| frame.timestamp_us);
        for (index, frame) in frames.iter_mut().enumerate() {
            frame.index = index;
        }
        Ok(Self { frames })
    }

    /// Get the number of frames in the dataset.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// A dataset is never empty by construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Get as reference the frames, in timestamp order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(token: &str) -> ObjectAnnotation {
        ObjectAnnotation {
            token: token.to_string(),
            track_id: None,
            category: Category::from_label("vehicle.car"),
            raw_label: "vehicle.car".to_string(),
            center: [0.0, 0.0, 0.0],
            size: BoxSize {
                length: 4.5,
                width: 1.9,
                height: 1.6,
            },
            orientation: Orientation::Yaw(0.0),
            num_points: 120,
        }
    }

    #[test]
    fn test_category_from_label() {
        assert_eq!(Category::from_label("vehicle.car"), Category::Vehicle);
        assert_eq!(Category::from_label("Vehicle.Truck"), Category::Vehicle);
        assert_eq!(
            Category::from_label("pedestrian.adult"),
            Category::Pedestrian
        );
        assert_eq!(Category::from_label("traffic_cone"), Category::Cone);
        assert_eq!(Category::from_label("stop_sign"), Category::Sign);
        assert_eq!(
            Category::from_label("animal"),
            Category::Other("animal".to_string())
        );
    }

    #[test]
    fn test_category_gating() {
        assert!(Category::Vehicle.has_heading());
        assert!(Category::Vehicle.has_up_axis());
        assert!(!Category::Pedestrian.has_heading());
        assert!(!Category::Cone.has_up_axis());
    }

    #[test]
    fn test_orientation_yaw() {
        use annolint_geometry::quat::quat_from_yaw;
        use approx::assert_relative_eq;

        assert_relative_eq!(Orientation::Yaw(1.2).yaw(), 1.2);
        assert_relative_eq!(
            Orientation::Quaternion(quat_from_yaw(1.2)).yaw(),
            1.2,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_orientation_finite() {
        assert!(Orientation::Yaw(0.5).is_finite());
        assert!(!Orientation::Yaw(f64::NAN).is_finite());
        assert!(!Orientation::Quaternion([1.0, f64::NAN, 0.0, 0.0]).is_finite());
    }

    #[test]
    fn test_dataset_rejects_empty() {
        assert_eq!(Dataset::new(vec![]).unwrap_err(), CheckError::EmptyDataset);
    }

    #[test]
    fn test_dataset_sorts_and_indexes_frames() -> Result<(), CheckError> {
        let frames = vec![
            Frame {
                index: 0,
                timestamp_us: 2_000_000,
                objects: vec![object("b")],
                cloud: None,
            },
            Frame {
                index: 0,
                timestamp_us: 1_000_000,
                objects: vec![object("a")],
                cloud: None,
            },
        ];
        let dataset = Dataset::new(frames)?;
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.frames()[0].timestamp_us, 1_000_000);
        assert_eq!(dataset.frames()[0].index, 0);
        assert_eq!(dataset.frames()[1].timestamp_us, 2_000_000);
        assert_eq!(dataset.frames()[1].index, 1);
        Ok(())
    }
}
