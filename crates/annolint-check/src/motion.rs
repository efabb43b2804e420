use std::collections::BTreeMap;
use std::f64::consts::PI;

use annolint_geometry::angles::angular_difference;

use crate::config::CheckConfig;
use crate::error::CheckError;
use crate::report::{Finding, Unevaluable};
use crate::rules::Rule;

/// One aligned pose of a tracked object, as collected during the
/// per-frame pass.
#[derive(Debug, Clone)]
pub struct TrackPose {
    /// Index of the frame the pose was observed in.
    pub frame_index: usize,
    /// Timestamp of that frame, in microseconds.
    pub timestamp_us: i64,
    /// Token of the annotation instance.
    pub object_token: String,
    /// Category label, for report context.
    pub category: String,
    /// Box center in vehicle coordinates.
    pub center: [f64; 3],
    /// Labeled yaw in vehicle coordinates.
    pub yaw: f64,
}

/// Group poses into tracks keyed by track identifier.
///
/// The arena is rebuilt on every run; poses arrive in frame order and
/// keep it, so timestamp regressions inside a track stay observable for
/// the integrity check.
pub fn build_tracks(poses: Vec<(String, TrackPose)>) -> BTreeMap<String, Vec<TrackPose>> {
    let mut tracks: BTreeMap<String, Vec<TrackPose>> = BTreeMap::new();
    for (track_id, pose) in poses {
        tracks.entry(track_id).or_default().push(pose);
    }
    tracks
}

/// Check labeled heading against displacement direction for one track.
///
/// # Arguments
///
/// * `track_id` - Identifier of the track.
/// * `poses` - The track's poses in frame order.
/// * `config` - The thresholds to apply.
///
/// # Returns
///
/// Motion findings for every inconsistent transition, or a
/// data-integrity error when timestamps are duplicated or go backwards.
///
/// The labeled yaw of the *earlier* pose of each transition is compared
/// against the displacement direction, and findings are attributed to
/// the earlier frame: the heading label at the start of a transition is
/// the one that predicts the displacement about to happen.
pub fn check_track(
    track_id: &str,
    poses: &[TrackPose],
    config: &CheckConfig,
) -> Result<Vec<Finding>, CheckError> {
    // a single pose carries no motion information
    if poses.len() < 2 {
        return Ok(Vec::new());
    }

    for pair in poses.windows(2) {
        if pair[1].timestamp_us <= pair[0].timestamp_us {
            return Err(CheckError::NonMonotonicTrack {
                track_id: track_id.to_string(),
                frame_index: pair[1].frame_index,
                prev_us: pair[0].timestamp_us,
                next_us: pair[1].timestamp_us,
            });
        }
    }

    let mut findings = Vec::new();
    for pair in poses.windows(2) {
        let (earlier, later) = (&pair[0], &pair[1]);
        let dx = later.center[0] - earlier.center[0];
        let dy = later.center[1] - earlier.center[1];
        let displacement = (dx * dx + dy * dy).sqrt();

        // below the motion threshold the pose delta is annotation jitter,
        // not motion
        if displacement < config.motion_displacement_threshold_m {
            continue;
        }

        let motion_yaw = dy.atan2(dx);
        let diff = angular_difference(motion_yaw, earlier.yaw);

        // a difference near π is a reversing maneuver, not a labeling error
        if (diff - PI).abs() <= config.reverse_tolerance_rad {
            continue;
        }

        if diff > config.motion_angle_limit_rad {
            findings.push(Finding {
                frame_index: earlier.frame_index,
                object_token: earlier.object_token.clone(),
                track_id: Some(track_id.to_string()),
                category: earlier.category.clone(),
                rule: Rule::MotionHeading,
                value: diff,
                limit: config.motion_angle_limit_rad,
                message: format!(
                    "heading {:.2} rad vs motion direction {:.2} rad: off by {:.1} degrees over {:.2}m",
                    earlier.yaw,
                    motion_yaw,
                    diff.to_degrees(),
                    displacement
                ),
            });
        }
    }

    Ok(findings)
}

/// Run the motion-consistency analysis over all tracks.
///
/// Requires the full frame scan to be complete; per-track integrity
/// errors become unevaluable entries and never abort the other tracks.
pub fn check_motion(
    tracks: &BTreeMap<String, Vec<TrackPose>>,
    config: &CheckConfig,
) -> (Vec<Finding>, Vec<Unevaluable>) {
    let mut findings = Vec::new();
    let mut unevaluable = Vec::new();

    for (track_id, poses) in tracks {
        match check_track(track_id, poses, config) {
            Ok(track_findings) => findings.extend(track_findings),
            Err(err) => {
                let offender = match &err {
                    CheckError::NonMonotonicTrack { frame_index, .. } => poses
                        .iter()
                        .find(|pose| pose.frame_index == *frame_index)
                        .unwrap_or(&poses[0]),
                    _ => &poses[0],
                };
                unevaluable.push(Unevaluable {
                    frame_index: offender.frame_index,
                    object_token: offender.object_token.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    log::debug!(
        "motion pass: {} tracks, {} findings, {} unevaluable",
        tracks.len(),
        findings.len(),
        unevaluable.len()
    );

    (findings, unevaluable)
}
