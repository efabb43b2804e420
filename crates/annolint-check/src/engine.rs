use rayon::prelude::*;

use crate::align::CoordinateFrameContext;
use crate::config::CheckConfig;
use crate::dataset::{Dataset, Frame};
use crate::error::CheckError;
use crate::motion::{build_tracks, check_motion, TrackPose};
use crate::report::{Finding, Report, ReportBuilder, Unevaluable};
use crate::rules::evaluate_static_rules;

/// Everything one frame contributes to the run. Workers fill their own
/// outcome; no shared mutable state until the merge.
#[derive(Debug, Default)]
struct FrameOutcome {
    findings: Vec<Finding>,
    unevaluable: Vec<Unevaluable>,
    poses: Vec<(String, TrackPose)>,
    objects: usize,
}

fn evaluate_frame(
    frame: &Frame,
    config: &CheckConfig,
    context: &CoordinateFrameContext,
) -> FrameOutcome {
    let mut outcome = FrameOutcome {
        objects: frame.objects.len(),
        ..Default::default()
    };

    for object in &frame.objects {
        let (center, orientation) = context.align_pose(&object.center, &object.orientation);
        let mut aligned = object.clone();
        aligned.center = center;
        aligned.orientation = orientation;

        match evaluate_static_rules(&aligned, config) {
            Ok(object_outcome) => {
                outcome
                    .findings
                    .extend(object_outcome.violations.into_iter().map(|violation| {
                        Finding {
                            frame_index: frame.index,
                            object_token: object.token.clone(),
                            track_id: object.track_id.clone(),
                            category: object.category.label().to_string(),
                            rule: violation.rule,
                            value: violation.value,
                            limit: violation.limit,
                            message: violation.message,
                        }
                    }));
                if let Some(reason) = object_outcome.unchecked {
                    outcome.unevaluable.push(Unevaluable {
                        frame_index: frame.index,
                        object_token: object.token.clone(),
                        reason,
                    });
                }
                if let Some(track_id) = &object.track_id {
                    if aligned.category.has_heading() {
                        outcome.poses.push((
                            track_id.clone(),
                            TrackPose {
                                frame_index: frame.index,
                                timestamp_us: frame.timestamp_us,
                                object_token: object.token.clone(),
                                category: object.category.label().to_string(),
                                center: aligned.center,
                                yaw: aligned.orientation.yaw(),
                            },
                        ));
                    }
                }
            }
            Err(err) => {
                // data-integrity defect: the object is unevaluable, the
                // rest of the frame continues
                outcome.unevaluable.push(Unevaluable {
                    frame_index: frame.index,
                    object_token: object.token.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    log::debug!(
        "frame {}: {} objects, {} findings",
        frame.index,
        outcome.objects,
        outcome.findings.len()
    );

    outcome
}

fn assemble(
    dataset: &Dataset,
    config: &CheckConfig,
    outcomes: Vec<FrameOutcome>,
) -> Report {
    let mut builder = ReportBuilder::new();
    builder.add_frames(dataset.len());

    let mut poses = Vec::new();
    for outcome in outcomes {
        builder.add_objects(outcome.objects);
        builder.extend_findings(outcome.findings);
        for entry in outcome.unevaluable {
            builder.push_unevaluable(entry);
        }
        poses.extend(outcome.poses);
    }

    // barrier: every frame is aligned and scanned before any motion rule
    // runs
    let tracks = build_tracks(poses);
    let (motion_findings, motion_unevaluable) = check_motion(&tracks, config);
    builder.extend_findings(motion_findings);
    for entry in motion_unevaluable {
        builder.push_unevaluable(entry);
    }

    builder.finalize()
}

/// Validate a dataset and produce a finalized report.
///
/// # Arguments
///
/// * `dataset` - The loaded dataset.
/// * `config` - The thresholds to apply.
/// * `context` - The coordinate frame context shared by all alignments.
///
/// # Returns
///
/// The finalized report, or a fatal configuration error before any
/// checking begins.
///
/// Frames are evaluated in parallel into per-worker buffers; the report
/// is sorted after the merge, so its content does not depend on worker
/// completion order.
pub fn check_dataset(
    dataset: &Dataset,
    config: &CheckConfig,
    context: &CoordinateFrameContext,
) -> Result<Report, CheckError> {
    config.validate()?;

    log::info!(
        "checking {} frames (extrinsics: {})",
        dataset.len(),
        context.has_extrinsics()
    );

    let outcomes: Vec<FrameOutcome> = dataset
        .frames()
        .par_iter()
        .map(|frame| evaluate_frame(frame, config, context))
        .collect();

    Ok(assemble(dataset, config, outcomes))
}

/// Sequential variant of [`check_dataset`], running the identical rule
/// code on the current thread.
pub fn check_dataset_serial(
    dataset: &Dataset,
    config: &CheckConfig,
    context: &CoordinateFrameContext,
) -> Result<Report, CheckError> {
    config.validate()?;

    let outcomes: Vec<FrameOutcome> = dataset
        .frames()
        .iter()
        .map(|frame| evaluate_frame(frame, config, context))
        .collect();

    Ok(assemble(dataset, config, outcomes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnknownCategoryPolicy;
    use crate::dataset::{BoxSize, Category, ObjectAnnotation, Orientation};
    use crate::rules::Rule;
    use annolint_geometry::quat::quat_from_yaw;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn object(token: &str, track_id: Option<&str>, label: &str) -> ObjectAnnotation {
        ObjectAnnotation {
            token: token.to_string(),
            track_id: track_id.map(|id| id.to_string()),
            category: Category::from_label(label),
            raw_label: label.to_string(),
            center: [10.0, 0.0, 0.0],
            size: BoxSize {
                length: 4.5,
                width: 1.9,
                height: 1.6,
            },
            orientation: Orientation::Yaw(0.0),
            num_points: 100,
        }
    }

    fn frame(index: usize, objects: Vec<ObjectAnnotation>) -> Frame {
        Frame {
            index,
            timestamp_us: index as i64 * 100_000,
            objects,
            cloud: None,
        }
    }

    fn context() -> CoordinateFrameContext {
        CoordinateFrameContext::from_sensor_height(0.0).unwrap()
    }

    #[test]
    fn test_clean_dataset_reports_no_findings() -> Result<(), CheckError> {
        let dataset = Dataset::new(vec![
            frame(0, vec![object("a", None, "vehicle.car")]),
            frame(1, vec![object("b", None, "vehicle.car")]),
        ])?;
        let report = check_dataset(&dataset, &CheckConfig::default(), &context())?;

        assert_eq!(report.summary().total_frames, 2);
        assert_eq!(report.summary().total_objects, 2);
        assert_eq!(report.summary().issue_frames, 0);
        assert_eq!(report.pass_rate(), 100.0);
        Ok(())
    }

    #[test]
    fn test_static_findings_carry_frame_and_object_context() -> Result<(), CheckError> {
        let mut bad = object("a", None, "vehicle.car");
        bad.size.length = 15.0;
        let dataset = Dataset::new(vec![frame(0, vec![bad, object("b", None, "vehicle.car")])])?;

        let report = check_dataset(&dataset, &CheckConfig::default(), &context())?;
        let findings: Vec<&Finding> = report.findings().collect();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].frame_index, 0);
        assert_eq!(findings[0].object_token, "a");
        assert_eq!(findings[0].rule, Rule::SizeBounds);
        assert_eq!(report.summary().objects_with_issues, 1);
        Ok(())
    }

    #[test]
    fn test_motion_findings_flow_into_report() -> Result<(), CheckError> {
        // vehicle driving east but labeled north across three frames
        let mut frames = Vec::new();
        for i in 0..3 {
            let mut obj = object("car", Some("track-1"), "vehicle.car");
            obj.center = [5.0 * i as f64, 0.0, 0.0];
            obj.orientation = Orientation::Yaw(FRAC_PI_2);
            frames.push(frame(i, vec![obj]));
        }
        let dataset = Dataset::new(frames)?;

        let report = check_dataset(&dataset, &CheckConfig::default(), &context())?;
        assert_eq!(report.summary().rule_counts["motion_heading"], 2);
        Ok(())
    }

    #[test]
    fn test_reversing_vehicle_is_not_flagged() -> Result<(), CheckError> {
        // displacement 5m east per frame, labeled heading west: reverse
        // driving, suppressed end to end
        let mut frames = Vec::new();
        for i in 0..3 {
            let mut obj = object("car", Some("track-1"), "vehicle.car");
            obj.center = [5.0 * i as f64, 0.0, 0.0];
            obj.orientation = Orientation::Yaw(PI);
            frames.push(frame(i, vec![obj]));
        }
        let dataset = Dataset::new(frames)?;

        let report = check_dataset(&dataset, &CheckConfig::default(), &context())?;
        assert_eq!(report.summary().issue_frames, 0);
        Ok(())
    }

    #[test]
    fn test_pedestrian_track_gets_no_motion_check() -> Result<(), CheckError> {
        // a pedestrian walking sideways is legitimate
        let mut frames = Vec::new();
        for i in 0..3 {
            let mut obj = object("ped", Some("track-1"), "pedestrian.adult");
            obj.size = BoxSize {
                length: 0.6,
                width: 0.6,
                height: 1.7,
            };
            obj.center = [5.0 * i as f64, 0.0, 0.0];
            obj.orientation = Orientation::Yaw(FRAC_PI_2);
            frames.push(frame(i, vec![obj]));
        }
        let dataset = Dataset::new(frames)?;

        let report = check_dataset(&dataset, &CheckConfig::default(), &context())?;
        assert_eq!(report.summary().issue_frames, 0);
        Ok(())
    }

    #[test]
    fn test_corrupt_object_does_not_stop_the_batch() -> Result<(), CheckError> {
        let mut corrupt = object("bad", None, "vehicle.car");
        corrupt.orientation = Orientation::Quaternion([f64::NAN, 0.0, 0.0, 0.0]);
        let mut undersized = object("small", None, "vehicle.car");
        undersized.size.width = 0.5;

        let dataset = Dataset::new(vec![frame(0, vec![corrupt, undersized])])?;
        let report = check_dataset(&dataset, &CheckConfig::default(), &context())?;

        assert_eq!(report.unevaluable().len(), 1);
        assert_eq!(report.unevaluable()[0].object_token, "bad");
        assert_eq!(report.findings().count(), 1);
        assert_eq!(report.summary().total_objects, 2);
        Ok(())
    }

    #[test]
    fn test_strict_unknown_category_is_surfaced() -> Result<(), CheckError> {
        let unknown = object("mystery", None, "animal");
        let dataset = Dataset::new(vec![frame(0, vec![unknown])])?;

        let config = CheckConfig {
            unknown_category: UnknownCategoryPolicy::Strict,
            ..Default::default()
        };
        let report = check_dataset(&dataset, &config, &context())?;
        assert_eq!(report.summary().issue_frames, 0);
        assert_eq!(report.unevaluable().len(), 1);
        assert!(report.unevaluable()[0].reason.contains("animal"));
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_fatal_before_checking() -> Result<(), CheckError> {
        let dataset = Dataset::new(vec![frame(0, vec![object("a", None, "vehicle.car")])])?;
        let config = CheckConfig {
            motion_angle_limit_rad: f64::NAN,
            ..Default::default()
        };
        assert!(check_dataset(&dataset, &config, &context()).is_err());
        Ok(())
    }

    #[test]
    fn test_parallel_and_serial_reports_match() -> Result<(), CheckError> {
        let mut frames = Vec::new();
        for i in 0..16 {
            let mut moving = object("car", Some("track-1"), "vehicle.car");
            moving.center = [2.0 * i as f64, 0.0, 0.0];
            moving.orientation = Orientation::Quaternion(quat_from_yaw(FRAC_PI_2));

            let mut sparse = object(&format!("sparse-{i}"), None, "pedestrian.adult");
            sparse.size = BoxSize {
                length: 0.6,
                width: 0.6,
                height: 1.7,
            };
            sparse.num_points = if i % 3 == 0 { 1 } else { 50 };

            frames.push(frame(i, vec![moving, sparse]));
        }
        let dataset = Dataset::new(frames)?;
        let config = CheckConfig::default();

        let parallel = check_dataset(&dataset, &config, &context())?;
        let serial = check_dataset_serial(&dataset, &config, &context())?;

        assert_eq!(parallel.summary(), serial.summary());
        let parallel_findings: Vec<&Finding> = parallel.findings().collect();
        let serial_findings: Vec<&Finding> = serial.findings().collect();
        assert_eq!(parallel_findings, serial_findings);
        Ok(())
    }

    #[test]
    fn test_findings_sorted_by_frame_object_rule() -> Result<(), CheckError> {
        let mut zebra = object("z", None, "vehicle.car");
        zebra.num_points = 0;
        let mut alpha = object("a", None, "vehicle.car");
        alpha.size.length = 15.0;
        alpha.num_points = 1;

        let dataset = Dataset::new(vec![frame(0, vec![zebra, alpha])])?;
        let report = check_dataset(&dataset, &CheckConfig::default(), &context())?;

        let order: Vec<(String, Rule)> = report
            .findings()
            .map(|f| (f.object_token.clone(), f.rule))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a".to_string(), Rule::MinPointCount),
                ("a".to_string(), Rule::SizeBounds),
                ("z".to_string(), Rule::MinPointCount),
            ]
        );
        Ok(())
    }
}
