use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::rules::Rule;

/// An immutable record of one rule violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    /// Index of the frame the object belongs to.
    pub frame_index: usize,
    /// Token of the offending object.
    pub object_token: String,
    /// Track identifier of the object, if tracked.
    pub track_id: Option<String>,
    /// Category label of the object.
    pub category: String,
    /// The violated rule.
    pub rule: Rule,
    /// The measured value that violated the threshold.
    pub value: f64,
    /// The threshold that was violated.
    pub limit: f64,
    /// Human-readable description with the offending numbers.
    pub message: String,
}

/// A distinguished entry for an object or track the engine could not
/// evaluate. Not a finding: the input was defective, not implausible.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unevaluable {
    /// Index of the frame the entry refers to.
    pub frame_index: usize,
    /// Token of the affected object.
    pub object_token: String,
    /// Why evaluation was aborted.
    pub reason: String,
}

/// Accumulates findings while a run is in progress.
///
/// Consumed by [`ReportBuilder::finalize`]; inserting into a finalized
/// report is unrepresentable.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    findings: Vec<Finding>,
    unevaluable: Vec<Unevaluable>,
    total_frames: usize,
    total_objects: usize,
}

impl ReportBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finding.
    pub fn push_finding(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Record several findings at once.
    pub fn extend_findings(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.findings.extend(findings);
    }

    /// Record an unevaluable object or track.
    pub fn push_unevaluable(&mut self, entry: Unevaluable) {
        self.unevaluable.push(entry);
    }

    /// Count frames that were checked.
    pub fn add_frames(&mut self, count: usize) {
        self.total_frames += count;
    }

    /// Count objects that were checked.
    pub fn add_objects(&mut self, count: usize) {
        self.total_objects += count;
    }

    /// Finalize into an immutable report.
    ///
    /// Findings are sorted by frame index, then object token, then rule
    /// order, so the report is identical regardless of the completion
    /// order of concurrent workers.
    pub fn finalize(mut self) -> Report {
        self.findings.sort_by(|a, b| {
            (a.frame_index, &a.object_token, a.rule).cmp(&(b.frame_index, &b.object_token, b.rule))
        });
        self.unevaluable
            .sort_by(|a, b| (a.frame_index, &a.object_token).cmp(&(b.frame_index, &b.object_token)));

        let mut findings_by_frame: BTreeMap<usize, Vec<Finding>> = BTreeMap::new();
        let mut rule_counts: BTreeMap<&'static str, usize> = BTreeMap::new();

        let objects_with_issues = {
            let mut distinct: BTreeSet<(usize, &str)> = BTreeSet::new();
            for finding in &self.findings {
                *rule_counts.entry(finding.rule.name()).or_insert(0) += 1;
                distinct.insert((finding.frame_index, finding.object_token.as_str()));
            }
            distinct.len()
        };

        for finding in self.findings {
            findings_by_frame
                .entry(finding.frame_index)
                .or_default()
                .push(finding);
        }

        let summary = ReportSummary {
            total_frames: self.total_frames,
            total_objects: self.total_objects,
            issue_frames: findings_by_frame.len(),
            objects_with_issues,
            unevaluable_count: self.unevaluable.len(),
            rule_counts,
        };

        Report {
            findings_by_frame,
            unevaluable: self.unevaluable,
            summary,
        }
    }
}

/// Summary counters over a finalized report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    /// Total frames checked.
    pub total_frames: usize,
    /// Total objects checked.
    pub total_objects: usize,
    /// Frames with at least one finding.
    pub issue_frames: usize,
    /// Objects with at least one finding.
    pub objects_with_issues: usize,
    /// Objects or tracks that could not be evaluated.
    pub unevaluable_count: usize,
    /// Finding counts broken down by rule name.
    pub rule_counts: BTreeMap<&'static str, usize>,
}

/// The finalized result of one validation run. Read-only and safe to
/// serialize or render without further synchronization.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    findings_by_frame: BTreeMap<usize, Vec<Finding>>,
    unevaluable: Vec<Unevaluable>,
    summary: ReportSummary,
}

impl Report {
    /// Findings grouped by frame index, sorted.
    pub fn findings_by_frame(&self) -> &BTreeMap<usize, Vec<Finding>> {
        &self.findings_by_frame
    }

    /// All findings in report order.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings_by_frame.values().flatten()
    }

    /// Entries that could not be evaluated.
    pub fn unevaluable(&self) -> &[Unevaluable] {
        &self.unevaluable
    }

    /// The summary counters.
    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }

    /// Percentage of frames without findings, in `[0, 100]`.
    pub fn pass_rate(&self) -> f64 {
        let total = self.summary.total_frames.max(1);
        (total - self.summary.issue_frames) as f64 * 100.0 / total as f64
    }
}
