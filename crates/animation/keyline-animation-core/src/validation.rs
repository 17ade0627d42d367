//! Structural consistency checks for animation targets at rebuild time.
//!
//! Failures are reported, never fatal: the caller decides whether to block
//! playback or proceed degraded. The only mutation performed here is the
//! safe auto-repair of orphaned settings entries.

use thiserror::Error;

use crate::curve::KEY_EPSILON;
use crate::settings::to_millis;
use crate::targets::AnimationTarget;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("target '{target}' has {count} keyframes, expected at least 2")]
    NotEnoughKeyframes { target: String, count: usize },
    #[error("target '{target}' has no keyframe at time 0")]
    MissingStartFrame { target: String },
    #[error("target '{target}' ends at {last_ms}ms instead of expected {expected_ms}ms")]
    WrongEndFrame {
        target: String,
        last_ms: u32,
        expected_ms: u32,
    },
    #[error("target '{target}' had {removed} orphaned settings entries, auto-repaired")]
    OrphanedSettings { target: String, removed: usize },
    #[error("target '{target}' has {keyframes} keyframes but {settings} settings entries")]
    SettingsCountMismatch {
        target: String,
        keyframes: usize,
        settings: usize,
    },
    #[error("target '{target}' has different times for settings and keyframes")]
    SettingsTimesMismatch { target: String },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.issues.extend(other.issues);
    }
}

/// Validate one target against the clip length. Checks run in order and
/// short-circuit on the first failure for this target, except the orphaned
/// settings repair which continues after repairing.
pub fn validate_target(
    target: &mut dyn AnimationTarget,
    animation_length: f32,
    report: &mut ValidationReport,
) {
    let name = target.name().to_string();

    let count = target.lead_curve().len();
    if count < 2 {
        report.push(ValidationIssue::NotEnoughKeyframes {
            target: name,
            count,
        });
        return;
    }

    let first = target.lead_curve().first().map(|k| k.time).unwrap_or(-1.0);
    if first.abs() > KEY_EPSILON {
        report.push(ValidationIssue::MissingStartFrame { target: name });
        return;
    }

    let last = target.lead_curve().last().map(|k| k.time).unwrap_or(-1.0);
    if (last - animation_length).abs() > KEY_EPSILON {
        report.push(ValidationIssue::WrongEndFrame {
            target: name,
            last_ms: to_millis(last),
            expected_ms: to_millis(animation_length),
        });
        return;
    }

    let curve_times: Vec<u32> = target
        .lead_curve()
        .keys()
        .iter()
        .map(|k| to_millis(k.time))
        .collect();

    if target.settings().len() > curve_times.len() {
        let removed = target.settings_mut().retain_times(&curve_times);
        if removed > 0 {
            report.push(ValidationIssue::OrphanedSettings {
                target: name.clone(),
                removed,
            });
        }
    }

    if target.settings().len() != curve_times.len() {
        report.push(ValidationIssue::SettingsCountMismatch {
            target: name,
            keyframes: curve_times.len(),
            settings: target.settings().len(),
        });
        return;
    }

    let settings_times: Vec<u32> = target.settings().times().collect();
    if settings_times != curve_times {
        report.push(ValidationIssue::SettingsTimesMismatch { target: name });
    }
}
