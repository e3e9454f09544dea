use metrics::{counter, histogram};
use std::sync::OnceLock;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if observability is enabled via OBSERVABILITY_ENABLED env var
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true) // Enabled by default
    })
}

// Course session metrics. Recorders are installed by the host application;
// without one these calls are no-ops inside the `metrics` facade.

/// Count a finished course resolution (`ready` or `failed`).
pub fn track_resolution(outcome: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("course_session_resolutions_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn track_resolution_duration(outcome: &str, duration_secs: f64) {
    if !is_observability_enabled() {
        return;
    }
    histogram!("course_session_resolution_duration_seconds", "outcome" => outcome.to_string())
        .record(duration_secs);
}

/// Count a resolution result discarded because its course was superseded.
pub fn track_stale_resolution() {
    if !is_observability_enabled() {
        return;
    }
    counter!("course_session_stale_resolutions_total").increment(1);
}

pub fn track_course_exit() {
    if !is_observability_enabled() {
        return;
    }
    counter!("course_session_exits_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_without_recorder_is_noop() {
        track_resolution("ready");
        track_resolution_duration("failed", 0.25);
        track_stale_resolution();
        track_course_exit();
    }
}
