//! Metrics for positive list sync
//!
//! Privacy-safe: only outcomes, generations and counts, never identifiers.

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use trace_core::Generation;

use crate::cache::PositiveSnapshot;
use crate::error::SyncError;
use crate::evaluator::ExposureStatus;

pub const OUTCOME_UPDATED: &str = "updated";
pub const OUTCOME_NO_UPDATE: &str = "no_update_needed";
pub const OUTCOME_TRANSPORT_ERROR: &str = "transport_error";
pub const OUTCOME_TIMEOUT: &str = "timeout";

pub fn load_outcome(result: &Result<Arc<PositiveSnapshot>, SyncError>) -> &'static str {
    match result {
        Ok(_) => OUTCOME_UPDATED,
        Err(SyncError::NoUpdateNeeded { .. }) => OUTCOME_NO_UPDATE,
        Err(SyncError::Transport(_)) => OUTCOME_TRANSPORT_ERROR,
    }
}

pub fn record_load(result: &Result<Arc<PositiveSnapshot>, SyncError>, duration: Duration) {
    let outcome = load_outcome(result);
    counter!("trace_positive_list_loads_total", "outcome" => outcome).increment(1);
    histogram!("trace_positive_list_load_duration_seconds", "outcome" => outcome)
        .record(duration.as_secs_f64());
}

pub fn record_load_timeout() {
    counter!("trace_positive_list_loads_total", "outcome" => OUTCOME_TIMEOUT).increment(1);
}

pub fn set_positive_list(generation: Generation, entries: usize) {
    gauge!("trace_positive_list_generation").set(generation as f64);
    gauge!("trace_positive_list_entries").set(entries as f64);
}

pub fn set_exposure_status(status: &ExposureStatus) {
    gauge!("trace_positive_self").set(if status.positive_self { 1.0 } else { 0.0 });
    gauge!("trace_exposed").set(if status.exposed { 1.0 } else { 0.0 });
}

pub fn init_prometheus_exporter(
    addr: std::net::SocketAddr,
) -> anyhow::Result<()> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn test_load_outcome_labels() {
        let updated: Result<Arc<PositiveSnapshot>, SyncError> =
            Ok(Arc::new(PositiveSnapshot::default()));
        assert_eq!(load_outcome(&updated), OUTCOME_UPDATED);

        let current = Err(SyncError::NoUpdateNeeded { generation: 1 });
        assert_eq!(load_outcome(&current), OUTCOME_NO_UPDATE);

        let failed: Result<Arc<PositiveSnapshot>, SyncError> =
            Err(StoreError::NotFound("positive_person_list.json".to_string()).into());
        assert_eq!(load_outcome(&failed), OUTCOME_TRANSPORT_ERROR);
    }
}
