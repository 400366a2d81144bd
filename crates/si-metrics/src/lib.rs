use std::env;
use std::sync::OnceLock;

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub const CALCULATION_RUNS: &str = "si_calculation_runs_total";
pub const EMPLOYEES_CALCULATED: &str = "si_employees_calculated_total";
pub const REFERENCE_ROWS_UPLOADED: &str = "si_reference_rows_uploaded_total";
pub const RESULTS_DELETED: &str = "si_results_deleted_total";

/// Initialize a Prometheus exporter listening on `0.0.0.0:<port>`.
///
/// The port is resolved from the provided environment variable name or the
/// supplied `default_port`. Must be called inside a tokio runtime; the listener
/// runs as a spawned task. Returns a handle to the exporter if it was started.
pub fn init_metrics(port_env: &str, default_port: u16) -> Option<&'static PrometheusHandle> {
    let port = env::var(port_env)
        .ok()
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or(default_port);

    if let Some(existing) = PROMETHEUS_HANDLE.get() {
        return Some(existing);
    }

    let (recorder, exporter) = match PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .build()
    {
        Ok(parts) => parts,
        Err(err) => {
            warn!(error = %err, metrics_port = port, "failed to build prometheus exporter");
            return None;
        }
    };

    let handle = recorder.handle();
    if let Err(err) = metrics::set_global_recorder(recorder) {
        warn!(error = %err, "metrics recorder already installed");
        return PROMETHEUS_HANDLE.get();
    }

    tokio::spawn(async move {
        if let Err(err) = exporter.await {
            warn!(error = ?err, "prometheus exporter stopped");
        }
    });

    let _ = PROMETHEUS_HANDLE.set(handle);
    info!(metrics_port = port, "started prometheus exporter");
    PROMETHEUS_HANDLE.get()
}

/// Only for runs that priced at least one employee: the city then has a
/// stored standard, so the label set stays bounded by reference data.
pub fn record_calculation_succeeded(city: &str, employees: usize) {
    counter!(CALCULATION_RUNS, "city" => city.to_string(), "outcome" => "ok").increment(1);
    if employees > 0 {
        counter!(EMPLOYEES_CALCULATED, "city" => city.to_string()).increment(employees as u64);
    }
}

/// Runs that priced nobody: `empty`, or the error code the API returned.
/// These carry no city label since the city came straight from the request.
pub fn record_calculation_outcome(outcome: &'static str) {
    counter!(CALCULATION_RUNS, "outcome" => outcome).increment(1);
}

pub fn record_upload(table: &'static str, rows: u64) {
    counter!(REFERENCE_ROWS_UPLOADED, "table" => table).increment(rows);
}

pub fn record_result_deleted() {
    counter!(RESULTS_DELETED).increment(1);
}
