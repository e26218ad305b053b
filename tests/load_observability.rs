use std::sync::{Arc, Mutex};

use refdata_store::store::{
    DatasetHandle, LoadContext, LoadObserver, LoadOptions, LoadSeverity, LoadStats, TracingObserver,
};
use refdata_store::RefDataError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<LoadStats>>,
    failures: Mutex<Vec<LoadSeverity>>,
    alerts: Mutex<Vec<LoadSeverity>>,
}

impl LoadObserver for RecordingObserver {
    fn on_success(&self, _ctx: &LoadContext, stats: LoadStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &RefDataError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &RefDataError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn cities_handle(path: &str, observer: Arc<dyn LoadObserver>) -> DatasetHandle {
    cities_handle_alerting_at(path, observer, LoadSeverity::Critical)
}

fn cities_handle_alerting_at(
    path: &str,
    observer: Arc<dyn LoadObserver>,
    alert_at_or_above: LoadSeverity,
) -> DatasetHandle {
    let doc = serde_json::json!({
        "id": "cities",
        "schema": [{"id": "city"}, {"id": "state"}],
        "format": {"type": "csv"}
    });
    DatasetHandle::from_document(&doc, path)
        .unwrap()
        .with_options(LoadOptions {
            observer: Some(observer),
            alert_at_or_above,
        })
}

#[test]
fn observer_receives_stats_on_success() {
    let obs = Arc::new(RecordingObserver::default());
    let handle = cities_handle("tests/fixtures/cities.csv", obs.clone());

    handle.load_table(None).unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(successes, vec![LoadStats { rows: 7, columns: 2 }]);
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());
    let handle = cities_handle("tests/fixtures/does_not_exist.csv", obs.clone());

    // Missing file -> Io error -> Critical
    let _ = handle.load(&["city"]).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(failures, vec![LoadSeverity::Critical]);
    assert_eq!(alerts, vec![LoadSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_schema_error() {
    let obs = Arc::new(RecordingObserver::default());
    let handle = cities_handle("tests/fixtures/cities.csv", obs.clone());

    // Schema mismatch -> Error severity (not Critical) -> should not alert
    let _ = handle.load(&["zip"]).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures, vec![LoadSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn lowered_threshold_alerts_on_schema_error() {
    let obs = Arc::new(RecordingObserver::default());
    let handle =
        cities_handle_alerting_at("tests/fixtures/cities.csv", obs.clone(), LoadSeverity::Error);

    let _ = handle.load(&["zip"]).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![LoadSeverity::Error]);
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![LoadSeverity::Error]);
}

/// Only overrides `on_failure`; alerts fall through to the trait's no-op default.
#[derive(Default)]
struct FailureCounter {
    failures: Mutex<Vec<String>>,
}

impl LoadObserver for FailureCounter {
    fn on_failure(&self, ctx: &LoadContext, _severity: LoadSeverity, error: &RefDataError) {
        self.failures
            .lock()
            .unwrap()
            .push(format!("{} {}: {error}", ctx.dataset, ctx.format));
    }
}

#[test]
fn default_alert_does_not_repeat_failure() {
    let obs = Arc::new(FailureCounter::default());
    let handle = cities_handle("tests/fixtures/does_not_exist.csv", obs.clone());

    let _ = handle.load(&["city"]).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("cities csv: io error on"));
}

#[test]
fn tracing_observer_does_not_change_load_results() {
    let plain = cities_handle("tests/fixtures/cities.csv", Arc::new(FailureCounter::default()));
    let traced = cities_handle("tests/fixtures/cities.csv", Arc::new(TracingObserver));

    assert_eq!(traced.load(&["city"]).unwrap(), plain.load(&["city"]).unwrap());
    assert!(traced.load(&["zip"]).is_err());
}
