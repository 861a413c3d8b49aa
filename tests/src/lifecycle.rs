//! xApp lifecycle integration tests
//!
//! Task startup from configuration, fatal errors raised by schema
//! violations, and orderly shutdown.

use std::sync::Arc;

use integration_tests::{
    init_test_logging, sim_runtime, wait_for_condition, RecordingSink, TestResult,
    DEFAULT_POLL_INTERVAL, DEFAULT_TEST_TIMEOUT, TEST_PLMN,
};
use nextgric_common::{KpmConfig, SNssai};
use nextgric_e2sm::kpm::{
    IndicationFormat1, IndicationHeader, IndicationMessage, KpmIndication, MeasInfo,
};
use nextgric_xapp::{
    kpm_indication_callback, load_and_validate_xapp_config, E2Runtime, KpmMonitor,
    MetricsAggregator, ShutdownReason, ShutdownSignal, SimE2Runtime, SimNode, TaskId, TaskManager,
    TaskState,
};

const SHIPPED_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config/xapp.yaml");

fn kpm_config() -> KpmConfig {
    KpmConfig {
        ran_function_id: 2,
        slice_filters: vec![SNssai::with_sd_u32(1, 1)],
    }
}

#[test]
fn test_shipped_config_is_valid() -> TestResult {
    let config = load_and_validate_xapp_config(SHIPPED_CONFIG)?;
    assert_eq!(config.plmn.to_string(), "00101");
    assert_eq!(config.rest.port, 8080);
    assert_eq!(config.kpm.slice_filters.len(), 3);
    assert_eq!(config.kpm.slice_filters[0].filter_octets(), [128, 0, 0, 128]);
    assert_eq!(config.nodes.len(), 2);
    assert!(config.synthetic_reports);
    Ok(())
}

#[tokio::test]
async fn test_monitor_runs_from_config_and_stops_cleanly() -> TestResult {
    init_test_logging();

    let mut config = load_and_validate_xapp_config(SHIPPED_CONFIG)?;
    config.synthetic_reports = false;
    let runtime = Arc::new(SimE2Runtime::from_config(&config));
    runtime.start()?;

    let sink = RecordingSink::default();
    let aggregator = Arc::new(MetricsAggregator::new(sink.clone()));
    let signal = ShutdownSignal::new();
    let mut tasks = TaskManager::new(signal.clone());
    let callback = kpm_indication_callback(aggregator.clone(), signal.clone());
    tasks.spawn(KpmMonitor::new(runtime.clone(), config.kpm.clone(), callback));

    // Two nodes, three slice filters each
    let watched = runtime.clone();
    wait_for_condition(
        || {
            let watched = watched.clone();
            async move { watched.subscription_count() == 6 }
        },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await?;

    assert_eq!(runtime.emit_synthetic_reports(), 6);
    assert_eq!(sink.rows().len(), 6);
    assert!(!signal.is_triggered());

    tasks.shutdown(1000).await?;
    assert_eq!(tasks.get_task_state(TaskId::Monitor), Some(TaskState::Stopped));
    assert_eq!(runtime.subscription_count(), 0);
    assert_eq!(signal.reason(), Some(ShutdownReason::Requested));
    assert!(runtime.try_stop());
    Ok(())
}

#[tokio::test]
async fn test_missing_kpm_function_is_fatal() -> TestResult {
    init_test_logging();

    let nodes = vec![SimNode::gnb(TEST_PLMN, 1).with_rc(3)];
    let runtime = Arc::new(SimE2Runtime::new(TEST_PLMN, nodes));
    let aggregator = Arc::new(MetricsAggregator::new(RecordingSink::default()));
    let signal = ShutdownSignal::new();
    let mut tasks = TaskManager::new(signal.clone());
    let callback = kpm_indication_callback(aggregator, signal.clone());
    tasks.spawn(KpmMonitor::new(runtime, kpm_config(), callback));

    let reason = tokio::time::timeout(DEFAULT_TEST_TIMEOUT, signal.wait()).await?;
    assert!(reason.is_fatal());

    assert!(tasks.shutdown(1000).await.is_err());
    assert!(tasks.any_task_failed());
    // The fatal reason is kept over the shutdown request.
    assert!(signal.reason().is_some_and(|r| r.is_fatal()));
    Ok(())
}

#[tokio::test]
async fn test_unsupported_indication_format_is_fatal() -> TestResult {
    init_test_logging();

    let runtime = sim_runtime(1);
    let sink = RecordingSink::default();
    let aggregator = Arc::new(MetricsAggregator::new(sink.clone()));
    let signal = ShutdownSignal::new();
    let callback = kpm_indication_callback(aggregator.clone(), signal.clone());
    let mut monitor = KpmMonitor::new(runtime.clone(), kpm_config(), callback);
    monitor.subscribe_all().await?;

    let format1 = KpmIndication {
        header: IndicationHeader::default(),
        message: IndicationMessage::Format1(IndicationFormat1 {
            meas_data: Vec::new(),
            meas_info: vec![MeasInfo::named("RRU.PrbTotDl")],
            granularity_period_ms: None,
        }),
    };
    let handle = monitor.handles()[0];
    runtime.deliver(handle, &format1)?;

    let reason = tokio::time::timeout(DEFAULT_TEST_TIMEOUT, signal.wait()).await?;
    assert!(reason.is_fatal());
    assert!(sink.rows().is_empty());
    assert_eq!(aggregator.reports_processed(), 0);
    Ok(())
}
