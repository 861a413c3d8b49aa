//! KPM monitoring pipeline integration tests
//!
//! Subscription through the simulated runtime, indication delivery into the
//! metrics aggregator, and persistence of the KPI snapshots.

use std::sync::Arc;
use std::thread;

use integration_tests::{
    gnb_ue, init_test_logging, kpm_indication, sim_runtime, wait_for_condition, RecordingSink,
    TestResult, DEFAULT_POLL_INTERVAL, DEFAULT_TEST_TIMEOUT, TEST_KPM_FUNCTION_ID, TEST_PLMN,
};
use nextgric_common::{DbConfig, KpmConfig, SNssai};
use nextgric_e2sm::kpm::MeasRecord;
use nextgric_e2sm::SchemaError;
use nextgric_xapp::{
    kpm_indication_callback, E2Runtime, KpiField, KpmMonitor, MetricsAggregator, ShutdownSignal,
    SimE2Runtime, SimNode, SqliteKpiSink,
};

fn kpm_config(filters: Vec<SNssai>) -> KpmConfig {
    KpmConfig {
        ran_function_id: TEST_KPM_FUNCTION_ID,
        slice_filters: filters,
    }
}

#[test]
fn test_integer_record_is_stored_as_real() {
    init_test_logging();

    let sink = RecordingSink::default();
    let aggregator = MetricsAggregator::new(sink.clone());
    let ind = kpm_indication(gnb_ue(9, Some(0x21)), &[("RRU.PrbTotDl", MeasRecord::Integer(42))]);

    let summary = aggregator.process_indication(&ind).unwrap();
    assert_eq!(summary.sequence, 1);
    assert_eq!(summary.updated, 1);
    assert!(summary.persisted);

    let kpi = aggregator.snapshot();
    assert_eq!(kpi.rru_prb_tot_dl, 42.0);
    assert_eq!(kpi.amf_ue_ngap_id, 9);
    assert_eq!(kpi.ran_ue_id, 0x21);

    let rows = sink.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kpi, kpi);
}

#[test]
fn test_record_keeps_last_value_per_measurement() {
    let sink = RecordingSink::default();
    let aggregator = MetricsAggregator::new(sink.clone());

    aggregator
        .process_indication(&kpm_indication(
            gnb_ue(1, None),
            &[
                ("RRU.PrbTotDl", MeasRecord::Integer(10)),
                ("DRB.UEThpDl", MeasRecord::Real(5.5)),
            ],
        ))
        .unwrap();
    let summary = aggregator
        .process_indication(&kpm_indication(
            gnb_ue(2, None),
            &[
                ("DRB.UEThpDl", MeasRecord::Real(7.25)),
                ("DRB.Unknown", MeasRecord::Integer(3)),
            ],
        ))
        .unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.ignored, 1);

    let kpi = aggregator.snapshot();
    assert_eq!(kpi.rru_prb_tot_dl, 10.0);
    assert_eq!(kpi.drb_ue_thp_dl, 7.25);
    assert_eq!(kpi.amf_ue_ngap_id, 2);

    let rows = sink.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].kpi.drb_ue_thp_dl, 5.5);
    assert_eq!(rows[1].kpi.drb_ue_thp_dl, 7.25);
}

#[test]
fn test_measurement_id_is_schema_error() {
    let aggregator = MetricsAggregator::new(RecordingSink::default());
    let mut ind = kpm_indication(gnb_ue(1, None), &[("RRU.PrbTotDl", MeasRecord::Integer(1))]);
    if let nextgric_e2sm::kpm::IndicationMessage::Format3(report) = &mut ind.message {
        report.ue_reports[0].report.meas_info[0].meas_type = nextgric_e2sm::kpm::MeasType::Id(5);
    }

    assert_eq!(
        aggregator.process_indication(&ind),
        Err(SchemaError::UnsupportedMeasTypeId(5))
    );
}

#[tokio::test]
async fn test_concurrent_deliveries_yield_one_row_each() -> TestResult {
    init_test_logging();

    const DELIVERIES: usize = 16;
    let runtime = sim_runtime(1);
    let sink = RecordingSink::default();
    let aggregator = Arc::new(MetricsAggregator::new(sink.clone()));
    let signal = ShutdownSignal::new();
    let callback = kpm_indication_callback(aggregator.clone(), signal.clone());

    let mut monitor = KpmMonitor::new(runtime.clone(), kpm_config(vec![SNssai::new(1)]), callback);
    assert_eq!(monitor.subscribe_all().await?, 1);

    thread::scope(|scope| {
        for i in 0..DELIVERIES {
            let runtime = &runtime;
            scope.spawn(move || {
                let ind = kpm_indication(
                    gnb_ue(i as u64, None),
                    &[("DRB.PdcpSduVolumeDL", MeasRecord::Integer(i as u64))],
                );
                assert_eq!(runtime.deliver_all(&ind), 1);
            });
        }
    });

    assert_eq!(aggregator.reports_processed(), DELIVERIES as u64);
    assert_eq!(sink.rows().len(), DELIVERIES);
    assert!(!signal.is_triggered());

    monitor.unsubscribe_all().await;
    assert_eq!(runtime.subscription_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_synthetic_reports_reach_sqlite_sink() -> TestResult {
    init_test_logging();

    let runtime = Arc::new(SimE2Runtime::new(
        TEST_PLMN,
        vec![SimNode::gnb(TEST_PLMN, 1).with_kpm(TEST_KPM_FUNCTION_ID)],
    ));
    let aggregator = Arc::new(MetricsAggregator::new(SqliteKpiSink::in_memory()?));
    let callback = kpm_indication_callback(aggregator.clone(), ShutdownSignal::new());

    let mut monitor = KpmMonitor::new(
        runtime.clone(),
        kpm_config(vec![SNssai::with_sd_u32(1, 1), SNssai::with_sd_u32(128, 0x80)]),
        callback,
    );
    assert_eq!(monitor.subscribe_all().await?, 2);
    assert_eq!(runtime.emit_synthetic_reports(), 2);

    let rows = aggregator.with_sink(|sink| sink.rows())?;
    assert_eq!(rows.len(), 2);

    // First report, single UE: counters are integral, the rest end in .5
    let kpi = aggregator.snapshot();
    for (i, field) in KpiField::ALL.iter().enumerate() {
        let base = 10.0 + i as f64;
        let expected = if field.is_counter() { base } else { base + 0.5 };
        assert_eq!(kpi.get(*field), expected, "{field}");
    }
    assert_eq!(kpi.amf_ue_ngap_id, 1);
    assert_eq!(kpi.ran_ue_id, 1);
    assert_eq!(rows[1].kpi, kpi);
    Ok(())
}

#[tokio::test]
async fn test_background_reports_stop_with_runtime() -> TestResult {
    init_test_logging();

    let node = SimNode::gnb(TEST_PLMN, 1).with_kpm(TEST_KPM_FUNCTION_ID);
    let runtime =
        Arc::new(SimE2Runtime::new(TEST_PLMN, vec![node]).with_synthetic_reports(true));
    let aggregator = Arc::new(MetricsAggregator::new(RecordingSink::default()));
    let callback = kpm_indication_callback(aggregator.clone(), ShutdownSignal::new());
    let mut monitor = KpmMonitor::new(runtime.clone(), kpm_config(vec![SNssai::new(1)]), callback);
    monitor.subscribe_all().await?;
    runtime.start()?;

    let watched = aggregator.clone();
    wait_for_condition(
        || {
            let watched = watched.clone();
            async move { watched.reports_processed() >= 1 }
        },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await?;

    monitor.unsubscribe_all().await;
    wait_for_condition(
        || {
            let runtime = runtime.clone();
            async move { runtime.try_stop() }
        },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await?;
    assert!(runtime.start().is_err());
    Ok(())
}

#[test]
fn test_sink_database_named_from_environment() -> TestResult {
    let db = DbConfig::from_lookup(|key| match key {
        "DB_NAME" => Some("kpm_pipeline_test".to_string()),
        _ => None,
    })?;
    let dir = std::env::temp_dir().join(format!("nextgric-kpm-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;

    let path = SqliteKpiSink::database_path(&db, &dir);
    assert_eq!(path, dir.join("kpm_pipeline_test.sqlite3"));

    {
        let aggregator = MetricsAggregator::new(SqliteKpiSink::open_in_dir(&db, &dir)?);
        aggregator.process_indication(&kpm_indication(
            gnb_ue(3, None),
            &[("RRU.PrbTotUl", MeasRecord::Integer(8))],
        ))?;
    }

    // Rows survive reopening the file.
    let reopened = SqliteKpiSink::open(&path)?;
    let rows = reopened.rows()?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kpi.rru_prb_tot_ul, 8.0);
    assert_eq!(rows[0].kpi.amf_ue_ngap_id, 3);

    drop(reopened);
    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
