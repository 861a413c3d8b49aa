//! Metrics aggregation
//!
//! [`MetricsAggregator`] owns the process-wide [`KpiRecord`] and the KPI sink
//! behind a single mutex. Each indication is processed under one lock
//! acquisition: UE identification, dispatch of every record of every UE, and
//! the final snapshot insert. Concurrent deliveries are therefore applied one
//! report at a time and every processed report yields exactly one row.
//!
//! The record is cumulative. Measurements missing from a report keep the
//! value of the last report that carried them.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use nextgric_e2sm::kpm::{IndicationFormat1, IndicationMessage, KpmIndication};
use nextgric_e2sm::{SchemaError, UeIdentity};
use tracing::{debug, error, info, warn};

use crate::kpm::dispatcher::{dispatch, Dispatched, KpiRecord};
use crate::kpm::sink::{KpiRow, KpiSink};

/// Result of processing one indication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportSummary {
    /// 1-based sequence number of the report
    pub sequence: u64,
    /// UE entries in the report
    pub ues: usize,
    /// Records applied to the KPI record
    pub updated: usize,
    /// Records with unknown measurement names
    pub ignored: usize,
    /// Records flagged incomplete by the node
    pub unreliable: usize,
    /// Whether the snapshot row reached the sink
    pub persisted: bool,
}

struct AggregatorState<S> {
    kpi: KpiRecord,
    sink: S,
    reports: u64,
}

/// Shared KPI aggregate and its sink.
pub struct MetricsAggregator<S: KpiSink> {
    state: Mutex<AggregatorState<S>>,
}

impl<S: KpiSink> MetricsAggregator<S> {
    pub fn new(sink: S) -> Self {
        Self {
            state: Mutex::new(AggregatorState {
                kpi: KpiRecord::default(),
                sink,
                reports: 0,
            }),
        }
    }

    // A panic in another delivery thread must not wedge the pipeline.
    fn lock(&self) -> MutexGuard<'_, AggregatorState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current aggregate.
    pub fn snapshot(&self) -> KpiRecord {
        self.lock().kpi
    }

    /// Number of indications that passed schema checks, whether or not the
    /// sink accepted the row.
    pub fn reports_processed(&self) -> u64 {
        self.lock().reports
    }

    /// Runs `f` against the sink while holding the aggregator lock.
    pub fn with_sink<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.lock().sink)
    }

    /// Consumes the aggregator and returns the sink.
    pub fn into_sink(self) -> S {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .sink
    }

    /// Applies one KPM indication and persists the resulting snapshot.
    ///
    /// Only indication message Format 3 is handled. A [`SchemaError`] leaves
    /// the records applied so far in place and skips the insert; sink
    /// failures are logged and reported through [`ReportSummary::persisted`].
    pub fn process_indication(
        &self,
        indication: &KpmIndication,
    ) -> Result<ReportSummary, SchemaError> {
        let report = match &indication.message {
            IndicationMessage::Format3(report) => report,
            other => {
                return Err(SchemaError::UnsupportedIndicationFormat(
                    other.format_name(),
                ))
            }
        };

        let mut state = self.lock();
        let sequence = state.reports + 1;

        let latency_us =
            now_us().saturating_sub(indication.header.collect_start_time_us as i64);
        info!(
            report = sequence,
            latency_us,
            ues = report.ue_reports.len(),
            "KPM indication"
        );

        let mut summary = ReportSummary {
            sequence,
            ues: report.ue_reports.len(),
            ..ReportSummary::default()
        };

        for ue_report in &report.ue_reports {
            record_ue_id(&mut state.kpi, &ue_report.ue_id)?;
            apply_measurements(&mut state.kpi, &ue_report.report, &mut summary)?;
        }
        state.reports = sequence;

        let row = KpiRow::now(state.kpi);
        match state.sink.insert(&row) {
            Ok(()) => summary.persisted = true,
            Err(e) => error!(report = summary.sequence, "KPI insert failed: {}", e),
        }

        Ok(summary)
    }
}

fn now_us() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}

/// Logs the UE identity and records its ids in `kpi`.
///
/// Only the gNB form updates the record. A gNB UE behind a CU/DU split is
/// identified by its F1AP ids, otherwise by its AMF UE NGAP id.
fn record_ue_id(kpi: &mut KpiRecord, ue_id: &UeIdentity) -> Result<(), SchemaError> {
    match ue_id {
        UeIdentity::Gnb(gnb) => {
            if gnb.gnb_cu_ue_f1ap_ids.is_empty() {
                info!(amf_ue_ngap_id = gnb.amf_ue_ngap_id, "UE ID type = gNB");
                kpi.amf_ue_ngap_id = gnb.amf_ue_ngap_id;
            } else {
                for f1ap in &gnb.gnb_cu_ue_f1ap_ids {
                    info!(gnb_cu_ue_f1ap = f1ap, "UE ID type = gNB-CU");
                }
            }
            if let Some(ran_ue_id) = gnb.ran_ue_id {
                info!("ran_ue_id = {:x}", ran_ue_id);
                kpi.ran_ue_id = ran_ue_id;
            }
            Ok(())
        }
        UeIdentity::GnbDu(du) => {
            info!(gnb_cu_ue_f1ap = du.gnb_cu_ue_f1ap_id, "UE ID type = gNB-DU");
            if let Some(ran_ue_id) = du.ran_ue_id {
                info!("ran_ue_id = {:x}", ran_ue_id);
            }
            Ok(())
        }
        UeIdentity::GnbCuUp(cu_up) => {
            info!(gnb_cu_cp_ue_e1ap = cu_up.gnb_cu_cp_ue_e1ap_id, "UE ID type = gNB-CU-UP");
            if let Some(ran_ue_id) = cu_up.ran_ue_id {
                info!("ran_ue_id = {:x}", ran_ue_id);
            }
            Ok(())
        }
        UeIdentity::Other(kind) => Err(SchemaError::UnsupportedUeId(*kind)),
    }
}

/// Dispatches every record of a Format 1 report. Record `i` of a data item
/// is described by measurement info entry `i`.
fn apply_measurements(
    kpi: &mut KpiRecord,
    report: &IndicationFormat1,
    summary: &mut ReportSummary,
) -> Result<(), SchemaError> {
    if report.meas_info.is_empty() {
        return Err(SchemaError::EmptyMeasInfo);
    }

    for item in &report.meas_data {
        if item.records.len() > report.meas_info.len() {
            return Err(SchemaError::MeasInfoMismatch {
                records: item.records.len(),
                infos: report.meas_info.len(),
            });
        }

        for (info, record) in report.meas_info.iter().zip(&item.records) {
            match dispatch(kpi, &info.meas_type, record)? {
                Dispatched::Updated(field) => {
                    debug!(%field, value = kpi.get(field), "KPI updated");
                    summary.updated += 1;
                }
                Dispatched::Ignored => summary.ignored += 1,
            }
            if item.incomplete {
                warn!("Measurement Record not reliable");
                summary.unreliable += 1;
            }
        }
    }

    Ok(())
}
