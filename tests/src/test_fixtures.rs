//! Test fixtures for integration tests
//!
//! Canned E2 nodes, KPM indications and an in-memory KPI sink shared by the
//! integration tests.

use std::sync::{Arc, Mutex};

use nextgric_common::{Guami, Plmn};
use nextgric_e2sm::kpm::{
    IndicationFormat1, IndicationFormat3, IndicationHeader, IndicationMessage, KpmIndication,
    MeasDataItem, MeasInfo, MeasRecord, UeMeasReport,
};
use nextgric_e2sm::ue_id::GnbUeId;
use nextgric_e2sm::UeIdentity;
use nextgric_xapp::{KpiRow, KpiSink, SimE2Runtime, SimNode, SinkError};

/// PLMN 001/01
pub const TEST_PLMN: Plmn = Plmn::new(1, 1, false);

/// RAN function id of E2SM-KPM on the test nodes
pub const TEST_KPM_FUNCTION_ID: u16 = 2;

/// RAN function id of E2SM-RC on the test nodes
pub const TEST_RC_FUNCTION_ID: u16 = 3;

/// Simulated runtime with `nodes` gNBs (nb_id 1..=nodes) exposing both KPM
/// and RC. Synthetic reports stay off; tests deliver indications explicitly.
pub fn sim_runtime(nodes: u32) -> Arc<SimE2Runtime> {
    let nodes = (1..=nodes)
        .map(|nb_id| {
            SimNode::gnb(TEST_PLMN, nb_id)
                .with_kpm(TEST_KPM_FUNCTION_ID)
                .with_rc(TEST_RC_FUNCTION_ID)
        })
        .collect();
    Arc::new(SimE2Runtime::new(TEST_PLMN, nodes))
}

/// Monolithic gNB UE identity.
pub fn gnb_ue(amf_ue_ngap_id: u64, ran_ue_id: Option<u64>) -> UeIdentity {
    UeIdentity::Gnb(GnbUeId {
        amf_ue_ngap_id,
        guami: Guami::new(TEST_PLMN, 0, 0, 0),
        gnb_cu_ue_f1ap_ids: Vec::new(),
        gnb_cu_cp_ue_e1ap_ids: Vec::new(),
        ran_ue_id,
    })
}

/// Format 3 indication carrying one UE and one record per measurement.
pub fn kpm_indication(ue_id: UeIdentity, measurements: &[(&str, MeasRecord)]) -> KpmIndication {
    KpmIndication {
        header: IndicationHeader {
            collect_start_time_us: 0,
            sender_name: Some("test-gnb".to_string()),
        },
        message: IndicationMessage::Format3(IndicationFormat3 {
            ue_reports: vec![UeMeasReport {
                ue_id,
                report: IndicationFormat1 {
                    meas_data: vec![MeasDataItem {
                        records: measurements.iter().map(|(_, record)| *record).collect(),
                        incomplete: false,
                    }],
                    meas_info: measurements.iter().map(|(name, _)| MeasInfo::named(name)).collect(),
                    granularity_period_ms: Some(1000),
                },
            }],
        }),
    }
}

/// KPI sink keeping rows in memory. Clones share the same rows.
#[derive(Clone, Default)]
pub struct RecordingSink {
    rows: Arc<Mutex<Vec<KpiRow>>>,
}

impl RecordingSink {
    pub fn rows(&self) -> Vec<KpiRow> {
        self.rows.lock().unwrap().clone()
    }
}

impl KpiSink for RecordingSink {
    fn insert(&mut self, row: &KpiRow) -> Result<(), SinkError> {
        self.rows.lock().unwrap().push(*row);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nextgric_xapp::E2Runtime;

    #[test]
    fn test_sim_runtime_nodes() {
        let runtime = sim_runtime(3);
        let nodes = runtime.connected_nodes();
        assert_eq!(nodes.len(), 3);
        for node in &nodes {
            assert!(node.ran_function(TEST_KPM_FUNCTION_ID).is_some());
            assert!(node.ran_function(TEST_RC_FUNCTION_ID).is_some());
        }
    }

    #[test]
    fn test_kpm_indication_shape() {
        let ind = kpm_indication(
            gnb_ue(7, None),
            &[("RRU.PrbTotDl", MeasRecord::Integer(1)), ("DRB.UEThpDl", MeasRecord::Real(2.0))],
        );
        let IndicationMessage::Format3(report) = &ind.message else {
            panic!("expected Format 3");
        };
        assert_eq!(report.ue_reports.len(), 1);
        assert_eq!(report.ue_reports[0].report.meas_info.len(), 2);
        assert_eq!(report.ue_reports[0].report.meas_data[0].records.len(), 2);
    }
}
