//! Measurement dispatch
//!
//! Routes decoded KPM measurement records into the fields of a [`KpiRecord`].
//! Measurements are matched by exact, case-sensitive name. Names the xApp
//! does not know are logged and dropped, so nodes may report measurements
//! beyond the set below.

use std::fmt;

use nextgric_e2sm::kpm::{MeasRecord, MeasType};
use nextgric_e2sm::SchemaError;
use tracing::warn;

/// Measurements the xApp aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KpiField {
    RruPrbTotDl,
    RruPrbTotUl,
    DrbPdcpSduVolumeDl,
    DrbPdcpSduVolumeUl,
    DrbRlcSduDelayDl,
    DrbUeThpDl,
    DrbUeThpUl,
}

impl KpiField {
    pub const ALL: [KpiField; 7] = [
        KpiField::RruPrbTotDl,
        KpiField::RruPrbTotUl,
        KpiField::DrbPdcpSduVolumeDl,
        KpiField::DrbPdcpSduVolumeUl,
        KpiField::DrbRlcSduDelayDl,
        KpiField::DrbUeThpDl,
        KpiField::DrbUeThpUl,
    ];

    /// 3GPP TS 28.552 measurement name.
    pub fn meas_name(&self) -> &'static str {
        match self {
            KpiField::RruPrbTotDl => "RRU.PrbTotDl",
            KpiField::RruPrbTotUl => "RRU.PrbTotUl",
            KpiField::DrbPdcpSduVolumeDl => "DRB.PdcpSduVolumeDL",
            KpiField::DrbPdcpSduVolumeUl => "DRB.PdcpSduVolumeUL",
            KpiField::DrbRlcSduDelayDl => "DRB.RlcSduDelayDl",
            KpiField::DrbUeThpDl => "DRB.UEThpDl",
            KpiField::DrbUeThpUl => "DRB.UEThpUl",
        }
    }

    /// Sink column name.
    pub fn column(&self) -> &'static str {
        match self {
            KpiField::RruPrbTotDl => "rru_prb_tot_dl",
            KpiField::RruPrbTotUl => "rru_prb_tot_ul",
            KpiField::DrbPdcpSduVolumeDl => "drb_pdcp_sdu_volume_dl",
            KpiField::DrbPdcpSduVolumeUl => "drb_pdcp_sdu_volume_ul",
            KpiField::DrbRlcSduDelayDl => "drb_rlc_sdu_delay_dl",
            KpiField::DrbUeThpDl => "drb_ue_thp_dl",
            KpiField::DrbUeThpUl => "drb_ue_thp_ul",
        }
    }

    /// Field for an exact measurement name.
    pub fn from_meas_name(name: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.meas_name().as_bytes() == name)
    }

    /// Whether nodes report the measurement as an integer count.
    pub fn is_counter(&self) -> bool {
        matches!(
            self,
            KpiField::RruPrbTotDl
                | KpiField::RruPrbTotUl
                | KpiField::DrbPdcpSduVolumeDl
                | KpiField::DrbPdcpSduVolumeUl
        )
    }
}

impl fmt::Display for KpiField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.meas_name())
    }
}

/// Aggregated KPIs: the last value seen for each measurement plus the last
/// identified UE.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KpiRecord {
    pub rru_prb_tot_dl: f64,
    pub rru_prb_tot_ul: f64,
    pub drb_pdcp_sdu_volume_dl: f64,
    pub drb_pdcp_sdu_volume_ul: f64,
    pub drb_rlc_sdu_delay_dl: f64,
    pub drb_ue_thp_dl: f64,
    pub drb_ue_thp_ul: f64,
    pub amf_ue_ngap_id: u64,
    pub ran_ue_id: u64,
}

impl KpiRecord {
    pub fn get(&self, field: KpiField) -> f64 {
        match field {
            KpiField::RruPrbTotDl => self.rru_prb_tot_dl,
            KpiField::RruPrbTotUl => self.rru_prb_tot_ul,
            KpiField::DrbPdcpSduVolumeDl => self.drb_pdcp_sdu_volume_dl,
            KpiField::DrbPdcpSduVolumeUl => self.drb_pdcp_sdu_volume_ul,
            KpiField::DrbRlcSduDelayDl => self.drb_rlc_sdu_delay_dl,
            KpiField::DrbUeThpDl => self.drb_ue_thp_dl,
            KpiField::DrbUeThpUl => self.drb_ue_thp_ul,
        }
    }

    pub fn set(&mut self, field: KpiField, value: f64) {
        let slot = match field {
            KpiField::RruPrbTotDl => &mut self.rru_prb_tot_dl,
            KpiField::RruPrbTotUl => &mut self.rru_prb_tot_ul,
            KpiField::DrbPdcpSduVolumeDl => &mut self.drb_pdcp_sdu_volume_dl,
            KpiField::DrbPdcpSduVolumeUl => &mut self.drb_pdcp_sdu_volume_ul,
            KpiField::DrbRlcSduDelayDl => &mut self.drb_rlc_sdu_delay_dl,
            KpiField::DrbUeThpDl => &mut self.drb_ue_thp_dl,
            KpiField::DrbUeThpUl => &mut self.drb_ue_thp_ul,
        };
        *slot = value;
    }
}

/// Effect of dispatching one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// The field was overwritten
    Updated(KpiField),
    /// Unknown measurement name, record dropped
    Ignored,
}

/// Applies one measurement record to `kpi`.
///
/// Integer and real values are both stored as `f64`. Measurements identified
/// by id and records without a value are schema errors.
pub fn dispatch(
    kpi: &mut KpiRecord,
    meas_type: &MeasType,
    record: &MeasRecord,
) -> Result<Dispatched, SchemaError> {
    let name = match meas_type {
        MeasType::Name(name) => name,
        MeasType::Id(id) => return Err(SchemaError::UnsupportedMeasTypeId(*id)),
    };

    let value = match *record {
        MeasRecord::Integer(v) => v as f64,
        MeasRecord::Real(v) => v,
        MeasRecord::NoValue => return Err(SchemaError::UnsupportedMeasValue(record.kind())),
    };

    match KpiField::from_meas_name(name.data()) {
        Some(field) => {
            kpi.set(field, value);
            Ok(Dispatched::Updated(field))
        }
        None => {
            warn!(
                name = %String::from_utf8_lossy(name.data()),
                "Measurement name not yet supported"
            );
            Ok(Dispatched::Ignored)
        }
    }
}
