//! E2SM-KPM indication content.

use nextgric_common::OctetString;

use crate::ue_id::UeIdentity;

/// How a measurement is identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeasType {
    Name(OctetString),
    Id(u16),
}

/// Measurement label. Only the no-label marker is used by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelInfo {
    pub no_label: bool,
}

impl LabelInfo {
    /// Label stating that the measurement is not split by any dimension.
    pub fn no_label() -> Self {
        Self { no_label: true }
    }
}

/// Measurement description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasInfo {
    pub meas_type: MeasType,
    pub labels: Vec<LabelInfo>,
}

impl MeasInfo {
    /// Measurement named `name` with the no-label marker.
    pub fn named(name: &str) -> Self {
        Self {
            meas_type: MeasType::Name(OctetString::from_ascii(name)),
            labels: vec![LabelInfo::no_label()],
        }
    }
}

/// A single measured value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasRecord {
    Integer(u64),
    Real(f64),
    NoValue,
}

impl MeasRecord {
    /// Name of the record kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            MeasRecord::Integer(_) => "INTEGER",
            MeasRecord::Real(_) => "REAL",
            MeasRecord::NoValue => "NO VALUE",
        }
    }
}

/// Records of one granularity period. Record `i` belongs to measurement
/// info entry `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasDataItem {
    pub records: Vec<MeasRecord>,
    /// Incomplete-flag: the node marked the values unreliable
    pub incomplete: bool,
}

/// Indication message Format 1: measurements for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicationFormat1 {
    pub meas_data: Vec<MeasDataItem>,
    pub meas_info: Vec<MeasInfo>,
    pub granularity_period_ms: Option<u64>,
}

/// Measurements of one UE.
#[derive(Debug, Clone, PartialEq)]
pub struct UeMeasReport {
    pub ue_id: UeIdentity,
    pub report: IndicationFormat1,
}

/// Indication message Format 3: per-UE measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicationFormat3 {
    pub ue_reports: Vec<UeMeasReport>,
}

/// Indication message.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicationMessage {
    Format1(IndicationFormat1),
    Format3(IndicationFormat3),
}

impl IndicationMessage {
    pub fn format_name(&self) -> &'static str {
        match self {
            IndicationMessage::Format1(_) => "Format 1",
            IndicationMessage::Format3(_) => "Format 3",
        }
    }
}

/// Indication header, Format 1.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndicationHeader {
    /// Collection start time, microseconds since the Unix epoch
    pub collect_start_time_us: u64,
    pub sender_name: Option<String>,
}

/// A KPM indication as delivered to the subscription callback.
#[derive(Debug, Clone, PartialEq)]
pub struct KpmIndication {
    pub header: IndicationHeader,
    pub message: IndicationMessage,
}
