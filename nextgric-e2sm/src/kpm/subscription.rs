//! E2SM-KPM subscription construction.
//!
//! A subscription is derived from the RAN function definition an E2 node
//! advertises. Only event trigger Format 1 and REPORT Service Style 4
//! ("Common Condition-based, UE-level Measurement") with action definition
//! Format 4 are implemented; anything else is rejected.

use std::fmt;

use nextgric_common::{OctetString, SNssai};
use thiserror::Error;

use crate::kpm::indication::{LabelInfo, MeasInfo, MeasType};

/// Report period and granularity period of every subscription.
pub const REPORT_PERIOD_MS: u64 = 1000;

/// Subscription cannot be built from the advertised capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    #[error("RAN function definition advertises no event trigger style")]
    NoEventTriggerStyle,
    #[error("RAN function definition advertises no report style")]
    NoReportStyle,
    #[error("report style {0} not supported")]
    UnsupportedReportStyle(ReportStyleType),
    #[error("action definition {0:?} not supported by report style {1}")]
    UnsupportedActionDefinition(ActionDefinitionFormat, ReportStyleType),
    #[error("report style {0} lists no measurements")]
    NoMeasurements(ReportStyleType),
}

/// Event trigger definition formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTriggerFormat {
    Format1,
}

/// REPORT Service Styles (O-RAN.WG3.E2SM-KPM Section 7.4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportStyleType {
    /// E2 Node Measurement
    Style1,
    /// E2 Node Measurement for a single UE
    Style2,
    /// Condition-based, UE-level E2 Node Measurement
    Style3,
    /// Common Condition-based, UE-level Measurement
    Style4,
    /// E2 Node Measurement for multiple UEs
    Style5,
}

impl fmt::Display for ReportStyleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = match self {
            ReportStyleType::Style1 => 1,
            ReportStyleType::Style2 => 2,
            ReportStyleType::Style3 => 3,
            ReportStyleType::Style4 => 4,
            ReportStyleType::Style5 => 5,
        };
        write!(f, "{n}")
    }
}

/// Action definition formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionDefinitionFormat {
    Format1,
    Format2,
    Format3,
    Format4,
    Format5,
}

/// An advertised event trigger style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTriggerStyle {
    pub name: String,
    pub format: EventTriggerFormat,
}

/// An advertised REPORT style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportStyle {
    pub style_type: ReportStyleType,
    pub name: String,
    pub action_format: ActionDefinitionFormat,
    /// Names of the measurements the style can report
    pub measurements: Vec<OctetString>,
}

/// E2SM-KPM RAN function definition as advertised by an E2 node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpmRanFunctionDefinition {
    pub event_trigger_styles: Vec<EventTriggerStyle>,
    pub report_styles: Vec<ReportStyle>,
}

/// Test condition types usable in a matching condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestCondType {
    Gbr,
    Ambr,
    IsStat,
    IsCatM,
    DlRsrp,
    DlRsrq,
    UlRsrp,
    Cqi,
    FiveQi,
    Qci,
    SNssai,
}

/// Test condition operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestCondition {
    Equal,
    GreaterThan,
    LessThan,
    Contains,
    Present,
}

/// A UE-level matching condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPredicate {
    pub cond_type: TestCondType,
    /// Presence flag of the condition type; always set
    pub present: bool,
    pub condition: TestCondition,
    /// `{sst, sd16, sd8, sd0}`
    pub value: [u8; 4],
}

/// Builds a `<cond_type> <condition> <value>` matching condition.
///
/// The presence flag is set whatever the type and operator.
pub fn build_filter_predicate(
    cond_type: TestCondType,
    condition: TestCondition,
    value: [u8; 4],
) -> FilterPredicate {
    FilterPredicate {
        cond_type,
        present: true,
        condition,
        value,
    }
}

/// `S-NSSAI EQUAL <value>` matching condition.
pub fn slice_filter(snssai: &SNssai) -> FilterPredicate {
    build_filter_predicate(TestCondType::SNssai, TestCondition::Equal, snssai.filter_octets())
}

/// Action definition Format 1 (measurement list and granularity).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDefinitionFormat1 {
    pub measurements: Vec<MeasInfo>,
    pub granularity_period_ms: u64,
}

/// Action definition Format 4: a matching condition wrapping Format 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDefinition {
    pub matching_condition: FilterPredicate,
    pub subscript: ActionDefinitionFormat1,
}

/// Builds a Format 4 action definition for `style` filtered on `filter`.
///
/// Every measurement the style lists is requested with the no-label marker.
pub fn build_action_definition(
    style: &ReportStyle,
    filter: [u8; 4],
) -> Result<ActionDefinition, SubscriptionError> {
    if style.style_type != ReportStyleType::Style4 {
        return Err(SubscriptionError::UnsupportedReportStyle(style.style_type));
    }
    if style.action_format != ActionDefinitionFormat::Format4 {
        return Err(SubscriptionError::UnsupportedActionDefinition(
            style.action_format,
            style.style_type,
        ));
    }
    if style.measurements.is_empty() {
        return Err(SubscriptionError::NoMeasurements(style.style_type));
    }

    let measurements = style
        .measurements
        .iter()
        .map(|name| MeasInfo {
            meas_type: MeasType::Name(name.clone()),
            labels: vec![LabelInfo::no_label()],
        })
        .collect();

    Ok(ActionDefinition {
        matching_condition: build_filter_predicate(
            TestCondType::SNssai,
            TestCondition::Equal,
            filter,
        ),
        subscript: ActionDefinitionFormat1 {
            measurements,
            granularity_period_ms: REPORT_PERIOD_MS,
        },
    })
}

/// Periodic event trigger, Format 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTrigger {
    pub report_period_ms: u64,
}

/// A complete KPM subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpmSubscription {
    pub event_trigger: EventTrigger,
    pub actions: Vec<ActionDefinition>,
}

/// Builds a subscription from the first advertised event trigger and report
/// styles, filtered on `filter`.
pub fn build_subscription(
    ran_function: &KpmRanFunctionDefinition,
    filter: [u8; 4],
) -> Result<KpmSubscription, SubscriptionError> {
    // Format 1 is the only trigger format KPM defines.
    if ran_function.event_trigger_styles.is_empty() {
        return Err(SubscriptionError::NoEventTriggerStyle);
    }

    let style = ran_function
        .report_styles
        .first()
        .ok_or(SubscriptionError::NoReportStyle)?;
    let action = build_action_definition(style, filter)?;

    Ok(KpmSubscription {
        event_trigger: EventTrigger {
            report_period_ms: REPORT_PERIOD_MS,
        },
        actions: vec![action],
    })
}
