//! E2SM-KPM (Key Performance Measurement) messages

pub mod indication;
pub mod subscription;

pub use indication::{
    IndicationFormat1, IndicationFormat3, IndicationHeader, IndicationMessage, KpmIndication,
    LabelInfo, MeasDataItem, MeasInfo, MeasRecord, MeasType, UeMeasReport,
};
pub use subscription::{
    build_action_definition, build_filter_predicate, build_subscription, slice_filter,
    ActionDefinition, ActionDefinitionFormat, ActionDefinitionFormat1, EventTrigger,
    EventTriggerFormat, EventTriggerStyle, FilterPredicate, KpmRanFunctionDefinition,
    KpmSubscription, ReportStyle, ReportStyleType, SubscriptionError, TestCondType, TestCondition,
    REPORT_PERIOD_MS,
};
