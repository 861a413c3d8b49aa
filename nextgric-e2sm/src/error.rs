//! Error types for E2SM message construction and interpretation.

use thiserror::Error;

use crate::kpm::SubscriptionError;
use crate::ran_param::TreeError;
use crate::ue_id::UeIdKind;

/// A message does not match the layout this crate implements.
///
/// Either a builder produced an invalid message or a peer sent content the
/// xApp has no handling for. Callers treat both as unrecoverable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// Invalid RAN parameter tree
    #[error("RAN parameter tree: {0}")]
    Tree(#[from] TreeError),

    /// Subscription cannot be built from the advertised capabilities
    #[error("KPM subscription: {0}")]
    Subscription(#[from] SubscriptionError),

    /// UE identity form not handled
    #[error("UE ID type {0} not supported")]
    UnsupportedUeId(UeIdKind),

    /// Measurement identified by id instead of name
    #[error("measurement type ID {0} not supported")]
    UnsupportedMeasTypeId(u16),

    /// Measurement record without value
    #[error("measurement record value {0} not supported")]
    UnsupportedMeasValue(&'static str),

    /// KPM indication message format not handled
    #[error("KPM indication message {0} not supported")]
    UnsupportedIndicationFormat(&'static str),

    /// E2 node does not expose the expected RAN function
    #[error("RAN function {0} not exposed by the E2 node")]
    MissingRanFunction(u16),

    /// RAN function exposes a different service model
    #[error("RAN function {0} is not an E2SM-KPM function")]
    NotKpmFunction(u16),

    /// Report without measurement descriptions
    #[error("measurement report has no measurement info")]
    EmptyMeasInfo,

    /// More records than measurement descriptions
    #[error("measurement report has {records} records but only {infos} measurement info entries")]
    MeasInfoMismatch {
        /// Records in the data item
        records: usize,
        /// Measurement info entries
        infos: usize,
    },
}
