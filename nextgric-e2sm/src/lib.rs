//! E2 service model content for the nextgric xApps
//!
//! This crate models the parts of E2SM-RC and E2SM-KPM that the xApps use:
//!
//! - [`ran_param`]: RAN parameter trees and their builders
//! - [`rc`]: RC control headers and the slice control payloads
//! - [`kpm`]: KPM subscriptions and indication content
//! - [`ue_id`]: UE identities
//!
//! Messages are plain Rust values. Encoding them for the E2 interface is the
//! job of the E2 runtime the xApp runs on.

pub mod error;
pub mod kpm;
pub mod ran_param;
pub mod rc;
pub mod ue_id;

pub use error::SchemaError;
pub use ran_param::{
    element, list, optional_structure, structure, ElementValue, RanParam, RanParamValue, TreeError,
};
pub use ue_id::{default_gnb_ue_id, UeIdKind, UeIdentity};
