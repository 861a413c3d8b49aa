//! UE identities carried by E2SM messages (O-RAN.WG3.E2SM Section 6.2.2.6).
//!
//! Only the gNB, gNB-DU and gNB-CU-UP forms are modelled. The remaining
//! forms are recognised by kind so that callers can reject them explicitly.

use std::fmt;

use nextgric_common::{Guami, Plmn};

use crate::error::SchemaError;

/// The seven UE identity forms defined by E2SM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UeIdKind {
    /// gNB UE ID
    Gnb,
    /// gNB-DU UE ID
    GnbDu,
    /// gNB-CU-UP UE ID
    GnbCuUp,
    /// ng-eNB UE ID
    NgEnb,
    /// ng-eNB-DU UE ID
    NgEnbDu,
    /// en-gNB UE ID
    EnGnb,
    /// eNB UE ID
    Enb,
}

impl fmt::Display for UeIdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UeIdKind::Gnb => "gNB",
            UeIdKind::GnbDu => "gNB-DU",
            UeIdKind::GnbCuUp => "gNB-CU-UP",
            UeIdKind::NgEnb => "ng-eNB",
            UeIdKind::NgEnbDu => "ng-eNB-DU",
            UeIdKind::EnGnb => "en-gNB",
            UeIdKind::Enb => "eNB",
        };
        f.write_str(name)
    }
}

/// gNB UE ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GnbUeId {
    /// AMF UE NGAP ID (40 bits)
    pub amf_ue_ngap_id: u64,
    /// Serving AMF
    pub guami: Guami,
    /// gNB-CU UE F1AP IDs, present when the gNB is split
    pub gnb_cu_ue_f1ap_ids: Vec<u32>,
    /// gNB-CU-CP UE E1AP IDs, present when the CU is split
    pub gnb_cu_cp_ue_e1ap_ids: Vec<u32>,
    /// RAN UE ID
    pub ran_ue_id: Option<u64>,
}

/// gNB-DU UE ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GnbDuUeId {
    /// gNB-CU UE F1AP ID
    pub gnb_cu_ue_f1ap_id: u32,
    /// RAN UE ID
    pub ran_ue_id: Option<u64>,
}

/// gNB-CU-UP UE ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GnbCuUpUeId {
    /// gNB-CU-CP UE E1AP ID
    pub gnb_cu_cp_ue_e1ap_id: u32,
    /// RAN UE ID
    pub ran_ue_id: Option<u64>,
}

/// A UE identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UeIdentity {
    /// gNB UE ID
    Gnb(GnbUeId),
    /// gNB-DU UE ID
    GnbDu(GnbDuUeId),
    /// gNB-CU-UP UE ID
    GnbCuUp(GnbCuUpUeId),
    /// A form this crate does not model
    Other(UeIdKind),
}

impl UeIdentity {
    /// Kind of this identity.
    pub fn kind(&self) -> UeIdKind {
        match self {
            UeIdentity::Gnb(_) => UeIdKind::Gnb,
            UeIdentity::GnbDu(_) => UeIdKind::GnbDu,
            UeIdentity::GnbCuUp(_) => UeIdKind::GnbCuUp,
            UeIdentity::Other(kind) => *kind,
        }
    }

    /// RAN UE ID, when the identity carries one.
    pub fn ran_ue_id(&self) -> Option<u64> {
        match self {
            UeIdentity::Gnb(id) => id.ran_ue_id,
            UeIdentity::GnbDu(id) => id.ran_ue_id,
            UeIdentity::GnbCuUp(id) => id.ran_ue_id,
            UeIdentity::Other(_) => None,
        }
    }

    /// Placeholder identity for node-level control messages.
    ///
    /// A gNB UE ID with AMF UE NGAP ID 0 and an all-zero AMF identifier on
    /// the given PLMN. Other kinds are rejected.
    pub fn placeholder(kind: UeIdKind, plmn: Plmn) -> Result<Self, SchemaError> {
        match kind {
            UeIdKind::Gnb => Ok(default_gnb_ue_id(plmn)),
            other => Err(SchemaError::UnsupportedUeId(other)),
        }
    }
}

/// Placeholder gNB identity, see [`UeIdentity::placeholder`].
pub fn default_gnb_ue_id(plmn: Plmn) -> UeIdentity {
    UeIdentity::Gnb(GnbUeId {
        amf_ue_ngap_id: 0,
        guami: Guami::new(plmn, 0, 0, 0),
        gnb_cu_ue_f1ap_ids: Vec::new(),
        gnb_cu_cp_ue_e1ap_ids: Vec::new(),
        ran_ue_id: None,
    })
}
