//! Slice control payloads.
//!
//! Two E2SM-RC control messages are built here:
//!
//! - Slice-level PRB quota (style 2, action 6), a list of RRM policy ratio
//!   groups with one policy member per slice (Section 8.4.3.6)
//! - Handover control with a slice-level target (style 3, action 1)
//!
//! Slice identifiers are carried as the decimal text the operator supplied,
//! e.g. SST `"1"` and SD `"000080"`. The PLMN is carried as its digit string.

use nextgric_common::Plmn;

use crate::error::SchemaError;
use crate::ran_param::{element, list, structure, RanParam, TreeError};
use crate::rc::control::{
    ConnectedModeMobilityAction, ControlAction, RadioResourceAllocationAction, RcControlHeader,
    RcControlRequest,
};

/// RAN parameter ids of the Slice-level PRB quota message.
pub mod prb_quota_ids {
    use crate::ran_param::RanParamId;

    pub const RRM_POLICY_RATIO_LIST: RanParamId = 1;
    pub const RRM_POLICY_RATIO_GROUP: RanParamId = 2;
    pub const RRM_POLICY: RanParamId = 3;
    pub const RRM_POLICY_MEMBER_LIST: RanParamId = 4;
    pub const RRM_POLICY_MEMBER: RanParamId = 5;
    pub const PLMN_IDENTITY: RanParamId = 6;
    pub const S_NSSAI: RanParamId = 7;
    pub const SST: RanParamId = 8;
    pub const SD: RanParamId = 9;
    pub const MIN_PRB_POLICY_RATIO: RanParamId = 10;
    pub const MAX_PRB_POLICY_RATIO: RanParamId = 11;
    pub const DEDICATED_PRB_POLICY_RATIO: RanParamId = 12;
}

/// RAN parameter ids of the slice-level Handover Control message.
pub mod handover_ids {
    use crate::ran_param::RanParamId;

    pub const TARGET_SLICE_INFORMATION: RanParamId = 1;
    pub const S_NSSAI: RanParamId = 2;
    pub const SST: RanParamId = 3;
    pub const SD: RanParamId = 4;
    pub const PLMN_IDENTITY: RanParamId = 5;
}

/// PRB quota for one slice, ratios in percent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlicePrbQuota {
    pub sst: String,
    pub sd: String,
    pub min_ratio: i64,
    pub max_ratio: i64,
    pub dedicated_ratio: i64,
}

impl SlicePrbQuota {
    /// Quota with min, max and dedicated ratio all set to `ratio`.
    pub fn uniform(sst: impl Into<String>, sd: impl Into<String>, ratio: i64) -> Self {
        Self {
            sst: sst.into(),
            sd: sd.into(),
            min_ratio: ratio,
            max_ratio: ratio,
            dedicated_ratio: ratio,
        }
    }
}

/// One RRM Policy Ratio Group entry.
///
/// ```text
/// RRM Policy (STRUCTURE)
/// > RRM Policy Member List (LIST)
/// >> RRM Policy Member (STRUCTURE)
/// >>> PLMN Identity (ELEMENT)
/// >>> S-NSSAI (STRUCTURE)
/// >>>> SST (ELEMENT)
/// >>>> SD (ELEMENT)
/// Min PRB Policy Ratio (ELEMENT)
/// Max PRB Policy Ratio (ELEMENT)
/// Dedicated PRB Policy Ratio (ELEMENT)
/// ```
pub fn rrm_policy_ratio_group(
    plmn: Plmn,
    quota: &SlicePrbQuota,
) -> Result<Vec<RanParam>, TreeError> {
    use prb_quota_ids::*;

    let s_nssai = structure(
        S_NSSAI,
        vec![element(SST, quota.sst.as_str()), element(SD, quota.sd.as_str())],
    )?;
    let member = structure(
        RRM_POLICY_MEMBER,
        vec![element(PLMN_IDENTITY, plmn.to_string().as_str()), s_nssai],
    )?;
    let member_list = list(RRM_POLICY_MEMBER_LIST, vec![vec![member]])?;
    let policy = structure(RRM_POLICY, vec![member_list])?;

    Ok(vec![
        policy,
        element(MIN_PRB_POLICY_RATIO, quota.min_ratio),
        element(MAX_PRB_POLICY_RATIO, quota.max_ratio),
        element(DEDICATED_PRB_POLICY_RATIO, quota.dedicated_ratio),
    ])
}

/// Slice-level PRB quota tree: one ratio group per slice, in input order.
pub fn slice_level_prb_quota(
    plmn: Plmn,
    quotas: &[SlicePrbQuota],
) -> Result<RanParam, TreeError> {
    let groups = quotas
        .iter()
        .map(|q| rrm_policy_ratio_group(plmn, q))
        .collect::<Result<Vec<_>, _>>()?;
    list(prb_quota_ids::RRM_POLICY_RATIO_LIST, groups)
}

/// Handover control tree with a slice-level target.
///
/// ```text
/// Target Slice Information (STRUCTURE)
/// > PLMN Identity (ELEMENT)
/// > S-NSSAI (STRUCTURE)
/// >> SST (ELEMENT)
/// >> SD (ELEMENT)
/// ```
///
/// PLMN Identity precedes S-NSSAI on the wire.
pub fn handover_slice_level(plmn: Plmn, sst: &str, sd: &str) -> Result<RanParam, TreeError> {
    use handover_ids::*;

    let s_nssai = structure(S_NSSAI, vec![element(SST, sst), element(SD, sd)])?;
    structure(
        TARGET_SLICE_INFORMATION,
        vec![element(PLMN_IDENTITY, plmn.to_string().as_str()), s_nssai],
    )
}

/// Complete Slice-level PRB quota control request.
pub fn slice_prb_quota_request(
    plmn: Plmn,
    quotas: &[SlicePrbQuota],
) -> Result<RcControlRequest, SchemaError> {
    let action =
        ControlAction::RadioResourceAllocation(RadioResourceAllocationAction::SliceLevelPrbQuota);
    Ok(RcControlRequest {
        header: RcControlHeader::node_level(action, plmn)?,
        message: slice_level_prb_quota(plmn, quotas)?,
    })
}

/// Complete slice-level Handover Control request.
pub fn handover_request(plmn: Plmn, sst: &str, sd: &str) -> Result<RcControlRequest, SchemaError> {
    let action =
        ControlAction::ConnectedModeMobility(ConnectedModeMobilityAction::HandoverControl);
    Ok(RcControlRequest {
        header: RcControlHeader::node_level(action, plmn)?,
        message: handover_slice_level(plmn, sst, sd)?,
    })
}
