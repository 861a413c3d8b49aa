//! E2SM-RC (RAN Control) messages

pub mod control;
pub mod slice;

pub use control::{
    ConnectedModeMobilityAction, ControlAction, RadioResourceAllocationAction, RcControlHeader,
    RcControlRequest,
};
pub use slice::{
    handover_request, handover_slice_level, rrm_policy_ratio_group, slice_level_prb_quota,
    slice_prb_quota_request, SlicePrbQuota,
};
