//! E2SM-RC control header and message (Format 1).

use std::fmt;

use nextgric_common::Plmn;

use crate::error::SchemaError;
use crate::ran_param::RanParam;
use crate::ue_id::{UeIdKind, UeIdentity};

/// Control Service Style 2: Radio Resource Allocation Control
/// (O-RAN.WG3.E2SM-RC Section 7.6.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum RadioResourceAllocationAction {
    DrxParameterConfiguration = 1,
    SrPeriodicityConfiguration = 2,
    SpsParametersConfiguration = 3,
    ConfiguredGrantControl = 4,
    CqiTableConfiguration = 5,
    SliceLevelPrbQuota = 6,
}

/// Control Service Style 3: Connected Mode Mobility Control
/// (O-RAN.WG3.E2SM-RC Section 7.6.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ConnectedModeMobilityAction {
    HandoverControl = 1,
    ConditionalHandoverControl = 2,
    DapsHandoverControl = 3,
}

/// Control action, qualified by its service style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    /// Style 2
    RadioResourceAllocation(RadioResourceAllocationAction),
    /// Style 3
    ConnectedModeMobility(ConnectedModeMobilityAction),
}

impl ControlAction {
    /// RIC Style Type of the action.
    pub fn style_type(&self) -> u32 {
        match self {
            ControlAction::RadioResourceAllocation(_) => 2,
            ControlAction::ConnectedModeMobility(_) => 3,
        }
    }

    /// Control Action ID within the style.
    pub fn action_id(&self) -> u16 {
        match self {
            ControlAction::RadioResourceAllocation(a) => *a as u16,
            ControlAction::ConnectedModeMobility(a) => *a as u16,
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlAction::RadioResourceAllocation(a) => format!("{a:?}"),
            ControlAction::ConnectedModeMobility(a) => format!("{a:?}"),
        };
        write!(f, "{name} (style {}, action {})", self.style_type(), self.action_id())
    }
}

/// Control header, Format 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcControlHeader {
    /// Target UE
    pub ue_id: UeIdentity,
    /// RIC Style Type
    pub ric_style_type: u32,
    /// Control Action ID
    pub control_action_id: u16,
}

impl RcControlHeader {
    /// Builds a Format 1 header for `action` addressed to `ue_id`.
    pub fn format1(ue_id: UeIdentity, action: ControlAction) -> Self {
        Self {
            ue_id,
            ric_style_type: action.style_type(),
            control_action_id: action.action_id(),
        }
    }

    /// Format 1 header carrying the placeholder gNB UE identity.
    pub fn node_level(action: ControlAction, plmn: Plmn) -> Result<Self, SchemaError> {
        let ue_id = UeIdentity::placeholder(UeIdKind::Gnb, plmn)?;
        Ok(Self::format1(ue_id, action))
    }
}

/// A complete RC control request: header plus Format 1 message tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcControlRequest {
    pub header: RcControlHeader,
    pub message: RanParam,
}
