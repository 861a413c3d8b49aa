//! E2 runtime contract
//!
//! The xApp does not speak E2AP itself. Node discovery, subscription and
//! control transport are delegated to an [`E2Runtime`], which delivers KPM
//! indications by invoking the registered [`IndicationCallback`] on threads
//! it owns.
//!
//! [`SimE2Runtime`] is an in-process implementation driven by configuration.

pub mod sim;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use nextgric_common::Plmn;
use nextgric_e2sm::kpm::{KpmIndication, KpmRanFunctionDefinition, KpmSubscription};
use nextgric_e2sm::rc::RcControlRequest;
use thiserror::Error;

pub use sim::{kpm_style4_definition, synthetic_indication, SentControl, SimE2Runtime, SimNode};

/// E2 node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum E2NodeType {
    Gnb,
    GnbCu,
    GnbCuUp,
    GnbDu,
    NgEnb,
    Enb,
}

impl fmt::Display for E2NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            E2NodeType::Gnb => "gNB",
            E2NodeType::GnbCu => "gNB-CU",
            E2NodeType::GnbCuUp => "gNB-CU-UP",
            E2NodeType::GnbDu => "gNB-DU",
            E2NodeType::NgEnb => "ng-eNB",
            E2NodeType::Enb => "eNB",
        };
        f.write_str(name)
    }
}

/// Global E2 node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalE2NodeId {
    pub plmn: Plmn,
    pub node_type: E2NodeType,
    pub nb_id: u32,
}

impl GlobalE2NodeId {
    pub fn gnb(plmn: Plmn, nb_id: u32) -> Self {
        Self {
            plmn,
            node_type: E2NodeType::Gnb,
            nb_id,
        }
    }
}

impl fmt::Display for GlobalE2NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.node_type, self.plmn, self.nb_id)
    }
}

/// Service model behind a RAN function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RanFunctionDefinition {
    /// E2SM-KPM
    Kpm(KpmRanFunctionDefinition),
    /// E2SM-RC
    Rc,
    /// Any other service model, by OID
    Other(String),
}

/// A RAN function advertised by an E2 node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RanFunction {
    pub id: u16,
    pub definition: RanFunctionDefinition,
}

/// A connected E2 node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E2Node {
    pub id: GlobalE2NodeId,
    pub ran_functions: Vec<RanFunction>,
}

impl E2Node {
    /// RAN function with the given id.
    pub fn ran_function(&self, id: u16) -> Option<&RanFunction> {
        self.ran_functions.iter().find(|rf| rf.id == id)
    }
}

/// Opaque subscription handle issued by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(pub u64);

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Invoked once per received KPM indication, possibly concurrently.
pub type IndicationCallback = Arc<dyn Fn(&KpmIndication) + Send + Sync>;

/// Transport-level failures reported by an E2 runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("E2 node {0} is not connected")]
    NodeNotConnected(GlobalE2NodeId),

    #[error("E2 node {node} has no RAN function {ran_function_id}")]
    UnknownRanFunction {
        node: GlobalE2NodeId,
        ran_function_id: u16,
    },

    #[error("E2 node {node} rejected the request: {cause}")]
    Rejected { node: GlobalE2NodeId, cause: String },

    #[error("unknown subscription {0}")]
    UnknownSubscription(SubscriptionHandle),

    #[error("E2 runtime is stopping")]
    Stopping,
}

/// Services the xApp consumes from the E2 runtime.
#[async_trait]
pub trait E2Runtime: Send + Sync {
    /// Starts background delivery.
    fn start(&self) -> Result<(), RuntimeError>;

    /// Snapshot of the currently connected E2 nodes.
    fn connected_nodes(&self) -> Vec<E2Node>;

    /// Issues a KPM subscription; `callback` receives every indication.
    async fn subscribe_kpm(
        &self,
        node: &GlobalE2NodeId,
        ran_function_id: u16,
        subscription: KpmSubscription,
        callback: IndicationCallback,
    ) -> Result<SubscriptionHandle, RuntimeError>;

    /// Sends an RC control request and waits for the outcome.
    async fn control_rc(
        &self,
        node: &GlobalE2NodeId,
        ran_function_id: u16,
        request: RcControlRequest,
    ) -> Result<(), RuntimeError>;

    /// Deletes a subscription.
    async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<(), RuntimeError>;

    /// Requests the runtime to stop; returns true once it has stopped.
    fn try_stop(&self) -> bool;
}
