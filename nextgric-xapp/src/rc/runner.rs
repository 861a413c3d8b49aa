//! RC control task runner
//!
//! Builds E2SM-RC control requests and sends one to every connected node.
//! A failure on one node is logged and does not stop delivery to the rest.

use std::sync::Arc;

use nextgric_common::Plmn;
use nextgric_e2sm::rc::{handover_request, slice_prb_quota_request, RcControlRequest, SlicePrbQuota};
use nextgric_e2sm::SchemaError;
use tracing::{error, info, warn};

use crate::e2::{E2Runtime, GlobalE2NodeId};

/// Delivery outcome of one control task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControlOutcome {
    /// Nodes a request was sent to
    pub attempted: usize,
    /// Nodes that reported a failure
    pub failed: Vec<GlobalE2NodeId>,
}

impl ControlOutcome {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed.len()
    }
}

pub struct RcControlRunner {
    runtime: Arc<dyn E2Runtime>,
    plmn: Plmn,
    ran_function_id: u16,
}

impl RcControlRunner {
    pub fn new(runtime: Arc<dyn E2Runtime>, plmn: Plmn, ran_function_id: u16) -> Self {
        Self {
            runtime,
            plmn,
            ran_function_id,
        }
    }

    /// Applies Slice-level PRB quota to every connected node.
    ///
    /// The request is built before anything is sent, so a malformed quota
    /// set reaches no node.
    pub async fn run_slice_prb_quota(
        &self,
        quotas: &[SlicePrbQuota],
    ) -> Result<ControlOutcome, SchemaError> {
        for (i, quota) in quotas.iter().enumerate() {
            info!(
                slice = i,
                sst = %quota.sst,
                sd = %quota.sd,
                min_ratio = quota.min_ratio,
                max_ratio = quota.max_ratio,
                dedicated_ratio = quota.dedicated_ratio,
                "Slice-level PRB quota"
            );
        }
        let request = slice_prb_quota_request(self.plmn, quotas)?;
        Ok(self.send_to_all(request).await)
    }

    /// Steers UEs to the slice `sst`/`sd` on every connected node.
    pub async fn run_handover_slice_level(
        &self,
        sst: &str,
        sd: &str,
    ) -> Result<ControlOutcome, SchemaError> {
        info!(sst, sd, "Slice-level handover control");
        let request = handover_request(self.plmn, sst, sd)?;
        Ok(self.send_to_all(request).await)
    }

    async fn send_to_all(&self, request: RcControlRequest) -> ControlOutcome {
        let nodes = self.runtime.connected_nodes();
        let mut outcome = ControlOutcome::default();
        if nodes.is_empty() {
            warn!("No connected nodes, control request not sent");
            return outcome;
        }

        for node in &nodes {
            outcome.attempted += 1;
            match self
                .runtime
                .control_rc(&node.id, self.ran_function_id, request.clone())
                .await
            {
                Ok(()) => info!(node = %node.id, "RC control delivered"),
                Err(e) => {
                    error!(node = %node.id, "RC control failed: {}", e);
                    outcome.failed.push(node.id);
                }
            }
        }
        outcome
    }
}
