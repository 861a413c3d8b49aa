//! Simulated E2 runtime
//!
//! An in-process [`E2Runtime`] serving a fixed set of E2 nodes. It records
//! subscriptions and control requests, lets callers inject indications, and
//! can emit synthetic KPM reports for every active subscription from a
//! delivery thread of its own, once per report period.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use nextgric_common::{Guami, OctetString, Plmn, XappConfig};
use nextgric_e2sm::kpm::{
    ActionDefinitionFormat, EventTriggerFormat, EventTriggerStyle, IndicationFormat1,
    IndicationFormat3, IndicationHeader, IndicationMessage, KpmIndication,
    KpmRanFunctionDefinition, KpmSubscription, MeasDataItem, MeasRecord, MeasType, ReportStyle,
    ReportStyleType, UeMeasReport, REPORT_PERIOD_MS,
};
use nextgric_e2sm::rc::RcControlRequest;
use nextgric_e2sm::ue_id::GnbUeId;
use nextgric_e2sm::UeIdentity;
use tracing::{debug, info, warn};

use super::{
    E2Node, E2Runtime, GlobalE2NodeId, IndicationCallback, RanFunction, RanFunctionDefinition,
    RuntimeError, SubscriptionHandle,
};
use crate::kpm::dispatcher::KpiField;

/// KPM function definition with one periodic trigger and REPORT style 4
/// listing every measurement the xApp aggregates.
pub fn kpm_style4_definition() -> KpmRanFunctionDefinition {
    KpmRanFunctionDefinition {
        event_trigger_styles: vec![EventTriggerStyle {
            name: "Periodic Report".to_string(),
            format: EventTriggerFormat::Format1,
        }],
        report_styles: vec![ReportStyle {
            style_type: ReportStyleType::Style4,
            name: "Common Condition-based, UE-level Measurement".to_string(),
            action_format: ActionDefinitionFormat::Format4,
            measurements: KpiField::ALL
                .iter()
                .map(|field| OctetString::from_ascii(field.meas_name()))
                .collect(),
        }],
    }
}

/// A simulated E2 node.
#[derive(Debug, Clone)]
pub struct SimNode {
    pub node: E2Node,
    /// UEs reported in synthetic indications
    pub ues: u32,
}

impl SimNode {
    pub fn new(node: E2Node) -> Self {
        Self { node, ues: 1 }
    }

    /// gNB without RAN functions.
    pub fn gnb(plmn: Plmn, nb_id: u32) -> Self {
        Self::new(E2Node {
            id: GlobalE2NodeId::gnb(plmn, nb_id),
            ran_functions: Vec::new(),
        })
    }

    pub fn with_kpm(mut self, ran_function_id: u16) -> Self {
        self.node.ran_functions.push(RanFunction {
            id: ran_function_id,
            definition: RanFunctionDefinition::Kpm(kpm_style4_definition()),
        });
        self
    }

    pub fn with_rc(mut self, ran_function_id: u16) -> Self {
        self.node.ran_functions.push(RanFunction {
            id: ran_function_id,
            definition: RanFunctionDefinition::Rc,
        });
        self
    }

    pub fn with_ues(mut self, ues: u32) -> Self {
        self.ues = ues;
        self
    }
}

/// A control request accepted by the simulated runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct SentControl {
    pub node: GlobalE2NodeId,
    pub ran_function_id: u16,
    pub request: RcControlRequest,
}

struct SimSubscription {
    node: GlobalE2NodeId,
    subscription: KpmSubscription,
    callback: IndicationCallback,
    ues: u32,
    sequence: u64,
}

#[derive(Default)]
struct SimState {
    subscriptions: BTreeMap<SubscriptionHandle, SimSubscription>,
    controls: Vec<SentControl>,
    failing_nodes: HashSet<GlobalE2NodeId>,
    next_handle: u64,
}

/// In-process E2 runtime.
pub struct SimE2Runtime {
    plmn: Plmn,
    nodes: Vec<SimNode>,
    synthetic_reports: bool,
    state: Arc<Mutex<SimState>>,
    stop: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimE2Runtime {
    pub fn new(plmn: Plmn, nodes: Vec<SimNode>) -> Self {
        Self {
            plmn,
            nodes,
            synthetic_reports: false,
            state: Arc::new(Mutex::new(SimState::default())),
            stop: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    /// Runtime serving the nodes listed in `config`.
    pub fn from_config(config: &XappConfig) -> Self {
        let nodes = config
            .nodes
            .iter()
            .map(|cfg| {
                let mut node = SimNode::gnb(config.plmn, cfg.nb_id).with_ues(cfg.ues);
                if cfg.kpm {
                    node = node.with_kpm(config.kpm.ran_function_id);
                }
                if cfg.rc {
                    node = node.with_rc(config.rc.ran_function_id);
                }
                node
            })
            .collect();
        Self::new(config.plmn, nodes).with_synthetic_reports(config.synthetic_reports)
    }

    /// Emit a synthetic report per subscription every report period once
    /// started.
    pub fn with_synthetic_reports(mut self, enabled: bool) -> Self {
        self.synthetic_reports = enabled;
        self
    }

    fn sim_node(&self, id: &GlobalE2NodeId) -> Option<&SimNode> {
        self.nodes.iter().find(|n| &n.node.id == id)
    }

    fn check_ran_function(
        &self,
        id: &GlobalE2NodeId,
        ran_function_id: u16,
    ) -> Result<&SimNode, RuntimeError> {
        if self.stop.load(Ordering::Acquire) {
            return Err(RuntimeError::Stopping);
        }
        let node = self.sim_node(id).ok_or(RuntimeError::NodeNotConnected(*id))?;
        if node.node.ran_function(ran_function_id).is_none() {
            return Err(RuntimeError::UnknownRanFunction {
                node: *id,
                ran_function_id,
            });
        }
        Ok(node)
    }

    pub fn subscription_count(&self) -> usize {
        lock(&self.state).subscriptions.len()
    }

    /// Matching-condition values of the active subscriptions.
    pub fn subscription_filters(&self) -> Vec<[u8; 4]> {
        lock(&self.state)
            .subscriptions
            .values()
            .flat_map(|s| s.subscription.actions.iter().map(|a| a.matching_condition.value))
            .collect()
    }

    /// Control requests accepted so far.
    pub fn sent_controls(&self) -> Vec<SentControl> {
        lock(&self.state).controls.clone()
    }

    /// Makes `node` reject every subsequent control request.
    pub fn fail_control_for(&self, node: GlobalE2NodeId) {
        lock(&self.state).failing_nodes.insert(node);
    }

    /// Delivers `indication` to the callback of `handle` on the caller's
    /// thread.
    pub fn deliver(
        &self,
        handle: SubscriptionHandle,
        indication: &KpmIndication,
    ) -> Result<(), RuntimeError> {
        let callback = lock(&self.state)
            .subscriptions
            .get(&handle)
            .map(|s| s.callback.clone())
            .ok_or(RuntimeError::UnknownSubscription(handle))?;
        callback(indication);
        Ok(())
    }

    /// Delivers `indication` to every active subscription. Returns the
    /// number of callbacks invoked.
    pub fn deliver_all(&self, indication: &KpmIndication) -> usize {
        let callbacks: Vec<IndicationCallback> = lock(&self.state)
            .subscriptions
            .values()
            .map(|s| s.callback.clone())
            .collect();
        for callback in &callbacks {
            callback(indication);
        }
        callbacks.len()
    }

    /// Emits one synthetic report per active subscription.
    pub fn emit_synthetic_reports(&self) -> usize {
        emit_round(&self.state, self.plmn)
    }
}

fn now_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// Builds a Format 3 indication answering `subscription` with `ues` UEs.
///
/// Values depend only on `sequence` and the UE index. Counters are reported
/// as integers and everything else as reals.
pub fn synthetic_indication(
    subscription: &KpmSubscription,
    plmn: Plmn,
    ues: u32,
    sequence: u64,
) -> KpmIndication {
    let meas_info: Vec<_> = subscription
        .actions
        .iter()
        .flat_map(|a| a.subscript.measurements.iter().cloned())
        .collect();

    let ue_reports = (0..ues)
        .map(|ue| {
            let records = meas_info
                .iter()
                .enumerate()
                .map(|(i, info)| {
                    let base = sequence * 10 + u64::from(ue) + i as u64;
                    let counter = match &info.meas_type {
                        MeasType::Name(name) => {
                            KpiField::from_meas_name(name.data()).map(|f| f.is_counter())
                        }
                        MeasType::Id(_) => None,
                    };
                    match counter {
                        Some(true) => MeasRecord::Integer(base),
                        _ => MeasRecord::Real(base as f64 + 0.5),
                    }
                })
                .collect();

            UeMeasReport {
                ue_id: UeIdentity::Gnb(GnbUeId {
                    amf_ue_ngap_id: u64::from(ue) + 1,
                    guami: Guami::new(plmn, 0, 0, 0),
                    gnb_cu_ue_f1ap_ids: Vec::new(),
                    gnb_cu_cp_ue_e1ap_ids: Vec::new(),
                    ran_ue_id: Some(u64::from(ue) + 1),
                }),
                report: IndicationFormat1 {
                    meas_data: vec![MeasDataItem {
                        records,
                        incomplete: false,
                    }],
                    meas_info: meas_info.clone(),
                    granularity_period_ms: Some(REPORT_PERIOD_MS),
                },
            }
        })
        .collect();

    KpmIndication {
        header: IndicationHeader {
            collect_start_time_us: now_us(),
            sender_name: Some("nextgric-sim".to_string()),
        },
        message: IndicationMessage::Format3(IndicationFormat3 { ue_reports }),
    }
}

// Indications are built under the lock; callbacks run outside it.
fn emit_round(state: &Mutex<SimState>, plmn: Plmn) -> usize {
    let batch: Vec<(IndicationCallback, KpmIndication)> = {
        let mut state = lock(state);
        state
            .subscriptions
            .values_mut()
            .map(|sub| {
                sub.sequence += 1;
                let ind = synthetic_indication(&sub.subscription, plmn, sub.ues, sub.sequence);
                debug!(node = %sub.node, sequence = sub.sequence, "Synthetic KPM report");
                (sub.callback.clone(), ind)
            })
            .collect()
    };
    for (callback, indication) in &batch {
        callback(indication);
    }
    batch.len()
}

#[async_trait]
impl E2Runtime for SimE2Runtime {
    fn start(&self) -> Result<(), RuntimeError> {
        if self.stop.load(Ordering::Acquire) {
            return Err(RuntimeError::Stopping);
        }
        info!(
            nodes = self.nodes.len(),
            synthetic = self.synthetic_reports,
            "Simulated E2 runtime started"
        );
        if !self.synthetic_reports {
            return Ok(());
        }

        let mut worker = lock(&self.worker);
        if worker.is_some() {
            return Ok(());
        }
        let state = self.state.clone();
        let stop = self.stop.clone();
        let plmn = self.plmn;
        *worker = Some(thread::spawn(move || {
            let period = Duration::from_millis(REPORT_PERIOD_MS);
            let mut next = Instant::now() + period;
            while !stop.load(Ordering::Acquire) {
                if Instant::now() < next {
                    thread::sleep(Duration::from_millis(10));
                    continue;
                }
                emit_round(&state, plmn);
                next += period;
            }
        }));
        Ok(())
    }

    fn connected_nodes(&self) -> Vec<E2Node> {
        self.nodes.iter().map(|n| n.node.clone()).collect()
    }

    async fn subscribe_kpm(
        &self,
        node: &GlobalE2NodeId,
        ran_function_id: u16,
        subscription: KpmSubscription,
        callback: IndicationCallback,
    ) -> Result<SubscriptionHandle, RuntimeError> {
        let ues = self.check_ran_function(node, ran_function_id)?.ues;
        let mut state = lock(&self.state);
        state.next_handle += 1;
        let handle = SubscriptionHandle(state.next_handle);
        state.subscriptions.insert(
            handle,
            SimSubscription {
                node: *node,
                subscription,
                callback,
                ues,
                sequence: 0,
            },
        );
        Ok(handle)
    }

    async fn control_rc(
        &self,
        node: &GlobalE2NodeId,
        ran_function_id: u16,
        request: RcControlRequest,
    ) -> Result<(), RuntimeError> {
        self.check_ran_function(node, ran_function_id)?;
        let mut state = lock(&self.state);
        if state.failing_nodes.contains(node) {
            return Err(RuntimeError::Rejected {
                node: *node,
                cause: "control failure".to_string(),
            });
        }
        debug!(%node, "RC control request accepted:\n{}", request.message);
        state.controls.push(SentControl {
            node: *node,
            ran_function_id,
            request,
        });
        Ok(())
    }

    async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<(), RuntimeError> {
        lock(&self.state)
            .subscriptions
            .remove(&handle)
            .map(|_| ())
            .ok_or(RuntimeError::UnknownSubscription(handle))
    }

    fn try_stop(&self) -> bool {
        self.stop.store(true, Ordering::Release);
        let mut worker = lock(&self.worker);
        match worker.take() {
            None => true,
            Some(handle) if handle.is_finished() => {
                if handle.join().is_err() {
                    warn!("Synthetic report thread panicked");
                }
                true
            }
            Some(handle) => {
                *worker = Some(handle);
                false
            }
        }
    }
}
