//! nextgric-xapp - RAN slice control and KPM monitoring xApp
#![allow(missing_docs)]
//!
//! The xApp runs two independent pipelines against the E2 nodes exposed by
//! an [`e2::E2Runtime`]:
//!
//! - **Monitoring**: one E2SM-KPM subscription per node and slice filter.
//!   Every indication is dispatched into a shared KPI record and a snapshot
//!   row is appended to the KPI sink.
//! - **Control**: `POST /run` on the REST endpoint builds a Slice-level PRB
//!   quota request and sends it to every connected node.
//!
//! # Architecture
//!
//! ```text
//!              ┌──────────────────────── nr-xapp ────────────────────────┐
//!  E2 nodes ◄──┤  E2Runtime ──► IndicationCallback ──► MetricsAggregator ├──► KPI sink
//!              │      ▲                                                  │
//!              │      └──── RcControlRunner ◄──── REST (POST /run) ◄─────┼─── operator
//!              └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Task Lifecycle
//!
//! The KPM monitor and the REST server run as tasks under a `TaskManager`.
//! A process signal, or a schema violation raised from any task or from a
//! runtime delivery thread, trips the shared `ShutdownSignal`; the binary
//! then stops the tasks, stops the runtime and closes the sink.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use nextgric_xapp::{kpm_indication_callback, MetricsAggregator, SqliteKpiSink, ShutdownSignal};
//!
//! let aggregator = Arc::new(MetricsAggregator::new(SqliteKpiSink::in_memory()?));
//! let callback = kpm_indication_callback(aggregator.clone(), ShutdownSignal::new());
//! ```

pub mod app;
pub mod e2;
pub mod kpm;
pub mod rc;
pub mod tasks;

// Re-export app module types
pub use app::{
    load_and_validate_xapp_config, load_xapp_config, load_xapp_config_from_str,
    validate_xapp_config, ConfigError, ConfigValidationError,
};

// Re-export E2 runtime types
pub use e2::{
    E2Node, E2NodeType, E2Runtime, GlobalE2NodeId, IndicationCallback, RanFunction,
    RanFunctionDefinition, RuntimeError, SentControl, SimE2Runtime, SimNode, SubscriptionHandle,
};

// Re-export KPM pipeline types
pub use kpm::{
    dispatch, kpm_indication_callback, Dispatched, KpiField, KpiRecord, KpiRow, KpiSink,
    KpmMonitor, MetricsAggregator, ReportSummary, SinkError, SqliteKpiSink,
};

// Re-export RC control types
pub use rc::{ControlOutcome, RcControlRunner, RequestError, RestServer, RestTask};

// Re-export lifecycle management types
pub use tasks::{
    ShutdownReason, ShutdownSignal, Task, TaskError, TaskId, TaskInfo, TaskManager, TaskState,
    DEFAULT_SHUTDOWN_TIMEOUT_MS,
};
