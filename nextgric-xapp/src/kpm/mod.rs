//! KPM monitoring
//!
//! Subscription management, measurement dispatch, aggregation and
//! persistence of the KPIs reported by the E2 nodes.

pub mod aggregator;
pub mod callback;
pub mod dispatcher;
pub mod monitor;
pub mod sink;

pub use aggregator::{MetricsAggregator, ReportSummary};
pub use callback::kpm_indication_callback;
pub use dispatcher::{dispatch, Dispatched, KpiField, KpiRecord};
pub use monitor::KpmMonitor;
pub use sink::{KpiRow, KpiSink, SinkError, SqliteKpiSink};
