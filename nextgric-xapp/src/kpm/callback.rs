//! Indication callback handed to the E2 runtime.

use std::sync::Arc;

use nextgric_e2sm::kpm::KpmIndication;
use tracing::error;

use crate::e2::IndicationCallback;
use crate::kpm::aggregator::MetricsAggregator;
use crate::kpm::sink::KpiSink;
use crate::tasks::{ShutdownReason, ShutdownSignal};

/// Wraps `aggregator` as an [`IndicationCallback`].
///
/// An indication the xApp cannot interpret is a schema violation: it is
/// logged and the process is asked to terminate with a fatal reason.
pub fn kpm_indication_callback<S>(
    aggregator: Arc<MetricsAggregator<S>>,
    shutdown: ShutdownSignal,
) -> IndicationCallback
where
    S: KpiSink + 'static,
{
    Arc::new(move |indication: &KpmIndication| {
        if let Err(e) = aggregator.process_indication(indication) {
            error!("Unprocessable KPM indication: {}", e);
            shutdown.trigger(ShutdownReason::Fatal(e.to_string()));
        }
    })
}
