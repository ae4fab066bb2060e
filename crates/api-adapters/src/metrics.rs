//! Prometheus counters for the HTTP surface.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Operation {
    CreateThread,
    ListThreads,
    DeleteThread,
    ReportThread,
    CreateReply,
    ViewThread,
    DeleteReply,
    ReportReply,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Outcome {
    Ok,
    NotFound,
    Unauthorized,
    Invalid,
    StoreFailure,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    pub operation: Operation,
    pub outcome: Outcome,
}

/// Exposed as `board_requests_total{operation, outcome}`.
#[derive(Debug)]
pub struct Metrics {
    registry: Registry,
    requests: Family<RequestLabels, Counter>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("board");
        let requests = Family::<RequestLabels, Counter>::default();
        registry.register(
            "requests",
            "Board API requests by operation and outcome",
            requests.clone(),
        );
        Self { registry, requests }
    }

    pub fn record(&self, operation: Operation, outcome: Outcome) {
        self.requests
            .get_or_create(&RequestLabels { operation, outcome })
            .inc();
    }

    /// Count recorded so far for one label pair.
    pub fn count(&self, operation: Operation, outcome: Outcome) -> u64 {
        self.requests
            .get_or_create(&RequestLabels { operation, outcome })
            .get()
    }

    /// OpenMetrics text exposition of every registered metric.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}
