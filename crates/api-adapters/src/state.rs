//! Application state shared across handlers

use std::sync::Arc;

use services::ThreadService;

use crate::error::ApiError;
use crate::metrics::{Metrics, Operation, Outcome};

#[derive(Clone)]
pub struct AppState {
    pub service: ThreadService,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(service: ThreadService) -> Self {
        Self {
            service,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Counts the outcome of one handled request and passes it through.
    pub fn observe<T>(&self, operation: Operation, result: Result<T, ApiError>) -> Result<T, ApiError> {
        let outcome = match &result {
            Ok(_) => Outcome::Ok,
            Err(e) => e.outcome(),
        };
        self.metrics.record(operation, outcome);
        result
    }
}
