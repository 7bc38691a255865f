use crate::db::{NewRequestLog, Store};
use tracing::{debug, error};

/// Writes one request-log row per API call.
///
/// Recording never fails from the caller's point of view: a database error is
/// reported on the operator log stream and otherwise dropped.
#[derive(Clone)]
pub struct AuditLogger {
    store: Store,
}

impl AuditLogger {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn record(&self, entry: NewRequestLog) {
        debug!(
            endpoint = %entry.endpoint,
            method = %entry.method,
            status = entry.status_code,
            "Recording API request"
        );

        let endpoint = entry.endpoint.clone();
        if let Err(e) = self.store.add_request_log(entry).await {
            error!(error = %e, endpoint = %endpoint, "Failed to log API request");
        }
    }
}
