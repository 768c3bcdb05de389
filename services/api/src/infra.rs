use async_trait::async_trait;
use listing_desk::listing::{ListingDraft, ListingSubmitter, SubmitError};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Stand-in for the marketplace backend: accepts every listing, stamps an id
/// and a pending-review status, and keeps what it received.
#[derive(Default, Clone)]
pub(crate) struct InMemoryListingBackend {
    received: Arc<Mutex<Vec<ListingDraft>>>,
}

#[async_trait]
impl ListingSubmitter for InMemoryListingBackend {
    async fn submit_listing(&self, draft: &ListingDraft) -> Result<ListingDraft, SubmitError> {
        let mut guard = self.received.lock().expect("listing backend mutex poisoned");
        guard.push(draft.clone());

        let mut echoed = draft.to_json();
        if let Some(fields) = echoed.as_object_mut() {
            fields.insert("id".to_string(), json!(format!("demo-listing-{}", guard.len())));
            fields.insert("status".to_string(), json!("PENDING_REVIEW"));
        }
        ListingDraft::from_json(echoed).map_err(|err| SubmitError::Rejected(err.to_string()))
    }
}

impl InMemoryListingBackend {
    pub(crate) fn received(&self) -> Vec<ListingDraft> {
        self.received
            .lock()
            .expect("listing backend mutex poisoned")
            .clone()
    }
}
