//! Progress reporting for the page walk and the enrichment batch.
//!
//! [`ProgressCallback`] keeps the crawl independent of any rendering
//! backend. The CLI plugs in `indicatif` bars; tests and library callers
//! use [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates from long-running crawl steps.
pub trait ProgressCallback: Send + Sync {
    /// Number of pages or items the step will process, once known.
    fn set_total(&self, total: u64);

    /// Records `delta` more pages or items as done.
    fn inc(&self, delta: u64);

    fn set_message(&self, msg: String);

    /// Called once when the step stops, with a summary of the result.
    fn finish(&self, msg: String);
}

/// Progress sink for library callers that render nothing.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// [`NullProgress`] behind the shared handle the crawl steps take.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
