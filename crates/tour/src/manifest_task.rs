use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use formats::{ManifestError, validate_manifest};
use scene::Area;
use serde_json::Value;
use tracing::{debug, info};

use crate::session::TourSession;

/// Somewhere a manifest can be fetched from (HTTP endpoint, local file, fixture).
pub trait ManifestSource {
    /// Fetch the raw JSON payload.
    fn fetch(&self) -> impl Future<Output = Result<Value, ManifestError>> + Send;

    /// Human-readable location, used in logs.
    fn describe(&self) -> String;
}

/// Shared flag that tells an in-flight manifest fetch its result is no longer wanted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// One-shot manifest load that fails quietly.
///
/// Any failure (transport, parse, validation) or a cancellation leaves the
/// caller with `None`, and the viewer keeps whatever areas it already had.
#[derive(Debug, Clone, Default)]
pub struct ManifestTask {
    cancel: CancelToken,
}

impl ManifestTask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub async fn run<S: ManifestSource>(&self, source: &S) -> Option<Vec<Area>> {
        if self.cancel.is_cancelled() {
            return None;
        }

        let fetched = source.fetch().await;
        if self.cancel.is_cancelled() {
            debug!(source = %source.describe(), "manifest result dropped after cancel");
            return None;
        }

        match fetched.and_then(|payload| validate_manifest(&payload)) {
            Ok(areas) => {
                info!(source = %source.describe(), areas = areas.len(), "manifest loaded");
                Some(areas)
            }
            Err(err) => {
                debug!(source = %source.describe(), kind = ?err.kind(), %err, "manifest ignored");
                None
            }
        }
    }

    /// Fetch and, if usable, install the manifest into `session`.
    pub async fn refresh<S: ManifestSource>(&self, source: &S, session: &mut TourSession) -> bool {
        match self.run(source).await {
            Some(areas) => session.apply_manifest_areas(areas),
            None => false,
        }
    }
}
