//! Shared helpers for engine and supervisor tests.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use dd_core::WatchSettings;

use crate::error::GenerateError;
use crate::generator::{GenerateRequest, GeneratedDocument, Generator};

/// Settings short enough for tests to observe several sweeps quickly.
pub(crate) fn test_settings() -> WatchSettings {
    WatchSettings {
        stability_ms: 150,
        poll_interval_ms: 50,
        ..WatchSettings::default()
    }
}

/// Clones a recording generator as the trait object engines take.
pub(crate) fn shared(generator: &Arc<RecordingGenerator>) -> Arc<dyn Generator> {
    let generator: Arc<RecordingGenerator> = Arc::clone(generator);
    generator
}

/// Records every request, reads both inputs like a real generator would,
/// then writes the output file or fails.
#[derive(Debug, Default)]
pub(crate) struct RecordingGenerator {
    requests: Mutex<Vec<GenerateRequest>>,
    fail: bool,
}

impl RecordingGenerator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl Generator for RecordingGenerator {
    fn generate(&self, request: &GenerateRequest) -> Result<GeneratedDocument, GenerateError> {
        self.requests.lock().push(request.clone());
        for input in [&request.data_path, &request.template_path] {
            std::fs::read(input).map_err(|e| GenerateError::other(e.to_string()))?;
        }
        if self.fail {
            return Err(GenerateError::other("template is corrupt"));
        }
        let path = request.output_path();
        std::fs::write(&path, request.base_name.as_bytes())
            .map_err(|e| GenerateError::other(e.to_string()))?;
        Ok(GeneratedDocument { path })
    }
}

/// Polls `condition` every 20ms until it holds or `limit` passes.
pub(crate) async fn wait_until(limit: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
