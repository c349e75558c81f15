//! Scripted providers for race tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ceprace_api::FetchError;
use ceprace_types::{LookupKey, LookupResult, ProviderId};

use crate::provider::LookupProvider;

pub fn sample_result(source: impl Into<ProviderId>) -> LookupResult {
    LookupResult::new(source.into(), "01153000", "Rua X", "Centro", "São Paulo", "SP")
}

/// Records whether a lookup was started and whether it ran to completion.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    started: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl Probe {
    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

/// Provider that sleeps for `delay`, then succeeds or fails.
pub struct FakeProvider {
    id: ProviderId,
    delay: Duration,
    succeed: bool,
    probe: Probe,
}

impl FakeProvider {
    pub fn succeeds(id: impl Into<ProviderId>, delay: Duration) -> Self {
        Self {
            id: id.into(),
            delay,
            succeed: true,
            probe: Probe::default(),
        }
    }

    pub fn fails(id: impl Into<ProviderId>, delay: Duration) -> Self {
        Self {
            succeed: false,
            ..Self::succeeds(id, delay)
        }
    }

    pub fn probe(&self) -> Probe {
        self.probe.clone()
    }

    pub fn shared(self) -> Arc<dyn LookupProvider> {
        Arc::new(self)
    }
}

#[async_trait]
impl LookupProvider for FakeProvider {
    fn id(&self) -> ProviderId {
        self.id.clone()
    }

    async fn lookup(&self, key: &LookupKey) -> Result<LookupResult, FetchError> {
        self.probe.started.store(true, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.probe.finished.store(true, Ordering::SeqCst);
        if self.succeed {
            Ok(sample_result(self.id.clone()))
        } else {
            Err(FetchError::NotFound { key: key.to_string() })
        }
    }
}
