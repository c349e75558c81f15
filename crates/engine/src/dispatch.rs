//! Wiring from settings to a race.

use std::sync::Arc;
use std::time::Duration;

use ceprace_api::{FetchError, ProviderClient};
use ceprace_types::{LookupKey, ProviderId, ProviderKind, RaceOutcome};
use ceprace_util::Settings;
use thiserror::Error;

use crate::provider::{BrasilApiProvider, LookupProvider, ViaCepProvider};
use crate::race::{RaceError, race};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Race(#[from] RaceError),

    #[error("cannot configure provider {provider}: {source}")]
    Client {
        provider: ProviderKind,
        #[source]
        source: FetchError,
    },
}

/// Holds the providers to race and the deadline to race them under.
///
/// Every call to [`Dispatcher::resolve`] runs a fresh, independent race.
pub struct Dispatcher {
    providers: Vec<Arc<dyn LookupProvider>>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(providers: Vec<Arc<dyn LookupProvider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// Build the enabled providers, in configured order, from `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, DispatchError> {
        let providers = settings
            .providers
            .iter()
            .map(|&kind| build_provider(kind, settings.base_url(kind)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(providers, settings.timeout()))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|provider| provider.id()).collect()
    }

    pub async fn resolve(&self, key: &LookupKey) -> Result<RaceOutcome, DispatchError> {
        Ok(race(key, &self.providers, self.timeout).await?)
    }
}

fn build_provider(kind: ProviderKind, base_url: &str) -> Result<Arc<dyn LookupProvider>, DispatchError> {
    let client = ProviderClient::new(base_url).map_err(|source| DispatchError::Client { provider: kind, source })?;
    Ok(match kind {
        ProviderKind::BrasilApi => Arc::new(BrasilApiProvider::new(client)),
        ProviderKind::ViaCep => Arc::new(ViaCepProvider::new(client)),
    })
}
