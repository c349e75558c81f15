//! Lookup providers and the attempt wrapper that races them.
//!
//! Modules:
//! - `brasil_api`: BrasilAPI CEP v1 adapter
//! - `via_cep`: ViaCEP JSON adapter
//!
//! Each provider only knows how to turn a key into a [`LookupResult`].
//! Cancellation, deadline handling and publishing are done once, in
//! [`attempt`].

mod brasil_api;
mod via_cep;

pub use brasil_api::BrasilApiProvider;
pub use via_cep::ViaCepProvider;

use std::sync::Arc;

use async_trait::async_trait;
use ceprace_api::FetchError;
use ceprace_types::{LookupKey, LookupResult, ProviderId};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::race::RaceContext;

/// One external address service.
#[async_trait]
pub trait LookupProvider: Send + Sync {
    /// Provenance label stamped on every result this provider produces.
    fn id(&self) -> ProviderId;

    /// Perform a single lookup for `key`.
    ///
    /// Implementations must not retry; the future may be dropped at any await
    /// point when the race is settled.
    async fn lookup(&self, key: &LookupKey) -> Result<LookupResult, FetchError>;
}

/// Run one provider inside a race and publish its result if it wins.
///
/// Failures are logged and swallowed. The attempt gives up without writing
/// when the race is already done at entry, when it is settled while the
/// lookup is in flight, or when it is settled before the result can be
/// handed to the coordinator.
pub async fn attempt(
    context: RaceContext,
    key: LookupKey,
    provider: Arc<dyn LookupProvider>,
    sender: mpsc::Sender<LookupResult>,
) {
    let provider_id = provider.id();
    if context.is_done() {
        trace!(provider = %provider_id, "race settled before attempt started");
        return;
    }

    let looked_up = tokio::select! {
        biased;
        _ = context.done() => {
            debug!(provider = %provider_id, "lookup abandoned: race settled");
            return;
        }
        looked_up = provider.lookup(&key) => looked_up,
    };

    let result = match looked_up {
        Ok(result) => result,
        Err(error) => {
            debug!(provider = %provider_id, %error, "provider abandoned");
            return;
        }
    };

    if context.is_done() {
        debug!(provider = %provider_id, "late result discarded");
        return;
    }

    tokio::select! {
        biased;
        _ = context.done() => debug!(provider = %provider_id, "late result discarded"),
        sent = sender.send(result) => match sent {
            Ok(()) => debug!(provider = %provider_id, "result published"),
            Err(_) => debug!(provider = %provider_id, "race no longer listening"),
        },
    }
}
