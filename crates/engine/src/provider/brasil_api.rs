use async_trait::async_trait;
use ceprace_api::{FetchError, ProviderClient, path_segment};
use ceprace_types::{LookupKey, LookupResult, ProviderId};
use serde::Deserialize;

use super::LookupProvider;

/// Success body of `GET /api/cep/v1/{cep}`.
#[derive(Debug, Deserialize)]
struct BrasilApiAddress {
    cep: String,
    #[serde(default)]
    street: Option<String>,
    #[serde(default)]
    neighborhood: Option<String>,
    city: String,
    state: String,
}

/// Adapter for the BrasilAPI CEP v1 endpoint.
#[derive(Debug, Clone)]
pub struct BrasilApiProvider {
    client: ProviderClient,
}

impl BrasilApiProvider {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LookupProvider for BrasilApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::BRASIL_API
    }

    async fn lookup(&self, key: &LookupKey) -> Result<LookupResult, FetchError> {
        let path = format!("/api/cep/v1/{}", path_segment(key.as_str()));
        let address: BrasilApiAddress = self.client.get_json(&path).await?;
        Ok(LookupResult::new(
            self.id(),
            address.cep,
            address.street.unwrap_or_default(),
            address.neighborhood.unwrap_or_default(),
            address.city,
            address.state,
        ))
    }
}
