use async_trait::async_trait;
use ceprace_api::{FetchError, ProviderClient, path_segment};
use ceprace_types::{LookupKey, LookupResult, ProviderId};
use serde::Deserialize;
use serde_json::Value;

use super::LookupProvider;

/// Body of `GET /ws/{cep}/json/`.
///
/// ViaCEP answers well-formed but unknown CEPs with `200 {"erro": true}`
/// (newer deployments send `"true"` as a string).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ViaCepResponse {
    Missing {
        #[allow(dead_code)]
        erro: Value,
    },
    Found(ViaCepAddress),
}

#[derive(Debug, Deserialize)]
struct ViaCepAddress {
    cep: String,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    localidade: String,
    uf: String,
}

/// Adapter for the ViaCEP JSON web service.
#[derive(Debug, Clone)]
pub struct ViaCepProvider {
    client: ProviderClient,
}

impl ViaCepProvider {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LookupProvider for ViaCepProvider {
    fn id(&self) -> ProviderId {
        ProviderId::VIA_CEP
    }

    async fn lookup(&self, key: &LookupKey) -> Result<LookupResult, FetchError> {
        let path = format!("/ws/{}/json/", path_segment(key.as_str()));
        match self.client.get_json(&path).await? {
            ViaCepResponse::Found(address) => Ok(LookupResult::new(
                self.id(),
                address.cep,
                address.logradouro,
                address.bairro,
                address.localidade,
                address.uf,
            )),
            ViaCepResponse::Missing { .. } => Err(FetchError::NotFound { key: key.to_string() }),
        }
    }
}
