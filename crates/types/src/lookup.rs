use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a [`LookupKey`] is built from an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lookup key must not be empty")]
pub struct LookupKeyError;

/// Opaque identifier sent to every provider in a race (for example a CEP).
///
/// Cloning is cheap: every concurrent attempt shares the same allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LookupKey(Arc<str>);

impl LookupKey {
    pub fn new(value: impl AsRef<str>) -> Result<Self, LookupKeyError> {
        let value = value.as_ref();
        if value.is_empty() {
            return Err(LookupKeyError);
        }
        Ok(Self(Arc::from(value)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LookupKey {
    type Error = LookupKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LookupKey> for String {
    fn from(key: LookupKey) -> Self {
        key.0.to_string()
    }
}

/// Provenance label naming the provider that produced a result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(Cow<'static, str>);

impl ProviderId {
    pub const BRASIL_API: ProviderId = ProviderId(Cow::Borrowed("BrasilAPI"));
    pub const VIA_CEP: ProviderId = ProviderId(Cow::Borrowed("ViaCEP"));

    pub fn new(label: impl Into<Cow<'static, str>>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for ProviderId {
    fn from(label: &'static str) -> Self {
        Self::new(label)
    }
}

impl From<String> for ProviderId {
    fn from(label: String) -> Self {
        Self::new(label)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The address services ceprace knows how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    BrasilApi,
    ViaCep,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::BrasilApi, ProviderKind::ViaCep];

    /// Configuration name, as accepted on the command line and in config files.
    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::BrasilApi => "brasilapi",
            ProviderKind::ViaCep => "viacep",
        }
    }

    /// Provenance label stamped on results from this provider.
    pub fn id(self) -> ProviderId {
        match self {
            ProviderKind::BrasilApi => ProviderId::BRASIL_API,
            ProviderKind::ViaCep => ProviderId::VIA_CEP,
        }
    }
}

/// Error returned when parsing an unrecognized provider name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown provider '{0}'; expected one of: brasilapi, viacep")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownProvider(needle.to_string()))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalized address returned by whichever provider wins a race.
///
/// Fields are private so a published result cannot be altered, and the
/// provenance label is a constructor argument so it is never missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    cep: String,
    street: String,
    neighborhood: String,
    city: String,
    region: String,
    source: ProviderId,
}

impl LookupResult {
    pub fn new(
        source: ProviderId,
        cep: impl Into<String>,
        street: impl Into<String>,
        neighborhood: impl Into<String>,
        city: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            cep: cep.into(),
            street: street.into(),
            neighborhood: neighborhood.into(),
            city: city.into(),
            region: region.into(),
            source,
        }
    }

    /// The key as echoed back by the provider.
    pub fn cep(&self) -> &str {
        &self.cep
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn neighborhood(&self) -> &str {
        &self.neighborhood
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// State code (`state` for BrasilAPI, `uf` for ViaCEP).
    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn source(&self) -> &ProviderId {
        &self.source
    }
}

/// Terminal state of a single race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum RaceOutcome {
    /// A provider answered before the deadline.
    Resolved(LookupResult),
    /// No provider answered before the deadline.
    TimedOut,
}

impl RaceOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, RaceOutcome::Resolved(_))
    }

    pub fn result(&self) -> Option<&LookupResult> {
        match self {
            RaceOutcome::Resolved(result) => Some(result),
            RaceOutcome::TimedOut => None,
        }
    }
}
