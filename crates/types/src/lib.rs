//! Shared data model for ceprace.
//!
//! The types here are deliberately free of I/O: the engine, the HTTP
//! adapters and the CLI all agree on them, and none of them can be mutated
//! once built.

mod lookup;

pub use lookup::{LookupKey, LookupKeyError, LookupResult, ProviderId, ProviderKind, RaceOutcome, UnknownProvider};
