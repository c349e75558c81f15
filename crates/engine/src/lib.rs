//! First-responder-wins address lookup.
//!
//! - [`race`]: run one bounded race across providers
//! - [`provider`]: the [`LookupProvider`] seam, its HTTP adapters and the
//!   [`attempt`] wrapper every provider runs inside
//! - [`Dispatcher`]: builds providers from [`ceprace_util::Settings`] and
//!   races them

pub mod dispatch;
pub mod provider;
pub mod race;

#[cfg(test)]
mod testing;

pub use dispatch::{DispatchError, Dispatcher};
pub use provider::{BrasilApiProvider, LookupProvider, ViaCepProvider, attempt};
pub use race::{RaceContext, RaceError, race};
