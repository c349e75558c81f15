pub mod cep;
pub mod config;
pub mod path_processing;

pub use cep::{CepError, normalize_cep};
pub use config::{ConfigError, Settings, SettingsOverrides};
pub use path_processing::expand_tilde;
