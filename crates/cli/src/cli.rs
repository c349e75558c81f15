use std::path::PathBuf;

use ceprace_types::ProviderKind;
use ceprace_util::SettingsOverrides;
use clap::Parser;

/// Resolve a CEP by racing address providers; the first answer wins.
#[derive(Debug, Parser)]
#[command(name = "ceprace", version)]
pub struct Cli {
    /// CEP to look up (8 digits, `NNNNN-NNN` also accepted)
    #[arg(default_value = "01153000")]
    pub cep: String,

    /// Overall deadline in milliseconds [default: 1000]
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Provider to race; repeat or comma-separate to pick several
    #[arg(long = "provider", value_name = "NAME", value_delimiter = ',')]
    pub providers: Vec<ProviderKind>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to a JSON config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log provider activity to stderr (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            timeout_ms: self.timeout_ms,
            providers: (!self.providers.is_empty()).then(|| self.providers.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_sample_cep_without_overrides() {
        let cli = Cli::try_parse_from(["ceprace"]).unwrap();
        assert_eq!(cli.cep, "01153000");
        let overrides = cli.overrides();
        assert!(overrides.timeout_ms.is_none());
        assert!(overrides.providers.is_none());
    }

    #[test]
    fn parses_repeated_and_comma_separated_providers() {
        let cli = Cli::try_parse_from([
            "ceprace",
            "01153-000",
            "--provider",
            "viacep,brasilapi",
            "--provider",
            "viacep",
            "--timeout-ms",
            "250",
        ])
        .unwrap();
        assert_eq!(cli.cep, "01153-000");
        let overrides = cli.overrides();
        assert_eq!(overrides.timeout_ms, Some(250));
        assert_eq!(
            overrides.providers,
            Some(vec![ProviderKind::ViaCep, ProviderKind::BrasilApi, ProviderKind::ViaCep])
        );
    }

    #[test]
    fn rejects_unknown_provider() {
        assert!(Cli::try_parse_from(["ceprace", "--provider", "correios"]).is_err());
    }
}
