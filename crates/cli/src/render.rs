//! Presentation of a race outcome.

use std::fmt::Write;
use std::time::Duration;

use ceprace_types::{LookupResult, ProviderId, RaceOutcome};

/// Field labels for street, neighborhood, city and region, in the answering
/// service's own vocabulary.
fn field_labels(source: &ProviderId) -> [&'static str; 4] {
    if *source == ProviderId::VIA_CEP {
        ["Logradouro", "Bairro", "Localidade", "UF"]
    } else if *source == ProviderId::BRASIL_API {
        ["Street", "Neighborhood", "City", "State"]
    } else {
        ["Street", "Neighborhood", "City", "Region"]
    }
}

fn render_address(result: &LookupResult) -> String {
    let [street, neighborhood, city, region] = field_labels(result.source());
    let mut out = String::new();
    let _ = writeln!(out, "Address found by {}:", result.source());
    let _ = writeln!(out, "CEP: {}", result.cep());
    let _ = writeln!(out, "{street}: {}", result.street());
    let _ = writeln!(out, "{neighborhood}: {}", result.neighborhood());
    let _ = writeln!(out, "{city}: {}", result.city());
    let _ = write!(out, "{region}: {}", result.region());
    out
}

pub fn render_text(outcome: &RaceOutcome, timeout: Duration) -> String {
    match outcome {
        RaceOutcome::Resolved(result) => render_address(result),
        RaceOutcome::TimedOut => format!("Timeout: no provider answered within {}ms.", timeout.as_millis()),
    }
}

pub fn render_json(outcome: &RaceOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(outcome)
}
