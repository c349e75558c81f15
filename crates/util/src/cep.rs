//! CEP (Brazilian postal code) input normalization.

use thiserror::Error;

/// Number of digits in a CEP.
pub const CEP_LENGTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CepError {
    #[error("CEP is empty")]
    Empty,
    #[error("CEP must have 8 digits; got {0}")]
    InvalidLength(usize),
    #[error("CEP contains invalid character '{0}'")]
    NonDigit(char),
}

/// Normalize user input into the 8-digit form both providers accept.
///
/// Surrounding whitespace is ignored and the conventional `NNNNN-NNN`
/// separator is removed. Anything else that is not an ASCII digit is rejected.
pub fn normalize_cep(input: &str) -> Result<String, CepError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CepError::Empty);
    }

    let compact = match trimmed.split_once('-') {
        Some((head, tail)) if head.len() == 5 => format!("{head}{tail}"),
        _ => trimmed.to_string(),
    };

    if let Some(invalid) = compact.chars().find(|c| !c.is_ascii_digit()) {
        return Err(CepError::NonDigit(invalid));
    }
    if compact.len() != CEP_LENGTH {
        return Err(CepError::InvalidLength(compact.len()));
    }
    Ok(compact)
}
