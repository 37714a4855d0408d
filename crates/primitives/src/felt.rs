//! Field element parsing.

use alloy_primitives::B256;

/// Errors raised while parsing a hex encoded field element.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeltError {
    /// The value is not a hex string of at most 64 digits.
    #[error("Invalid field element: {0}")]
    Invalid(String),
}

/// Parses a hex string of up to 64 digits into a 32-byte word.
///
/// Nodes and manifests drop leading zeros, so short values are left padded.
/// The `0x` prefix is optional.
///
/// # Errors
///
/// Returns [`FeltError::Invalid`] if the value is empty, too long, or not hex.
pub fn parse_felt(value: &str) -> Result<B256, FeltError> {
    let digits = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")).unwrap_or(value);
    if digits.is_empty() || digits.len() > 64 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FeltError::Invalid(value.to_string()));
    }
    format!("{digits:0>64}").parse::<B256>().map_err(|_| FeltError::Invalid(value.to_string()))
}

/// Builds a word from a small integer.
pub fn felt_from_u64(value: u64) -> B256 {
    B256::left_padding_from(&value.to_be_bytes())
}
