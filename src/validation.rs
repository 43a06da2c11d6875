//! Input validation for the sessile CLI.
//!
//! Saved sessions are addressed by the sha256 hex digest of their key (or a
//! prefix of it), and the digest doubles as the file stem inside the store
//! directory. Validating the shape up front keeps arbitrary path fragments
//! out of file lookups.

use anyhow::{bail, Result};

/// A full digest is 64 hex characters; prefixes may be shorter.
pub const MAX_DIGEST_LENGTH: usize = 64;

/// Shortest prefix accepted; anything shorter matches too much to be useful.
pub const MIN_PREFIX_LENGTH: usize = 4;

/// Validates a session digest or digest prefix.
///
/// A prefix is valid if:
/// - It is between MIN_PREFIX_LENGTH and MAX_DIGEST_LENGTH characters
/// - It contains only lowercase hex digits
pub fn validate_digest_prefix(prefix: &str) -> Result<()> {
    if prefix.len() < MIN_PREFIX_LENGTH {
        bail!(
            "Digest prefix too short: {} characters (min {})",
            prefix.len(),
            MIN_PREFIX_LENGTH
        );
    }

    if prefix.len() > MAX_DIGEST_LENGTH {
        bail!(
            "Digest prefix too long: {} characters (max {})",
            prefix.len(),
            MAX_DIGEST_LENGTH
        );
    }

    let valid_chars = prefix
        .chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    if !valid_chars {
        bail!("Digest prefix '{prefix}' is not lowercase hex");
    }

    Ok(())
}

/// Clap value parser for digest prefix arguments.
///
/// # Examples
///
/// ```ignore
/// #[arg(value_parser = clap_digest_validator)]
/// digest: String,
/// ```
pub fn clap_digest_validator(s: &str) -> Result<String, String> {
    validate_digest_prefix(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}
