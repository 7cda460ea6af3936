//! Conversion between public plurk permalinks and numeric plurk ids.
//!
//! A permalink such as `https://www.plurk.com/p/ajd4` carries the plurk id
//! written in base 36. No network access is involved.

use crate::error::{PlurkError, Result};
use url::Url;

/// Digit table used by permalink tokens, lowest value first.
pub const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Prefix of every permalink produced by [`plurk_id_to_permalink`].
pub const PERMALINK_BASE: &str = "https://www.plurk.com/p/";

const RADIX: u64 = ALPHABET.len() as u64;

/// Resolve a permalink URL to the plurk id it encodes.
///
/// Scheme and host are optional; a trailing slash, query string or fragment
/// is ignored. Fails with [`PlurkError::Parse`] when the path carries no
/// `/p/<token>` segment or the token is not a valid base-36 number.
pub fn permalink_to_plurk_id(url: &str) -> Result<u64> {
    let token = extract_token(url)?;
    token_to_plurk_id(&token).map_err(|reason| PlurkError::parse(url, reason))
}

/// Build the canonical permalink for a plurk id.
pub fn plurk_id_to_permalink(plurk_id: u64) -> String {
    format!("{PERMALINK_BASE}{}", plurk_id_to_token(plurk_id))
}

/// Encode a plurk id as a permalink token.
pub fn plurk_id_to_token(plurk_id: u64) -> String {
    if plurk_id == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    let mut rest = plurk_id;
    while rest > 0 {
        digits.push(ALPHABET[(rest % RADIX) as usize] as char);
        rest /= RADIX;
    }
    digits.iter().rev().collect()
}

fn extract_token(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PlurkError::parse(input, "empty permalink"));
    }

    // Bare `plurk.com/p/xyz` has no scheme, so the path is split by hand.
    let path = if trimmed.contains("://") {
        let url = Url::parse(trimmed).map_err(|e| PlurkError::parse(input, e.to_string()))?;
        url.path().to_string()
    } else {
        let without_extras = trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        match without_extras.find('/') {
            Some(idx) => without_extras[idx..].to_string(),
            None => return Err(PlurkError::parse(input, "missing /p/ segment")),
        }
    };

    let rest = path
        .strip_prefix("/p/")
        .ok_or_else(|| PlurkError::parse(input, "missing /p/ segment"))?;
    let token = rest.trim_end_matches('/');
    if token.is_empty() {
        return Err(PlurkError::parse(input, "empty token"));
    }
    if token.contains('/') {
        return Err(PlurkError::parse(input, "unexpected path after token"));
    }
    Ok(token.to_string())
}

fn token_to_plurk_id(token: &str) -> std::result::Result<u64, String> {
    token.bytes().try_fold(0u64, |acc, byte| {
        let lower = byte.to_ascii_lowercase();
        let digit = ALPHABET
            .iter()
            .position(|&c| c == lower)
            .ok_or_else(|| format!("invalid character {:?} in token", byte as char))?;
        acc.checked_mul(RADIX)
            .and_then(|v| v.checked_add(digit as u64))
            .ok_or_else(|| "token overflows a plurk id".to_string())
    })
}
