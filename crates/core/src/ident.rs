//! Binding identifier compaction.
//!
//! Platforms hand out binding identifiers as UUID strings. Database role names
//! derived from them have to be short and safe to use unquoted, so the 128 bits
//! of the UUID are re-encoded as unpadded base32 instead of hex.
//!
//! ```text
//! a7cb6bd8-cf67-400f-805c-019e85eac3bf  ->  U7FWXWGPM5AA7AC4AGPIL2WDX4
//!                                       ->  useru7fwxwgpm5aa7ac4agpil2wdx4
//! ```

use crate::{Error, Result};
use base32::Alphabet;

/// Prefix carried by every username generated for a binding.
pub const BINDING_USER_PREFIX: &str = "user";

/// Number of bytes in a decoded UUID.
const UUID_BYTES: usize = 16;

/// Length of a compacted UUID token (128 bits in 5-bit groups).
pub const COMPACT_TOKEN_LEN: usize = 26;

/// Length of a generated binding username.
pub const BINDING_USERNAME_LEN: usize = BINDING_USER_PREFIX.len() + COMPACT_TOKEN_LEN;

/// Compact a UUID string into its unpadded RFC 4648 base32 form.
///
/// Hyphens are stripped before decoding. The remaining input must be exactly
/// 32 hex digits; anything else is rejected with [`Error::InvalidIdentifier`].
pub fn compact_uuid(uuid: &str) -> Result<String> {
    let digits: String = uuid.chars().filter(|c| *c != '-').collect();

    let bytes = hex::decode(&digits)
        .map_err(|e| Error::InvalidIdentifier(format!("{uuid:?} is not a hex UUID: {e}")))?;
    if bytes.len() != UUID_BYTES {
        return Err(Error::InvalidIdentifier(format!(
            "{uuid:?} decodes to {} bytes, expected {UUID_BYTES}",
            bytes.len()
        )));
    }

    Ok(base32::encode(Alphabet::Rfc4648 { padding: false }, &bytes))
}

/// Derive the database username for a binding.
pub fn binding_username(bind_id: &str) -> Result<String> {
    let token = compact_uuid(bind_id)?;
    Ok(format!("{BINDING_USER_PREFIX}{}", token.to_lowercase()))
}

/// Whether `name` has the exact shape produced by [`binding_username`].
///
/// Default cluster users never match, so this separates application bindings
/// from the accounts the cluster was created with.
pub fn is_binding_username(name: &str) -> bool {
    let Some(token) = name.strip_prefix(BINDING_USER_PREFIX) else {
        return false;
    };
    token.len() == COMPACT_TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_lowercase() || (b'2'..=b'7').contains(&b))
}
