// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::Address;

use crate::error::{BridgeError, Result};

/// Parses a user-supplied recipient.
///
/// Accepts a 20-byte hex address with or without a `0x` or `0X` prefix.
/// Mixed-case input must carry a valid checksum. The zero address is
/// rejected: tokens sent there could never be bridged again.
///
/// # Example
///
/// ```rust
/// use nft_bridge::bridge::parse_recipient;
///
/// assert!(parse_recipient("0x742d35cc6634c0532925a3b844bc9e7595f8fa0d").is_ok());
/// assert!(parse_recipient("0x1234").is_err());
/// ```
pub fn parse_recipient(raw: &str) -> Result<Address> {
    let trimmed = raw.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let address = if hex.chars().any(|c| c.is_ascii_uppercase())
        && hex.chars().any(|c| c.is_ascii_lowercase())
    {
        Address::parse_checksummed(format!("0x{hex}"), None)
            .map_err(|e| BridgeError::InvalidRecipient(format!("{trimmed}: {e}")))?
    } else {
        hex.parse::<Address>()
            .map_err(|e| BridgeError::InvalidRecipient(format!("{trimmed}: {e}")))?
    };

    if address == Address::ZERO {
        return Err(BridgeError::InvalidRecipient(
            "the zero address cannot receive tokens".to_string(),
        ));
    }
    Ok(address)
}

/// Recipient to use for a bridge: the supplied one, or the caller.
pub fn resolve_recipient(supplied: Option<&str>, caller: Address) -> Result<Address> {
    match supplied {
        Some(raw) if !raw.trim().is_empty() => parse_recipient(raw),
        _ => Ok(caller),
    }
}
