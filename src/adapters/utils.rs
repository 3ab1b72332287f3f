//! Shared credential validation.
//!
//! Used by the configuration loader and the Wi-Fi adapter so both reject
//! the same inputs.

use crate::app::ports::AssociationError;

/// Returns `true` if every byte of `s` is in the printable ASCII range
/// `0x20..=0x7E` (space through tilde, inclusive).
pub(crate) fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// SSID must be 1-32 printable ASCII bytes.
pub(crate) fn validate_ssid(ssid: &str) -> Result<(), AssociationError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(AssociationError::InvalidSsid);
    }
    Ok(())
}

/// Empty means an open network; otherwise WPA2 needs 8-64 bytes.
pub(crate) fn validate_password(password: &str) -> Result<(), AssociationError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(AssociationError::InvalidPassword);
    }
    Ok(())
}
