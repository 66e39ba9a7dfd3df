//! Stateless hex-string / byte-triple conversion.
//!
//! Hex codes cover the canonical 8-bit range only. The store accepts a wider
//! channel domain (0..=999), so [`rgb_to_hex`] rejects channels above 255
//! rather than clamping -- a silent clamp would make the round trip lossy.

use crate::{EngineError, Rgb};

/// Parses a hex color code into an (r, g, b) triple.
///
/// Accepts an optional leading `#` followed by exactly six hex digits,
/// case-insensitive. Any other length or a non-hex character is
/// [`EngineError::InvalidFormat`].
///
/// ```
/// use tintdb_core::{convert::hex_to_rgb, Rgb};
///
/// assert_eq!(hex_to_rgb("#FF8000").unwrap(), Rgb::new(255, 128, 0));
/// assert_eq!(hex_to_rgb("0c2238").unwrap(), Rgb::new(12, 34, 56));
/// assert!(hex_to_rgb("#fff").is_err());
/// ```
pub fn hex_to_rgb(text: &str) -> Result<Rgb, EngineError> {
    let digits = text.strip_prefix('#').unwrap_or(text);

    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(EngineError::InvalidFormat(format!(
            "expected six hex digits with optional leading '#', got '{text}'"
        )));
    }

    let channel = |range| {
        // Range and digit checks above guarantee this parse succeeds.
        u16::from(u8::from_str_radix(&digits[range], 16).unwrap_or(0))
    };

    Ok(Rgb::new(channel(0..2), channel(2..4), channel(4..6)))
}

/// Formats an (r, g, b) triple as a `#rrggbb` hex code.
///
/// Each channel is rendered as two lowercase, zero-padded hex digits.
/// Channels above 255 are rejected with [`EngineError::OutOfRange`].
pub fn rgb_to_hex(r: u16, g: u16, b: u16) -> Result<String, EngineError> {
    for channel in [r, g, b] {
        if channel > 255 {
            return Err(EngineError::OutOfRange(channel));
        }
    }
    Ok(format!("#{r:02x}{g:02x}{b:02x}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
