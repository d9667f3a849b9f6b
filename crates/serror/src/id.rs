//! Correlation identifiers.
//!
//! Every error gets 16 bytes from the OS RNG, hex-encoded to 32 characters.
//! If the RNG fails the id is left empty; it is never retried.

use std::fmt::Write;

use rand::rngs::OsRng;
use rand::RngCore;

/// Raw id length in bytes.
pub const ID_BYTES: usize = 16;

/// Generate a fresh correlation id, or `None` if the RNG is unavailable.
pub fn correlation_id() -> Option<String> {
    let mut buf = [0u8; ID_BYTES];
    match OsRng.try_fill_bytes(&mut buf) {
        Ok(()) => Some(hex(&buf)),
        Err(e) => {
            tracing::warn!(error = %e, "correlation id generation failed");
            None
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // Writing to a String cannot fail.
        let _ = write!(out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_encoding() {
        assert_eq!(hex(&[0x00, 0x0f, 0xa5, 0xff]), "000fa5ff");
        assert_eq!(hex(&[]), "");
    }

    #[test]
    fn ids_are_32_hex_chars() {
        let id = correlation_id().unwrap();
        assert_eq!(id.len(), ID_BYTES * 2);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn ids_are_distinct() {
        let a = correlation_id().unwrap();
        let b = correlation_id().unwrap();
        assert_ne!(a, b);
    }
}
