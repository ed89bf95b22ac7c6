//! base64url without padding, per spec.md §4.1 "Base64url" and
//! `original_source/test/test_base64url.cc`. Used by the h2c Upgrade
//! handshake to carry the client's SETTINGS payload in an HTTP header
//! (spec.md §4.5).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::error::Base64UrlError;

/// Encodes `input` as unpadded base64url.
#[must_use]
pub fn encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Decodes unpadded base64url text, rejecting padding and non-alphabet
/// characters the way `nexus::http2::detail::base64url::decode` does.
pub fn decode(input: &str) -> Result<Vec<u8>, Base64UrlError> {
    if input.len() % 4 == 1 {
        return Err(Base64UrlError::InvalidLength);
    }
    let mut values = Vec::with_capacity(input.len());
    for &byte in input.as_bytes() {
        values.push(char_value(byte).ok_or(Base64UrlError::InvalidCharacter)?);
    }

    let mut out = Vec::with_capacity(values.len() * 6 / 8);
    let mut acc: u32 = 0;
    let mut bits = 0u32;
    for value in values {
        acc = (acc << 6) | u32::from(value);
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
        }
    }
    Ok(out)
}

/// Maps a URL-safe base64 alphabet character to its 6-bit value. `=` is
/// deliberately not part of this alphabet: padding is always rejected.
fn char_value(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'Z' => Some(c - b'A'),
        b'a'..=b'z' => Some(c - b'a' + 26),
        b'0'..=b'9' => Some(c - b'0' + 52),
        b'-' => Some(62),
        b'_' => Some(63),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s5_encode_foobar_prefixes() {
        assert_eq!(encode(b""), "");
        assert_eq!(encode(b"f"), "Zg");
        assert_eq!(encode(b"fo"), "Zm8");
        assert_eq!(encode(b"foo"), "Zm9v");
        assert_eq!(encode(b"foob"), "Zm9vYg");
        assert_eq!(encode(b"fooba"), "Zm9vYmE");
        assert_eq!(encode(b"foobar"), "Zm9vYmFy");
    }

    #[test]
    fn s5_decode_foobar_prefixes() {
        assert_eq!(decode("").unwrap(), b"");
        assert_eq!(decode("Zg").unwrap(), b"f");
        assert_eq!(decode("Zm8").unwrap(), b"fo");
        assert_eq!(decode("Zm9v").unwrap(), b"foo");
        assert_eq!(decode("Zm9vYg").unwrap(), b"foob");
        assert_eq!(decode("Zm9vYmE").unwrap(), b"fooba");
        assert_eq!(decode("Zm9vYmFy").unwrap(), b"foobar");
    }

    #[test]
    fn s5_decode_rejects_bad_length() {
        assert_eq!(decode("1"), Err(Base64UrlError::InvalidLength));
    }

    #[test]
    fn s5_decode_rejects_bad_character() {
        assert_eq!(decode("aaa["), Err(Base64UrlError::InvalidCharacter));
    }

    #[test]
    fn s5_decode_rejects_padding() {
        assert_eq!(decode("aa=="), Err(Base64UrlError::InvalidCharacter));
    }

    #[test]
    fn round_trip_is_stable_for_arbitrary_bytes() {
        let input: Vec<u8> = (0u8..=255).collect();
        let encoded = encode(&input);
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, input);
    }
}
