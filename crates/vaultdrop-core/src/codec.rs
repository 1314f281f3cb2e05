//! Transport codecs.
//!
//! Binary material (wrapped keys, nonces, digests, whole records) travels
//! through JSON fields and HTTP headers as text. Hex is lowercase with no
//! separators; base64 is the standard padded alphabet.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::CodecError;

/// Encode bytes as lowercase hex.
pub fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(bytes)
}

/// Decode a hex string.
///
/// Odd-length input and non-hex characters are rejected; nothing is
/// truncated or substituted. Upper-case digits are accepted.
pub fn hex_decode(s: &str) -> Result<Vec<u8>, CodecError> {
    if s.len() % 2 != 0 {
        return Err(CodecError::OddLength(s.len()));
    }
    hex::decode(s).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { c, index } => {
            CodecError::InvalidHexCharacter { c, index }
        }
        hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
            CodecError::OddLength(s.len())
        }
    })
}

/// Decode a hex string into a fixed-size array.
pub fn hex_decode_array<const N: usize>(s: &str) -> Result<[u8; N], CodecError> {
    let bytes = hex_decode(s)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| CodecError::UnexpectedLength {
        expected: N,
        actual: bytes.len(),
    })
}

/// Encode bytes as standard padded base64.
pub fn base64_encode(bytes: impl AsRef<[u8]>) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard padded base64.
pub fn base64_decode(s: &str) -> Result<Vec<u8>, CodecError> {
    STANDARD
        .decode(s)
        .map_err(|e| CodecError::InvalidBase64(e.to_string()))
}

/// Remove all whitespace, for key text pasted from forms or files.
pub(crate) fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hex_lowercase_no_separators() {
        assert_eq!(hex_encode([0x00, 0xab, 0xff, 0x10]), "00abff10");
    }

    #[test]
    fn test_hex_empty() {
        assert_eq!(hex_encode([]), "");
        assert_eq!(hex_decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_hex_rejects_odd_length() {
        assert_eq!(hex_decode("abc"), Err(CodecError::OddLength(3)));
    }

    #[test]
    fn test_hex_rejects_non_hex() {
        assert!(matches!(
            hex_decode("zz"),
            Err(CodecError::InvalidHexCharacter { c: 'z', index: 0 })
        ));
    }

    #[test]
    fn test_hex_accepts_uppercase() {
        assert_eq!(hex_decode("ABCD").unwrap(), vec![0xab, 0xcd]);
    }

    #[test]
    fn test_hex_decode_array_length() {
        let nonce: [u8; 12] = hex_decode_array("000102030405060708090a0b").unwrap();
        assert_eq!(nonce[11], 0x0b);

        let err = hex_decode_array::<12>("0001").unwrap_err();
        assert_eq!(
            err,
            CodecError::UnexpectedLength {
                expected: 12,
                actual: 2
            }
        );
    }

    #[test]
    fn test_base64_padded() {
        assert_eq!(base64_encode(b"hi"), "aGk=");
        assert_eq!(base64_decode("aGk=").unwrap(), b"hi");
        assert!(base64_decode("a").is_err());
    }

    #[test]
    fn test_strip_whitespace() {
        assert_eq!(strip_whitespace(" ab\ncd\t ef "), "abcdef");
    }

    proptest! {
        #[test]
        fn test_hex_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(hex_decode(&hex_encode(&bytes)).unwrap(), bytes);
        }

        #[test]
        fn test_base64_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(base64_decode(&base64_encode(&bytes)).unwrap(), bytes);
        }
    }
}
