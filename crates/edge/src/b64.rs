//! Base64 decoding for token payloads.
//!
//! Standard alphabet, canonical `=` padding required, non-zero trailing
//! bits rejected. [`Base64Decoder::Standard`] uses the `base64` crate when
//! the `std-base64` feature is on; otherwise it falls back to the manual
//! decoder, which accepts exactly the same inputs.

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Base64Decoder {
    Standard,
    Manual,
}

impl Base64Decoder {
    /// The best decoder this build has.
    pub fn detect() -> Self {
        if cfg!(feature = "std-base64") {
            Base64Decoder::Standard
        } else {
            Base64Decoder::Manual
        }
    }

    pub fn decode(&self, input: &str) -> Option<Vec<u8>> {
        match self {
            Base64Decoder::Standard => decode_standard(input),
            Base64Decoder::Manual => decode_manual(input),
        }
    }
}

#[cfg(feature = "std-base64")]
fn decode_standard(input: &str) -> Option<Vec<u8>> {
    use ::base64::Engine;
    ::base64::engine::general_purpose::STANDARD.decode(input).ok()
}

#[cfg(not(feature = "std-base64"))]
fn decode_standard(input: &str) -> Option<Vec<u8>> {
    decode_manual(input)
}

fn sextet(c: u8) -> Option<u32> {
    let v = match c {
        b'A'..=b'Z' => c - b'A',
        b'a'..=b'z' => c - b'a' + 26,
        b'0'..=b'9' => c - b'0' + 52,
        b'+' => 62,
        b'/' => 63,
        _ => return None,
    };
    Some(u32::from(v))
}

/// Decode without any codec library.
pub fn decode_manual(input: &str) -> Option<Vec<u8>> {
    let bytes = input.as_bytes();
    if bytes.len() % 4 != 0 {
        return None;
    }

    let quads = bytes.len() / 4;
    let mut out = Vec::with_capacity(quads * 3);

    for (i, quad) in bytes.chunks_exact(4).enumerate() {
        let pad = quad.iter().rev().take_while(|&&c| c == b'=').count();
        if pad > 2 || (pad > 0 && i + 1 != quads) {
            return None;
        }

        let mut word = 0u32;
        for &c in &quad[..4 - pad] {
            word = word << 6 | sextet(c)?;
        }
        word <<= 6 * pad as u32;

        let [_, b0, b1, b2] = word.to_be_bytes();
        match pad {
            0 => out.extend_from_slice(&[b0, b1, b2]),
            // Bits beyond the last whole byte must be zero.
            1 if b2 == 0 => out.extend_from_slice(&[b0, b1]),
            2 if b1 == 0 && b2 == 0 => out.push(b0),
            _ => return None,
        }
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_rfc4648_vectors() {
        let cases: [(&str, &[u8]); 7] = [
            ("", b""),
            ("Zg==", b"f"),
            ("Zm8=", b"fo"),
            ("Zm9v", b"foo"),
            ("Zm9vYg==", b"foob"),
            ("Zm9vYmE=", b"fooba"),
            ("Zm9vYmFy", b"foobar"),
        ];
        for (input, expected) in cases {
            assert_eq!(decode_manual(input).as_deref(), Some(expected), "{input}");
            assert_eq!(Base64Decoder::Standard.decode(input).as_deref(), Some(expected));
        }
    }

    #[test]
    fn decodes_full_alphabet() {
        assert_eq!(decode_manual("+/+/").unwrap(), vec![0xfb, 0xff, 0xbf]);
    }

    #[test]
    fn rejects_unpadded_or_misplaced_padding() {
        for input in ["Zg", "Zm8", "Z===", "====", "Zg==Zm9v", "Z=g=", "=Zm9"] {
            assert_eq!(decode_manual(input), None, "{input}");
        }
    }

    #[test]
    fn rejects_non_canonical_trailing_bits() {
        assert_eq!(decode_manual("Zh=="), None);
        assert_eq!(decode_manual("Zm9="), None);
    }

    #[test]
    fn rejects_foreign_characters() {
        for input in ["Zm9v\n", "Zm9-", "Zm9_", "Zm 9", "Zm9v.abc"] {
            assert_eq!(decode_manual(input), None, "{input}");
        }
    }

    #[test]
    fn detect_prefers_standard_when_compiled_in() {
        let expected = if cfg!(feature = "std-base64") {
            Base64Decoder::Standard
        } else {
            Base64Decoder::Manual
        };
        assert_eq!(Base64Decoder::detect(), expected);
    }
}
