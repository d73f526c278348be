use crate::base32::Error;

const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const NO_VALUE: u8 = 255;
const BITS_PER_CHAR: usize = 5;

/// Lookup table for Crockford base32 decoding
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0_u8;
    // Main alphabet, allow lower-case
    while i < 32 {
        let c = ALPHABET[i as usize];
        lut[c as usize] = i;
        if c.is_ascii_uppercase() {
            lut[(c + 32) as usize] = i; // lowercase letter
        }
        i += 1;
    }
    // Crockford-specific aliases
    lut[b'O' as usize] = 0;
    lut[b'o' as usize] = 0;
    lut[b'I' as usize] = 1;
    lut[b'i' as usize] = 1;
    lut[b'L' as usize] = 1;
    lut[b'l' as usize] = 1;
    lut
};

/// Number of base32 characters needed for `len` bytes: `ceil(8 * len / 5)`.
pub const fn encoded_len(len: usize) -> usize {
    (len * 8).div_ceil(BITS_PER_CHAR)
}

/// Encodes `input` as Crockford base32.
///
/// Zero pad bits are placed at the *front* of the output, so encodings of
/// equal-length inputs sort the same way the inputs do.
///
/// ```
/// use keyflake::base32::encode;
///
/// assert_eq!(encode(&[0xFF]), "7Z");
/// assert_eq!(encode(&[]), "");
/// ```
pub fn encode(input: &[u8]) -> String {
    let output_chars = encoded_len(input.len());
    let mut out = String::with_capacity(output_chars);
    let mut bits = output_chars * BITS_PER_CHAR - input.len() * 8;
    let mut acc = 0_u16;

    for &b in input {
        acc = (acc << 8) | u16::from(b);
        bits += 8;
        while bits >= BITS_PER_CHAR {
            bits -= BITS_PER_CHAR;
            out.push(char::from(ALPHABET[usize::from((acc >> bits) & 0x1F)]));
        }
        acc &= (1 << bits) - 1;
    }

    out
}

/// Decodes Crockford base32 produced by [`encode`].
///
/// Lower-case letters and the aliases `O` (for `0`) and `I`/`L` (for `1`) are
/// accepted.
///
/// # Errors
///
/// - [`Error::DecodeInvalidLen`] if no byte sequence encodes to this length
/// - [`Error::DecodeInvalidAscii`] on a character outside the alphabet
/// - [`Error::DecodeNonCanonical`] if the leading pad bits are not zero
pub fn decode(encoded: &str) -> Result<Vec<u8>, Error> {
    let total_bits = encoded.len() * BITS_PER_CHAR;
    let out_len = total_bits / 8;
    let pad = total_bits - out_len * 8;
    if pad >= BITS_PER_CHAR {
        return Err(Error::DecodeInvalidLen { len: encoded.len() });
    }

    let mut out = Vec::with_capacity(out_len);
    let mut acc = 0_u16;
    let mut bits = 0;

    for (index, byte) in encoded.bytes().enumerate() {
        let val = LOOKUP[usize::from(byte)];
        if val == NO_VALUE {
            return Err(Error::DecodeInvalidAscii { byte, index });
        }
        acc = (acc << BITS_PER_CHAR) | u16::from(val);
        bits += BITS_PER_CHAR;

        if index == 0 {
            if acc >> (bits - pad) != 0 {
                return Err(Error::DecodeNonCanonical);
            }
            bits -= pad;
        }
        if bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
        }
        acc &= (1 << bits) - 1;
    }

    debug_assert_eq!(out.len(), out_len);
    Ok(out)
}
