/// Errors raised while decoding Crockford base32 text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No byte sequence encodes to a string of this length.
    #[error("invalid base32 length: {len}")]
    DecodeInvalidLen { len: usize },

    /// A character outside the Crockford alphabet (and its aliases).
    #[error("invalid base32 byte {byte:#04x} at index {index}")]
    DecodeInvalidAscii { byte: u8, index: usize },

    /// The leading pad bits are not zero, so the text is not the canonical
    /// encoding of any byte sequence.
    #[error("non-canonical base32: leading pad bits are set")]
    DecodeNonCanonical,

    /// The decoded value does not fit the target identifier.
    #[error("decoded value {raw} is not a valid identifier")]
    DecodeOverflow { raw: u64 },
}
