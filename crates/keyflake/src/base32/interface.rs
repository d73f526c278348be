use crate::{base32::Error, id::RecordId};

/// Fixed-width Crockford base32 text for identifiers.
///
/// The encoding is 13 characters for a [`RecordId`] and sorts in the same
/// order as the numeric value, which makes it suitable for file names or
/// URLs where the decimal form is unwieldy.
///
/// ```
/// use keyflake::{RecordId, base32::Base32Ext};
///
/// let id = RecordId::try_from(2_424_242_424_242_424_242).unwrap();
/// assert_eq!(id.encode(), "23953MG16DJDJ");
/// assert_eq!(RecordId::decode("23953mg16djdj").unwrap(), id);
/// ```
pub trait Base32Ext: Sized {
    /// Number of characters in the encoding.
    const BASE32_SIZE: usize;

    /// Encodes this identifier as Crockford base32.
    fn encode(&self) -> String;

    /// Decodes an identifier from its Crockford base32 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not exactly [`Self::BASE32_SIZE`]
    /// characters, contains characters outside the alphabet, or decodes to a
    /// value that is not a valid identifier.
    fn decode(s: &str) -> Result<Self, Error>;
}

impl Base32Ext for RecordId {
    const BASE32_SIZE: usize = crate::base32::encoded_len(8);

    fn encode(&self) -> String {
        crate::base32::encode(&self.to_u64().to_be_bytes())
    }

    fn decode(s: &str) -> Result<Self, Error> {
        if s.len() != Self::BASE32_SIZE {
            return Err(Error::DecodeInvalidLen { len: s.len() });
        }
        let bytes = crate::base32::decode(s)?;
        let raw = bytes
            .try_into()
            .map(u64::from_be_bytes)
            .map_err(|bytes: Vec<u8>| Error::DecodeInvalidLen { len: bytes.len() })?;
        Self::try_from(raw).map_err(|_| Error::DecodeOverflow { raw })
    }
}
