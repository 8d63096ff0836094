//! Serialization traits and the Length-Value helper.
//!
//! See the [message module] documentation since this is a private module anyways.
//!
//! [message module]: crate::message

use std::{convert::TryInto, ops::Range};

use anyhow::{anyhow, Context};

use crate::message::DecodeError;

/// An interface for serializable types.
///
/// See also [`FromBytes`] for deserialization.
pub trait ToBytes {
    /// The length of the buffer for encoding the type.
    fn buffer_length(&self) -> usize;

    /// Serialize the type in the given buffer.
    ///
    /// # Panics
    /// This method may panic if the given buffer is too small. Thus, [`buffer_length()`] must be
    /// called prior to calling this, and a large enough buffer must be provided.
    ///
    /// [`buffer_length()`]: ToBytes::buffer_length
    fn to_bytes<T: AsMut<[u8]>>(&self, buffer: &mut T);
}

/// An interface for deserializable types.
///
/// See also [`ToBytes`] for serialization.
pub trait FromBytes: Sized {
    /// Deserialize the type from the given buffer.
    ///
    /// # Errors
    /// May fail if certain parts of the deserialized buffer don't pass validity checks.
    fn from_byte_slice<T: AsRef<[u8]>>(buffer: &T) -> Result<Self, DecodeError>;
}

impl ToBytes for u64 {
    fn buffer_length(&self) -> usize {
        8
    }

    fn to_bytes<T: AsMut<[u8]>>(&self, buffer: &mut T) {
        buffer.as_mut()[..8].copy_from_slice(&self.to_be_bytes());
    }
}

impl FromBytes for u64 {
    fn from_byte_slice<T: AsRef<[u8]>>(buffer: &T) -> Result<Self, DecodeError> {
        let bytes: [u8; 8] = buffer
            .as_ref()
            .try_into()
            .map_err(|_| anyhow!("invalid integer: expected 8 bytes"))?;
        Ok(u64::from_be_bytes(bytes))
    }
}

impl ToBytes for [f64] {
    fn buffer_length(&self) -> usize {
        8 * self.len()
    }

    fn to_bytes<T: AsMut<[u8]>>(&self, buffer: &mut T) {
        for (chunk, value) in buffer.as_mut().chunks_exact_mut(8).zip(self.iter()) {
            chunk.copy_from_slice(&value.to_be_bytes());
        }
    }
}

impl FromBytes for Vec<f64> {
    fn from_byte_slice<T: AsRef<[u8]>>(buffer: &T) -> Result<Self, DecodeError> {
        let chunks = buffer.as_ref().chunks_exact(8);
        if !chunks.remainder().is_empty() {
            return Err(anyhow!("invalid real sequence: trailing bytes"));
        }
        // unwrap safe: the chunks are exactly 8 bytes long
        Ok(chunks
            .map(|chunk| f64::from_be_bytes(chunk.try_into().unwrap()))
            .collect())
    }
}

impl ToBytes for [u8] {
    fn buffer_length(&self) -> usize {
        self.len()
    }

    fn to_bytes<T: AsMut<[u8]>>(&self, buffer: &mut T) {
        buffer.as_mut()[..self.len()].copy_from_slice(self);
    }
}

impl FromBytes for Vec<u8> {
    fn from_byte_slice<T: AsRef<[u8]>>(buffer: &T) -> Result<Self, DecodeError> {
        Ok(buffer.as_ref().to_vec())
    }
}

/// A helper for encoding and decoding Length-Value (LV) fields.
///
/// Note that the 4 bytes [`length()`] field gives the length of the *total* Length-Value field,
/// _i.e._ the length of the value, plus the 4 extra bytes of the length field itself.
///
/// # Examples
/// ## Decoding a LV field
///
/// ```rust
/// # use private_billing_core::message::LengthValueBuffer;
/// let bytes = vec![
///     0x00, 0x00, 0x00, 0x05, // Length = 5
///     0xff, // Value = 0xff
///     0x11, 0x22, // Extra bytes
/// ];
/// let buffer = LengthValueBuffer::new(&bytes).unwrap();
/// assert_eq!(buffer.length(), 5);
/// assert_eq!(buffer.value_length(), 1);
/// assert_eq!(buffer.value(), &[0xff][..]);
/// ```
///
/// [`length()`]: LengthValueBuffer::length
pub struct LengthValueBuffer<T> {
    inner: T,
}

/// The size of the length field for encoding a Length-Value item.
pub(crate) const LENGTH_FIELD: Range<usize> = 0..4;

impl<T: AsRef<[u8]>> LengthValueBuffer<T> {
    /// Returns a new [`LengthValueBuffer`].
    ///
    /// # Errors
    /// This method performs bound checks and returns an error if the given buffer is not a valid
    /// Length-Value item.
    pub fn new(bytes: T) -> Result<Self, DecodeError> {
        let buffer = Self { inner: bytes };
        buffer
            .check_buffer_length()
            .context("not a valid LengthValueBuffer")?;
        Ok(buffer)
    }

    /// Create a new [`LengthValueBuffer`] without any bound checks.
    pub fn new_unchecked(bytes: T) -> Self {
        Self { inner: bytes }
    }

    /// Check that the buffer is a valid Length-Value item.
    pub fn check_buffer_length(&self) -> Result<(), DecodeError> {
        let len = self.inner.as_ref().len();
        if len < LENGTH_FIELD.end {
            return Err(anyhow!(
                "invalid buffer length: {} < {}",
                len,
                LENGTH_FIELD.end
            ));
        }

        if (self.length() as usize) < LENGTH_FIELD.end {
            return Err(anyhow!(
                "invalid length value: {} (should be >= {})",
                self.length(),
                LENGTH_FIELD.end
            ));
        }

        if len < self.length() as usize {
            return Err(anyhow!(
                "invalid buffer length: {} < {}",
                len,
                self.length(),
            ));
        }
        Ok(())
    }

    /// Returns the length field. Note that the value of the length
    /// field includes the length of the field itself (4 bytes).
    ///
    /// # Panics
    /// This method may panic if buffer is not a valid Length-Value item.
    pub fn length(&self) -> u32 {
        // unwrap safe: the slice is exactly 4 bytes long
        u32::from_be_bytes(self.inner.as_ref()[LENGTH_FIELD].try_into().unwrap())
    }

    /// Returns the length of the value.
    pub fn value_length(&self) -> usize {
        self.length() as usize - LENGTH_FIELD.end
    }

    /// Returns the range corresponding to the value.
    fn value_range(&self) -> Range<usize> {
        let offset = LENGTH_FIELD.end;
        let value_length = self.value_length();
        offset..offset + value_length
    }
}

impl<T: AsMut<[u8]>> LengthValueBuffer<T> {
    /// Sets the length field to the given value.
    ///
    /// # Panics
    /// This method may panic if buffer is not a valid Length-Value item.
    pub fn set_length(&mut self, value: u32) {
        self.inner.as_mut()[LENGTH_FIELD].copy_from_slice(&value.to_be_bytes());
    }
}

impl<'a, T: AsRef<[u8]> + AsMut<[u8]> + ?Sized> LengthValueBuffer<&'a mut T> {
    /// Gets a mutable reference to the value field.
    ///
    /// # Panics
    /// This method may panic if buffer is not a valid Length-Value item.
    pub fn value_mut(&mut self) -> &mut [u8] {
        let range = self.value_range();
        &mut self.inner.as_mut()[range]
    }
}

impl<'a, T: AsRef<[u8]> + ?Sized> LengthValueBuffer<&'a T> {
    /// Gets a reference to the value field.
    ///
    /// # Panics
    /// This method may panic if buffer is not a valid Length-Value item.
    pub fn value(&self) -> &'a [u8] {
        &self.inner.as_ref()[self.value_range()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_length_value_buffer() {
        let bytes = vec![
            0x00, 0x00, 0x00, 0x05, // Length = 5
            0xff, // Value = 0xff
            0x11, 0x22, // Extra bytes
        ];
        let buffer = LengthValueBuffer::new(&bytes).unwrap();
        assert_eq!(buffer.length(), 5);
        assert_eq!(buffer.value_length(), 1);
        assert_eq!(buffer.value(), &[0xff][..]);
    }

    #[test]
    fn test_decode_empty_value() {
        let bytes = vec![0x00, 0x00, 0x00, 0x04];
        let buffer = LengthValueBuffer::new(&bytes).unwrap();
        assert_eq!(buffer.value_length(), 0);
    }

    #[test]
    fn test_decode_rejects_short_buffers() {
        assert!(LengthValueBuffer::new(&vec![0x00, 0x00, 0x00]).is_err());
        assert!(LengthValueBuffer::new(&vec![0x00, 0x00, 0x00, 0x03]).is_err());
        assert!(LengthValueBuffer::new(&vec![0x00, 0x00, 0x00, 0x08, 0x11]).is_err());
    }

    #[test]
    fn test_encode_length_value_buffer() {
        let mut bytes = vec![0xff; 7];
        let mut buffer = LengthValueBuffer::new_unchecked(&mut bytes);
        buffer.set_length(6);
        buffer.value_mut().copy_from_slice(&[0xaa, 0xbb][..]);
        assert_eq!(bytes, vec![0x00, 0x00, 0x00, 0x06, 0xaa, 0xbb, 0xff]);
    }

    #[test]
    fn test_reals_keep_their_bits() {
        let values = vec![0.1, -0.0, f64::MAX, 1e-300];
        let mut buffer = vec![0; values.buffer_length()];
        values.as_slice().to_bytes(&mut buffer);
        let decoded = Vec::<f64>::from_byte_slice(&buffer).unwrap();
        for (lhs, rhs) in values.iter().zip(decoded.iter()) {
            assert_eq!(lhs.to_bits(), rhs.to_bits());
        }
        assert!(Vec::<f64>::from_byte_slice(&vec![0_u8; 9]).is_err());
    }

    #[test]
    fn test_integers() {
        let mut buffer = vec![0; 8];
        42_u64.to_bytes(&mut buffer);
        assert_eq!(buffer, vec![0, 0, 0, 0, 0, 0, 0, 42]);
        assert_eq!(u64::from_byte_slice(&buffer).unwrap(), 42);
        assert!(u64::from_byte_slice(&vec![0_u8; 7]).is_err());
    }
}
