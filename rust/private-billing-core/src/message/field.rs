//! Typed Length-Value fields of serialized entities.
//!
//! See the [message module] documentation since this is a private module anyways.
//!
//! [message module]: crate::message

use std::convert::TryFrom;

use anyhow::{anyhow, Context};

use crate::message::{
    header::{EntityTag, Header, HEADER_LENGTH},
    traits::{FromBytes, LengthValueBuffer, ToBytes, LENGTH_FIELD},
    DecodeError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The kind of a field value.
pub enum FieldKind {
    /// A big endian `u64`.
    Integer = 1,
    /// A sequence of big endian `f64`.
    Reals = 2,
    /// A scale byte followed by the ciphertext bytes of the homomorphic scheme.
    Ciphertext = 3,
    /// A masked vector.
    Masked = 4,
    /// Opaque bytes of the homomorphic scheme (parameters and keys).
    Bytes = 5,
}

impl TryFrom<u8> for FieldKind {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(FieldKind::Integer),
            2 => Ok(FieldKind::Reals),
            3 => Ok(FieldKind::Ciphertext),
            4 => Ok(FieldKind::Masked),
            5 => Ok(FieldKind::Bytes),
            _ => Err(anyhow!("invalid field kind {}", value)),
        }
    }
}

/// Writes the header and the fields of an entity.
pub struct EntityWriter {
    buffer: Vec<u8>,
}

impl EntityWriter {
    /// Starts a new entity of the given type.
    pub fn new(tag: EntityTag) -> Self {
        let mut buffer = vec![0; HEADER_LENGTH];
        Header::new(tag).to_bytes(&mut buffer);
        Self { buffer }
    }

    /// Appends a field.
    pub fn field<V: ToBytes + ?Sized>(&mut self, kind: FieldKind, value: &V) -> &mut Self {
        let start = self.buffer.len();
        let length = LENGTH_FIELD.end + value.buffer_length();
        self.buffer.resize(start + 1 + length, 0);
        self.buffer[start] = kind as u8;
        let mut field = LengthValueBuffer::new_unchecked(&mut self.buffer[start + 1..]);
        field.set_length(length as u32);
        value.to_bytes(&mut field.value_mut());
        self
    }

    /// Gets the serialized entity.
    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }
}

/// Reads the fields of an entity in the order they were written.
pub struct EntityReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> EntityReader<'a> {
    /// Checks the header of the serialized entity.
    ///
    /// # Errors
    /// Fails if the header is malformed or announces another entity.
    pub fn new(bytes: &'a [u8], tag: EntityTag) -> Result<Self, DecodeError> {
        let header = Header::from_byte_slice(&bytes)?;
        if header.tag != tag {
            return Err(anyhow!(
                "unexpected entity: expected {:?}, got {:?}",
                tag,
                header.tag
            ));
        }
        Ok(Self {
            bytes,
            offset: HEADER_LENGTH,
        })
    }

    /// Reads the raw value of the next field.
    ///
    /// # Errors
    /// Fails if the next field is missing, truncated or of another kind.
    pub fn field(&mut self, kind: FieldKind) -> Result<&'a [u8], DecodeError> {
        let bytes: &'a [u8] = self.bytes;
        let rest = &bytes[self.offset..];
        let found = rest
            .first()
            .ok_or_else(|| anyhow!("missing {:?} field at offset {}", kind, self.offset))?;
        let found = FieldKind::try_from(*found)?;
        if found != kind {
            return Err(anyhow!(
                "unexpected field at offset {}: expected {:?}, got {:?}",
                self.offset,
                kind,
                found
            ));
        }
        let field = LengthValueBuffer::new(&rest[1..])
            .with_context(|| format!("invalid {:?} field at offset {}", kind, self.offset))?;
        self.offset += 1 + field.length() as usize;
        Ok(field.value())
    }

    /// Reads and decodes the value of the next field.
    ///
    /// # Errors
    /// Fails if the field can't be read or decoded.
    pub fn value<V: FromBytes>(&mut self, kind: FieldKind, name: &str) -> Result<V, DecodeError> {
        let offset = self.offset;
        let bytes = self.field(kind)?;
        V::from_byte_slice(&bytes)
            .with_context(|| format!("invalid field {} at offset {}", name, offset))
    }

    /// Checks that all bytes were consumed.
    ///
    /// # Errors
    /// Fails if there are trailing bytes.
    pub fn finish(self) -> Result<(), DecodeError> {
        if self.offset != self.bytes.len() {
            return Err(anyhow!(
                "{} trailing bytes",
                self.bytes.len() - self.offset
            ));
        }
        Ok(())
    }
}
