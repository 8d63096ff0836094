//! Entity headers.
//!
//! See the [message module] documentation since this is a private module anyways.
//!
//! [message module]: crate::message

use std::convert::TryFrom;

use anyhow::{anyhow, Context};

use crate::message::{
    traits::{FromBytes, ToBytes},
    DecodeError,
};

/// The version of the wire format.
pub const WIRE_VERSION: u8 = 1;

pub(crate) const HEADER_LENGTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The type of the serialized entity.
pub enum EntityTag {
    CycleContext = 1,
    HiddenData = 2,
    HiddenBill = 3,
    PublicHidingContext = 4,
}

impl TryFrom<u8> for EntityTag {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(EntityTag::CycleContext),
            2 => Ok(EntityTag::HiddenData),
            3 => Ok(EntityTag::HiddenBill),
            4 => Ok(EntityTag::PublicHidingContext),
            _ => Err(anyhow!("invalid entity tag {}", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The header preceding the fields of every serialized entity.
pub struct Header {
    pub version: u8,
    pub tag: EntityTag,
}

impl Header {
    /// Creates a header of the current wire version.
    pub fn new(tag: EntityTag) -> Self {
        Self {
            version: WIRE_VERSION,
            tag,
        }
    }
}

impl ToBytes for Header {
    fn buffer_length(&self) -> usize {
        HEADER_LENGTH
    }

    fn to_bytes<T: AsMut<[u8]>>(&self, buffer: &mut T) {
        let buffer = buffer.as_mut();
        buffer[0] = self.version;
        buffer[1] = self.tag as u8;
    }
}

impl FromBytes for Header {
    fn from_byte_slice<T: AsRef<[u8]>>(buffer: &T) -> Result<Self, DecodeError> {
        let bytes = buffer.as_ref();
        if bytes.len() < HEADER_LENGTH {
            return Err(anyhow!(
                "invalid buffer length: {} < {}",
                bytes.len(),
                HEADER_LENGTH
            ));
        }
        if bytes[0] != WIRE_VERSION {
            return Err(anyhow!("unsupported wire version {}", bytes[0]));
        }
        Ok(Self {
            version: bytes[0],
            tag: EntityTag::try_from(bytes[1]).context("invalid header")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header() {
        let mut buffer = vec![0; HEADER_LENGTH];
        Header::new(EntityTag::HiddenBill).to_bytes(&mut buffer);
        assert_eq!(buffer, vec![WIRE_VERSION, 3]);
        assert_eq!(
            Header::from_byte_slice(&buffer).unwrap(),
            Header::new(EntityTag::HiddenBill)
        );
    }

    #[test]
    fn test_header_rejects_unknown_version_and_tag() {
        assert!(Header::from_byte_slice(&vec![WIRE_VERSION + 1, 3]).is_err());
        assert!(Header::from_byte_slice(&vec![WIRE_VERSION, 9]).is_err());
        assert!(Header::from_byte_slice(&vec![WIRE_VERSION]).is_err());
    }
}
