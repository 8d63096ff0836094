use anyhow::Context;

use crate::{
    billing::CycleContext,
    message::{
        field::{EntityReader, EntityWriter, FieldKind},
        header::EntityTag,
        payload::read_usize,
        DecodeError,
    },
};

impl CycleContext {
    /// Serializes the cycle context.
    pub fn serialize(&self) -> Vec<u8> {
        EntityWriter::new(EntityTag::CycleContext)
            .field(FieldKind::Integer, &self.cycle_id)
            .field(FieldKind::Integer, &(self.cycle_length as u64))
            .field(FieldKind::Reals, self.retail_prices.as_slice())
            .field(FieldKind::Reals, self.feed_in_tarifs.as_slice())
            .field(FieldKind::Reals, self.trading_prices.as_slice())
            .finish()
    }

    /// Deserializes a cycle context.
    ///
    /// # Errors
    /// Fails if the bytes are malformed or the context is invalid.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = EntityReader::new(bytes, EntityTag::CycleContext)?;
        let cyc = Self {
            cycle_id: reader.value(FieldKind::Integer, "cycle_id")?,
            cycle_length: read_usize(&mut reader, "cycle_length")?,
            retail_prices: reader.value(FieldKind::Reals, "retail_prices")?,
            feed_in_tarifs: reader.value(FieldKind::Reals, "feed_in_tarifs")?,
            trading_prices: reader.value(FieldKind::Reals, "trading_prices")?,
        };
        reader.finish()?;
        cyc.check_validity().context("invalid cycle context")?;
        Ok(cyc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let cyc =
            CycleContext::new(3, 2, vec![0.21, 0.3], vec![0.05, 0.0], vec![0.1, 1e-7]).unwrap();
        let bytes = cyc.serialize();
        assert_eq!(bytes[..2], [1, EntityTag::CycleContext as u8]);
        assert_eq!(CycleContext::deserialize(&bytes).unwrap(), cyc);
    }

    #[test]
    fn test_deserialize_rejects_invalid_context() {
        let cyc = CycleContext {
            cycle_id: 3,
            cycle_length: 3,
            retail_prices: vec![0.21; 2],
            feed_in_tarifs: vec![0.05; 2],
            trading_prices: vec![0.11; 2],
        };
        assert!(CycleContext::deserialize(&cyc.serialize()).is_err());
    }

    #[test]
    fn test_deserialize_rejects_malformed_bytes() {
        let bytes = CycleContext::new(3, 1, vec![0.21], vec![0.05], vec![0.11])
            .unwrap()
            .serialize();
        assert!(CycleContext::deserialize(&bytes[..bytes.len() - 1]).is_err());
        let mut padded = bytes.clone();
        padded.push(0);
        assert!(CycleContext::deserialize(&padded).is_err());
        let mut retagged = bytes;
        retagged[1] = EntityTag::HiddenBill as u8;
        assert!(CycleContext::deserialize(&retagged).is_err());
    }
}
