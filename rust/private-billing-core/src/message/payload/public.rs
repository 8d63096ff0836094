use std::{convert::TryFrom, sync::Arc};

use anyhow::{anyhow, Context};
use fhe::bfv::{BfvParameters, PublicKey};
use fhe_traits::{Deserialize as FheDeserialize, DeserializeParametrized, Serialize as FheSerialize};

use crate::{
    hiding::{EvaluationKeys, PublicHidingContext},
    message::{
        field::{EntityReader, EntityWriter, FieldKind},
        header::EntityTag,
        payload::read_usize,
        DecodeError,
    },
};

/// Reads the scheme parameters from a bytes field.
pub(super) fn read_parameters(
    reader: &mut EntityReader,
) -> Result<Arc<BfvParameters>, DecodeError> {
    let bytes = reader.field(FieldKind::Bytes)?;
    BfvParameters::try_deserialize(bytes)
        .map(Arc::new)
        .map_err(|error| anyhow!("invalid scheme parameters: {}", error))
}

impl PublicHidingContext {
    pub(super) fn write_fields(&self, writer: &mut EntityWriter) {
        writer
            .field(FieldKind::Integer, &(self.cycle_length() as u64))
            .field(FieldKind::Integer, &u64::from(self.precision()))
            .field(FieldKind::Bytes, self.parameters().to_bytes().as_slice())
            .field(FieldKind::Bytes, self.public_key().to_bytes().as_slice())
            .field(FieldKind::Bytes, self.evaluation_keys().encoded());
    }

    pub(super) fn read_fields(reader: &mut EntityReader) -> Result<Self, DecodeError> {
        let cycle_length = read_usize(reader, "cycle_length")?;
        let precision = reader.value::<u64>(FieldKind::Integer, "precision")?;
        let precision =
            u8::try_from(precision).map_err(|_| anyhow!("invalid precision {}", precision))?;
        let par = read_parameters(reader)?;
        let public_key = PublicKey::from_bytes(reader.field(FieldKind::Bytes)?, &par)
            .map_err(|error| anyhow!("invalid public key: {}", error))?;
        let keys = EvaluationKeys::from_encoded(&par, reader.field(FieldKind::Bytes)?.to_vec());
        PublicHidingContext::new(cycle_length, precision, par, public_key, keys)
            .map_err(|error| anyhow!("{}", error))
            .context("invalid public hiding context")
    }

    /// Serializes the public hiding context including its evaluation keys.
    pub fn serialize(&self) -> Vec<u8> {
        let mut writer = EntityWriter::new(EntityTag::PublicHidingContext);
        self.write_fields(&mut writer);
        writer.finish()
    }

    /// Deserializes a public hiding context.
    ///
    /// The evaluation keys of the context are inactive, see [`activate_keys()`].
    ///
    /// # Errors
    /// Fails if the bytes are malformed.
    ///
    /// [`activate_keys()`]: PublicHidingContext::activate_keys
    pub fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = EntityReader::new(bytes, EntityTag::PublicHidingContext)?;
        let phc = Self::read_fields(&mut reader)?;
        reader.finish()?;
        Ok(phc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hiding::{HidingError, HomomorphicOps, SecretOps},
        testutils::billing::hiding_contexts,
    };

    #[test]
    fn test_roundtrip() {
        let hc = hiding_contexts(1, 3).pop().unwrap();
        let phc = hc.get_public_hiding_context();
        let deserialized = PublicHidingContext::deserialize(&phc.serialize()).unwrap();
        assert_eq!(&deserialized, phc.as_ref());
        assert_eq!(deserialized.id(), phc.id());
        assert_eq!(deserialized.cycle_length(), 3);

        // encryptions under the deserialized context decrypt with the original secret key
        let ct = deserialized.encrypt(&[0.5, -1.0, 2.0]).unwrap();
        assert_eq!(hc.decrypt(&ct).unwrap(), vec![0.5, -1.0, 2.0]);
    }

    #[test]
    fn test_keys_need_activation_after_deserialization() {
        let hc = hiding_contexts(1, 2).pop().unwrap();
        let phc = PublicHidingContext::deserialize(&hc.get_public_hiding_context().serialize())
            .unwrap();
        assert!(!phc.is_active());

        let values = phc.encrypt(&[1.5, 2.0]).unwrap();
        let flags = phc.encrypt_flags(&[true, false]).unwrap();
        assert!(matches!(
            phc.multiply(&values, &flags),
            Err(HidingError::KeysNotActive)
        ));

        phc.activate_keys().unwrap();
        phc.activate_keys().unwrap();
        assert!(phc.is_active());
        let product = phc.multiply(&values, &flags).unwrap();
        let decrypted = hc.decrypt(&product).unwrap();
        assert!((decrypted[0] - 1.5).abs() < 1e-5);
        assert!(decrypted[1].abs() < 1e-5);
    }

    #[test]
    fn test_deserialize_rejects_foreign_keys() {
        let mut hcs = hiding_contexts(2, 2);
        let other = hcs.pop().unwrap().get_public_hiding_context();
        let own = hcs.pop().unwrap().get_public_hiding_context();

        let mut writer = EntityWriter::new(EntityTag::PublicHidingContext);
        writer
            .field(FieldKind::Integer, &2_u64)
            .field(FieldKind::Integer, &5_u64)
            .field(FieldKind::Bytes, own.parameters().to_bytes().as_slice())
            .field(FieldKind::Bytes, &[1_u8, 2, 3][..])
            .field(FieldKind::Bytes, other.evaluation_keys().encoded());
        assert!(PublicHidingContext::deserialize(&writer.finish()).is_err());
    }
}
