use std::sync::Arc;

use crate::{
    billing::HiddenData,
    hiding::PublicHidingContext,
    message::{
        field::{EntityReader, EntityWriter, FieldKind},
        header::EntityTag,
        payload::read_ciphertext,
        DecodeError,
    },
};

impl HiddenData {
    /// Serializes the hidden data together with the public hiding context it is encrypted under.
    pub fn serialize(&self) -> Vec<u8> {
        let mut writer = EntityWriter::new(EntityTag::HiddenData);
        self.phc.write_fields(&mut writer);
        writer
            .field(FieldKind::Integer, &self.client)
            .field(FieldKind::Integer, &self.cycle_id);
        for ct in [
            &self.consumptions,
            &self.supplies,
            &self.accepted_consumer_flags,
            &self.accepted_producer_flags,
            &self.positive_deviation_flags,
        ]
        .iter()
        {
            writer.field(FieldKind::Ciphertext, &ct.to_wire());
        }
        writer
            .field(FieldKind::Masked, &self.masked_individual_deviations)
            .field(FieldKind::Masked, &self.masked_p2p_consumer_flags)
            .field(FieldKind::Masked, &self.masked_p2p_producer_flags)
            .finish()
    }

    /// Deserializes hidden data.
    ///
    /// The evaluation keys of the embedded context are inactive. The data is only decoded, not
    /// validated against a cycle, see [`check_validity()`].
    ///
    /// # Errors
    /// Fails if the bytes are malformed.
    ///
    /// [`check_validity()`]: HiddenData::check_validity
    pub fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = EntityReader::new(bytes, EntityTag::HiddenData)?;
        let phc = Arc::new(PublicHidingContext::read_fields(&mut reader)?);
        let client = reader.value(FieldKind::Integer, "client")?;
        let cycle_id = reader.value(FieldKind::Integer, "cycle_id")?;
        let par = phc.parameters().clone();
        let data = Self {
            client,
            cycle_id,
            consumptions: read_ciphertext(&mut reader, &par)?,
            supplies: read_ciphertext(&mut reader, &par)?,
            accepted_consumer_flags: read_ciphertext(&mut reader, &par)?,
            accepted_producer_flags: read_ciphertext(&mut reader, &par)?,
            positive_deviation_flags: read_ciphertext(&mut reader, &par)?,
            masked_individual_deviations: reader
                .value(FieldKind::Masked, "masked_individual_deviations")?,
            masked_p2p_consumer_flags: reader.value(FieldKind::Masked, "masked_p2p_consumer_flags")?,
            masked_p2p_producer_flags: reader.value(FieldKind::Masked, "masked_p2p_producer_flags")?,
            phc,
        };
        reader.finish()?;
        Ok(data)
    }
}
