use fhe_traits::Serialize as FheSerialize;

use crate::{
    billing::HiddenBill,
    message::{
        field::{EntityReader, EntityWriter, FieldKind},
        header::EntityTag,
        payload::{public::read_parameters, read_ciphertext},
        DecodeError,
    },
};

impl HiddenBill {
    /// Serializes the hidden bill together with the scheme parameters of its ciphertexts.
    pub fn serialize(&self) -> Vec<u8> {
        let par = self.hidden_bill.parameters();
        EntityWriter::new(EntityTag::HiddenBill)
            .field(FieldKind::Integer, &self.cycle_id)
            .field(FieldKind::Bytes, par.to_bytes().as_slice())
            .field(FieldKind::Ciphertext, &self.hidden_bill.to_wire())
            .field(FieldKind::Ciphertext, &self.hidden_reward.to_wire())
            .finish()
    }

    /// Deserializes a hidden bill.
    ///
    /// # Errors
    /// Fails if the bytes are malformed.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = EntityReader::new(bytes, EntityTag::HiddenBill)?;
        let cycle_id = reader.value(FieldKind::Integer, "cycle_id")?;
        let par = read_parameters(&mut reader)?;
        let hidden_bill = read_ciphertext(&mut reader, &par)?;
        let hidden_reward = read_ciphertext(&mut reader, &par)?;
        reader.finish()?;
        Ok(Self {
            cycle_id,
            hidden_bill,
            hidden_reward,
        })
    }
}
