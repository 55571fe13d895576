use std::borrow::Cow;

use heed::BoxedError;

/// Encodes `RAW` and `TREE` keys as 4 native-endian bytes.
///
/// Both tables are opened with `DatabaseFlags::INTEGER_KEY` (see
/// [`crate::store`]), so LMDB itself compares keys as native integers rather
/// than lexicographically on these bytes, which is what makes
/// `last_key`/`MDB_LAST` a true max-id lookup regardless of host endianness.
pub enum IdKeyCodec {}

impl<'a> heed::BytesEncode<'a> for IdKeyCodec {
    type EItem = i32;

    fn bytes_encode(id: &'a i32) -> Result<Cow<'a, [u8]>, BoxedError> {
        Ok(Cow::Owned(id.to_ne_bytes().to_vec()))
    }
}

impl<'a> heed::BytesDecode<'a> for IdKeyCodec {
    type DItem = i32;

    fn bytes_decode(bytes: &'a [u8]) -> Result<i32, BoxedError> {
        let array: [u8; 4] = bytes.try_into()?;
        Ok(i32::from_ne_bytes(array))
    }
}
