use super::Error;
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use std::io::Result as IoResult;

/// Utility trait for serializing data inside class files
///
/// Java class files have some peculiarities that make it useful to define an extra trait (instead
/// of just using `serde`):
///
///   - tags are always `u8`
///   - when serializing a sequence, the length of the sequence is usually `u16`
///
pub trait Serialize: Sized {
    /// Serialize construct into a binary output stream
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> IoResult<()>;
}

impl Serialize for u8 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_u8(*self)
    }
}

impl Serialize for u16 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_u16::<BigEndian>(*self)
    }
}

impl Serialize for u32 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_u32::<BigEndian>(*self)
    }
}

impl Serialize for i32 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_i32::<BigEndian>(*self)
    }
}

impl Serialize for i64 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_i64::<BigEndian>(*self)
    }
}

impl Serialize for f32 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_f32::<BigEndian>(*self)
    }
}

impl Serialize for f64 {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_f64::<BigEndian>(*self)
    }
}

/// Size in `u16` is the first thing serialized/deserialized
impl<A: Serialize> Serialize for Vec<A> {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> IoResult<()> {
        (self.len() as u16).serialize(writer)?;
        for elem in self {
            elem.serialize(writer)?;
        }
        Ok(())
    }
}

/// Bounds-checked big-endian reader over the bytes of one class file
///
/// Every read that would run past the end of the input fails with [`Error::TruncatedInput`],
/// recording where the read started and how many bytes were missing.
#[derive(Clone, Debug)]
pub struct ClassCursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ClassCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> ClassCursor<'a> {
        ClassCursor { bytes, position: 0 }
    }

    /// Offset of the next byte to be read
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes left to read
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Check that `count` values of at least `min_size` bytes each can still fit in the input
    ///
    /// This is what catches declared member/attribute counts that are obviously larger than the
    /// rest of the file before we start allocating for them.
    pub fn expect_at_least(&self, count: usize, min_size: usize) -> Result<(), Error> {
        let needed = count.saturating_mul(min_size);
        if needed > self.remaining() {
            Err(Error::TruncatedInput {
                offset: self.position,
                needed,
                available: self.remaining(),
            })
        } else {
            Ok(())
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        self.expect_at_least(len, 1)?;
        let start = self.position;
        self.position += len;
        Ok(&self.bytes[start..self.position])
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        Ok(BigEndian::read_u16(self.read_bytes(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        Ok(BigEndian::read_u32(self.read_bytes(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32, Error> {
        Ok(BigEndian::read_i32(self.read_bytes(4)?))
    }

    pub fn read_i64(&mut self) -> Result<i64, Error> {
        Ok(BigEndian::read_i64(self.read_bytes(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32, Error> {
        Ok(BigEndian::read_f32(self.read_bytes(4)?))
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        Ok(BigEndian::read_f64(self.read_bytes(8)?))
    }
}

/// Counterpart of [`Serialize`] for reading class file structures back
pub trait Deserialize: Sized {
    /// Smallest number of bytes an encoded value can take up
    const MIN_SIZE: usize;

    /// Read the construct from the cursor, advancing it past the construct
    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error>;
}

impl Deserialize for u8 {
    const MIN_SIZE: usize = 1;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        cursor.read_u8()
    }
}

impl Deserialize for u16 {
    const MIN_SIZE: usize = 2;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        cursor.read_u16()
    }
}

impl Deserialize for u32 {
    const MIN_SIZE: usize = 4;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        cursor.read_u32()
    }
}

/// Size in `u16` is the first thing serialized/deserialized
impl<A: Deserialize> Deserialize for Vec<A> {
    const MIN_SIZE: usize = 2;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        let count = cursor.read_u16()? as usize;
        cursor.expect_at_least(count, A::MIN_SIZE)?;
        let mut elems = Vec::with_capacity(count);
        for _ in 0..count {
            elems.push(A::deserialize(cursor)?);
        }
        Ok(elems)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_big_endian() {
        let mut cursor = ClassCursor::new(&[0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x34]);
        assert_eq!(cursor.read_u32().unwrap(), 0xCAFEBABE);
        assert_eq!(cursor.read_u16().unwrap(), 52);
        assert!(cursor.is_empty());
    }

    #[test]
    fn short_read_reports_position() {
        let mut cursor = ClassCursor::new(&[0x00, 0x01, 0x02]);
        cursor.read_u16().unwrap();
        match cursor.read_u32() {
            Err(Error::TruncatedInput {
                offset,
                needed,
                available,
            }) => assert_eq!((offset, needed, available), (2, 4, 1)),
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn oversized_count_fails_before_reading_elements() {
        // Claims 0x0100 u16 entries but only carries two bytes of payload
        let mut cursor = ClassCursor::new(&[0x01, 0x00, 0xAB, 0xCD]);
        assert!(matches!(
            Vec::<u16>::deserialize(&mut cursor),
            Err(Error::TruncatedInput { needed: 512, .. })
        ));
    }

    #[test]
    fn vec_round_trips_through_serialize() {
        let mut bytes = vec![];
        vec![7u16, 9u16].serialize(&mut bytes).unwrap();
        assert_eq!(bytes, vec![0, 2, 0, 7, 0, 9]);
        let decoded = Vec::<u16>::deserialize(&mut ClassCursor::new(&bytes)).unwrap();
        assert_eq!(decoded, vec![7, 9]);
    }
}
