use super::{
    ClassConstantIndex, ClassCursor, ClassFileDefect, ConstantIndex, ConstantPool, Deserialize,
    Error, InnerClassAccessFlags, NameAndTypeConstantIndex, Serialize, Utf8ConstantIndex,
};
use byteorder::WriteBytesExt;

/// Attributes (used in classes, fields, methods, and even on some attributes)
///
/// Attributes are kept as raw blobs when the class file is read. Only the handful that matter
/// for comparing API surfaces get decoded, and only on demand (see [`AttributeLike::find`]).
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name_index: Utf8ConstantIndex,
    pub info: Vec<u8>,
}

impl Serialize for Attribute {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.name_index.serialize(writer)?;

        // Attribute info length is 4 bytes
        (self.info.len() as u32).serialize(writer)?;
        writer.write_all(&self.info)?;

        Ok(())
    }
}

impl Deserialize for Attribute {
    const MIN_SIZE: usize = 6;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        let name_index = Utf8ConstantIndex::deserialize(cursor)?;
        let length = cursor.read_u32()? as usize;
        let info = cursor.read_bytes(length)?.to_vec();
        Ok(Attribute { name_index, info })
    }
}

/// Attributes are all stored in the same way (see `Attribute`), but internally
/// they represent very different things. This trait is implemented by things
/// which can be turned into attributes (and back).
pub trait AttributeLike: Serialize + Deserialize {
    /// Name of the attribute
    const NAME: &'static str;

    /// Decode the attribute from its `info` bytes, which must be consumed exactly
    fn decode(info: &[u8]) -> Result<Self, Error> {
        let bad_length = || {
            Error::MalformedClassFile(ClassFileDefect::BadAttributeLength {
                attribute: Self::NAME,
                length: info.len(),
            })
        };
        let mut cursor = ClassCursor::new(info);
        let decoded = Self::deserialize(&mut cursor).map_err(|err| match err {
            Error::TruncatedInput { .. } => bad_length(),
            other => other,
        })?;
        if !cursor.is_empty() {
            return Err(bad_length());
        }
        Ok(decoded)
    }

    /// Find and decode the first attribute with this name
    fn find(attributes: &[Attribute], constants: &ConstantPool) -> Result<Option<Self>, Error> {
        for attribute in attributes {
            if constants.utf8(attribute.name_index)? == Self::NAME {
                return Self::decode(&attribute.info).map(Some);
            }
        }
        Ok(None)
    }

    /// Check for the presence of an attribute with this name
    fn is_present(attributes: &[Attribute], constants: &ConstantPool) -> Result<bool, Error> {
        Ok(Self::find(attributes, constants)?.is_some())
    }
}

/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.2
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantValue(pub ConstantIndex);

impl AttributeLike for ConstantValue {
    const NAME: &'static str = "ConstantValue";
}

impl Serialize for ConstantValue {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}

impl Deserialize for ConstantValue {
    const MIN_SIZE: usize = 2;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        Ok(ConstantValue(ConstantIndex::deserialize(cursor)?))
    }
}

/// Checked exceptions a method declares it throws
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.5
#[derive(Debug, Clone, PartialEq)]
pub struct Exceptions(pub Vec<ClassConstantIndex>);

impl AttributeLike for Exceptions {
    const NAME: &'static str = "Exceptions";
}

impl Serialize for Exceptions {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}

impl Deserialize for Exceptions {
    const MIN_SIZE: usize = 2;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        Ok(Exceptions(Vec::deserialize(cursor)?))
    }
}

/// Every inner class referenced in a class' constant pool must be included in the inner classes
/// attribute on the class.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.6
#[derive(Debug, Clone, PartialEq)]
pub struct InnerClasses(pub Vec<InnerClass>);

impl AttributeLike for InnerClasses {
    const NAME: &'static str = "InnerClasses";
}

impl Serialize for InnerClasses {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}

impl Deserialize for InnerClasses {
    const MIN_SIZE: usize = 2;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        Ok(InnerClasses(Vec::deserialize(cursor)?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InnerClass {
    pub inner_class: ClassConstantIndex,

    /// Zero for local and anonymous classes
    pub outer_class: ClassConstantIndex,

    /// Zero for anonymous classes
    pub inner_name: Utf8ConstantIndex,
    pub access_flags: InnerClassAccessFlags,
}

impl Serialize for InnerClass {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.inner_class.serialize(writer)?;
        self.outer_class.serialize(writer)?;
        self.inner_name.serialize(writer)?;
        self.access_flags.serialize(writer)?;
        Ok(())
    }
}

impl Deserialize for InnerClass {
    const MIN_SIZE: usize = 8;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        Ok(InnerClass {
            inner_class: ClassConstantIndex::deserialize(cursor)?,
            outer_class: ClassConstantIndex::deserialize(cursor)?,
            inner_name: Utf8ConstantIndex::deserialize(cursor)?,
            access_flags: InnerClassAccessFlags::deserialize(cursor)?,
        })
    }
}

/// Present on local and anonymous classes
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.7
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnclosingMethod {
    pub class: ClassConstantIndex,

    /// Zero when the class is not enclosed by a method or constructor (eg. field initializers)
    pub method: NameAndTypeConstantIndex,
}

impl AttributeLike for EnclosingMethod {
    const NAME: &'static str = "EnclosingMethod";
}

impl Serialize for EnclosingMethod {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.class.serialize(writer)?;
        self.method.serialize(writer)?;
        Ok(())
    }
}

impl Deserialize for EnclosingMethod {
    const MIN_SIZE: usize = 4;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        Ok(EnclosingMethod {
            class: ClassConstantIndex::deserialize(cursor)?,
            method: NameAndTypeConstantIndex::deserialize(cursor)?,
        })
    }
}

/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.9
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signature {
    pub signature: Utf8ConstantIndex,
}

impl AttributeLike for Signature {
    const NAME: &'static str = "Signature";
}

impl Serialize for Signature {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.signature.serialize(writer)?;
        Ok(())
    }
}

impl Deserialize for Signature {
    const MIN_SIZE: usize = 2;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        Ok(Signature {
            signature: Utf8ConstantIndex::deserialize(cursor)?,
        })
    }
}

/// Marks a class or member with no counterpart in source code (older compilers emit this
/// instead of `ACC_SYNTHETIC`)
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.8
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Synthetic;

impl AttributeLike for Synthetic {
    const NAME: &'static str = "Synthetic";
}

impl Serialize for Synthetic {
    fn serialize<W: WriteBytesExt>(&self, _writer: &mut W) -> std::io::Result<()> {
        Ok(())
    }
}

impl Deserialize for Synthetic {
    const MIN_SIZE: usize = 0;

    fn deserialize(_cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        Ok(Synthetic)
    }
}

/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.15
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deprecated;

impl AttributeLike for Deprecated {
    const NAME: &'static str = "Deprecated";
}

impl Serialize for Deprecated {
    fn serialize<W: WriteBytesExt>(&self, _writer: &mut W) -> std::io::Result<()> {
        Ok(())
    }
}

impl Deserialize for Deprecated {
    const MIN_SIZE: usize = 0;

    fn deserialize(_cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        Ok(Deprecated)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::ConstantPoolBuilder;

    #[test]
    fn finds_attribute_by_name() {
        let mut builder = ConstantPoolBuilder::new();
        let exception = builder.get_class("java/io/IOException").unwrap();
        let attributes = vec![
            builder.get_attribute(Deprecated).unwrap(),
            builder.get_attribute(Exceptions(vec![exception])).unwrap(),
        ];
        let constants = builder.finish();

        assert_eq!(
            Exceptions::find(&attributes, &constants).unwrap(),
            Some(Exceptions(vec![exception]))
        );
        assert!(Deprecated::is_present(&attributes, &constants).unwrap());
        assert!(!Synthetic::is_present(&attributes, &constants).unwrap());
    }

    #[test]
    fn fixed_size_attribute_with_wrong_length() {
        fn bad_length<T>(attribute: &'static str, length: usize) -> Result<T, Error> {
            Err(Error::MalformedClassFile(ClassFileDefect::BadAttributeLength {
                attribute,
                length,
            }))
        }
        assert_eq!(Synthetic::decode(&[0]), bad_length("Synthetic", 1));
        assert_eq!(Signature::decode(&[0]), bad_length("Signature", 1));
        assert_eq!(
            EnclosingMethod::decode(&[0, 1, 0, 0, 9]),
            bad_length("EnclosingMethod", 5)
        );

        // Count says two inner classes but there is only room for one
        let mut info = vec![0, 2];
        info.extend_from_slice(&[0, 1, 0, 2, 0, 3, 0, 8]);
        assert_eq!(InnerClasses::decode(&info), bad_length("InnerClasses", 10));
    }
}
