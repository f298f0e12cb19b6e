use super::{
    Attribute, ClassAccessFlags, ClassConstantIndex, ClassCursor, ClassFileDefect, ConstantPool,
    Deserialize, Error, FieldAccessFlags, MethodAccessFlags, Serialize, SupportedVersions,
    Utf8ConstantIndex, Version,
};
use byteorder::WriteBytesExt;

/// Representation of the [`class` file format of the JVM][0]
///
/// This is the raw structure: names, descriptors and attributes are still indices into
/// `constants`. See [`super::ClassDescriptor`] for the resolved view used when comparing classes.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    pub version: Version,
    pub constants: ConstantPool,
    pub access_flags: ClassAccessFlags,
    pub this_class: ClassConstantIndex,
    pub super_class: ClassConstantIndex,
    pub interfaces: Vec<ClassConstantIndex>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    /// Magic header bytes that go at the front of the serialized class file
    pub const MAGIC: u32 = 0xCAFE_BABE;

    /// Read a class file
    ///
    /// Checks happen in file order, so a file with a bad magic number reports that even if the
    /// rest is garbage too, and a file with an unsupported version is rejected before its
    /// constant pool is decoded.
    pub fn parse(bytes: &[u8], supported: &SupportedVersions) -> Result<ClassFile, Error> {
        let mut cursor = ClassCursor::new(bytes);

        let magic = cursor.read_u32()?;
        if magic != ClassFile::MAGIC {
            return Err(Error::MalformedClassFile(ClassFileDefect::BadMagic(magic)));
        }

        let version = Version::deserialize(&mut cursor)?;
        if !supported.contains(version) {
            return Err(Error::UnsupportedClassVersion {
                version,
                supported: *supported,
            });
        }

        let constants = ConstantPool::read(&mut cursor)?;
        let class_file = ClassFile {
            version,
            constants,
            access_flags: ClassAccessFlags::deserialize(&mut cursor)?,
            this_class: ClassConstantIndex::deserialize(&mut cursor)?,
            super_class: ClassConstantIndex::deserialize(&mut cursor)?,
            interfaces: Vec::deserialize(&mut cursor)?,
            fields: Vec::deserialize(&mut cursor)?,
            methods: Vec::deserialize(&mut cursor)?,
            attributes: Vec::deserialize(&mut cursor)?,
        };

        if !cursor.is_empty() {
            return Err(Error::MalformedClassFile(ClassFileDefect::TrailingBytes(
                cursor.remaining(),
            )));
        }
        Ok(class_file)
    }

    /// Serialize the class file into a fresh buffer
    pub fn to_bytes(&self) -> std::io::Result<Vec<u8>> {
        let mut bytes = vec![];
        self.serialize(&mut bytes)?;
        Ok(bytes)
    }
}

impl Serialize for ClassFile {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        ClassFile::MAGIC.serialize(writer)?;
        self.version.serialize(writer)?;
        self.constants.serialize(writer)?;
        self.access_flags.serialize(writer)?;
        self.this_class.serialize(writer)?;
        self.super_class.serialize(writer)?;
        self.interfaces.serialize(writer)?;
        self.fields.serialize(writer)?;
        self.methods.serialize(writer)?;
        self.attributes.serialize(writer)?;
        Ok(())
    }
}

/// Field declared by a class or interface
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.5
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub access_flags: FieldAccessFlags,
    pub name_index: Utf8ConstantIndex,
    pub descriptor_index: Utf8ConstantIndex,
    pub attributes: Vec<Attribute>,
}

impl Serialize for Field {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.access_flags.serialize(writer)?;
        self.name_index.serialize(writer)?;
        self.descriptor_index.serialize(writer)?;
        self.attributes.serialize(writer)?;
        Ok(())
    }
}

impl Deserialize for Field {
    const MIN_SIZE: usize = 8;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        Ok(Field {
            access_flags: FieldAccessFlags::deserialize(cursor)?,
            name_index: Utf8ConstantIndex::deserialize(cursor)?,
            descriptor_index: Utf8ConstantIndex::deserialize(cursor)?,
            attributes: Vec::deserialize(cursor)?,
        })
    }
}

/// Method declared by a class or interface
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.6
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub access_flags: MethodAccessFlags,
    pub name_index: Utf8ConstantIndex,
    pub descriptor_index: Utf8ConstantIndex,
    pub attributes: Vec<Attribute>,
}

impl Serialize for Method {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.access_flags.serialize(writer)?;
        self.name_index.serialize(writer)?;
        self.descriptor_index.serialize(writer)?;
        self.attributes.serialize(writer)?;
        Ok(())
    }
}

impl Deserialize for Method {
    const MIN_SIZE: usize = 8;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        Ok(Method {
            access_flags: MethodAccessFlags::deserialize(cursor)?,
            name_index: Utf8ConstantIndex::deserialize(cursor)?,
            descriptor_index: Utf8ConstantIndex::deserialize(cursor)?,
            attributes: Vec::deserialize(cursor)?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::ConstantPoolBuilder;

    fn minimal_class() -> ClassFile {
        let mut builder = ConstantPoolBuilder::new();
        let this_class = builder.get_class("me/Example").unwrap();
        let super_class = builder.get_class("java/lang/Object").unwrap();
        let name_index = builder.get_utf8("count").unwrap();
        let descriptor_index = builder.get_utf8("I").unwrap();
        ClassFile {
            version: Version::JAVA8,
            constants: builder.finish(),
            access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
            this_class,
            super_class,
            interfaces: vec![],
            fields: vec![Field {
                access_flags: FieldAccessFlags::PRIVATE,
                name_index,
                descriptor_index,
                attributes: vec![],
            }],
            methods: vec![],
            attributes: vec![],
        }
    }

    #[test]
    fn reads_back_what_was_written() {
        let class = minimal_class();
        let bytes = class.to_bytes().unwrap();
        assert_eq!(&bytes[..4], &[0xCA, 0xFE, 0xBA, 0xBE]);
        assert_eq!(
            ClassFile::parse(&bytes, &SupportedVersions::default()).unwrap(),
            class
        );
    }

    #[test]
    fn rejects_bad_headers() {
        let supported = SupportedVersions::default();
        assert!(matches!(
            ClassFile::parse(&[0xCA, 0xFE], &supported),
            Err(Error::TruncatedInput {
                offset: 0,
                needed: 4,
                available: 2
            })
        ));
        assert_eq!(
            ClassFile::parse(&[0xDE, 0xAD, 0xBE, 0xEF, 0, 0, 0, 52], &supported),
            Err(Error::MalformedClassFile(ClassFileDefect::BadMagic(
                0xDEAD_BEEF
            )))
        );

        let bytes = minimal_class().to_bytes().unwrap();
        let java_7_only = SupportedVersions::new(51, 51);
        assert_eq!(
            ClassFile::parse(&bytes, &java_7_only),
            Err(Error::UnsupportedClassVersion {
                version: Version::JAVA8,
                supported: java_7_only,
            })
        );
    }

    #[test]
    fn rejects_truncation_and_trailing_bytes() {
        let supported = SupportedVersions::default();
        let bytes = minimal_class().to_bytes().unwrap();

        // Cut in the middle of the field table
        let cut = &bytes[..bytes.len() - 6];
        assert!(matches!(
            ClassFile::parse(cut, &supported),
            Err(Error::TruncatedInput { .. })
        ));

        let mut padded = bytes;
        padded.extend_from_slice(&[0, 0, 0]);
        assert_eq!(
            ClassFile::parse(&padded, &supported),
            Err(Error::MalformedClassFile(ClassFileDefect::TrailingBytes(3)))
        );
    }
}
