use super::{Attribute, AttributeLike, ClassCursor, ConstantPoolDefect, Deserialize, Error, Serialize};
use crate::util::{Offset, OffsetResult, OffsetVec, Width};
use byteorder::WriteBytesExt;
use std::borrow::{Borrow, Cow};
use std::collections::HashMap;
use std::convert::TryFrom;
use std::result::Result;

/// Constant pool of one class file, as read from its bytes
///
/// Indexing starts at 1 and `long`/`double` entries take up two slots, leaving the second one as
/// an unusable hole (see [`Width for Constant`](#impl-Width-for-Constant)). The pool is never
/// modified once read: every other part of the class file refers into it by index.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantPool {
    constants: OffsetVec<Constant>,
}

impl ConstantPool {
    /// Read the pool, starting at its `constant_pool_count`
    ///
    /// The cursor must be positioned right after the magic and version header. Besides decoding
    /// every entry, this checks that all indices stored inside of entries point at usable slots,
    /// so later lookups only ever have to worry about the _kind_ of entry they find.
    pub fn read(cursor: &mut ClassCursor<'_>) -> Result<ConstantPool, Error> {
        let count = cursor
            .read_u16()
            .map_err(|_| pool_error(0, ConstantPoolDefect::Truncated))?;
        if count == 0 {
            return Err(pool_error(0, ConstantPoolDefect::EmptyPool));
        }

        let mut constants = OffsetVec::new_starting_at(Offset(1));
        while constants.offset_len().0 < count as usize {
            let index = constants.offset_len().0 as u16;
            let constant = Constant::read(cursor, index)?;
            if index as usize + constant.width() > count as usize {
                return Err(pool_error(index, ConstantPoolDefect::WideEntryOverflow));
            }
            constants.push(constant);
        }

        let pool = ConstantPool { constants };
        pool.check_references()?;
        log::trace!("Read constant pool with {} entries", pool.len());
        Ok(pool)
    }

    /// Number of entries (not slots) in the pool
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// Value of `constant_pool_count`, which is one more than the last usable slot
    pub fn slot_count(&self) -> u16 {
        self.constants.offset_len().0 as u16
    }

    /// Iterate over entries along with their index
    pub fn iter(&self) -> impl Iterator<Item = (ConstantIndex, &Constant)> + '_ {
        self.constants
            .iter()
            .map(|(Offset(offset), _, constant)| (ConstantIndex(offset as u16), constant))
    }

    /// Get a constant from the pool
    ///
    /// Index `0`, indices past the end, and the hole after a two-slot entry all return `None`.
    pub fn get<I: Into<ConstantIndex>>(&self, index: I) -> Option<&Constant> {
        let ConstantIndex(index) = index.into();
        if index == 0 {
            return None;
        }
        match self.constants.get_offset(Offset(index as usize)) {
            OffsetResult::Ok(_, constant) => Some(constant),
            OffsetResult::InvalidOffset(_) | OffsetResult::TooLarge => None,
        }
    }

    /// Resolve a `Utf8` entry
    pub fn utf8(&self, index: Utf8ConstantIndex) -> Result<&str, Error> {
        match self.get(index) {
            Some(Constant::Utf8(string)) => Ok(string),
            other => Err(unresolved(index.0, "Utf8", other)),
        }
    }

    /// Resolve a `Utf8` entry, where index `0` stands for "absent"
    pub fn optional_utf8(&self, index: Utf8ConstantIndex) -> Result<Option<&str>, Error> {
        if index.0 .0 == 0 {
            Ok(None)
        } else {
            self.utf8(index).map(Some)
        }
    }

    /// Resolve a `Class` entry to the binary name it refers to (eg. `java/lang/Object`)
    pub fn class_name(&self, index: ClassConstantIndex) -> Result<&str, Error> {
        match self.get(index) {
            Some(Constant::Class(name)) => self.utf8(*name),
            other => Err(unresolved(index.0, "Class", other)),
        }
    }

    /// Resolve a `Class` entry, where index `0` stands for "absent"
    pub fn optional_class_name(&self, index: ClassConstantIndex) -> Result<Option<&str>, Error> {
        if index.0 .0 == 0 {
            Ok(None)
        } else {
            self.class_name(index).map(Some)
        }
    }

    /// Resolve a `NameAndType` entry to its name and descriptor strings
    pub fn name_and_type(&self, index: NameAndTypeConstantIndex) -> Result<(&str, &str), Error> {
        match self.get(index) {
            Some(Constant::NameAndType { name, descriptor }) => {
                Ok((self.utf8(*name)?, self.utf8(*descriptor)?))
            }
            other => Err(unresolved(index.0, "NameAndType", other)),
        }
    }

    /// Render the constant that initializes a `static final` field, Java literal style
    pub fn render_field_constant(&self, index: ConstantIndex) -> Result<String, Error> {
        match self.get(index) {
            Some(Constant::Integer(integer)) => Ok(integer.to_string()),
            Some(Constant::Long(long)) => Ok(format!("{}L", long)),
            Some(Constant::Float(float)) => Ok(format!("{:?}f", float)),
            Some(Constant::Double(double)) => Ok(format!("{:?}d", double)),
            Some(Constant::String(utf8)) => Ok(format!("{:?}", self.utf8(*utf8)?)),
            other => Err(unresolved(index, "Integer, Long, Float, Double or String", other)),
        }
    }

    /// Check that every index stored inside an entry points at a usable slot
    fn check_references(&self) -> Result<(), Error> {
        for (ConstantIndex(index), constant) in self.iter() {
            for referenced in constant.references() {
                if self.get(referenced).is_none() {
                    return Err(pool_error(
                        index,
                        ConstantPoolDefect::IndexOutOfRange(referenced.0),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Serialize for ConstantPool {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.slot_count().serialize(writer)?;
        for (_, constant) in self.iter() {
            constant.serialize(writer)?;
        }
        Ok(())
    }
}

fn pool_error(index: u16, defect: ConstantPoolDefect) -> Error {
    Error::MalformedConstantPool { index, defect }
}

fn unresolved<I: Into<ConstantIndex>>(
    index: I,
    expected: &'static str,
    found: Option<&Constant>,
) -> Error {
    Error::UnresolvedConstantPoolReference {
        index: index.into().0,
        expected,
        found: found.map(Constant::kind),
    }
}

/// Constants as in the constant pool
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.4
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Class or an interface
    Class(Utf8ConstantIndex),

    /// Field
    FieldRef(ClassConstantIndex, NameAndTypeConstantIndex),

    /// Method (this combines `Methodref` and `InterfaceMethodref`
    MethodRef {
        class: ClassConstantIndex,
        name_and_type: NameAndTypeConstantIndex,
        is_interface: bool,
    },

    /// Constant object of type `java.lang.String`
    String(Utf8ConstantIndex),

    /// Constant primitive of type `int`
    Integer(i32),

    /// Constant primitive of type `float`
    Float(f32),

    /// Constant primitive of type `long`
    Long(i64),

    /// Constant primitive of type `double`
    Double(f64),

    /// Name and a type (eg. for a field or a method)
    NameAndType {
        name: Utf8ConstantIndex,
        descriptor: Utf8ConstantIndex,
    },

    /// Constant UTF-8 encoded raw string value
    ///
    /// Despite the name, the encoding is not quite UTF-8 (the encoding of the
    /// null character `\u{0000}` and the encoding of supplementary characters
    /// is different).
    Utf8(String),

    /// Constant object of type `java.lang.invoke.MethodHandle`
    MethodHandle {
        handle_kind: HandleKind,

        /// Depending on the method kind, this points to a `FieldRef` or a `MethodRef`
        member: ConstantIndex,
    },

    /// Method type
    MethodType { descriptor: Utf8ConstantIndex },

    /// Dynamically-computed constant
    Dynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method: u16,
        name_and_type: NameAndTypeConstantIndex,
    },

    /// Dynamically-computed call site
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method: u16,
        name_and_type: NameAndTypeConstantIndex,
    },

    /// Module (only in `module-info.class`)
    Module(Utf8ConstantIndex),

    /// Package exported or opened by a module
    Package(Utf8ConstantIndex),
}

impl Constant {
    /// Name of the kind of entry, as used in the JVM specification (minus the `CONSTANT_` prefix)
    pub fn kind(&self) -> &'static str {
        match self {
            Constant::Class(_) => "Class",
            Constant::FieldRef(_, _) => "Fieldref",
            Constant::MethodRef {
                is_interface: false,
                ..
            } => "Methodref",
            Constant::MethodRef {
                is_interface: true, ..
            } => "InterfaceMethodref",
            Constant::String(_) => "String",
            Constant::Integer(_) => "Integer",
            Constant::Float(_) => "Float",
            Constant::Long(_) => "Long",
            Constant::Double(_) => "Double",
            Constant::NameAndType { .. } => "NameAndType",
            Constant::Utf8(_) => "Utf8",
            Constant::MethodHandle { .. } => "MethodHandle",
            Constant::MethodType { .. } => "MethodType",
            Constant::Dynamic { .. } => "Dynamic",
            Constant::InvokeDynamic { .. } => "InvokeDynamic",
            Constant::Module(_) => "Module",
            Constant::Package(_) => "Package",
        }
    }

    /// Other constant pool entries this one refers to
    fn references(&self) -> Vec<ConstantIndex> {
        match self {
            Constant::Class(utf8)
            | Constant::String(utf8)
            | Constant::MethodType { descriptor: utf8 }
            | Constant::Module(utf8)
            | Constant::Package(utf8) => vec![utf8.0],
            Constant::FieldRef(class, name_and_type)
            | Constant::MethodRef {
                class,
                name_and_type,
                ..
            } => vec![class.0, name_and_type.0],
            Constant::NameAndType { name, descriptor } => vec![name.0, descriptor.0],
            Constant::MethodHandle { member, .. } => vec![*member],
            Constant::Dynamic { name_and_type, .. }
            | Constant::InvokeDynamic { name_and_type, .. } => vec![name_and_type.0],
            Constant::Integer(_)
            | Constant::Float(_)
            | Constant::Long(_)
            | Constant::Double(_)
            | Constant::Utf8(_) => vec![],
        }
    }

    /// Read one tagged entry, which will be stored at `index`
    fn read(cursor: &mut ClassCursor<'_>, index: u16) -> Result<Constant, Error> {
        let truncated = |err: Error| match err {
            Error::TruncatedInput { .. } => pool_error(index, ConstantPoolDefect::Truncated),
            other => other,
        };
        let tag = cursor.read_u8().map_err(truncated)?;
        Constant::read_body(cursor, index, tag).map_err(truncated)
    }

    fn read_body(cursor: &mut ClassCursor<'_>, index: u16, tag: u8) -> Result<Constant, Error> {
        let constant = match tag {
            1 => {
                let length = cursor.read_u16()? as usize;
                let bytes = cursor.read_bytes(length)?;
                let string = decode_modified_utf8(bytes)
                    .ok_or_else(|| pool_error(index, ConstantPoolDefect::InvalidUtf8))?;
                Constant::Utf8(string)
            }
            3 => Constant::Integer(cursor.read_i32()?),
            4 => Constant::Float(cursor.read_f32()?),
            5 => Constant::Long(cursor.read_i64()?),
            6 => Constant::Double(cursor.read_f64()?),
            7 => Constant::Class(Utf8ConstantIndex::deserialize(cursor)?),
            8 => Constant::String(Utf8ConstantIndex::deserialize(cursor)?),
            9 => Constant::FieldRef(
                ClassConstantIndex::deserialize(cursor)?,
                NameAndTypeConstantIndex::deserialize(cursor)?,
            ),
            10 | 11 => Constant::MethodRef {
                class: ClassConstantIndex::deserialize(cursor)?,
                name_and_type: NameAndTypeConstantIndex::deserialize(cursor)?,
                is_interface: tag == 11,
            },
            12 => Constant::NameAndType {
                name: Utf8ConstantIndex::deserialize(cursor)?,
                descriptor: Utf8ConstantIndex::deserialize(cursor)?,
            },
            15 => {
                let kind = cursor.read_u8()?;
                let handle_kind = HandleKind::try_from(kind)
                    .map_err(|_| pool_error(index, ConstantPoolDefect::InvalidHandleKind(kind)))?;
                Constant::MethodHandle {
                    handle_kind,
                    member: ConstantIndex::deserialize(cursor)?,
                }
            }
            16 => Constant::MethodType {
                descriptor: Utf8ConstantIndex::deserialize(cursor)?,
            },
            17 => Constant::Dynamic {
                bootstrap_method: cursor.read_u16()?,
                name_and_type: NameAndTypeConstantIndex::deserialize(cursor)?,
            },
            18 => Constant::InvokeDynamic {
                bootstrap_method: cursor.read_u16()?,
                name_and_type: NameAndTypeConstantIndex::deserialize(cursor)?,
            },
            19 => Constant::Module(Utf8ConstantIndex::deserialize(cursor)?),
            20 => Constant::Package(Utf8ConstantIndex::deserialize(cursor)?),
            other => return Err(pool_error(index, ConstantPoolDefect::UnknownTag(other))),
        };
        Ok(constant)
    }
}

impl Serialize for Constant {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        match self {
            Constant::Utf8(string) => {
                1u8.serialize(writer)?;
                let buffer: Vec<u8> = encode_modified_utf8(string);
                (buffer.len() as u16).serialize(writer)?;
                writer.write_all(&buffer)?;
            }
            Constant::Integer(integer) => {
                3u8.serialize(writer)?;
                integer.serialize(writer)?;
            }
            Constant::Float(float) => {
                4u8.serialize(writer)?;
                float.serialize(writer)?;
            }
            Constant::Long(long) => {
                5u8.serialize(writer)?;
                long.serialize(writer)?;
            }
            Constant::Double(double) => {
                6u8.serialize(writer)?;
                double.serialize(writer)?;
            }
            Constant::Class(name) => {
                7u8.serialize(writer)?;
                name.serialize(writer)?;
            }
            Constant::String(bytes) => {
                8u8.serialize(writer)?;
                bytes.serialize(writer)?;
            }
            Constant::FieldRef(class, name_and_type) => {
                9u8.serialize(writer)?;
                class.serialize(writer)?;
                name_and_type.serialize(writer)?;
            }
            Constant::MethodRef {
                class,
                name_and_type,
                is_interface,
            } => {
                (if !is_interface { 10u8 } else { 11u8 }).serialize(writer)?;
                class.serialize(writer)?;
                name_and_type.serialize(writer)?;
            }
            Constant::NameAndType { name, descriptor } => {
                12u8.serialize(writer)?;
                name.serialize(writer)?;
                descriptor.serialize(writer)?;
            }
            Constant::MethodHandle {
                handle_kind,
                member,
            } => {
                15u8.serialize(writer)?;
                (*handle_kind as u8).serialize(writer)?;
                member.serialize(writer)?;
            }
            Constant::MethodType { descriptor } => {
                16u8.serialize(writer)?;
                descriptor.serialize(writer)?;
            }
            Constant::Dynamic {
                bootstrap_method,
                name_and_type,
            } => {
                17u8.serialize(writer)?;
                bootstrap_method.serialize(writer)?;
                name_and_type.serialize(writer)?;
            }
            Constant::InvokeDynamic {
                bootstrap_method,
                name_and_type,
            } => {
                18u8.serialize(writer)?;
                bootstrap_method.serialize(writer)?;
                name_and_type.serialize(writer)?;
            }
            Constant::Module(name) => {
                19u8.serialize(writer)?;
                name.serialize(writer)?;
            }
            Constant::Package(name) => {
                20u8.serialize(writer)?;
                name.serialize(writer)?;
            }
        };
        Ok(())
    }
}

/// Almost all constants have width 1, except for `Constant::Long` and `Constant::Double`. Quoting
/// the JVM specification:
///
/// > All 8-byte constants take up two entries in the constant_pool table of the class file. If a
/// > CONSTANT_Long_info or CONSTANT_Double_info structure is the item in the constant_pool table
/// > at index n, then the next usable item in the pool is located at index n+2. The constant_pool
/// > index n+1 must be valid but is considered unusable.
/// >
/// > In retrospect, making 8-byte constants take two constant pool entries was a poor choice.
impl Width for Constant {
    fn width(&self) -> usize {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        }
    }
}

/// Modified UTF-8 format used in class files.
///
/// See [this `DataInput` section for details][0]. Quoting from that section:
///
/// > The differences between this format and the standard UTF-8 format are the following:
/// >
/// >  * The null byte `\u0000` is encoded in 2-byte format rather than 1-byte, so that the encoded
/// >    strings never have embedded nulls.
/// >  * Only the 1-byte, 2-byte, and 3-byte formats are used.
/// >  * Supplementary characters are represented in the form of surrogate pairs.
///
/// [0]: https://docs.oracle.com/en/java/javase/17/docs/api/java.base/java/io/DataInput.html#modified-utf-8
pub fn encode_modified_utf8(string: &str) -> Vec<u8> {
    let mut buffer: Vec<u8> = vec![];
    for c in string.chars() {
        if c == '\u{0000}' {
            buffer.extend_from_slice(&[0b1100_0000, 0b1000_0000]);
            continue;
        }

        // Supplementary characters come out of this as two surrogates, each encoded on 3 bytes
        let mut units = [0u16; 2];
        for unit in c.encode_utf16(&mut units) {
            let code = *unit as u32;
            if code < 0x80 {
                buffer.push(code as u8);
            } else if code < 0x800 {
                buffer.push((code >> 6 & 0x1F) as u8 | 0b1100_0000);
                buffer.push((code & 0x3F) as u8 | 0b1000_0000);
            } else {
                buffer.push((code >> 12 & 0x0F) as u8 | 0b1110_0000);
                buffer.push((code >> 6 & 0x3F) as u8 | 0b1000_0000);
                buffer.push((code & 0x3F) as u8 | 0b1000_0000);
            }
        }
    }
    buffer
}

/// Inverse of [`encode_modified_utf8`]
///
/// Returns `None` on bytes that can't occur in modified UTF-8 (raw nulls, 4-byte sequences, bad
/// continuation bytes) and on unpaired surrogates.
pub fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    // Fast path: the overwhelming majority of names and descriptors are plain ASCII
    if bytes.iter().all(|b| *b != 0 && *b < 0x80) {
        return std::str::from_utf8(bytes).ok().map(String::from);
    }

    let continuation = |byte: Option<&u8>| -> Option<u16> {
        match byte {
            Some(b) if b & 0b1100_0000 == 0b1000_0000 => Some((b & 0x3F) as u16),
            _ => None,
        }
    };

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter();
    while let Some(&byte) = iter.next() {
        let unit = match byte {
            0x01..=0x7F => byte as u16,
            0xC0..=0xDF => {
                let low = continuation(iter.next())?;
                ((byte & 0x1F) as u16) << 6 | low
            }
            0xE0..=0xEF => {
                let mid = continuation(iter.next())?;
                let low = continuation(iter.next())?;
                ((byte & 0x0F) as u16) << 12 | mid << 6 | low
            }
            _ => return None,
        };
        units.push(unit);
    }
    String::from_utf16(&units).ok()
}

/// Reference kinds of method handles
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-5.html#jvms-5.4.3.5
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum HandleKind {
    GetField = 1,
    GetStatic = 2,
    PutField = 3,
    PutStatic = 4,
    InvokeVirtual = 5,
    InvokeStatic = 6,
    InvokeSpecial = 7,
    NewInvokeSpecial = 8,
    InvokeInterface = 9,
}

impl TryFrom<u8> for HandleKind {
    type Error = u8;

    fn try_from(kind: u8) -> Result<HandleKind, u8> {
        Ok(match kind {
            1 => HandleKind::GetField,
            2 => HandleKind::GetStatic,
            3 => HandleKind::PutField,
            4 => HandleKind::PutStatic,
            5 => HandleKind::InvokeVirtual,
            6 => HandleKind::InvokeStatic,
            7 => HandleKind::InvokeSpecial,
            8 => HandleKind::NewInvokeSpecial,
            9 => HandleKind::InvokeInterface,
            other => return Err(other),
        })
    }
}

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct ConstantIndex(pub u16);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct Utf8ConstantIndex(pub ConstantIndex);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct NameAndTypeConstantIndex(pub ConstantIndex);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct ClassConstantIndex(pub ConstantIndex);

impl ClassConstantIndex {
    /// Stands in for an absent class (eg. the superclass of `java/lang/Object`)
    pub const NONE: ClassConstantIndex = ClassConstantIndex(ConstantIndex(0));
}

impl Utf8ConstantIndex {
    /// Stands in for an absent name (eg. the simple name of an anonymous class)
    pub const NONE: Utf8ConstantIndex = Utf8ConstantIndex(ConstantIndex(0));
}

impl From<Utf8ConstantIndex> for ConstantIndex {
    fn from(index: Utf8ConstantIndex) -> ConstantIndex {
        index.0
    }
}

impl From<NameAndTypeConstantIndex> for ConstantIndex {
    fn from(index: NameAndTypeConstantIndex) -> ConstantIndex {
        index.0
    }
}

impl From<ClassConstantIndex> for ConstantIndex {
    fn from(index: ClassConstantIndex) -> ConstantIndex {
        index.0
    }
}

impl Serialize for ConstantIndex {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}

impl Serialize for Utf8ConstantIndex {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}

impl Serialize for NameAndTypeConstantIndex {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}

impl Serialize for ClassConstantIndex {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.serialize(writer)
    }
}

impl Deserialize for ConstantIndex {
    const MIN_SIZE: usize = 2;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        Ok(ConstantIndex(cursor.read_u16()?))
    }
}

impl Deserialize for Utf8ConstantIndex {
    const MIN_SIZE: usize = 2;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        Ok(Utf8ConstantIndex(ConstantIndex::deserialize(cursor)?))
    }
}

impl Deserialize for NameAndTypeConstantIndex {
    const MIN_SIZE: usize = 2;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        Ok(NameAndTypeConstantIndex(ConstantIndex::deserialize(cursor)?))
    }
}

impl Deserialize for ClassConstantIndex {
    const MIN_SIZE: usize = 2;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> Result<Self, Error> {
        Ok(ClassConstantIndex(ConstantIndex::deserialize(cursor)?))
    }
}

/// Append-only constant pool writer, for assembling class files
///
/// Entries are interned: asking twice for the same string, class, or name & type returns the same
/// index. [`ConstantPoolBuilder::finish`] produces the same [`ConstantPool`] that reading the
/// serialized pool back would.
pub struct ConstantPoolBuilder {
    constants: OffsetVec<Constant>,

    utf8s: HashMap<String, Utf8ConstantIndex>,
    classes: HashMap<Utf8ConstantIndex, ClassConstantIndex>,
    strings: HashMap<Utf8ConstantIndex, ConstantIndex>,
    name_and_types: HashMap<(Utf8ConstantIndex, Utf8ConstantIndex), NameAndTypeConstantIndex>,
    integers: HashMap<i32, ConstantIndex>,
    longs: HashMap<i64, ConstantIndex>,
}

#[derive(Debug)]
pub struct ConstantPoolOverflow {
    pub constant: Constant,
    pub offset: u16,
}

impl std::fmt::Display for ConstantPoolOverflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "constant pool overflow at #{} while adding a {} entry",
            self.offset,
            self.constant.kind()
        )
    }
}

impl std::error::Error for ConstantPoolOverflow {}

/// Ways assembling a class file can fail
#[derive(Debug)]
pub enum BuildError {
    ConstantPoolOverflow(ConstantPoolOverflow),
    IoError(std::io::Error),
}

impl From<ConstantPoolOverflow> for BuildError {
    fn from(overflow: ConstantPoolOverflow) -> BuildError {
        BuildError::ConstantPoolOverflow(overflow)
    }
}

impl From<std::io::Error> for BuildError {
    fn from(err: std::io::Error) -> BuildError {
        BuildError::IoError(err)
    }
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::ConstantPoolOverflow(overflow) => write!(f, "{}", overflow),
            BuildError::IoError(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for BuildError {}

impl ConstantPoolBuilder {
    /// Make a fresh empty constants pool
    pub fn new() -> ConstantPoolBuilder {
        ConstantPoolBuilder {
            constants: OffsetVec::new_starting_at(Offset(1)),
            utf8s: HashMap::new(),
            classes: HashMap::new(),
            strings: HashMap::new(),
            name_and_types: HashMap::new(),
            integers: HashMap::new(),
            longs: HashMap::new(),
        }
    }

    /// Push a constant into the constant pool, provided there is space for it, without interning
    ///
    /// Note: the largest valid index is 65535, indexing starts at 1, and some constants take two
    /// spaces.
    pub fn push_constant(&mut self, constant: Constant) -> Result<ConstantIndex, ConstantPoolOverflow> {
        let offset: u16 = self.constants.offset_len().0 as u16;

        if offset.checked_add(constant.width() as u16).is_none() {
            return Err(ConstantPoolOverflow { constant, offset });
        }

        self.constants.push(constant);
        Ok(ConstantIndex(offset))
    }

    /// Get or insert a utf8 constant
    pub fn get_utf8<'a, S: Into<Cow<'a, str>>>(
        &mut self,
        utf8: S,
    ) -> Result<Utf8ConstantIndex, ConstantPoolOverflow> {
        let cow = utf8.into();

        // Two lookups, but no `String` allocation unless the constant is new
        if let Some(idx) = self.utf8s.get::<str>(cow.borrow()) {
            Ok(*idx)
        } else {
            let owned = cow.into_owned();
            let idx = Utf8ConstantIndex(self.push_constant(Constant::Utf8(owned.clone()))?);
            self.utf8s.insert(owned, idx);
            Ok(idx)
        }
    }

    /// Get or insert a class constant for a binary name like `java/lang/Object`
    pub fn get_class(&mut self, name: &str) -> Result<ClassConstantIndex, ConstantPoolOverflow> {
        let name = self.get_utf8(name)?;
        if let Some(idx) = self.classes.get(&name) {
            Ok(*idx)
        } else {
            let idx = ClassConstantIndex(self.push_constant(Constant::Class(name))?);
            self.classes.insert(name, idx);
            Ok(idx)
        }
    }

    /// Get or insert a string constant
    pub fn get_string(&mut self, string: &str) -> Result<ConstantIndex, ConstantPoolOverflow> {
        let utf8 = self.get_utf8(string)?;
        if let Some(idx) = self.strings.get(&utf8) {
            Ok(*idx)
        } else {
            let idx = self.push_constant(Constant::String(utf8))?;
            self.strings.insert(utf8, idx);
            Ok(idx)
        }
    }

    /// Get or insert a name & type constant
    pub fn get_name_and_type(
        &mut self,
        name: &str,
        descriptor: &str,
    ) -> Result<NameAndTypeConstantIndex, ConstantPoolOverflow> {
        let key = (self.get_utf8(name)?, self.get_utf8(descriptor)?);
        if let Some(idx) = self.name_and_types.get(&key) {
            Ok(*idx)
        } else {
            let constant = Constant::NameAndType {
                name: key.0,
                descriptor: key.1,
            };
            let idx = NameAndTypeConstantIndex(self.push_constant(constant)?);
            self.name_and_types.insert(key, idx);
            Ok(idx)
        }
    }

    /// Get or insert an integer constant
    pub fn get_integer(&mut self, integer: i32) -> Result<ConstantIndex, ConstantPoolOverflow> {
        if let Some(idx) = self.integers.get(&integer) {
            Ok(*idx)
        } else {
            let idx = self.push_constant(Constant::Integer(integer))?;
            self.integers.insert(integer, idx);
            Ok(idx)
        }
    }

    /// Get or insert a long constant (which takes up two slots)
    pub fn get_long(&mut self, long: i64) -> Result<ConstantIndex, ConstantPoolOverflow> {
        if let Some(idx) = self.longs.get(&long) {
            Ok(*idx)
        } else {
            let idx = self.push_constant(Constant::Long(long))?;
            self.longs.insert(long, idx);
            Ok(idx)
        }
    }

    /// Encode an attribute, adding its name to the constant pool
    pub fn get_attribute<A: AttributeLike>(&mut self, attribute: A) -> Result<Attribute, BuildError> {
        let name_index = self.get_utf8(A::NAME)?;
        let mut info = vec![];
        attribute.serialize(&mut info)?;
        Ok(Attribute { name_index, info })
    }

    /// Consume the builder and return the final pool
    pub fn finish(self) -> ConstantPool {
        ConstantPool {
            constants: self.constants,
        }
    }
}

impl Default for ConstantPoolBuilder {
    fn default() -> Self {
        ConstantPoolBuilder::new()
    }
}
