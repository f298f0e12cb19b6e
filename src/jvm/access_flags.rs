use super::{ClassCursor, Deserialize, Error, Serialize};
use bitflags::bitflags;
use byteorder::WriteBytesExt;
use std::io::Result;

bitflags! {
    /// Access flags on classes
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.1-200-E.1
    pub struct ClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;
    }
}

bitflags! {
    /// Access flags on methods
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.6-200-A.1
    pub struct MethodAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
    }
}

bitflags! {
    /// Access flags on fields
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.5-200-A.1
    pub struct FieldAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const SYNTHETIC = 0x1000;
        const ENUM = 0x4000;
    }
}

bitflags! {
    /// Access flags on inner classes
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.6-300-D.1-D.1
    pub struct InnerClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

/// Human readable names for access flags
///
/// Names are listed in the order Java source would spell the corresponding modifiers, followed by
/// the flags that have no source keyword.
pub trait AccessFlagNames: Copy + 'static {
    const NAMES: &'static [(Self, &'static str)];

    fn has(&self, flag: Self) -> bool;

    /// Names of all of the flags that are set
    fn names(&self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(flag, _)| self.has(*flag))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Names of the flags that are spelled as modifier keywords in Java source
    fn source_modifiers(&self) -> Vec<&'static str> {
        self.names()
            .into_iter()
            .filter(|name| SOURCE_MODIFIERS.contains(name))
            .collect()
    }
}

const SOURCE_MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "static",
    "final",
    "synchronized",
    "native",
    "abstract",
    "strictfp",
    "transient",
    "volatile",
];

/// Serialize flags as the list of their names (for use with `#[serde(serialize_with)]`)
pub fn serialize_flag_names<F, S>(flags: &F, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    F: AccessFlagNames,
    S: serde::Serializer,
{
    serializer.collect_seq(flags.names())
}

impl AccessFlagNames for ClassAccessFlags {
    const NAMES: &'static [(Self, &'static str)] = &[
        (ClassAccessFlags::PUBLIC, "public"),
        (ClassAccessFlags::ABSTRACT, "abstract"),
        (ClassAccessFlags::FINAL, "final"),
        (ClassAccessFlags::INTERFACE, "interface"),
        (ClassAccessFlags::ANNOTATION, "annotation"),
        (ClassAccessFlags::ENUM, "enum"),
        (ClassAccessFlags::MODULE, "module"),
        (ClassAccessFlags::SUPER, "super"),
        (ClassAccessFlags::SYNTHETIC, "synthetic"),
    ];

    fn has(&self, flag: Self) -> bool {
        self.contains(flag)
    }
}

impl AccessFlagNames for MethodAccessFlags {
    const NAMES: &'static [(Self, &'static str)] = &[
        (MethodAccessFlags::PUBLIC, "public"),
        (MethodAccessFlags::PRIVATE, "private"),
        (MethodAccessFlags::PROTECTED, "protected"),
        (MethodAccessFlags::STATIC, "static"),
        (MethodAccessFlags::FINAL, "final"),
        (MethodAccessFlags::SYNCHRONIZED, "synchronized"),
        (MethodAccessFlags::NATIVE, "native"),
        (MethodAccessFlags::ABSTRACT, "abstract"),
        (MethodAccessFlags::STRICT, "strictfp"),
        (MethodAccessFlags::VARARGS, "varargs"),
        (MethodAccessFlags::BRIDGE, "bridge"),
        (MethodAccessFlags::SYNTHETIC, "synthetic"),
    ];

    fn has(&self, flag: Self) -> bool {
        self.contains(flag)
    }
}

impl AccessFlagNames for FieldAccessFlags {
    const NAMES: &'static [(Self, &'static str)] = &[
        (FieldAccessFlags::PUBLIC, "public"),
        (FieldAccessFlags::PRIVATE, "private"),
        (FieldAccessFlags::PROTECTED, "protected"),
        (FieldAccessFlags::STATIC, "static"),
        (FieldAccessFlags::FINAL, "final"),
        (FieldAccessFlags::TRANSIENT, "transient"),
        (FieldAccessFlags::VOLATILE, "volatile"),
        (FieldAccessFlags::ENUM, "enum"),
        (FieldAccessFlags::SYNTHETIC, "synthetic"),
    ];

    fn has(&self, flag: Self) -> bool {
        self.contains(flag)
    }
}

impl Serialize for ClassAccessFlags {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        self.bits().serialize(writer)
    }
}

impl Serialize for MethodAccessFlags {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        self.bits().serialize(writer)
    }
}

impl Serialize for FieldAccessFlags {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        self.bits().serialize(writer)
    }
}

impl Serialize for InnerClassAccessFlags {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        self.bits().serialize(writer)
    }
}

// Unknown bits are dropped when reading: they have no meaning to compare on

impl Deserialize for ClassAccessFlags {
    const MIN_SIZE: usize = 2;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> std::result::Result<Self, Error> {
        Ok(ClassAccessFlags::from_bits_truncate(cursor.read_u16()?))
    }
}

impl Deserialize for MethodAccessFlags {
    const MIN_SIZE: usize = 2;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> std::result::Result<Self, Error> {
        Ok(MethodAccessFlags::from_bits_truncate(cursor.read_u16()?))
    }
}

impl Deserialize for FieldAccessFlags {
    const MIN_SIZE: usize = 2;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> std::result::Result<Self, Error> {
        Ok(FieldAccessFlags::from_bits_truncate(cursor.read_u16()?))
    }
}

impl Deserialize for InnerClassAccessFlags {
    const MIN_SIZE: usize = 2;

    fn deserialize(cursor: &mut ClassCursor<'_>) -> std::result::Result<Self, Error> {
        Ok(InnerClassAccessFlags::from_bits_truncate(cursor.read_u16()?))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names_follow_source_order() {
        let flags =
            MethodAccessFlags::SYNTHETIC | MethodAccessFlags::BRIDGE | MethodAccessFlags::PUBLIC;
        assert_eq!(flags.names(), vec!["public", "bridge", "synthetic"]);

        let flags = FieldAccessFlags::FINAL | FieldAccessFlags::STATIC | FieldAccessFlags::PRIVATE;
        assert_eq!(flags.names(), vec!["private", "static", "final"]);

        let flags = ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER | ClassAccessFlags::ABSTRACT;
        assert_eq!(flags.source_modifiers(), vec!["public", "abstract"]);
    }

    #[test]
    fn unknown_bits_are_dropped() {
        let mut cursor = ClassCursor::new(&[0x80, 0x01]);
        let flags = FieldAccessFlags::deserialize(&mut cursor).unwrap();
        assert_eq!(flags, FieldAccessFlags::PUBLIC);
    }
}
