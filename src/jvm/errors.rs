use super::{SupportedVersions, Version};
use std::fmt;

/// Ways reading a class file can fail
///
/// All of these are fatal for the one class file being read, but nothing more.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The constant pool could not be decoded
    MalformedConstantPool {
        /// Constant pool index of the offending entry (`0` when it concerns the pool as a whole)
        index: u16,
        defect: ConstantPoolDefect,
    },

    /// The class file structure itself is wrong
    MalformedClassFile(ClassFileDefect),

    /// The major version is outside the configured range
    UnsupportedClassVersion {
        version: Version,
        supported: SupportedVersions,
    },

    /// A declared count or length needs more bytes than are left
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A constant pool index resolves to an entry of an unexpected kind (or to nothing at all)
    UnresolvedConstantPoolReference {
        index: u16,
        expected: &'static str,
        found: Option<&'static str>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstantPoolDefect {
    /// Declared entry count is zero (even an empty pool has a count of 1)
    EmptyPool,

    UnknownTag(u8),

    /// The pool runs past the end of the input
    Truncated,

    /// A two-slot `long` or `double` starts on the very last slot of the pool
    WideEntryOverflow,

    /// An entry refers to index `0`, an index past the end of the pool, or a two-slot hole
    IndexOutOfRange(u16),

    /// `Utf8` entry bytes are not valid modified UTF-8
    InvalidUtf8,

    /// Method handle reference kinds are in `1..=9`
    InvalidHandleKind(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassFileDefect {
    /// The file does not start with `0xCAFEBABE`
    BadMagic(u32),

    /// Bytes are left over after the last class attribute
    TrailingBytes(usize),

    /// Two fields (or two methods) share a name and descriptor
    DuplicateMember { name: String, descriptor: String },

    /// A fixed-size attribute has the wrong length
    BadAttributeLength {
        attribute: &'static str,
        length: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedConstantPool { index, defect } => {
                write!(f, "malformed constant pool at #{}: {}", index, defect)
            }
            Error::MalformedClassFile(defect) => write!(f, "malformed class file: {}", defect),
            Error::UnsupportedClassVersion { version, supported } => write!(
                f,
                "unsupported class version {} (supported major versions: {})",
                version, supported
            ),
            Error::TruncatedInput {
                offset,
                needed,
                available,
            } => write!(
                f,
                "truncated input at offset {}: needed {} bytes but only {} remain",
                offset, needed, available
            ),
            Error::UnresolvedConstantPoolReference {
                index,
                expected,
                found,
            } => match found {
                Some(found) => write!(f, "constant #{} is {}, expected {}", index, found, expected),
                None => write!(f, "constant #{} does not exist, expected {}", index, expected),
            },
        }
    }
}

impl fmt::Display for ConstantPoolDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantPoolDefect::EmptyPool => f.write_str("declared entry count is zero"),
            ConstantPoolDefect::UnknownTag(tag) => write!(f, "unknown tag {}", tag),
            ConstantPoolDefect::Truncated => f.write_str("pool extends past the end of input"),
            ConstantPoolDefect::WideEntryOverflow => {
                f.write_str("two-slot entry does not fit in the declared count")
            }
            ConstantPoolDefect::IndexOutOfRange(index) => {
                write!(f, "reference to unusable index #{}", index)
            }
            ConstantPoolDefect::InvalidUtf8 => f.write_str("invalid modified UTF-8"),
            ConstantPoolDefect::InvalidHandleKind(kind) => {
                write!(f, "invalid method handle kind {}", kind)
            }
        }
    }
}

impl fmt::Display for ClassFileDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassFileDefect::BadMagic(magic) => write!(f, "bad magic 0x{:08X}", magic),
            ClassFileDefect::TrailingBytes(count) => {
                write!(f, "{} unexpected bytes after the class attributes", count)
            }
            ClassFileDefect::DuplicateMember { name, descriptor } => {
                write!(f, "duplicate member {}{}", name, descriptor)
            }
            ClassFileDefect::BadAttributeLength { attribute, length } => {
                write!(f, "attribute {} has unexpected length {}", attribute, length)
            }
        }
    }
}

impl std::error::Error for Error {}
