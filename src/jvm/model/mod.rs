//! Resolved representations of classes
//!
//! This is the representation to use when comparing classes. Everything the raw [`ClassFile`]
//! keeps as constant pool indices is resolved to owned strings, so descriptors can be compared,
//! hashed, and sent across threads without dragging the constant pool along.
//!
//!   - __Class__ is represented using [`ClassDescriptor`]
//!   - __Method__ is represented using [`MethodDescriptor`]
//!   - __Field__ is represented using [`FieldDescriptor`]
//!
//! [`ClassFile`]: super::ClassFile

mod class;
mod field;
mod method;

pub use class::*;
pub use field::*;
pub use method::*;

use serde::Serialize;
use std::fmt;

/// Whether a member is a field or a method
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Field,
    Method,
}

/// Identity of a member within its class
///
/// Overloads are told apart by descriptor, so this is unique within one [`ClassDescriptor`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize)]
pub struct MemberId {
    pub kind: MemberKind,
    pub name: String,
    pub descriptor: String,
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MemberKind::Field => write!(f, "{}:{}", self.name, self.descriptor),
            MemberKind::Method => write!(f, "{}{}", self.name, self.descriptor),
        }
    }
}

/// Common view of fields and methods
pub trait Member {
    const KIND: MemberKind;

    fn name(&self) -> &str;

    /// Type descriptor (eg. `I` or `(Ljava/lang/String;)V`)
    fn descriptor(&self) -> &str;

    /// `ACC_SYNTHETIC` is set
    fn has_synthetic_flag(&self) -> bool;

    /// `Synthetic` attribute is present
    fn has_synthetic_attribute(&self) -> bool;

    /// Declaration as it would appear in Java source (without a body or initializer)
    fn java_declaration(&self) -> String;

    fn id(&self) -> MemberId {
        MemberId {
            kind: Self::KIND,
            name: self.name().to_owned(),
            descriptor: self.descriptor().to_owned(),
        }
    }
}
