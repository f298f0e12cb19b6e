use super::Classification;
use crate::jvm::{
    java_class_name, serialize_flag_names, AccessFlagNames, ClassAccessFlags, ClassDescriptor,
    FieldDescriptor, Member, MethodDescriptor, Version,
};
use serde::Serialize;

/// One difference between the old and new version of a class
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "lowercase")]
pub enum Change {
    Added {
        subject: Subject,
        classification: Classification,
    },
    Removed {
        subject: Subject,
        classification: Classification,
    },
    Modified {
        old: Subject,
        new: Subject,
        deltas: Vec<Delta>,

        /// Classification on the new side
        classification: Classification,
    },
}

impl Change {
    pub fn classification(&self) -> Classification {
        match self {
            Change::Added { classification, .. }
            | Change::Removed { classification, .. }
            | Change::Modified { classification, .. } => *classification,
        }
    }

    /// Subject as it is after the change (or before, for removals)
    pub fn subject(&self) -> &Subject {
        match self {
            Change::Added { subject, .. } | Change::Removed { subject, .. } => subject,
            Change::Modified { new, .. } => new,
        }
    }
}

/// What was added, removed, or modified
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Subject {
    Class(ClassHeader),
    Field(FieldDescriptor),
    Method(MethodDescriptor),
}

impl Subject {
    /// Class name, or member name
    pub fn name(&self) -> &str {
        match self {
            Subject::Class(header) => &header.name,
            Subject::Field(field) => &field.name,
            Subject::Method(method) => &method.name,
        }
    }

    /// How the subject would be declared in Java source
    pub fn java_declaration(&self) -> String {
        match self {
            Subject::Class(header) => header.java_declaration(),
            Subject::Field(field) => field.java_declaration(),
            Subject::Method(method) => method.java_declaration(),
        }
    }
}

/// Everything about a class except for its members
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassHeader {
    pub name: String,
    pub version: Version,
    #[serde(serialize_with = "serialize_flag_names")]
    pub access_flags: ClassAccessFlags,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub outer_class: Option<String>,
    pub signature: Option<String>,
    pub deprecated: bool,
}

impl ClassHeader {
    pub fn of(class: &ClassDescriptor) -> ClassHeader {
        ClassHeader {
            name: class.name.clone(),
            version: class.version,
            access_flags: class.access_flags,
            super_class: class.super_class.clone(),
            interfaces: class.interfaces.clone(),
            outer_class: class.outer_class.clone(),
            signature: class.signature.clone(),
            deprecated: class.deprecated,
        }
    }

    /// Declaration line of the class (eg. `public final class java.lang.String`)
    pub fn java_declaration(&self) -> String {
        let flags = self.access_flags;
        let keyword = if flags.contains(ClassAccessFlags::ANNOTATION) {
            "@interface"
        } else if flags.contains(ClassAccessFlags::INTERFACE) {
            "interface"
        } else if flags.contains(ClassAccessFlags::ENUM) {
            "enum"
        } else {
            "class"
        };

        let mut declaration = String::new();
        for modifier in flags.source_modifiers() {
            // Interfaces are always abstract and enums are implicitly final
            let implied = (modifier == "abstract" && flags.contains(ClassAccessFlags::INTERFACE))
                || (modifier == "final" && flags.contains(ClassAccessFlags::ENUM));
            if !implied {
                declaration.push_str(modifier);
                declaration.push(' ');
            }
        }
        declaration.push_str(keyword);
        declaration.push(' ');
        declaration.push_str(&java_class_name(&self.name));
        declaration
    }
}

/// Single aspect in which a matched class or member differs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "delta", rename_all = "snake_case")]
pub enum Delta {
    AccessFlags {
        added: Vec<&'static str>,
        removed: Vec<&'static str>,
    },
    Signature {
        old: Option<String>,
        new: Option<String>,
    },
    Exceptions {
        added: Vec<String>,
        removed: Vec<String>,
    },
    ConstantValue {
        old: Option<String>,
        new: Option<String>,
    },
    Deprecated {
        old: bool,
        new: bool,
    },
    SuperClass {
        old: Option<String>,
        new: Option<String>,
    },
    Interfaces {
        added: Vec<String>,
        removed: Vec<String>,
    },
    Version {
        old: Version,
        new: Version,
    },
    OuterClass {
        old: Option<String>,
        new: Option<String>,
    },
}

#[cfg(test)]
mod test {
    use super::*;

    fn header(name: &str, access_flags: ClassAccessFlags) -> ClassHeader {
        ClassHeader {
            name: name.to_owned(),
            version: Version::JAVA8,
            access_flags,
            super_class: Some(String::from("java/lang/Object")),
            interfaces: vec![],
            outer_class: None,
            signature: None,
            deprecated: false,
        }
    }

    #[test]
    fn class_declarations() {
        let class = header(
            "java/lang/String",
            ClassAccessFlags::PUBLIC | ClassAccessFlags::FINAL | ClassAccessFlags::SUPER,
        );
        assert_eq!(class.java_declaration(), "public final class java.lang.String");

        let interface = header(
            "java/util/Map$Entry",
            ClassAccessFlags::PUBLIC | ClassAccessFlags::INTERFACE | ClassAccessFlags::ABSTRACT,
        );
        assert_eq!(interface.java_declaration(), "public interface java.util.Map$Entry");

        let annotation = header(
            "a/Marker",
            ClassAccessFlags::INTERFACE | ClassAccessFlags::ABSTRACT | ClassAccessFlags::ANNOTATION,
        );
        assert_eq!(annotation.java_declaration(), "@interface a.Marker");

        let enumeration = header(
            "a/Color",
            ClassAccessFlags::PUBLIC | ClassAccessFlags::FINAL | ClassAccessFlags::ENUM,
        );
        assert_eq!(enumeration.java_declaration(), "public enum a.Color");
    }
}
